//! # Workbook Reading Module
//!
//! Unified access to uploaded tabular files: Excel formats (`.xlsx`, `.xlsm`,
//! `.xlam`, `.xlsb`, `.xls`, `.xla`), OpenDocument spreadsheets (`.ods`) and
//! delimited text (`.csv`, `.tsv`, `.txt`). Whatever the source format, a
//! sheet is read into a [`Grid`] of trimmed cell text; all typing happens
//! downstream, during field mapping and line-item extraction.
pub(crate) mod delimited;
mod grid;

pub use grid::{column_label, Grid};
pub(crate) use grid::leading_number;

use calamine::{
    open_workbook, Data, ExcelDateTime, Ods, OdsError, Range, Reader, Xls, XlsError, Xlsb,
    XlsbError, Xlsx, XlsxError,
};
use chrono::Timelike;
use glob::Pattern;
use std::ffi::OsStr;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;
use thiserror::Error;
use tracing::debug;

/// Errors raised while opening or reading workbook files.
#[derive(Error, Debug)]
pub enum WorkbookError {
    /// Error in Excel 2007+ format (.xlsx, .xlsm, .xlam)
    #[error("Invalid xlsx file format: {0}")]
    InvalidXlsxFormat(#[from] XlsxError),

    /// Error in Excel Binary format (.xlsb)
    #[error("Invalid xlsb file format: {0}")]
    InvalidXlsbFormat(#[from] XlsbError),

    /// Error in legacy Excel format (.xls, .xla)
    #[error("Invalid xls file format: {0}")]
    InvalidXlsFormat(#[from] XlsError),

    /// Error in OpenDocument format (.ods)
    #[error("Invalid ods file format: {0}")]
    InvalidOdsFormat(#[from] OdsError),

    /// Error in delimited text (.csv, .tsv, .txt)
    #[error("Invalid delimited file: {0}")]
    InvalidDelimitedFormat(#[from] csv::Error),

    /// Unsupported or unrecognized file format
    #[error("Cannot detect file format for '{name}'")]
    InvalidFileFormat { name: String },

    /// Malformed sheet-name glob pattern
    #[error("Invalid sheet name pattern: {0}")]
    InvalidSheetPattern(#[from] glob::PatternError),

    /// Selector that matches none of the workbook's sheets
    #[error("No sheet matches '{selector}'")]
    SheetNotFound { selector: String },

    #[error("{0}")]
    IoError(#[from] std::io::Error),
}

/// Type alias for buffered file reader
pub type FileReader = BufReader<File>;

/// Wrapper enum over the supported workbook formats.
///
/// Excel and OpenDocument files go through calamine readers; delimited text is
/// materialized up front and exposed as a single sheet.
pub enum Workbook {
    /// Excel 2007+ format reader (.xlsx, .xlsm, .xlam)
    Xlsx(Xlsx<FileReader>),
    /// Excel Binary format reader (.xlsb)
    Xlsb(Xlsb<FileReader>),
    /// Legacy Excel format reader (.xls, .xla)
    Xls(Xls<FileReader>),
    /// OpenDocument format reader (.ods)
    Ods(Ods<FileReader>),
    /// Delimited text rows (.csv, .tsv, .txt)
    Delimited(Vec<Vec<String>>),
}

impl Workbook {
    /// Opens a tabular file, picking the reader from the file extension.
    pub fn open<P>(path: P) -> Result<Workbook, WorkbookError>
    where
        P: AsRef<Path>,
    {
        let path = path.as_ref();
        let extension = path
            .extension()
            .and_then(OsStr::to_str)
            .map(str::to_ascii_lowercase);
        let workbook = match extension.as_deref() {
            Some("xlsx") | Some("xlsm") | Some("xlam") => Self::Xlsx(open_workbook(path)?),
            Some("xlsb") => Self::Xlsb(open_workbook(path)?),
            Some("xls") | Some("xla") => Self::Xls(open_workbook(path)?),
            Some("ods") => Self::Ods(open_workbook(path)?),
            Some(extension @ ("csv" | "tsv" | "txt")) => {
                let file = File::open(path)?;
                Self::from_delimited(BufReader::new(file), delimited::delimiter_for(extension))?
            }
            _ => {
                return Err(WorkbookError::InvalidFileFormat {
                    name: path.to_string_lossy().to_string(),
                })
            }
        };
        debug!(file = %path.display(), sheets = workbook.sheet_names().len(), "opened workbook");
        Ok(workbook)
    }

    /// Builds a single-sheet workbook from any delimited-text reader.
    pub fn from_delimited<R: Read>(reader: R, delimiter: u8) -> Result<Workbook, WorkbookError> {
        Ok(Self::Delimited(delimited::read_rows(reader, delimiter)?))
    }

    /// Returns the names of all sheets in the workbook.
    pub fn sheet_names(&self) -> Vec<String> {
        match self {
            Self::Xlsx(xlsx) => xlsx.sheet_names(),
            Self::Xlsb(xlsb) => xlsb.sheet_names(),
            Self::Xls(xls) => xls.sheet_names(),
            Self::Ods(ods) => ods.sheet_names(),
            Self::Delimited(_) => vec![delimited::SHEET_NAME.to_string()],
        }
    }

    /// Reads the sheet at `index` into a grid of trimmed cell text.
    ///
    /// Returns `Ok(None)` when the workbook has no sheet at that index so the
    /// caller can keep its prior state; read failures surface as errors.
    pub fn read_grid(&mut self, index: usize) -> Result<Option<Grid>, WorkbookError> {
        let grid = match self {
            Self::Xlsx(xlsx) => match xlsx.worksheet_range_at(index) {
                Some(range) => Some(range_to_grid(&range?)),
                None => None,
            },
            Self::Xlsb(xlsb) => match xlsb.worksheet_range_at(index) {
                Some(range) => Some(range_to_grid(&range?)),
                None => None,
            },
            Self::Xls(xls) => match xls.worksheet_range_at(index) {
                Some(range) => Some(range_to_grid(&range?)),
                None => None,
            },
            Self::Ods(ods) => match ods.worksheet_range_at(index) {
                Some(range) => Some(range_to_grid(&range?)),
                None => None,
            },
            Self::Delimited(rows) => (index == 0).then(|| Grid::new(rows.clone())),
        };
        if let Some(grid) = &grid {
            debug!(
                sheet = index,
                rows = grid.row_count(),
                columns = grid.column_count(),
                "read sheet"
            );
        }
        Ok(grid)
    }
}

/// How a caller picks a sheet: by position, or by glob pattern over names.
#[derive(Clone, Debug)]
pub enum SheetSelector {
    Index(usize),
    Name(Pattern),
}

impl SheetSelector {
    /// Parses a selector string: bare digits mean an index, anything else a
    /// glob pattern matched against sheet names.
    pub fn parse(text: &str) -> Result<Self, WorkbookError> {
        if let Ok(index) = text.parse::<usize>() {
            Ok(Self::Index(index))
        } else {
            Ok(Self::Name(Pattern::new(text)?))
        }
    }

    /// Resolves the selector against the workbook's sheet names; `None` when
    /// nothing matches. Patterns pick the first matching sheet.
    pub fn resolve(&self, names: &[String]) -> Option<usize> {
        match self {
            Self::Index(index) => (*index < names.len()).then_some(*index),
            Self::Name(pattern) => names.iter().position(|name| pattern.matches(name)),
        }
    }
}

impl Default for SheetSelector {
    fn default() -> Self {
        Self::Index(0)
    }
}

/// Flattens a calamine range into a grid anchored at the sheet origin.
///
/// Calamine ranges start at the first used cell; rows and columns before that
/// point are padded back in as blanks so grid coordinates always equal sheet
/// coordinates. The backend receives raw column indexes, so this alignment is
/// load-bearing, not cosmetic.
fn range_to_grid(range: &Range<Data>) -> Grid {
    let Some((row_offset, col_offset)) = range.start() else {
        return Grid::new(Vec::new());
    };
    let mut rows: Vec<Vec<String>> = vec![Vec::new(); row_offset as usize];
    for cells in range.rows() {
        let mut row = vec![String::new(); col_offset as usize];
        row.extend(cells.iter().map(cell_text));
        rows.push(row);
    }
    Grid::new(rows)
}

/// Cell text the way the mapping engine sees it: stringified and trimmed,
/// empty for blank cells. No numeric coercion happens here; error cells keep
/// their Excel error text so they stay visible in previews.
fn cell_text(value: &Data) -> String {
    match value {
        Data::Empty => String::new(),
        Data::String(text) => text.trim().to_owned(),
        Data::Bool(value) => value.to_string(),
        Data::Int(value) => value.to_string(),
        Data::Float(value) => value.to_string(),
        Data::DateTime(stamp) => datetime_text(stamp),
        Data::DateTimeIso(text) => text.trim().to_owned(),
        Data::DurationIso(text) => text.trim().to_owned(),
        Data::Error(error) => error.to_string(),
    }
}

/// Stamps at exactly midnight are date-only serials; render them as dates,
/// everything else as full timestamps.
fn datetime_text(stamp: &ExcelDateTime) -> String {
    match stamp.as_datetime() {
        Some(datetime)
            if datetime.num_seconds_from_midnight() == 0 && datetime.nanosecond() == 0 =>
        {
            datetime.format("%Y-%m-%d").to_string()
        }
        Some(datetime) => datetime.format("%Y-%m-%d %H:%M:%S").to_string(),
        None => stamp.as_f64().to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use calamine::{CellErrorType, ExcelDateTimeType};
    use std::io::Cursor;

    #[test]
    fn cell_text_stringifies_without_coercion() {
        assert_eq!(cell_text(&Data::Empty), "");
        assert_eq!(cell_text(&Data::String("  Pipe 25mm ".to_string())), "Pipe 25mm");
        assert_eq!(cell_text(&Data::Int(7)), "7");
        assert_eq!(cell_text(&Data::Float(10.0)), "10");
        assert_eq!(cell_text(&Data::Float(10.5)), "10.5");
        assert_eq!(cell_text(&Data::Bool(true)), "true");
        assert_eq!(cell_text(&Data::Error(CellErrorType::Div0)), "#DIV/0!");
        assert_eq!(cell_text(&Data::DateTimeIso(" 2024-01-05 ".to_string())), "2024-01-05");
    }

    #[test]
    fn whole_day_serials_render_without_a_time_component() {
        // Serial 45536 is 2024-09-01; the .5 serial lands at noon.
        let date = ExcelDateTime::new(45536.0, ExcelDateTimeType::DateTime, false);
        assert_eq!(cell_text(&Data::DateTime(date)), "2024-09-01");
        let stamp = ExcelDateTime::new(45536.5, ExcelDateTimeType::DateTime, false);
        assert_eq!(cell_text(&Data::DateTime(stamp)), "2024-09-01 12:00:00");
    }

    #[test]
    fn range_grid_pads_back_to_sheet_origin() {
        let mut range: Range<Data> = Range::new((2, 1), (3, 2));
        range.set_value((2, 1), Data::String("Item".to_string()));
        range.set_value((2, 2), Data::String("Qty".to_string()));
        range.set_value((3, 1), Data::String("Pipe".to_string()));
        range.set_value((3, 2), Data::Int(10));

        let grid = range_to_grid(&range);
        assert_eq!(grid.row_count(), 4);
        assert!(grid.is_blank_row(0));
        assert!(grid.is_blank_row(1));
        assert_eq!(grid.cell(2, 0), "");
        assert_eq!(grid.cell(2, 1), "Item");
        assert_eq!(grid.cell(3, 2), "10");
    }

    #[test]
    fn delimited_workbook_has_one_sheet() {
        let mut workbook =
            Workbook::from_delimited(Cursor::new("Item,Qty\nPipe,10\n"), b',').unwrap();
        assert_eq!(workbook.sheet_names(), vec!["Sheet1".to_string()]);
        let grid = workbook.read_grid(0).unwrap().unwrap();
        assert_eq!(grid.cell(1, 0), "Pipe");
        assert!(workbook.read_grid(1).unwrap().is_none());
    }

    #[test]
    fn unknown_extension_is_rejected() {
        let result = Workbook::open("boq.pdf");
        assert!(matches!(
            result,
            Err(WorkbookError::InvalidFileFormat { .. })
        ));
    }

    #[test]
    fn sheet_selectors_resolve_by_index_or_pattern() {
        let names = vec![
            "Summary".to_string(),
            "BOQ Civil".to_string(),
            "BOQ MEP".to_string(),
        ];
        assert_eq!(SheetSelector::parse("2").unwrap().resolve(&names), Some(2));
        assert_eq!(SheetSelector::parse("9").unwrap().resolve(&names), None);
        assert_eq!(
            SheetSelector::parse("BOQ*").unwrap().resolve(&names),
            Some(1)
        );
        assert_eq!(SheetSelector::parse("TDS*").unwrap().resolve(&names), None);
    }
}
