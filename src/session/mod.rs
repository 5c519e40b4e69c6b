//! # Import Session Module
//!
//! The interactive state machine behind the column-mapping screen: one open
//! workbook, the active sheet read into a grid, the current header selection
//! and field mapping, and the previews derived from them. Every mutation
//! keeps the invariants the UI depends on: one header per column, one column
//! per field, mapped columns always selected.
use crate::import::{build_line_items, ImportMeta, ImportRequest, LineItem};
use crate::mapping::detect::auto_select_headers;
use crate::mapping::{FieldMapping, HeaderSelection, TargetField};
use crate::options::ImportOptions;
use crate::workbook::{Grid, Workbook, WorkbookError};
use serde::Serialize;
use std::path::Path;
use thiserror::Error;
use tracing::debug;

/// Errors raised by import-session operations.
#[derive(Error, Debug)]
pub enum SessionError {
    /// Workbook that contains no readable sheet
    #[error("Workbook has no sheets")]
    EmptyWorkbook,

    /// Mapping a field to a column with no selected header
    #[error("Column {column} has no selected header cell")]
    ColumnNotSelected { column: usize },

    /// Extracting line items before a description column is mapped
    #[error("No description column is mapped")]
    DescriptionNotMapped,

    #[error("{0}")]
    Workbook(#[from] WorkbookError),
}

/// What a header-cell toggle did to the selection.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ToggleOutcome {
    /// Blank cell; nothing changed.
    Ignored,
    /// Selection already holds the maximum number of columns.
    Rejected,
    /// The cell was selected and is now deselected.
    Deselected,
    /// The column's header moved to this cell.
    Replaced { suggestion: Option<TargetField> },
    /// A new column was selected.
    Selected { suggestion: Option<TargetField> },
}

/// One data-zone row surfaced in the mapped preview.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct DataRow {
    /// Zero-based sheet row the cells came from.
    pub source_row: usize,
    pub cells: Vec<String>,
}

/// An in-progress spreadsheet import: workbook, active sheet and mapping state.
pub struct ImportSession {
    workbook: Workbook,
    sheet_names: Vec<String>,
    options: ImportOptions,
    sheet_index: usize,
    grid: Grid,
    detected_header_row: usize,
    selection: HeaderSelection,
    mapping: FieldMapping,
}

impl ImportSession {
    /// Opens a file and starts a session on its first sheet, with header
    /// detection and field suggestions already applied.
    pub fn open<P>(path: P, options: ImportOptions) -> Result<Self, SessionError>
    where
        P: AsRef<Path>,
    {
        Self::from_workbook(Workbook::open(path)?, options)
    }

    /// Starts a session on an already-open workbook.
    pub fn from_workbook(
        mut workbook: Workbook,
        options: ImportOptions,
    ) -> Result<Self, SessionError> {
        let sheet_names = workbook.sheet_names();
        let grid = workbook
            .read_grid(0)?
            .ok_or(SessionError::EmptyWorkbook)?;
        let mut session = Self {
            workbook,
            sheet_names,
            options,
            sheet_index: 0,
            grid,
            detected_header_row: 0,
            selection: HeaderSelection::default(),
            mapping: FieldMapping::default(),
        };
        session.rebuild();
        Ok(session)
    }

    /// Re-runs header detection and rebuilds the field mapping from scratch.
    fn rebuild(&mut self) {
        let (selection, header_row) = auto_select_headers(&self.grid, &self.options);
        self.mapping = FieldMapping::infer(&self.grid, &selection, &self.options.fields);
        self.selection = selection;
        self.detected_header_row = header_row;
    }

    /// Switches to the sheet at `index` and redetects headers on it.
    ///
    /// Returns `Ok(false)` and leaves the session untouched when the workbook
    /// has no such sheet.
    pub fn change_sheet(&mut self, index: usize) -> Result<bool, SessionError> {
        let Some(grid) = self.workbook.read_grid(index)? else {
            debug!(sheet = index, "sheet unavailable; keeping current sheet");
            return Ok(false);
        };
        self.sheet_index = index;
        self.grid = grid;
        self.rebuild();
        Ok(true)
    }

    /// Toggles the header state of one cell.
    ///
    /// Selecting a cell in an already-selected column moves that column's
    /// header; selecting the same cell again deselects the column and drops
    /// its field mapping. Blank cells and selections beyond the cap are
    /// turned away unchanged.
    pub fn toggle(&mut self, row: usize, column: usize) -> ToggleOutcome {
        if self.grid.cell(row, column).is_empty() {
            return ToggleOutcome::Ignored;
        }
        match self.selection.row_for(column) {
            Some(selected) if selected == row => {
                self.selection.remove(column);
                self.mapping.clear_column(column);
                ToggleOutcome::Deselected
            }
            Some(_) => {
                self.selection.insert(row, column);
                self.mapping.clear_column(column);
                let suggestion = self.suggest_for(row, column);
                ToggleOutcome::Replaced { suggestion }
            }
            None if self.selection.len() >= self.options.max_header_cells => {
                ToggleOutcome::Rejected
            }
            None => {
                self.selection.insert(row, column);
                let suggestion = self.suggest_for(row, column);
                ToggleOutcome::Selected { suggestion }
            }
        }
    }

    /// Suggests a field for a freshly selected header cell and maps it.
    fn suggest_for(&mut self, row: usize, column: usize) -> Option<TargetField> {
        let text = self.grid.cell(row, column);
        let mapping = &self.mapping;
        let field = self
            .options
            .fields
            .suggest(text, |field| mapping.is_mapped(field))?;
        self.mapping.assign(field, column);
        Some(field)
    }

    /// Maps `field` to a selected column, or clears it with `None`.
    ///
    /// Mapping to an unselected column is refused; the grid cell being
    /// pointed at must first be selected as a header.
    pub fn set_field(
        &mut self,
        field: TargetField,
        column: Option<usize>,
    ) -> Result<(), SessionError> {
        match column {
            Some(column) if !self.selection.contains(column) => {
                Err(SessionError::ColumnNotSelected { column })
            }
            Some(column) => {
                self.mapping.assign(field, column);
                Ok(())
            }
            None => {
                self.mapping.clear_field(field);
                Ok(())
            }
        }
    }

    /// Deselects every header cell and drops the whole field mapping.
    pub fn clear_headers(&mut self) {
        self.selection.clear();
        self.mapping.clear();
    }

    /// True once the import can proceed: a description column is mapped.
    pub fn can_import(&self) -> bool {
        self.mapping.is_mapped(TargetField::Description)
    }

    pub fn sheet_names(&self) -> &[String] {
        &self.sheet_names
    }

    pub fn sheet_index(&self) -> usize {
        self.sheet_index
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    /// Row the detector judged most header-like on the active sheet.
    pub fn detected_header_row(&self) -> usize {
        self.detected_header_row
    }

    pub fn selection(&self) -> &HeaderSelection {
        &self.selection
    }

    pub fn mapping(&self) -> &FieldMapping {
        &self.mapping
    }

    /// First row of the data zone, derived from the current selection.
    pub fn data_start_row(&self) -> usize {
        self.selection.data_start_row()
    }

    /// Leading sheet rows, for the grid the user picks headers from.
    pub fn raw_preview(&self) -> Vec<Vec<String>> {
        self.grid.head(self.options.raw_preview_rows)
    }

    /// Non-blank data-zone rows, capped for display.
    pub fn data_preview(&self) -> Vec<DataRow> {
        self.grid
            .data_rows(self.data_start_row())
            .take(self.options.preview_rows)
            .map(|(source_row, cells)| DataRow {
                source_row,
                cells: cells.to_vec(),
            })
            .collect()
    }

    /// Total non-blank data-zone rows, uncapped.
    pub fn data_row_count(&self) -> usize {
        self.grid.data_rows(self.data_start_row()).count()
    }

    /// Line items the current mapping would import.
    pub fn line_items(&self) -> Vec<LineItem> {
        build_line_items(&self.grid, &self.mapping, self.data_start_row())
    }

    /// Assembles the request the backend runs the import from.
    pub fn import_request(&self, meta: ImportMeta) -> ImportRequest {
        ImportRequest {
            sheet_index: self.sheet_index,
            sheet_name: self
                .sheet_names
                .get(self.sheet_index)
                .cloned()
                .unwrap_or_default(),
            data_start_row: self.data_start_row(),
            mapping: self.mapping.to_wire(),
            meta,
        }
    }
}
