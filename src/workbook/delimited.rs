//! Delimited text (csv/tsv) presented as a single-sheet workbook.
use csv::ReaderBuilder;
use std::io::Read;

/// Sheet name shown for delimited files, which carry no sheet concept.
pub(crate) const SHEET_NAME: &str = "Sheet1";

/// Delimiter for a lowercased file extension; tabs for tsv, commas otherwise.
pub(crate) fn delimiter_for(extension: &str) -> u8 {
    match extension {
        "tsv" => b'\t',
        _ => b',',
    }
}

/// Reads every record into trimmed string rows.
///
/// Rows keep their source field counts, so ragged files come through as jagged
/// rows. Note the csv reader drops zero-width lines; a blank spreadsheet row
/// exported as ",,," still arrives as a row of empty cells.
pub(crate) fn read_rows<R: Read>(reader: R, delimiter: u8) -> Result<Vec<Vec<String>>, csv::Error> {
    let mut reader = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .delimiter(delimiter)
        .from_reader(reader);
    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record?;
        rows.push(record.iter().map(|cell| cell.trim().to_owned()).collect());
    }
    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn reads_trimmed_jagged_rows() {
        let rows = read_rows(Cursor::new("a , b ,c\nd\n,,\n"), b',').unwrap();
        assert_eq!(
            rows,
            vec![
                vec!["a".to_string(), "b".to_string(), "c".to_string()],
                vec!["d".to_string()],
                vec![String::new(), String::new(), String::new()],
            ]
        );
    }

    #[test]
    fn honors_tab_delimiter_and_quotes() {
        let rows = read_rows(Cursor::new("Item\t\"Qty, total\"\nPipe\t10\n"), b'\t').unwrap();
        assert_eq!(rows[0], vec!["Item".to_string(), "Qty, total".to_string()]);
        assert_eq!(rows[1], vec!["Pipe".to_string(), "10".to_string()]);
    }

    #[test]
    fn delimiters_follow_extension() {
        assert_eq!(delimiter_for("tsv"), b'\t');
        assert_eq!(delimiter_for("csv"), b',');
        assert_eq!(delimiter_for("txt"), b',');
    }
}
