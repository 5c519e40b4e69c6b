/// Rectangular view over one sheet: rows of trimmed string cells.
///
/// Rows keep their source lengths, so the logical column count is the longest
/// row and short rows read as blanks. Blank rows survive reading; row indexes
/// therefore always line up with the source sheet.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Grid {
    rows: Vec<Vec<String>>,
}

impl Grid {
    /// Wraps already-trimmed rows. Readers are responsible for trimming.
    pub(crate) fn new(rows: Vec<Vec<String>>) -> Self {
        Self { rows }
    }

    /// Number of rows, counting blank ones.
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Logical column count over all rows.
    pub fn column_count(&self) -> usize {
        self.rows.iter().map(Vec::len).max().unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Cell text at (row, col); cells outside any row read as empty.
    pub fn cell(&self, row: usize, col: usize) -> &str {
        self.rows
            .get(row)
            .and_then(|cells| cells.get(col))
            .map(String::as_str)
            .unwrap_or("")
    }

    pub fn row(&self, index: usize) -> Option<&[String]> {
        self.rows.get(index).map(Vec::as_slice)
    }

    pub fn rows(&self) -> impl Iterator<Item = &[String]> {
        self.rows.iter().map(Vec::as_slice)
    }

    /// True when the row is missing or every cell in it is empty.
    pub fn is_blank_row(&self, index: usize) -> bool {
        self.rows
            .get(index)
            .map(|cells| cells.iter().all(|cell| cell.is_empty()))
            .unwrap_or(true)
    }

    /// Non-blank rows from `start` onward, paired with their source row index.
    pub fn data_rows(&self, start: usize) -> impl Iterator<Item = (usize, &[String])> {
        self.rows
            .iter()
            .enumerate()
            .skip(start)
            .filter(|(_, cells)| !cells.iter().all(|cell| cell.is_empty()))
            .map(|(index, cells)| (index, cells.as_slice()))
    }

    /// First `limit` rows, cloned for preview display.
    pub(crate) fn head(&self, limit: usize) -> Vec<Vec<String>> {
        self.rows.iter().take(limit).cloned().collect()
    }
}

/// Excel-style column label: 0 -> "A", 25 -> "Z", 26 -> "AA".
pub fn column_label(index: usize) -> String {
    let mut column = index as u32 + 1;
    let mut label = String::new();
    while column > 0 {
        column -= 1;
        let digit = char::from_u32(65 + column % 26).expect("Hardcode letters");
        column /= 26;
        label.insert(0, digit);
    }
    label
}

/// Lenient float parse matching the upload form this engine replaces: reads
/// the leading numeric run, so "12.5 /m" parses as 12.5. Returns None when the
/// text has no leading number at all.
pub(crate) fn leading_number(text: &str) -> Option<f64> {
    let text = text.trim();
    let mut end = 0;
    let mut seen_digit = false;
    let mut seen_dot = false;
    for (index, character) in text.char_indices() {
        match character {
            '+' | '-' if index == 0 => {}
            '.' if !seen_dot => seen_dot = true,
            character if character.is_ascii_digit() => seen_digit = true,
            _ => break,
        }
        end = index + character.len_utf8();
    }
    if seen_digit {
        text[..end].parse::<f64>().ok()
    } else {
        None
    }
}
