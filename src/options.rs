//! # Import Options Module
//!
//! Tuning knobs for detection and preview, threaded through the engine the
//! way a caller configures one import session. Defaults match the behavior
//! the procurement UI ships with.
use crate::mapping::FieldTable;

/// Header vocabulary for generic header-likeness checks.
///
/// Includes the serial-number headings ("Sl", "S.No") common in bills of
/// quantities, which mark a column as a header without mapping to a field.
pub(crate) const HEADER_KEYWORDS: [&str; 18] = [
    "description",
    "item",
    "particular",
    "particulars",
    "quantity",
    "qty",
    "unit",
    "uom",
    "rate",
    "amount",
    "total",
    "supply",
    "installation",
    "sl",
    "sno",
    "s.no",
    "sr",
    "no",
];

/// Options controlling header detection and preview sizes.
#[derive(Clone, Debug)]
pub struct ImportOptions {
    /// How many leading rows to scan for header candidates.
    pub scan_rows: usize,
    /// Upper bound on auto-selected header cells.
    pub max_header_cells: usize,
    /// Rows shown in the raw grid preview.
    pub raw_preview_rows: usize,
    /// Data rows shown in the mapped preview.
    pub preview_rows: usize,
    /// Generic header vocabulary, matched as lowercase substrings.
    pub header_keywords: Vec<String>,
    /// Keyword table mapping header text to line-item fields.
    pub fields: FieldTable,
}

impl Default for ImportOptions {
    fn default() -> Self {
        Self {
            scan_rows: 15,
            max_header_cells: 5,
            raw_preview_rows: 15,
            preview_rows: 100,
            header_keywords: HEADER_KEYWORDS.iter().map(|k| k.to_string()).collect(),
            fields: FieldTable::default(),
        }
    }
}
