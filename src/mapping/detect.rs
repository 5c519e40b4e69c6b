//! # Header Detection Module
//!
//! Heuristics that locate the header row of an uploaded sheet and pick an
//! initial set of header cells. Scoring favors rows that are well filled,
//! non-numeric and rich in header vocabulary; selection then claims cells for
//! line-item fields, falling back to generic header words for columns (like a
//! bare "Rate") that name no single field.
use crate::mapping::{HeaderSelection, TargetField};
use crate::options::ImportOptions;
use crate::workbook::{leading_number, Grid};
use std::collections::BTreeSet;
use tracing::debug;

/// Finds the most header-like row among the first `scan_rows` rows.
///
/// Ties go to the earliest row; an empty sheet yields row zero.
pub fn detect_header_row(grid: &Grid, options: &ImportOptions) -> usize {
    let mut best_row = 0;
    let mut best_score = i32::MIN;
    for index in 0..grid.row_count().min(options.scan_rows) {
        let score = score_row(grid.row(index).unwrap_or_default(), &options.header_keywords);
        if score > best_score {
            best_score = score;
            best_row = index;
        }
    }
    debug!(row = best_row, "detected header row");
    best_row
}

/// Scores one row's likeness to a header row.
///
/// Sparse rows (under three filled cells) are penalized, otherwise each
/// filled cell counts one. A row with no numeric-looking cell gains two, and
/// every header keyword found in a cell gains three. Data rows lose out on
/// both counts: they parse as numbers and miss the vocabulary.
fn score_row(cells: &[String], keywords: &[String]) -> i32 {
    let filled: Vec<&str> = cells
        .iter()
        .map(String::as_str)
        .filter(|cell| !cell.is_empty())
        .collect();
    let mut score = if filled.len() < 3 {
        -5
    } else {
        filled.len() as i32
    };
    if filled.iter().all(|cell| leading_number(cell).is_none()) {
        score += 2;
    }
    for cell in &filled {
        let cell = cell.to_lowercase();
        for keyword in keywords {
            if cell.contains(keyword.as_str()) {
                score += 3;
            }
        }
    }
    score
}

/// Detects the header row and auto-selects header cells from it.
///
/// First pass walks the detected row left to right: a cell is selected when
/// it suggests an unclaimed field (claiming it) or merely looks like a
/// header by vocabulary. Second pass sweeps the remaining scanned rows for
/// fields still unclaimed, so split headers ("Supply Rate" sitting a row
/// below "Description") are still picked up. Both passes stop at
/// `max_header_cells`.
pub(crate) fn auto_select_headers(
    grid: &Grid,
    options: &ImportOptions,
) -> (HeaderSelection, usize) {
    let header_row = detect_header_row(grid, options);
    let mut selection = HeaderSelection::default();
    let mut used: BTreeSet<TargetField> = BTreeSet::new();

    if let Some(cells) = grid.row(header_row) {
        for (column, text) in cells.iter().enumerate() {
            if selection.len() >= options.max_header_cells {
                break;
            }
            if text.is_empty() {
                continue;
            }
            if let Some(field) = options.fields.suggest(text, |field| used.contains(&field)) {
                used.insert(field);
                selection.insert(header_row, column);
            } else if options.fields.matches_any(text)
                || contains_any(text, &options.header_keywords)
            {
                // Header-looking text whose field is taken (or that names no
                // field, like a bare "Rate") is still worth selecting.
                selection.insert(header_row, column);
            }
        }
    }

    'scan: for row in 0..grid.row_count().min(options.scan_rows) {
        if row == header_row {
            continue;
        }
        let Some(cells) = grid.row(row) else { continue };
        for (column, text) in cells.iter().enumerate() {
            if selection.len() >= options.max_header_cells {
                break 'scan;
            }
            if text.is_empty() || selection.contains(column) {
                continue;
            }
            if let Some(field) = options.fields.suggest(text, |field| used.contains(&field)) {
                used.insert(field);
                selection.insert(row, column);
            }
        }
    }

    debug!(
        row = header_row,
        selected = selection.len(),
        "auto-selected header cells"
    );
    (selection, header_row)
}

fn contains_any(text: &str, keywords: &[String]) -> bool {
    let text = text.to_lowercase();
    keywords.iter().any(|keyword| text.contains(keyword.as_str()))
}
