//! # Column Mapping Module
//!
//! State for the header-selection and field-mapping workflow: which cells the
//! user has marked as column headers, which line-item field each selected
//! column feeds, and the automatic suggestions that seed both. Detection
//! lives in `detect`; this module owns the data structures and the rules
//! for keeping them consistent.
pub(crate) mod detect;
mod fields;

pub use detect::detect_header_row;
pub use fields::{FieldSpec, FieldTable, FieldTableError, TargetField};

use crate::workbook::Grid;
use serde::Serialize;
use std::collections::BTreeMap;

/// The set of cells currently marked as column headers, keyed by column.
///
/// At most one header cell per column; the value is the row the header was
/// taken from. Iteration is in ascending column order, which fixes the order
/// previews and prompts list the selected columns in.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct HeaderSelection {
    cells: BTreeMap<usize, usize>,
}

impl HeaderSelection {
    /// Number of selected header cells.
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Row the header for `column` was taken from, if one is selected.
    pub fn row_for(&self, column: usize) -> Option<usize> {
        self.cells.get(&column).copied()
    }

    pub fn contains(&self, column: usize) -> bool {
        self.cells.contains_key(&column)
    }

    /// Marks `(row, column)` as the header for its column, replacing any
    /// previous selection in that column.
    pub fn insert(&mut self, row: usize, column: usize) {
        self.cells.insert(column, row);
    }

    /// Drops the selection for `column`, if any.
    pub fn remove(&mut self, column: usize) {
        self.cells.remove(&column);
    }

    pub fn clear(&mut self) {
        self.cells.clear();
    }

    /// Selected entries as `(column, row)` pairs in ascending column order.
    pub fn iter(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        self.cells.iter().map(|(column, row)| (*column, *row))
    }

    /// Selected columns in ascending order.
    pub fn columns(&self) -> impl Iterator<Item = usize> + '_ {
        self.cells.keys().copied()
    }

    /// First row of the data zone: one past the deepest selected header row,
    /// or row zero when nothing is selected.
    pub fn data_start_row(&self) -> usize {
        self.cells
            .values()
            .max()
            .map(|row| row + 1)
            .unwrap_or_default()
    }
}

/// Which selected column feeds which line-item field.
///
/// Both directions are unique: a field reads from at most one column, and a
/// column feeds at most one field.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FieldMapping {
    columns: BTreeMap<TargetField, usize>,
}

impl FieldMapping {
    /// Column mapped to `field`, if any.
    pub fn column(&self, field: TargetField) -> Option<usize> {
        self.columns.get(&field).copied()
    }

    /// Field fed by `column`, if any.
    pub fn field_for(&self, column: usize) -> Option<TargetField> {
        self.columns
            .iter()
            .find(|(_, mapped)| **mapped == column)
            .map(|(field, _)| *field)
    }

    pub fn is_mapped(&self, field: TargetField) -> bool {
        self.columns.contains_key(&field)
    }

    /// Points `field` at `column`, unmapping whichever field previously read
    /// from that column.
    pub fn assign(&mut self, field: TargetField, column: usize) {
        self.columns.retain(|_, mapped| *mapped != column);
        self.columns.insert(field, column);
    }

    /// Unmaps `field`.
    pub fn clear_field(&mut self, field: TargetField) {
        self.columns.remove(&field);
    }

    /// Unmaps whatever field reads from `column`.
    pub fn clear_column(&mut self, column: usize) {
        self.columns.retain(|_, mapped| *mapped != column);
    }

    pub fn clear(&mut self) {
        self.columns.clear();
    }

    /// Mapped `(field, column)` pairs in field-priority order.
    pub fn iter(&self) -> impl Iterator<Item = (TargetField, usize)> + '_ {
        self.columns.iter().map(|(field, column)| (*field, *column))
    }

    /// Wire form for the import request: field name to column index.
    pub fn to_wire(&self) -> BTreeMap<&'static str, usize> {
        self.columns
            .iter()
            .map(|(field, column)| (field.as_str(), *column))
            .collect()
    }

    /// Rebuilds the whole mapping from the current selection.
    ///
    /// Walks selected columns in ascending order and gives each header cell to
    /// the first unmapped field its text matches; blank header cells and
    /// already-claimed fields are skipped.
    pub fn infer(grid: &Grid, selection: &HeaderSelection, table: &FieldTable) -> Self {
        let mut mapping = Self::default();
        for (column, row) in selection.iter() {
            let text = grid.cell(row, column);
            if text.is_empty() {
                continue;
            }
            if let Some(field) = table.suggest(text, |field| mapping.is_mapped(field)) {
                mapping.columns.insert(field, column);
            }
        }
        mapping
    }
}
