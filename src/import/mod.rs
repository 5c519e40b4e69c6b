//! # Line Item Module
//!
//! Turns the mapped data zone into priced bill-of-quantities line items and
//! packages the import request the procurement backend consumes. Pricing is
//! derived here so previews and summaries show the same totals the backend
//! will compute.
use crate::mapping::{FieldMapping, TargetField};
use crate::workbook::{leading_number, Grid};
use serde::Serialize;
use std::collections::BTreeMap;
use tracing::debug;

/// One bill-of-quantities line item built from a mapped sheet row.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct LineItem {
    /// Zero-based sheet row the item came from.
    pub source_row: usize,
    pub description: String,
    pub unit: String,
    pub quantity: f64,
    pub supply_rate: f64,
    pub installation_rate: f64,
    /// Supply rate plus installation rate.
    pub total_rate: f64,
    /// Quantity times total rate.
    pub amount: f64,
}

/// Project context attached to an import request.
#[derive(Clone, Debug, Default, Serialize)]
pub struct ImportMeta {
    pub project: String,
    pub work_package: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub zone: Option<String>,
}

/// Everything the backend needs to run the import server-side.
#[derive(Clone, Debug, Serialize)]
pub struct ImportRequest {
    pub sheet_index: usize,
    pub sheet_name: String,
    pub data_start_row: usize,
    /// Field name to zero-based column index.
    pub mapping: BTreeMap<&'static str, usize>,
    pub meta: ImportMeta,
}

/// Builds line items from every non-blank data-zone row.
///
/// Rows whose description cell is blank are dropped; in practice those are
/// section dividers and subtotal rows. Numeric cells parse leniently
/// ("12.5 /m" reads 12.5) and unreadable or unmapped values fall back to
/// zero, matching how estimators key partially priced sheets.
pub fn build_line_items(
    grid: &Grid,
    mapping: &FieldMapping,
    data_start_row: usize,
) -> Vec<LineItem> {
    let description_column = mapping.column(TargetField::Description);
    let number = |row: usize, field: TargetField| -> f64 {
        mapping
            .column(field)
            .and_then(|column| leading_number(grid.cell(row, column)))
            .unwrap_or(0.0)
    };

    let mut items = Vec::new();
    let mut skipped = 0usize;
    for (source_row, _) in grid.data_rows(data_start_row) {
        let description = description_column
            .map(|column| grid.cell(source_row, column))
            .unwrap_or_default();
        if description.is_empty() {
            skipped += 1;
            continue;
        }
        let unit = mapping
            .column(TargetField::Unit)
            .map(|column| grid.cell(source_row, column).to_string())
            .unwrap_or_default();
        let quantity = number(source_row, TargetField::Quantity);
        let supply_rate = number(source_row, TargetField::SupplyRate);
        let installation_rate = number(source_row, TargetField::InstallationRate);
        let total_rate = supply_rate + installation_rate;
        items.push(LineItem {
            source_row,
            description: description.to_string(),
            unit,
            quantity,
            supply_rate,
            installation_rate,
            total_rate,
            amount: quantity * total_rate,
        });
    }
    debug!(built = items.len(), skipped, "built line items");
    items
}

/// Sum of line-item amounts, for import summaries.
pub fn total_amount(items: &[LineItem]) -> f64 {
    items.iter().map(|item| item.amount).sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grid(rows: &[&[&str]]) -> Grid {
        Grid::new(
            rows.iter()
                .map(|row| row.iter().map(|cell| cell.to_string()).collect())
                .collect(),
        )
    }

    fn full_mapping() -> FieldMapping {
        let mut mapping = FieldMapping::default();
        mapping.assign(TargetField::Description, 0);
        mapping.assign(TargetField::Quantity, 1);
        mapping.assign(TargetField::Unit, 2);
        mapping.assign(TargetField::SupplyRate, 3);
        mapping.assign(TargetField::InstallationRate, 4);
        mapping
    }

    #[test]
    fn prices_rows_and_skips_blank_descriptions() {
        let grid = grid(&[
            &["Item", "Qty", "Unit", "Supply", "Install"],
            &["Pipe 25mm", "10", "m", "200", "50"],
            &["", "5", "m", "1", "1"],
            &["Gate valve", "4", "nos", "1200", "0"],
        ]);
        let items = build_line_items(&grid, &full_mapping(), 1);
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].source_row, 1);
        assert_eq!(items[0].total_rate, 250.0);
        assert_eq!(items[0].amount, 2500.0);
        assert_eq!(items[1].description, "Gate valve");
        assert_eq!(items[1].unit, "nos");
        assert_eq!(items[1].amount, 4800.0);
        assert_eq!(total_amount(&items), 7300.0);
    }

    #[test]
    fn unreadable_numbers_fall_back_to_zero() {
        let grid = grid(&[&["Cable 4mm", "12.5 /m", "m", "N/A", "55"]]);
        let items = build_line_items(&grid, &full_mapping(), 0);
        assert_eq!(items[0].quantity, 12.5);
        assert_eq!(items[0].supply_rate, 0.0);
        assert_eq!(items[0].installation_rate, 55.0);
        assert_eq!(items[0].amount, 12.5 * 55.0);
    }

    #[test]
    fn unmapped_fields_read_as_empty_or_zero() {
        let grid = grid(&[&["Shuttering", "40"]]);
        let mut mapping = FieldMapping::default();
        mapping.assign(TargetField::Description, 0);
        let items = build_line_items(&grid, &mapping, 0);
        assert_eq!(items[0].unit, "");
        assert_eq!(items[0].quantity, 0.0);
        assert_eq!(items[0].amount, 0.0);
    }

    #[test]
    fn unmapped_description_builds_nothing() {
        let grid = grid(&[&["Pipe", "10"]]);
        let items = build_line_items(&grid, &FieldMapping::default(), 0);
        assert!(items.is_empty());
    }

    #[test]
    fn request_serializes_with_wire_field_names() {
        let mut mapping = FieldMapping::default();
        mapping.assign(TargetField::Description, 1);
        mapping.assign(TargetField::Quantity, 3);
        let request = ImportRequest {
            sheet_index: 2,
            sheet_name: "BOQ Civil".to_string(),
            data_start_row: 4,
            mapping: mapping.to_wire(),
            meta: ImportMeta {
                project: "Tower B".to_string(),
                work_package: "Plumbing".to_string(),
                zone: None,
            },
        };
        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(
            value,
            serde_json::json!({
                "sheet_index": 2,
                "sheet_name": "BOQ Civil",
                "data_start_row": 4,
                "mapping": {"description": 1, "quantity": 3},
                "meta": {"project": "Tower B", "work_package": "Plumbing"}
            })
        );
    }
}
