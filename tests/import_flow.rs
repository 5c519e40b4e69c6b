//! End-to-end import flow over real files on disk.
//!
//! Writes bill-of-quantities fixtures into a temp directory, opens them
//! through the public API and walks the whole review loop: detection,
//! header corrections, field overrides and the final import request.

use boq_import::{
    total_amount, ImportMeta, ImportOptions, ImportSession, SessionError, SheetSelector,
    TargetField, ToggleOutcome, Workbook,
};
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

// Banner rows, a column count one past the selection cap, a blank row in
// the data zone and a trailing note row.
const BOQ_CSV: &str = "\
TENDER FOR CIVIL WORKS,,,,,
Bill of Quantities - Block A,,,,,
,,,,,
S.No,Description of Item,Unit,Qty,Supply Rate,Installation Rate
1,Excavation in ordinary soil,cum,120,85,40
2,PCC 1:4:8 in foundation,cum,24,4200,600
,,,,,
3,Brickwork in CM 1:6,cum,36,5100,900
,NOTE: Rates inclusive of all taxes,,,,
";

fn write_fixture(dir: &TempDir, name: &str, contents: &str) -> PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, contents).unwrap();
    path
}

#[test]
fn csv_import_review_loop() {
    let dir = TempDir::new().unwrap();
    let path = write_fixture(&dir, "boq.csv", BOQ_CSV);
    let mut session = ImportSession::open(&path, ImportOptions::default()).unwrap();

    // The keyword row wins over banners and data rows.
    assert_eq!(session.detected_header_row(), 3);
    let selected: Vec<(usize, usize)> = session.selection().iter().collect();
    assert_eq!(selected, vec![(0, 3), (1, 3), (2, 3), (3, 3), (4, 3)]);
    assert_eq!(session.mapping().column(TargetField::Description), Some(1));
    assert_eq!(session.mapping().column(TargetField::Unit), Some(2));
    assert_eq!(session.mapping().column(TargetField::Quantity), Some(3));
    assert_eq!(session.mapping().column(TargetField::SupplyRate), Some(4));
    assert_eq!(
        session.mapping().column(TargetField::InstallationRate),
        None
    );
    assert!(session.can_import());

    assert_eq!(session.data_start_row(), 4);
    assert_eq!(session.data_row_count(), 4);
    let preview = session.raw_preview();
    assert_eq!(preview[0][0], "TENDER FOR CIVIL WORKS");

    // The sixth header is past the cap until another column is released.
    assert_eq!(session.toggle(3, 5), ToggleOutcome::Rejected);
    assert_eq!(session.toggle(3, 0), ToggleOutcome::Deselected);
    assert_eq!(
        session.toggle(3, 5),
        ToggleOutcome::Selected {
            suggestion: Some(TargetField::InstallationRate)
        }
    );
    assert_eq!(
        session.mapping().column(TargetField::InstallationRate),
        Some(5)
    );

    // Field overrides only land on selected columns.
    let error = session
        .set_field(TargetField::SupplyRate, Some(0))
        .unwrap_err();
    assert!(matches!(error, SessionError::ColumnNotSelected { column: 0 }));

    let items = session.line_items();
    assert_eq!(items.len(), 4);
    assert_eq!(items[0].source_row, 4);
    assert_eq!(items[0].description, "Excavation in ordinary soil");
    assert_eq!(items[0].unit, "cum");
    assert_eq!(items[0].quantity, 120.0);
    assert_eq!(items[0].total_rate, 125.0);
    assert_eq!(items[0].amount, 15000.0);
    // The note row has a description and nothing else.
    assert_eq!(items[3].source_row, 8);
    assert_eq!(items[3].amount, 0.0);
    assert_eq!(total_amount(&items), 346200.0);

    let request = session.import_request(ImportMeta {
        project: "Metro Depot".to_string(),
        work_package: "Civil".to_string(),
        zone: None,
    });
    assert_eq!(
        serde_json::to_value(&request).unwrap(),
        serde_json::json!({
            "sheet_index": 0,
            "sheet_name": "Sheet1",
            "data_start_row": 4,
            "mapping": {
                "description": 1,
                "unit": 2,
                "quantity": 3,
                "supply_rate": 4,
                "installation_rate": 5,
            },
            "meta": {
                "project": "Metro Depot",
                "work_package": "Civil",
            },
        })
    );
}

#[test]
fn annotations_outside_the_description_column_are_skipped() {
    let dir = TempDir::new().unwrap();
    let path = write_fixture(
        &dir,
        "noted.csv",
        "\
S.No,Description of Item,Unit,Qty,Supply Rate,Installation Rate
1,Excavation in ordinary soil,cum,120,85,40
NOTE: Rates inclusive of all taxes,,,,,
2,PCC 1:4:8 in foundation,cum,24,4200,600
",
    );
    let session = ImportSession::open(&path, ImportOptions::default()).unwrap();

    // The note sits in the serial column; a filled cell there does not make
    // the row an item while its description cell is blank.
    let items = session.line_items();
    assert_eq!(items.len(), 2);
    assert_eq!(items[0].source_row, 1);
    assert_eq!(items[1].source_row, 3);
    assert_eq!(items[1].description, "PCC 1:4:8 in foundation");
    assert_eq!(total_amount(&items), 111_000.0);
}

#[test]
fn tsv_files_open_by_extension() {
    let dir = TempDir::new().unwrap();
    let path = write_fixture(
        &dir,
        "rates.tsv",
        "Description\tQty\tRate\nShuttering\t55\t310\n",
    );

    let mut workbook = Workbook::open(&path).unwrap();
    let names = workbook.sheet_names();
    assert_eq!(names, vec!["Sheet1".to_string()]);
    assert_eq!(
        SheetSelector::parse("Sheet*").unwrap().resolve(&names),
        Some(0)
    );

    let grid = workbook.read_grid(0).unwrap().unwrap();
    assert_eq!(grid.cell(1, 0), "Shuttering");
    assert_eq!(grid.cell(1, 2), "310");
}

#[test]
fn header_rescan_follows_a_sheet_change_request() {
    let dir = TempDir::new().unwrap();
    let path = write_fixture(&dir, "single.csv", "Item,Qty\nPipe,10\n");
    let mut session = ImportSession::open(&path, ImportOptions::default()).unwrap();

    // Delimited files expose exactly one sheet; asking for another is a no-op.
    assert!(!session.change_sheet(3).unwrap());
    assert_eq!(session.sheet_index(), 0);
    assert_eq!(session.detected_header_row(), 0);
    assert_eq!(session.data_row_count(), 1);
}
