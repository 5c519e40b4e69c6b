//! # BOQ Import Engine
//!
//! A spreadsheet import and column-mapping engine for construction
//! procurement. It takes the bill-of-quantities files vendors actually send
//! (Excel workbooks, OpenDocument sheets, exported CSV), finds the header
//! row, suggests which column feeds which line-item field, and turns the
//! mapped rows into priced line items ready for the procurement backend.
//!
//! ## Features
//!
//! - **Multi-format support**: Excel files (`.xls`, `.xlsx`, `.xlsm`, `.xlsb`,
//!   `.xla`, `.xlam`), OpenDocument spreadsheets (`.ods`) and delimited text
//!   (`.csv`, `.tsv`, `.txt`)
//! - **Header detection**: Scores the leading rows of a sheet to find the
//!   header row, even below title blocks and blank padding
//! - **Mapping suggestions**: Keyword-driven matching from header text to
//!   line-item fields, with a replaceable keyword table for unusual tenders
//! - **Interactive corrections**: Header cells can be toggled, moved and
//!   remapped one at a time; every change keeps selection and mapping
//!   consistent
//! - **Previews**: Raw grid and mapped data-zone previews sized for a UI,
//!   plus full line-item extraction with derived totals
//!
//! ## Entry points
//!
//! [`ImportSession::open`] drives the whole interactive workflow; the
//! lower-level pieces ([`Workbook`], [`detect_header_row`],
//! [`build_line_items`]) are exposed for callers that only need one stage.
mod error;
mod import;
mod mapping;
mod options;
mod session;
mod workbook;

pub use crate::error::{BoqImportError, ResultMessage};
pub use crate::import::{build_line_items, total_amount, ImportMeta, ImportRequest, LineItem};
pub use crate::mapping::{
    detect_header_row, FieldMapping, FieldSpec, FieldTable, FieldTableError, HeaderSelection,
    TargetField,
};
pub use crate::options::ImportOptions;
pub use crate::session::{DataRow, ImportSession, SessionError, ToggleOutcome};
pub use crate::workbook::{column_label, Grid, SheetSelector, Workbook, WorkbookError};
