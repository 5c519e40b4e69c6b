use anyhow::Result;
use boq_import::{
    column_label, total_amount, BoqImportError, DataRow, FieldSpec, FieldTable, ImportMeta,
    ImportOptions, ImportSession, ResultMessage, SessionError, SheetSelector, WorkbookError,
};
use clap::{Args, Parser, Subcommand};
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Parser)]
#[command(name = "boq-import")]
#[command(about = "Spreadsheet import and column mapping for bill-of-quantities line items", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Detect the header row of a sheet and show the suggested column mapping
    Analyze {
        /// Path to the spreadsheet or delimited file
        path: PathBuf,

        #[command(flatten)]
        detect: DetectArgs,

        /// Also print the mapped data-zone preview
        #[arg(long)]
        preview: bool,

        /// Emit machine-readable JSON instead of a summary
        #[arg(long)]
        json: bool,
    },

    /// Extract priced line items using the suggested mapping
    Extract {
        /// Path to the spreadsheet or delimited file
        path: PathBuf,

        #[command(flatten)]
        detect: DetectArgs,

        /// Project name recorded in the import request
        #[arg(long, default_value = "")]
        project: String,

        /// Work package recorded in the import request
        #[arg(long, default_value = "")]
        work_package: String,

        /// Zone recorded in the import request
        #[arg(long)]
        zone: Option<String>,

        /// Print at most this many line items
        #[arg(long)]
        limit: Option<usize>,

        /// Emit machine-readable JSON instead of a summary
        #[arg(long)]
        json: bool,
    },
}

/// Flags shared by every command that opens a sheet.
#[derive(Args)]
struct DetectArgs {
    /// Sheet to use: an index or a glob pattern over sheet names
    #[arg(long, default_value = "0")]
    sheet: String,

    /// Rows scanned for header candidates
    #[arg(long, default_value_t = 15)]
    scan_rows: usize,

    /// Maximum number of auto-selected header cells
    #[arg(long, default_value_t = 5)]
    max_headers: usize,

    /// JSON field table replacing the built-in mapping keywords
    #[arg(long)]
    fields: Option<PathBuf>,
}

#[derive(Serialize)]
struct HeaderReport {
    column: usize,
    row: usize,
    cell: String,
    text: String,
    field: Option<&'static str>,
}

#[derive(Serialize)]
struct AnalyzeReport {
    file: String,
    sheet_index: usize,
    sheet_name: String,
    sheet_names: Vec<String>,
    detected_header_row: usize,
    headers: Vec<HeaderReport>,
    data_start_row: usize,
    data_rows: usize,
    ready: bool,
    /// Mapped data-zone rows, present when the preview was requested.
    #[serde(skip_serializing_if = "Option::is_none")]
    preview: Option<Vec<DataRow>>,
}

#[derive(Serialize)]
struct ExtractReport {
    request: boq_import::ImportRequest,
    item_count: usize,
    total_amount: f64,
    items: Vec<boq_import::LineItem>,
}

fn main() -> Result<()> {
    // Default to warn level; override with RUST_LOG. Logs go to stderr so
    // --json output on stdout stays parseable.
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let _tracing = tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(env_filter)
        .try_init();

    match Cli::parse().command {
        Commands::Analyze {
            path,
            detect,
            preview,
            json,
        } => analyze(&path, &detect, preview, json)?,
        Commands::Extract {
            path,
            detect,
            project,
            work_package,
            zone,
            limit,
            json,
        } => {
            let meta = ImportMeta {
                project,
                work_package,
                zone,
            };
            extract(&path, &detect, meta, limit, json)?;
        }
    }
    Ok(())
}

/// Opens the file and switches to the requested sheet.
fn open_session(path: &Path, detect: &DetectArgs) -> Result<ImportSession, BoqImportError> {
    let mut options = ImportOptions {
        scan_rows: detect.scan_rows,
        max_header_cells: detect.max_headers,
        ..ImportOptions::default()
    };
    if let Some(fields) = &detect.fields {
        options.fields = load_field_table(fields).with_prefix("Cannot load field table")?;
    }
    let mut session = ImportSession::open(path, options)?;
    let selector = SheetSelector::parse(&detect.sheet)?;
    let index = selector
        .resolve(session.sheet_names())
        .ok_or_else(|| WorkbookError::SheetNotFound {
            selector: detect.sheet.clone(),
        })?;
    if index != session.sheet_index() {
        session.change_sheet(index)?;
    }
    Ok(session)
}

fn load_field_table(path: &Path) -> Result<FieldTable, BoqImportError> {
    let text = std::fs::read_to_string(path)?;
    let specs: Vec<FieldSpec> = serde_json::from_str(&text)?;
    Ok(FieldTable::try_from(specs)?)
}

/// Snapshot of the session the analyze command reports on.
fn analyze_report(path: &Path, session: &ImportSession, preview: bool) -> AnalyzeReport {
    let sheet_names = session.sheet_names().to_vec();
    let headers: Vec<HeaderReport> = session
        .selection()
        .iter()
        .map(|(column, row)| HeaderReport {
            column,
            row,
            cell: format!("{}{}", column_label(column), row + 1),
            text: session.grid().cell(row, column).to_string(),
            field: session.mapping().field_for(column).map(|f| f.as_str()),
        })
        .collect();
    AnalyzeReport {
        file: path.display().to_string(),
        sheet_index: session.sheet_index(),
        sheet_name: sheet_names
            .get(session.sheet_index())
            .cloned()
            .unwrap_or_default(),
        sheet_names,
        detected_header_row: session.detected_header_row(),
        headers,
        data_start_row: session.data_start_row(),
        data_rows: session.data_row_count(),
        ready: session.can_import(),
        preview: preview.then(|| session.data_preview()),
    }
}

fn analyze(path: &Path, detect: &DetectArgs, preview: bool, json: bool) -> Result<(), BoqImportError> {
    let session = open_session(path, detect)?;
    let report = analyze_report(path, &session, preview);

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    println!("File: {}", report.file);
    println!(
        "Sheet: {} ({} of {})",
        report.sheet_name,
        report.sheet_index + 1,
        report.sheet_names.len()
    );
    println!("Header row: {}", report.detected_header_row + 1);
    println!("Selected headers:");
    for header in &report.headers {
        println!(
            "  {:<6} {:<30} {}",
            header.cell,
            format!("{:?}", header.text),
            header.field.unwrap_or("-")
        );
    }
    println!(
        "Data rows: {} starting at row {}",
        report.data_rows,
        report.data_start_row + 1
    );
    println!("Ready to import: {}", if report.ready { "yes" } else { "no" });

    if let Some(rows) = &report.preview {
        println!();
        println!("Preview:");
        for row in rows {
            println!("  {:>5}  {}", row.source_row + 1, row.cells.join(" | "));
        }
    }
    Ok(())
}

fn extract(
    path: &Path,
    detect: &DetectArgs,
    meta: ImportMeta,
    limit: Option<usize>,
    json: bool,
) -> Result<(), BoqImportError> {
    let session = open_session(path, detect)?;
    if !session.can_import() {
        return Err(SessionError::DescriptionNotMapped.into());
    }
    let mut items = session.line_items();
    let total = total_amount(&items);
    let item_count = items.len();
    if let Some(limit) = limit {
        items.truncate(limit);
    }
    info!(items = item_count, total, "extract complete");

    if json {
        let report = ExtractReport {
            request: session.import_request(meta),
            item_count,
            total_amount: total,
            items,
        };
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    println!(
        "{:<6} {:<40} {:<8} {:>10} {:>12} {:>12} {:>12}",
        "Row", "Description", "Unit", "Qty", "Supply", "Install", "Amount"
    );
    for item in &items {
        println!(
            "{:<6} {:<40} {:<8} {:>10} {:>12} {:>12} {:>12}",
            item.source_row + 1,
            truncated(&item.description, 40),
            truncated(&item.unit, 8),
            item.quantity,
            item.supply_rate,
            item.installation_rate,
            item.amount
        );
    }
    println!();
    println!("{} line items, total amount {}", item_count, total);
    Ok(())
}

fn truncated(text: &str, width: usize) -> String {
    if text.chars().count() <= width {
        text.to_string()
    } else {
        let kept: String = text.chars().take(width.saturating_sub(1)).collect();
        format!("{kept}~")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn analyze_report_carries_the_preview_only_on_request() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("boq.csv");
        fs::write(&path, "Item,Qty,Rate\nPipe 25mm,10,250\n").unwrap();
        let session = ImportSession::open(&path, ImportOptions::default()).unwrap();

        let report = analyze_report(&path, &session, true);
        let rows = report.preview.as_deref().unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].source_row, 1);
        assert_eq!(rows[0].cells, vec!["Pipe 25mm", "10", "250"]);
        let value = serde_json::to_value(&report).unwrap();
        assert_eq!(value["preview"][0]["cells"][0], "Pipe 25mm");

        let report = analyze_report(&path, &session, false);
        assert!(report.preview.is_none());
        let value = serde_json::to_value(&report).unwrap();
        assert!(value.get("preview").is_none());
    }

    #[test]
    fn long_cells_truncate_with_a_marker() {
        assert_eq!(truncated("Pipe 25mm", 20), "Pipe 25mm");
        assert_eq!(truncated("Excavation in hard rock strata", 12), "Excavation ~");
    }
}
