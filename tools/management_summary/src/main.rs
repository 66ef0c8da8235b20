//! Protected and multiple-use area of the five natural NVC classes, grouped
//! by PAD-US management category.
//! Output: one stacked bar chart (default ManagementSummary.html)

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;

use gap_core::chart::{management::stacked_bar, write_chart, ChartFormat};
use gap_core::management::{categorize_records, CategoryMapper, UnmappedOwnerPolicy};
use gap_core::nvc::retain_natural_classes;
use gap_core::records::{read_json_records, CellCountRecord};
use gap_core::reshape::{summarize_management, ManagementSummary, SummaryRow};
use gap_logging::{init_logging, LogConfig};
use gap_odbc::{load_cell_counts, ConnectionArgs};

// ── CLI ───────────────────────────────────────────────────────────────────────

#[derive(Parser, Debug)]
#[command(
    name = "management_summary",
    about = "Chart protected vs. multiple-use area by management category and NVC class"
)]
struct Args {
    #[command(flatten)]
    db: ConnectionArgs,

    /// Read management query rows from a JSON array instead of the database.
    #[arg(short, long)]
    input: Option<PathBuf>,

    /// Chart file. The extension follows --format.
    #[arg(short, long, default_value = "ManagementSummary.html")]
    output: PathBuf,

    /// Chart format: html or json (bare Vega-Lite spec).
    #[arg(short, long, default_value = "html")]
    format: ChartFormat,

    /// Owner labels missing from the category table: fail, or count as Other.
    #[arg(long, default_value = "fail")]
    unmapped_owners: UnmappedOwnerPolicy,

    /// Debug logging.
    #[arg(short, long)]
    verbose: bool,
}

fn load(args: &Args) -> Result<Vec<CellCountRecord>> {
    if let Some(path) = &args.input {
        info!(path = %path.display(), "reading cell counts from file");
        return read_json_records(path).with_context(|| format!("parsing {}", path.display()));
    }
    let conn_str = args.db.connection_string()?;
    info!(connection = %conn_str.redacted(), "querying analytic database");
    Ok(load_cell_counts(&conn_str)?)
}

fn print_table(rows: &[SummaryRow]) {
    eprintln!(
        "\n{:<30} {:<22} {:>12} {:>12} {:>12}",
        "Category", "Class", "Protected", "Multiple Use", "Total"
    );
    eprintln!("{}", "-".repeat(92));
    for row in rows {
        eprintln!(
            "{:<30} {:<22} {:>12.0} {:>12.0} {:>12.0}",
            row.category.label(),
            row.class.short_label(),
            row.protected_km2,
            row.multiple_use_km2,
            row.total_km2,
        );
    }
}

/// Load, summarize and write the chart. Returns the summary and chart path.
fn run(args: &Args) -> Result<(ManagementSummary, PathBuf)> {
    let records = load(&args).context("query: loading management cell counts")?;
    eprintln!("Loaded {} rows.", records.len());

    let natural = retain_natural_classes(records);
    let mapper = CategoryMapper::new(args.unmapped_owners);
    let categorized = categorize_records(natural, &mapper)
        .context("categorize: mapping owners to management categories")?;

    let summary = summarize_management(&categorized).context("reshape: building summary table")?;
    if summary.synthesized > 0 {
        eprintln!("{} zero-area status rows added to complete the table.", summary.synthesized);
    }
    print_table(&summary.rows);

    let writer = args.format.writer();
    let path = args.output.with_extension(writer.extension());
    let chart = stacked_bar(&summary.rows);
    write_chart(writer.as_ref(), &chart, &path).context("render: writing management chart")?;
    eprintln!("  -> {}", path.display());
    Ok((summary, path))
}

// ── main ──────────────────────────────────────────────────────────────────────

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(LogConfig {
        app_name: env!("CARGO_PKG_NAME"),
        verbose: args.verbose,
    })?;

    let (summary, _) = run(&args)?;
    eprintln!("\nDone. {} category/class rows.", summary.rows.len());
    Ok(())
}
