//! Percent of each NVC group under GAP status 1 & 2 (and 1, 2 & 3),
//! summarized per natural NVC class.
//! Output: three charts in --output-dir (box plot, grouped bins, stacked bins)

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;

use gap_core::chart::protection::{bins_grouped, bins_stacked, boxplot};
use gap_core::chart::{write_chart_into, ChartFormat};
use gap_core::nvc::NvcClass;
use gap_core::protection::{summarize_protection, ProtectionBin, ProtectionSummary};
use gap_core::records::{read_json_records, NvcGroupRecord};
use gap_logging::{init_logging, LogConfig};
use gap_odbc::{load_group_counts, ConnectionArgs};

// ── CLI ───────────────────────────────────────────────────────────────────────

#[derive(Parser, Debug)]
#[command(
    name = "nvc_summarization",
    about = "Chart percent protection of NVC groups by NVC class"
)]
struct Args {
    #[command(flatten)]
    db: ConnectionArgs,

    /// Read pivoted NVC group rows from a JSON array instead of the database.
    #[arg(short, long)]
    input: Option<PathBuf>,

    /// Directory for the chart files.
    #[arg(short, long, default_value = ".")]
    output_dir: PathBuf,

    /// Chart format: html or json (bare Vega-Lite spec).
    #[arg(short, long, default_value = "html")]
    format: ChartFormat,

    /// Debug logging.
    #[arg(short, long)]
    verbose: bool,
}

fn load(args: &Args) -> Result<Vec<NvcGroupRecord>> {
    if let Some(path) = &args.input {
        info!(path = %path.display(), "reading NVC group counts from file");
        return read_json_records(path).with_context(|| format!("parsing {}", path.display()));
    }
    let conn_str = args.db.connection_string()?;
    info!(connection = %conn_str.redacted(), "querying analytic database");
    Ok(load_group_counts(&conn_str)?)
}

fn print_overall(summary: &ProtectionSummary) {
    eprintln!("\n{:<32} {:>8}", "% Protected 1 & 2 (all groups)", "Groups");
    eprintln!("{}", "-".repeat(41));
    for bin in ProtectionBin::ALL {
        eprintln!("{:<32} {:>8}", bin.label(), summary.overall.get(bin));
    }
    eprintln!("{:<32} {:>8}", "Total", summary.overall.total());

    eprintln!(
        "\nDesert & Semi-Desert groups under 1%: {}",
        summary.count(NvcClass::DesertSemiDesert, ProtectionBin::Below1)
    );
    eprintln!(
        "Forest & Woodland groups at 1-17%: {}",
        summary.count(NvcClass::ForestWoodland, ProtectionBin::From1To17)
    );
}

fn print_by_class(summary: &ProtectionSummary) {
    eprint!("\n{:<22} {:>6}", "Class", "N");
    for bin in ProtectionBin::ALL {
        eprint!(" {:>8}", bin.label());
    }
    eprintln!();
    eprintln!("{}", "-".repeat(65));
    for c in &summary.by_class {
        eprint!("{:<22} {:>6}", c.class.short_label(), c.n_groups);
        for bin in ProtectionBin::ALL {
            eprint!(" {:>8}", c.bins.get(bin));
        }
        eprintln!();
    }
}

/// Load, summarize and write the three charts. Returns the summary and the
/// chart paths.
fn run(args: &Args) -> Result<(ProtectionSummary, Vec<PathBuf>)> {
    let records = load(&args).context("query: loading NVC group counts")?;
    eprintln!("Loaded {} NVC groups.", records.len());

    let summary = summarize_protection(&records).context("reshape: computing percent protected")?;
    print_overall(&summary);
    print_by_class(&summary);

    let writer = args.format.writer();
    let charts = [
        boxplot(&summary.observations),
        bins_grouped(&summary.by_class),
        bins_stacked(&summary.by_class),
    ];
    let mut paths = Vec::with_capacity(charts.len());
    for chart in &charts {
        let path = write_chart_into(writer.as_ref(), chart, &args.output_dir)
            .with_context(|| format!("render: writing {}", chart.name))?;
        eprintln!("  -> {}", path.display());
        paths.push(path);
    }
    Ok((summary, paths))
}

// ── main ──────────────────────────────────────────────────────────────────────

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(LogConfig {
        app_name: env!("CARGO_PKG_NAME"),
        verbose: args.verbose,
    })?;

    let (_, paths) = run(&args)?;
    eprintln!("\nDone. {} charts in {}.", paths.len(), args.output_dir.display());
    Ok(())
}
