use anyhow::{Context, Result};
use clap::Parser;
use std::{fs::File, io::BufWriter, path::PathBuf};
use tracing::{error, info, warn};
use tracing_subscriber::{fmt, EnvFilter};
use urenrapport::{
    ingest::RawSubmission,
    pipeline::{self, Severity},
    report::{self, OutputConvention},
    transform::TranslationTable,
};

/// Consolidate specification-hours exports into one report of hours per
/// monitoring code, one row per project.
#[derive(Parser)]
#[command(name = "urenrapport", version)]
struct Cli {
    /// Specification-hours CSV exports, processed in argument order
    #[arg(required = true)]
    files: Vec<PathBuf>,

    /// Where to write the consolidated report
    #[arg(short, long, default_value = "uren_per_bewakingscode.csv")]
    output: PathBuf,

    /// CSV convention for the report
    #[arg(long, value_enum, default_value_t = OutputConvention::Local)]
    format: OutputConvention,

    /// JSON file replacing the built-in translation table
    #[arg(long)]
    translation_table: Option<PathBuf>,

    /// Also print the per-file processing log as JSON on stdout
    #[arg(long)]
    log_json: bool,
}

fn main() -> Result<()> {
    // ─── 1) init logging ─────────────────────────────────────────────
    let env = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt::Subscriber::builder()
        .with_env_filter(env)
        .with_span_events(fmt::format::FmtSpan::CLOSE)
        .init();

    let cli = Cli::parse();

    // ─── 2) reference data ───────────────────────────────────────────
    let table = match &cli.translation_table {
        Some(path) => {
            info!("loading translation table from {}", path.display());
            TranslationTable::from_json_file(path)?
        }
        None => TranslationTable::builtin().clone(),
    };
    info!("{} translation entries", table.len());

    // ─── 3) read submissions up front, in argument order ─────────────
    let mut submissions = Vec::with_capacity(cli.files.len());
    for path in &cli.files {
        submissions.push(RawSubmission::from_path(path)?);
    }

    // ─── 4) run the pipeline ─────────────────────────────────────────
    let outcome = pipeline::run(&submissions, &table);

    for report in &outcome.reports {
        match report.severity {
            Severity::Success => info!("[OK] {}: {}", report.filename, report.message),
            Severity::Warning => warn!("[WARN] {}: {}", report.filename, report.message),
            Severity::Error => error!("[ERROR] {}: {}", report.filename, report.message),
        }
    }
    if cli.log_json {
        println!("{}", serde_json::to_string_pretty(&outcome.reports)?);
    }

    // ─── 5) write the report ─────────────────────────────────────────
    let matrix = outcome.result?;
    let file = File::create(&cli.output)
        .with_context(|| format!("creating {}", cli.output.display()))?;
    report::write_matrix(&matrix, cli.format, BufWriter::new(file))?;

    report::log_summary(&matrix);
    info!("wrote {}", cli.output.display());
    Ok(())
}
