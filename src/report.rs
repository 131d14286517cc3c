// src/report.rs

use anyhow::{Context, Result};
use clap::ValueEnum;
use csv::WriterBuilder;
use std::io::Write;
use tracing::info;

use crate::transform::aggregate::{ReportMatrix, HOURS_SUFFIX};

/// CSV convention for the serialized report. Dutch Office expects the local
/// semicolon/decimal-comma pair; everything else reads the international one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputConvention {
    /// Semicolon delimiter, decimal comma.
    Local,
    /// Comma delimiter, decimal point.
    International,
}

impl std::fmt::Display for OutputConvention {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputConvention::Local => write!(f, "local"),
            OutputConvention::International => write!(f, "international"),
        }
    }
}

impl OutputConvention {
    pub fn delimiter(self) -> u8 {
        match self {
            OutputConvention::Local => b';',
            OutputConvention::International => b',',
        }
    }

    pub fn decimal(self) -> char {
        match self {
            OutputConvention::Local => ',',
            OutputConvention::International => '.',
        }
    }
}

/// Serialize the matrix in the chosen convention. The matrix itself is the
/// contract; this is the thin transport shell around it.
pub fn write_matrix<W: Write>(
    matrix: &ReportMatrix,
    convention: OutputConvention,
    writer: W,
) -> Result<()> {
    let mut wtr = WriterBuilder::new()
        .delimiter(convention.delimiter())
        .from_writer(writer);

    wtr.write_record(&matrix.columns)
        .context("writing report header")?;

    for (project, cells) in matrix.projects.iter().zip(&matrix.cells) {
        let mut record = Vec::with_capacity(matrix.columns.len());
        record.push(project.clone());
        record.extend(cells.iter().map(|v| format_hours(*v, convention)));
        wtr.write_record(&record).context("writing report row")?;
    }

    wtr.flush().context("flushing report")?;
    Ok(())
}

fn format_hours(value: f64, convention: OutputConvention) -> String {
    let formatted = format!("{value:.2}");
    match convention.decimal() {
        '.' => formatted,
        decimal => formatted.replace('.', &decimal.to_string()),
    }
}

/// Total hours per monitoring description, summed over all projects. Column
/// names are reported without the hours suffix.
pub fn code_totals(matrix: &ReportMatrix) -> Vec<(String, f64)> {
    matrix
        .columns
        .iter()
        .skip(1)
        .enumerate()
        .map(|(col, name)| {
            let total = matrix.cells.iter().map(|row| row[col]).sum();
            let name = name.strip_suffix(HOURS_SUFFIX).unwrap_or(name);
            (name.to_string(), total)
        })
        .collect()
}

/// Summary metrics for the run, in the log.
pub fn log_summary(matrix: &ReportMatrix) {
    info!(
        projects = matrix.project_count(),
        codes = matrix.code_count(),
        total_hours = matrix.total_hours(),
        "report summary"
    );
    for (code, total) in code_totals(matrix) {
        info!(code = %code, hours = total, "total per monitoring code");
    }
}
