// src/pipeline.rs

use std::collections::HashSet;

use serde::Serialize;
use tracing::{error, info, warn};

use crate::error::{FileError, RunError};
use crate::ingest::{encoding, header::ProjectIdentifier, validate, RawSubmission};
use crate::transform::{aggregate, normalize, CombinedRows, NormalizedFile, ReportMatrix, TranslationTable};

/// Log classification for one submission. Duplicates are warnings so the UI
/// can render them apart from hard errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Success,
    Warning,
    Error,
}

/// Exactly one of these is produced per submission, for the external UI.
#[derive(Debug, Clone, Serialize)]
pub struct FileReport {
    pub filename: String,
    pub success: bool,
    pub severity: Severity,
    pub message: String,
}

impl FileReport {
    fn admitted(filename: &str, id: &ProjectIdentifier) -> Self {
        Self {
            filename: filename.to_string(),
            success: true,
            severity: Severity::Success,
            message: format!("processed (project: {})", id.raw),
        }
    }

    fn excluded(filename: &str, err: &FileError) -> Self {
        Self {
            filename: filename.to_string(),
            success: false,
            severity: if err.is_warning() {
                Severity::Warning
            } else {
                Severity::Error
            },
            message: err.to_string(),
        }
    }
}

/// Result of one run: the per-file log plus the matrix, or the run-fatal
/// error. The log is populated either way.
#[derive(Debug)]
pub struct RunOutcome {
    pub reports: Vec<FileReport>,
    pub result: Result<ReportMatrix, RunError>,
}

/// Process submissions strictly in arrival order and aggregate the admitted
/// ones. Per-file failures never abort the run; the duplicate-project set and
/// the row buffer live only inside this call.
#[tracing::instrument(level = "info", skip_all, fields(files = submissions.len()))]
pub fn run(submissions: &[RawSubmission], table: &TranslationTable) -> RunOutcome {
    let mut seen: HashSet<String> = HashSet::new();
    let mut admitted: Vec<String> = Vec::new();
    let mut combined = CombinedRows::default();
    let mut reports = Vec::with_capacity(submissions.len());

    for sub in submissions {
        match process_submission(sub, &mut seen) {
            Ok((id, file)) => {
                info!(
                    file = %sub.filename,
                    project = %id.clean,
                    rows = file.rows.len(),
                    "admitted"
                );
                admitted.push(id.clean.clone());
                combined.extend(file);
                reports.push(FileReport::admitted(&sub.filename, &id));
            }
            Err(err) => {
                if err.is_warning() {
                    warn!(file = %sub.filename, "{err}");
                } else {
                    error!(file = %sub.filename, "{err}");
                }
                reports.push(FileReport::excluded(&sub.filename, &err));
            }
        }
    }

    if admitted.is_empty() {
        warn!("no valid submissions, skipping aggregation");
        return RunOutcome {
            reports,
            result: Err(RunError::NothingProcessed),
        };
    }

    info!(
        admitted = admitted.len(),
        rows = combined.rows.len(),
        "combining admitted files"
    );
    let result = aggregate(&combined, &admitted, table);
    RunOutcome { reports, result }
}

fn process_submission(
    sub: &RawSubmission,
    seen: &mut HashSet<String>,
) -> Result<(ProjectIdentifier, NormalizedFile), FileError> {
    let decoded = encoding::resolve(&sub.bytes)?;
    let id = ProjectIdentifier::extract(&decoded.text);

    validate::validate(&decoded.table)?;
    id.validate()?;

    // first file for a project wins; later ones are skipped
    if !seen.insert(id.clean.clone()) {
        return Err(FileError::DuplicateProject {
            project: id.clean.clone(),
        });
    }

    let file = normalize(&decoded.table, &id.clean);
    Ok((id, file))
}
