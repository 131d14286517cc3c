// src/error.rs

use thiserror::Error;

/// Why a single submission was excluded from the run. Every variant is
/// recovered at file granularity: the run continues with the next file.
#[derive(Debug, Error)]
pub enum FileError {
    /// No candidate encoding produced a parseable, non-empty table.
    #[error("could not read CSV with any supported encoding, or the file is empty")]
    Unreadable,

    /// The second column is not the fixed description header, so this is not
    /// a specification-hours export.
    #[error("unexpected format: second column is not 'Omschrijving' (found: {found})")]
    InvalidSchema { found: String },

    /// The first header cell does not carry the project prefix phrase.
    #[error("unexpected format: '{raw}' is not a project reference")]
    InvalidProjectId { raw: String },

    /// A file for this project was already admitted earlier in the run. The
    /// first-seen file wins; this one is skipped.
    #[error("project {project} was already processed, file skipped")]
    DuplicateProject { project: String },

    /// Anything outside the closed taxonomy above, surfaced per file so an
    /// unexpected failure never aborts the run.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl FileError {
    /// Duplicates are a warning classification, everything else an error.
    pub fn is_warning(&self) -> bool {
        matches!(self, FileError::DuplicateProject { .. })
    }
}

/// Fatal conditions for the whole run. No partial output is produced.
#[derive(Debug, Error)]
pub enum RunError {
    /// Checked once, after all admitted files are combined, because files may
    /// order their columns differently.
    #[error("no column containing 'Uren' found in the combined data")]
    NoHoursColumn,

    /// Every submission failed, so there is nothing to aggregate.
    #[error("no files were successfully processed")]
    NothingProcessed,
}
