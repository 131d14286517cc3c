// src/ingest/mod.rs

pub mod encoding;
pub mod header;
pub mod validate;

use anyhow::{Context, Result};
use std::{fs, path::Path};

/// One uploaded export file: its name plus the raw bytes, acquired in full
/// before the pipeline runs. Consumed once per run, never persisted.
#[derive(Debug, Clone)]
pub struct RawSubmission {
    pub filename: String,
    pub bytes: Vec<u8>,
}

impl RawSubmission {
    pub fn new(filename: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            filename: filename.into(),
            bytes,
        }
    }

    /// Read a submission from disk, keeping only the file name as identity.
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let bytes =
            fs::read(path).with_context(|| format!("reading submission {}", path.display()))?;
        let filename = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        Ok(Self { filename, bytes })
    }
}

/// Tabular interpretation of one export after the three metadata rows.
///
/// `headers` come from the fourth physical line exactly as the exporter wrote
/// them; `rows` are padded or truncated to the header width so downstream
/// code can index columns positionally.
#[derive(Debug)]
pub struct SpecTable {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl SpecTable {
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }
}
