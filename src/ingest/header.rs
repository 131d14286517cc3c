// src/ingest/header.rs

use crate::error::FileError;

/// Fixed phrase sharing the first header cell with the project reference.
pub const PROJECT_PREFIX: &str = "SPECIFICATIE UREN van project: ";

/// Project reference embedded in the first line of an export.
///
/// `raw` is the verbatim first semicolon-field of the first line; `clean` is
/// that field with the prefix phrase stripped. The first line physically
/// co-resides with metadata text, so there is no guarantee it holds a valid
/// reference: [`ProjectIdentifier::validate`] asserts that separately.
#[derive(Debug, Clone)]
pub struct ProjectIdentifier {
    pub raw: String,
    pub clean: String,
}

impl ProjectIdentifier {
    /// Pull the identifier out of decoded text. Takes the first
    /// newline-terminated segment (or the whole text), then its first
    /// semicolon field (or the whole segment).
    pub fn extract(text: &str) -> Self {
        let first_line = text.split('\n').next().unwrap_or("");
        let raw = first_line
            .trim()
            .split(';')
            .next()
            .unwrap_or("")
            .trim()
            .to_string();
        let clean = raw
            .strip_prefix(PROJECT_PREFIX)
            .unwrap_or("")
            .trim()
            .to_string();
        Self { raw, clean }
    }

    /// Usable only when the prefix phrase is present and something follows it.
    pub fn validate(&self) -> Result<(), FileError> {
        if !self.raw.starts_with(PROJECT_PREFIX) || self.clean.is_empty() {
            return Err(FileError::InvalidProjectId {
                raw: self.raw.clone(),
            });
        }
        Ok(())
    }
}
