// src/ingest/validate.rs

use super::SpecTable;
use crate::error::FileError;

/// Fixed header of the second column. The sole structural anchor proving a
/// file is a specification-hours export: column count and order beyond this
/// are not guaranteed.
pub const DESCRIPTION_COLUMN: &str = "Omschrijving";

/// Check the minimum structural shape of a parsed table.
pub fn validate(table: &SpecTable) -> Result<(), FileError> {
    if table.rows.is_empty() {
        return Err(FileError::Unreadable);
    }
    if table.headers.len() < 2 {
        return Err(FileError::InvalidSchema {
            found: "no second column".to_string(),
        });
    }
    if table.headers[1] != DESCRIPTION_COLUMN {
        return Err(FileError::InvalidSchema {
            found: table.headers[1].clone(),
        });
    }
    Ok(())
}
