// src/ingest/encoding.rs

use csv::ReaderBuilder;
use encoding_rs::{Encoding, UTF_8, WINDOWS_1252};
use tracing::{debug, warn};

use super::SpecTable;
use crate::error::FileError;

/// Field delimiter of the upstream export.
pub const DELIMITER: u8 = b';';

/// Metadata rows preceding the column header row.
pub const SKIP_ROWS: usize = 3;

/// One submission decoded and parsed. `text` is the full decoded content so
/// the header line can be re-read with the same encoding that parsed the body.
#[derive(Debug)]
pub struct DecodedFile {
    pub table: SpecTable,
    pub text: String,
    pub encoding: &'static str,
}

struct Candidate {
    encoding: &'static Encoding,
    lossy: bool,
    label: &'static str,
}

/// The exporter is known to emit legacy Western encodings more often than
/// UTF-8, so windows-1252 goes first. The latin-1/iso-8859-1 labels fold into
/// windows-1252 under the WHATWG encoding standard; the trailing lossy pass
/// plays their never-fails role at the end of the chain.
fn candidates() -> [Candidate; 3] {
    [
        Candidate {
            encoding: WINDOWS_1252,
            lossy: false,
            label: "windows-1252",
        },
        Candidate {
            encoding: UTF_8,
            lossy: false,
            label: "utf-8",
        },
        Candidate {
            encoding: WINDOWS_1252,
            lossy: true,
            label: "windows-1252 (lossy)",
        },
    ]
}

/// Try each candidate encoding in order and return the first that decodes the
/// bytes and parses into a table with at least one data row. Deterministic:
/// the same bytes always pick the same candidate.
pub fn resolve(bytes: &[u8]) -> Result<DecodedFile, FileError> {
    if bytes.is_empty() {
        return Err(FileError::Unreadable);
    }

    for cand in &candidates() {
        let (text, _, had_errors) = cand.encoding.decode(bytes);
        if had_errors && !cand.lossy {
            debug!(encoding = cand.label, "decode error, trying next candidate");
            continue;
        }

        match parse_table(&text) {
            Ok(table) if !table.rows.is_empty() => {
                debug!(
                    encoding = cand.label,
                    rows = table.rows.len(),
                    columns = table.headers.len(),
                    "decoded submission"
                );
                return Ok(DecodedFile {
                    table,
                    text: text.into_owned(),
                    encoding: cand.label,
                });
            }
            Ok(_) => {
                debug!(encoding = cand.label, "table has no data rows");
            }
            Err(reason) => {
                debug!(encoding = cand.label, %reason, "candidate rejected");
            }
        }
    }

    Err(FileError::Unreadable)
}

/// Parse decoded text as a semicolon-delimited table, skipping the metadata
/// rows. A single malformed line is skipped with a warning rather than
/// invalidating the whole file.
fn parse_table(text: &str) -> Result<SpecTable, anyhow::Error> {
    let mut rdr = ReaderBuilder::new()
        .delimiter(DELIMITER)
        .has_headers(false)
        .flexible(true)
        .from_reader(text.as_bytes());

    let mut headers: Option<Vec<String>> = None;
    let mut rows = Vec::new();

    for (idx, result) in rdr.records().enumerate() {
        let record = match result {
            Ok(r) => r,
            Err(e) => {
                warn!(record = idx, error = %e, "skipping malformed line");
                continue;
            }
        };
        if idx < SKIP_ROWS {
            continue;
        }
        match headers {
            None => headers = Some(record.iter().map(|s| s.trim().to_string()).collect()),
            Some(ref h) => {
                let mut row: Vec<String> = record.iter().map(str::to_string).collect();
                row.resize(h.len(), String::new());
                rows.push(row);
            }
        }
    }

    let headers =
        headers.ok_or_else(|| anyhow::anyhow!("no header row after {} metadata rows", SKIP_ROWS))?;
    Ok(SpecTable { headers, rows })
}
