// src/transform/translate.rs

use anyhow::{bail, Context, Result};
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::{
    collections::{BTreeSet, HashMap},
    fs::File,
    io::BufReader,
    path::Path,
};
use tracing::debug;

use super::normalize::NormalizedRow;

/// One line of the specification-code → monitoring-code reference table.
///
/// `bewakingscode` and `bewakingomschrijving` are absent together: a codeless
/// entry marks a specification code that is deliberately kept out of the
/// aggregation (glazing is subcontracted, so its hours are not monitored).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranslationEntry {
    pub specificatiecode: String,
    pub omschrijving: String,
    pub bewakingscode: Option<String>,
    pub bewakingomschrijving: Option<String>,
}

/// Immutable lookup table, loaded once and shared by reference for the whole
/// process. Specification codes are unique within the table.
#[derive(Debug, Clone)]
pub struct TranslationTable {
    entries: Vec<TranslationEntry>,
    index: HashMap<String, usize>,
}

impl TranslationTable {
    pub fn new(entries: Vec<TranslationEntry>) -> Result<Self> {
        let mut index = HashMap::with_capacity(entries.len());
        for (i, entry) in entries.iter().enumerate() {
            if entry.bewakingscode.is_some() != entry.bewakingomschrijving.is_some() {
                bail!(
                    "entry {}: bewakingscode and bewakingomschrijving must be absent together",
                    entry.specificatiecode
                );
            }
            if index.insert(entry.specificatiecode.clone(), i).is_some() {
                bail!(
                    "duplicate specificatiecode {} in translation table",
                    entry.specificatiecode
                );
            }
        }
        Ok(Self { entries, index })
    }

    /// The built-in table shipped with the tool.
    pub fn builtin() -> &'static TranslationTable {
        &BUILTIN
    }

    /// Load a replacement table from a JSON array of entries.
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path)
            .with_context(|| format!("opening translation table {}", path.display()))?;
        let entries: Vec<TranslationEntry> = serde_json::from_reader(BufReader::new(file))
            .with_context(|| format!("parsing translation table {}", path.display()))?;
        Self::new(entries)
    }

    pub fn get(&self, specification_code: &str) -> Option<&TranslationEntry> {
        self.index.get(specification_code).map(|&i| &self.entries[i])
    }

    pub fn entries(&self) -> &[TranslationEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// A normalized row joined against the translation table. Misses keep the
/// row with `entry` absent; dropping them is the aggregator's call, so code
/// mismatches stay visible here.
#[derive(Debug)]
pub struct JoinedRow<'a> {
    pub row: &'a NormalizedRow,
    pub entry: Option<&'a TranslationEntry>,
}

impl JoinedRow<'_> {
    /// Monitoring code and description, when the row resolved to a coded entry.
    pub fn monitoring(&self) -> Option<(&str, &str)> {
        let entry = self.entry?;
        match (&entry.bewakingscode, &entry.bewakingomschrijving) {
            (Some(code), Some(desc)) => Some((code, desc)),
            _ => None,
        }
    }
}

/// Left join of rows against the table: every row survives.
pub fn translate<'a>(
    rows: &'a [NormalizedRow],
    table: &'a TranslationTable,
) -> Vec<JoinedRow<'a>> {
    let joined: Vec<JoinedRow<'a>> = rows
        .iter()
        .map(|row| JoinedRow {
            row,
            entry: table.get(&row.specification_code),
        })
        .collect();

    let misses: BTreeSet<&str> = joined
        .iter()
        .filter(|j| j.entry.is_none())
        .map(|j| j.row.specification_code.as_str())
        .collect();
    if !misses.is_empty() {
        debug!(codes = ?misses, "specification codes without translation entry");
    }

    joined
}

fn entry(
    code: &str,
    omschrijving: &str,
    bewaking: Option<(&str, &str)>,
) -> TranslationEntry {
    TranslationEntry {
        specificatiecode: code.to_string(),
        omschrijving: omschrijving.to_string(),
        bewakingscode: bewaking.map(|(c, _)| c.to_string()),
        bewakingomschrijving: bewaking.map(|(_, d)| d.to_string()),
    }
}

const OPSLUITEN: &str = "Opsluiten, Voormontage, Afkort/profiel/contr lat";

static BUILTIN: Lazy<TranslationTable> = Lazy::new(|| {
    let entries = vec![
        entry("020CAL", "Afkorten en calibreren", Some(("K601", "Machinale"))),
        entry("035FRE", "Frezen", Some(("K601", "Machinale"))),
        entry("040CON", "Conturex", Some(("K602", "Conturex"))),
        entry("050BIE", "Biesse", Some(("K608", "Biesse en Select"))),
        entry("055ORD", "Opsluite ramen/deuren", Some(("K603", OPSLUITEN))),
        entry("060SEL", "Select", Some(("K608", "Biesse en Select"))),
        entry("070LAT", "Afkort/ProfielContr Lat", Some(("K603", OPSLUITEN))),
        entry("080OPK", "opsluiten kozijnen", Some(("K603", OPSLUITEN))),
        entry("090SPU", "Spuiten", Some(("K604", "Spuiten"))),
        entry("100AFM", "Afmontage", Some(("K605", "Afmontage"))),
        entry("110GLZ", "Glaszetten (extern)", None),
        entry("AFM", "afmonteren", Some(("K605", "Afmontage"))),
        entry("085VMO", "Voormontage/glaslatten", Some(("K603", OPSLUITEN))),
    ];
    TranslationTable::new(entries).expect("built-in translation table is valid")
});
