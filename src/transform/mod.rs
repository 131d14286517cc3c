// src/transform/mod.rs

pub mod aggregate;
pub mod normalize;
pub mod translate;

pub use aggregate::{aggregate, find_hours_column, ReportMatrix};
pub use normalize::{normalize, NormalizedFile, NormalizedRow};
pub use translate::{translate, JoinedRow, TranslationEntry, TranslationTable};

/// Rows pooled across all admitted files, plus the ordered union of their
/// extra column names. Files may order their columns differently, so the
/// union (first appearance wins) is what the hours probe runs against.
#[derive(Debug, Default)]
pub struct CombinedRows {
    pub columns: Vec<String>,
    pub rows: Vec<NormalizedRow>,
}

impl CombinedRows {
    pub fn extend(&mut self, file: NormalizedFile) {
        for name in &file.columns {
            if !self.columns.iter().any(|c| c == name) {
                self.columns.push(name.clone());
            }
        }
        self.rows.extend(file.rows);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ingest::SpecTable;

    fn file(headers: &[&str], project: &str) -> NormalizedFile {
        let table = SpecTable {
            headers: headers.iter().map(|s| s.to_string()).collect(),
            rows: vec![vec![String::from("x"); headers.len()]],
        };
        normalize(&table, project)
    }

    #[test]
    fn column_union_preserves_first_seen_order() {
        let mut combined = CombinedRows::default();
        combined.extend(file(&["", "Omschrijving", "Minuten", "Uren"], "1"));
        combined.extend(file(&["", "Omschrijving", "Uren", "Tarief"], "2"));
        assert_eq!(
            combined.columns,
            vec!["Omschrijving", "Minuten", "Uren", "Tarief"]
        );
        assert_eq!(combined.rows.len(), 2);
    }
}
