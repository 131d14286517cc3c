// src/transform/normalize.rs

use std::collections::HashMap;

use crate::ingest::SpecTable;

/// One data row with the project reference anchored onto it. Column 0 of the
/// source table is taken positionally as the specification code whatever the
/// export labelled it; the remaining columns ride along by name.
#[derive(Debug, Clone)]
pub struct NormalizedRow {
    pub project_code: String,
    pub specification_code: String,
    fields: HashMap<String, String>,
}

impl NormalizedRow {
    pub fn field(&self, name: &str) -> Option<&str> {
        self.fields.get(name).map(String::as_str)
    }
}

/// One file's rows after normalization. `columns` are the extra column names
/// in the order the file declared them, for the combined-column union.
#[derive(Debug)]
pub struct NormalizedFile {
    pub columns: Vec<String>,
    pub rows: Vec<NormalizedRow>,
}

pub fn normalize(table: &SpecTable, project_code: &str) -> NormalizedFile {
    let columns: Vec<String> = table.headers.iter().skip(1).cloned().collect();

    let rows = table
        .rows
        .iter()
        .map(|row| {
            let mut fields = HashMap::with_capacity(columns.len());
            for (name, value) in columns.iter().zip(row.iter().skip(1)) {
                fields.insert(name.clone(), value.clone());
            }
            NormalizedRow {
                project_code: project_code.to_string(),
                specification_code: row.first().cloned().unwrap_or_default(),
                fields,
            }
        })
        .collect();

    NormalizedFile { columns, rows }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn anchors_project_and_takes_first_column_positionally() {
        let table = SpecTable {
            // the exporter leaves the leading column unlabeled
            headers: vec!["".into(), "Omschrijving".into(), "Uren".into()],
            rows: vec![
                vec!["020CAL".into(), "Afkorten en calibreren".into(), "31,71".into()],
                vec!["040CON".into(), "Conturex".into(), "10,00".into()],
            ],
        };
        let file = normalize(&table, "225028");
        assert_eq!(file.columns, vec!["Omschrijving", "Uren"]);
        assert_eq!(file.rows.len(), 2);
        assert_eq!(file.rows[0].project_code, "225028");
        assert_eq!(file.rows[0].specification_code, "020CAL");
        assert_eq!(file.rows[0].field("Uren"), Some("31,71"));
        assert_eq!(file.rows[1].specification_code, "040CON");
    }

    #[test]
    fn missing_field_reads_as_none() {
        let table = SpecTable {
            headers: vec!["code".into(), "Omschrijving".into()],
            rows: vec![vec!["020CAL".into(), "x".into()]],
        };
        let file = normalize(&table, "1");
        assert_eq!(file.rows[0].field("Uren"), None);
    }
}
