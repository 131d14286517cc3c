// src/transform/aggregate.rs

use std::collections::BTreeMap;

use tracing::{debug, info};

use super::translate::{translate, TranslationTable};
use super::CombinedRows;
use crate::error::RunError;

/// Substring marking the hours measure among the export's column names.
pub const HOURS_MARKER: &str = "Uren";

/// Suffix appended to each monitoring-description column of the report.
pub const HOURS_SUFFIX: &str = "_uren";

/// Name of the leading, unsuffixed project column of the report.
pub const PROJECT_COLUMN: &str = "projectcode";

/// The consolidated report: one row per admitted project, one column per
/// monitoring description observed among coded rows, zero-filled.
#[derive(Debug, Clone, PartialEq)]
pub struct ReportMatrix {
    /// `projectcode` followed by the suffixed description columns.
    pub columns: Vec<String>,
    /// Sorted distinct project codes, one matrix row each.
    pub projects: Vec<String>,
    /// `cells[i][j]` holds the summed hours for `projects[i]` in
    /// `columns[j + 1]`.
    pub cells: Vec<Vec<f64>>,
}

impl ReportMatrix {
    pub fn project_count(&self) -> usize {
        self.projects.len()
    }

    pub fn code_count(&self) -> usize {
        self.columns.len() - 1
    }

    pub fn total_hours(&self) -> f64 {
        self.cells.iter().flatten().sum()
    }

    /// Cell lookup by project and full (suffixed) column name.
    pub fn hours(&self, project: &str, column: &str) -> Option<f64> {
        let row = self.projects.iter().position(|p| p == project)?;
        let col = self.columns.iter().position(|c| c == column)?;
        if col == 0 {
            return None;
        }
        Some(self.cells[row][col - 1])
    }
}

/// Typed schema probe, run once against the combined column union: the first
/// column name containing the hours marker. Absence is fatal for the run.
pub fn find_hours_column(columns: &[String]) -> Result<&str, RunError> {
    columns
        .iter()
        .find(|c| c.contains(HOURS_MARKER))
        .map(String::as_str)
        .ok_or(RunError::NoHoursColumn)
}

/// Join, filter, sum and pivot the combined rows into the report matrix.
///
/// Rows without a resolved monitoring code (translation misses and the
/// deliberately codeless entry) are dropped here; uncoercible hour cells
/// count as zero. f64 accumulation per (description, project) bucket keeps
/// the result independent of row arrival order.
pub fn aggregate(
    combined: &CombinedRows,
    admitted_projects: &[String],
    table: &TranslationTable,
) -> Result<ReportMatrix, RunError> {
    let hours_column = find_hours_column(&combined.columns)?;
    debug!(column = hours_column, "resolved hours column");

    let joined = translate(&combined.rows, table);

    let mut sums: BTreeMap<String, BTreeMap<String, f64>> = BTreeMap::new();
    let mut kept = 0usize;
    for j in &joined {
        let Some((_, description)) = j.monitoring() else {
            continue;
        };
        kept += 1;
        let hours = j.row.field(hours_column).map(parse_hours).unwrap_or(0.0);
        *sums
            .entry(description.to_string())
            .or_default()
            .entry(j.row.project_code.clone())
            .or_insert(0.0) += hours;
    }
    info!(
        rows = combined.rows.len(),
        coded = kept,
        descriptions = sums.len(),
        "aggregated hours"
    );

    let mut projects: Vec<String> = admitted_projects.to_vec();
    projects.sort();
    projects.dedup();

    let mut columns = Vec::with_capacity(sums.len() + 1);
    columns.push(PROJECT_COLUMN.to_string());
    columns.extend(sums.keys().map(|d| format!("{d}{HOURS_SUFFIX}")));

    let cells = projects
        .iter()
        .map(|project| {
            sums.values()
                .map(|per_project| per_project.get(project).copied().unwrap_or(0.0))
                .collect()
        })
        .collect();

    Ok(ReportMatrix {
        columns,
        projects,
        cells,
    })
}

/// Decimal-comma coercion: empty or malformed cells count as zero, never as
/// an error.
fn parse_hours(value: &str) -> f64 {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return 0.0;
    }
    match trimmed.replace(',', ".").parse::<f64>() {
        Ok(v) => v,
        Err(_) => {
            debug!(value, "hours cell is not numeric, counting as zero");
            0.0
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ingest::SpecTable;
    use crate::transform::normalize::normalize;

    fn spec_table(headers: &[&str], rows: &[&[&str]]) -> SpecTable {
        SpecTable {
            headers: headers.iter().map(|s| s.to_string()).collect(),
            rows: rows
                .iter()
                .map(|r| {
                    let mut row: Vec<String> = r.iter().map(|s| s.to_string()).collect();
                    row.resize(headers.len(), String::new());
                    row
                })
                .collect(),
        }
    }

    fn combine(files: &[(&str, SpecTable)]) -> (CombinedRows, Vec<String>) {
        let mut combined = CombinedRows::default();
        let mut admitted = Vec::new();
        for (project, table) in files {
            combined.extend(normalize(table, project));
            admitted.push(project.to_string());
        }
        (combined, admitted)
    }

    const HEADERS: &[&str] = &["", "Omschrijving", "Minuten", "Uren"];

    #[test]
    fn two_file_example_pivots_with_zero_fill() {
        let a = spec_table(
            HEADERS,
            &[&["020CAL", "Afkorten en calibreren", "1.902,85", "31,71"]],
        );
        let b = spec_table(HEADERS, &[&["040CON", "Conturex", "600,00", "10,00"]]);
        let (combined, admitted) = combine(&[("225028", a), ("225030", b)]);

        let matrix = aggregate(&combined, &admitted, TranslationTable::builtin()).unwrap();
        assert_eq!(matrix.projects, vec!["225028", "225030"]);
        assert_eq!(
            matrix.columns,
            vec!["projectcode", "Conturex_uren", "Machinale_uren"]
        );
        assert_eq!(matrix.hours("225028", "Machinale_uren"), Some(31.71));
        assert_eq!(matrix.hours("225028", "Conturex_uren"), Some(0.0));
        assert_eq!(matrix.hours("225030", "Conturex_uren"), Some(10.0));
        assert_eq!(matrix.hours("225030", "Machinale_uren"), Some(0.0));
    }

    #[test]
    fn misses_and_codeless_entries_contribute_nothing() {
        let table = spec_table(
            HEADERS,
            &[
                &["020CAL", "", "", "5,00"],
                &["110GLZ", "glas", "", "40,00"],
                &["ONBEKEND", "", "", "40,00"],
            ],
        );
        let (combined, admitted) = combine(&[("225028", table)]);
        let matrix = aggregate(&combined, &admitted, TranslationTable::builtin()).unwrap();
        assert_eq!(matrix.total_hours(), 5.0);
        assert_eq!(matrix.columns, vec!["projectcode", "Machinale_uren"]);
    }

    #[test]
    fn codes_sharing_a_description_sum_into_one_column() {
        // 020CAL and 035FRE both map to K601/Machinale
        let table = spec_table(
            HEADERS,
            &[&["020CAL", "", "", "1,50"], &["035FRE", "", "", "2,25"]],
        );
        let (combined, admitted) = combine(&[("1", table)]);
        let matrix = aggregate(&combined, &admitted, TranslationTable::builtin()).unwrap();
        assert_eq!(matrix.hours("1", "Machinale_uren"), Some(3.75));
    }

    #[test]
    fn non_numeric_hours_count_as_zero() {
        let table = spec_table(
            HEADERS,
            &[
                &["020CAL", "", "", ""],
                &["020CAL", "", "", "n.v.t."],
                &["020CAL", "", "", "1.902,85"],
                &["020CAL", "", "", "2,00"],
            ],
        );
        let (combined, admitted) = combine(&[("1", table)]);
        let matrix = aggregate(&combined, &admitted, TranslationTable::builtin()).unwrap();
        // "1.902,85" normalizes to "1.902.85", which is not a number either
        assert_eq!(matrix.hours("1", "Machinale_uren"), Some(2.0));
    }

    #[test]
    fn upload_order_does_not_change_the_matrix() {
        let a = || spec_table(HEADERS, &[&["020CAL", "", "", "31,71"]]);
        let b = || spec_table(HEADERS, &[&["040CON", "", "", "10,00"]]);
        let (c1, p1) = combine(&[("225028", a()), ("225030", b())]);
        let (c2, p2) = combine(&[("225030", b()), ("225028", a())]);

        let m1 = aggregate(&c1, &p1, TranslationTable::builtin()).unwrap();
        let m2 = aggregate(&c2, &p2, TranslationTable::builtin()).unwrap();
        assert_eq!(m1, m2);
    }

    #[test]
    fn project_with_only_uncoded_rows_still_gets_a_row() {
        let a = spec_table(HEADERS, &[&["020CAL", "", "", "4,00"]]);
        let b = spec_table(HEADERS, &[&["110GLZ", "", "", "9,00"]]);
        let (combined, admitted) = combine(&[("225028", a), ("225030", b)]);
        let matrix = aggregate(&combined, &admitted, TranslationTable::builtin()).unwrap();
        assert_eq!(matrix.projects, vec!["225028", "225030"]);
        assert_eq!(matrix.hours("225030", "Machinale_uren"), Some(0.0));
    }

    #[test]
    fn hours_column_is_probed_across_files() {
        // first file has no Uren column; the union still resolves it
        let a = spec_table(&["", "Omschrijving", "Minuten"], &[&["020CAL", "", "120"]]);
        let b = spec_table(HEADERS, &[&["040CON", "", "", "10,00"]]);
        let (combined, admitted) = combine(&[("1", a), ("2", b)]);
        let matrix = aggregate(&combined, &admitted, TranslationTable::builtin()).unwrap();
        // rows lacking the column coerce to zero
        assert_eq!(matrix.hours("1", "Machinale_uren"), Some(0.0));
        assert_eq!(matrix.hours("2", "Conturex_uren"), Some(10.0));
    }

    #[test]
    fn missing_hours_column_is_fatal() {
        let table = spec_table(&["", "Omschrijving", "Minuten"], &[&["020CAL", "", "120"]]);
        let (combined, admitted) = combine(&[("1", table)]);
        let err = aggregate(&combined, &admitted, TranslationTable::builtin());
        assert!(matches!(err, Err(RunError::NoHoursColumn)));
    }

    #[test]
    fn parse_hours_handles_decimal_comma() {
        assert_eq!(parse_hours("31,71"), 31.71);
        assert_eq!(parse_hours(" 10,00 "), 10.0);
        assert_eq!(parse_hours("7"), 7.0);
        assert_eq!(parse_hours(""), 0.0);
        assert_eq!(parse_hours("1.902,85"), 0.0);
    }
}
