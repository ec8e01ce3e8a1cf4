/// Grade handling: default-grade backfill and grade ranking.

use crate::alias::GRADE;
use crate::column::Column;
use crate::error::{TableError, TableResult};
use crate::header::normalize_header;
use crate::table::Table;
use std::collections::BTreeSet;

/// Fill empty `grade` cells with `default`.
///
/// Cells that are empty or whitespace-only are replaced; any other value is
/// left untouched. An empty `default` returns an unchanged copy.
///
/// ```
/// use ngss_toolkit::{backfill_grade, Table};
///
/// let mut table = Table::with_columns("t", &["grade", "code"]);
/// table.append_row(vec!["".to_string(), "A".to_string()]).unwrap();
/// table.append_row(vec!["3".to_string(), "B".to_string()]).unwrap();
///
/// let filled = backfill_grade(&table, "6th").unwrap();
/// assert_eq!(filled.get_value(0, "grade").unwrap(), "6th");
/// assert_eq!(filled.get_value(1, "grade").unwrap(), "3");
/// ```
pub fn backfill_grade(table: &Table, default: &str) -> TableResult<Table> {
    let grades = table
        .column(GRADE)
        .ok_or_else(|| TableError::UnknownColumn(GRADE.to_string()))?;

    if default.is_empty() {
        return Ok(table.clone());
    }

    let filled: Vec<String> = grades
        .iter()
        .map(|g| {
            if g.trim().is_empty() {
                default.to_string()
            } else {
                g.to_string()
            }
        })
        .collect();

    let mut out = table.clone();
    out.put_column(Column::from_values(GRADE, filled))?;
    Ok(out)
}

/// Distinct non-empty grade labels in lexical order.
///
/// These are the choices offered for the grade allow-list. A table without a
/// `grade` column has no choices.
pub fn grade_options(table: &Table) -> Vec<String> {
    table
        .column(GRADE)
        .map(|col| {
            col.iter()
                .filter(|g| !g.is_empty())
                .map(str::to_string)
                .collect::<BTreeSet<_>>()
                .into_iter()
                .collect()
        })
        .unwrap_or_default()
}

/// Grade priority lookup.
///
/// Maps a grade label to its position in a fixed ordered list so that "2nd"
/// sorts before "10th". Labels are matched loosely: `"1"`, `"1st"` and
/// `"Grade 1"` are the same grade, as are `"K"` and `"Kindergarten"`.
/// Labels not in the list rank after every listed grade.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GradeOrder {
    keys: Vec<String>,
}

impl Default for GradeOrder {
    fn default() -> Self {
        Self::standard()
    }
}

impl GradeOrder {
    /// `PK, K, 1 .. 12`.
    pub fn standard() -> Self {
        let mut labels = vec!["PK".to_string(), "K".to_string()];
        labels.extend((1..=12).map(|g| g.to_string()));
        Self::new(&labels)
    }

    pub fn new<S: AsRef<str>>(labels: &[S]) -> Self {
        GradeOrder {
            keys: labels.iter().map(|l| grade_key(l.as_ref())).collect(),
        }
    }

    /// Rank of `label`; unknown labels get `self.len()`.
    pub fn rank(&self, label: &str) -> usize {
        let key = grade_key(label);
        self.keys
            .iter()
            .position(|k| *k == key)
            .unwrap_or(self.keys.len())
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }
}

/// Loose comparison key for a grade label.
fn grade_key(label: &str) -> String {
    let norm = normalize_header(label);
    let norm = norm.strip_prefix("grade_").unwrap_or(&norm);

    match norm {
        "pk" | "prek" | "pre_k" | "pre_kindergarten" | "prekindergarten" => "pk".to_string(),
        "k" | "kg" | "kindergarten" => "k".to_string(),
        other => {
            let digits = ["st", "nd", "rd", "th"]
                .iter()
                .find_map(|suffix| other.strip_suffix(suffix))
                .unwrap_or(other);
            match digits.parse::<u32>() {
                Ok(n) => n.to_string(),
                Err(_) => other.to_string(),
            }
        }
    }
}
