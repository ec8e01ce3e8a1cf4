/// Filter / Sort / Project Pipeline
///
/// A [`FilterSpec`] describes one render pass over a dataset: a grade
/// allow-list, a free-text search, per-column "contains" filters, an optional
/// sort key and an optional column selection. [`apply`] runs the stages in
/// that fixed order and returns a new table; the input is never modified.
///
/// Every row stage keeps rows in their incoming relative order and can only
/// drop rows. Sorting is stable.
///
/// # Examples
///
/// ```
/// use ngss_toolkit::{apply, FilterSpec, SortKey, Table};
///
/// let mut table = Table::with_columns("standards", &["grade", "code", "domain"]);
/// for (g, c, d) in [("4th", "4-PS3-1", "Physical"), ("10th", "HS-PS4-1", "Physical"), ("9th", "HS-LS1-1", "Life")] {
///     table.append_row(vec![g.to_string(), c.to_string(), d.to_string()]).unwrap();
/// }
///
/// let spec = FilterSpec::new()
///     .with_column_filter("domain", "phys")
///     .sorted_by(SortKey::descending("grade"));
/// let out = apply(&table, &spec).unwrap();
///
/// assert_eq!(out.len(), 2);
/// assert_eq!(out.get_value(0, "grade").unwrap(), "4th");
/// assert_eq!(out.get_value(1, "grade").unwrap(), "10th");
/// ```

use crate::alias::GRADE;
use crate::error::{TableError, TableResult};
use crate::grade::GradeOrder;
use crate::table::Table;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet};
use std::str::FromStr;

/// Sort order specification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SortOrder {
    /// Ascending order (smallest first)
    #[default]
    #[serde(rename = "asc")]
    Ascending,
    /// Descending order (largest first)
    #[serde(rename = "desc")]
    Descending,
}

impl FromStr for SortOrder {
    type Err = String;

    /// Accepts: "asc", "ascending", "desc", "descending"
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "asc" | "ascending" => Ok(SortOrder::Ascending),
            "desc" | "descending" => Ok(SortOrder::Descending),
            _ => Err(format!(
                "Unknown sort direction: '{}'. Use 'asc' or 'desc'",
                s
            )),
        }
    }
}

/// How cells are compared when sorting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Collation {
    /// Plain string ordering: "10th" sorts before "2nd".
    #[default]
    Lexical,
    /// Rank by [`GradeOrder::standard`]; unknown labels sort after known ones.
    GradeRank,
}

/// A single sort key specifying a column, order and collation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortKey {
    pub column: String,
    pub order: SortOrder,
    pub collation: Collation,
}

impl SortKey {
    pub fn new(column: impl Into<String>, order: SortOrder) -> Self {
        SortKey {
            column: column.into(),
            order,
            collation: Collation::Lexical,
        }
    }

    pub fn ascending(column: impl Into<String>) -> Self {
        Self::new(column, SortOrder::Ascending)
    }

    pub fn descending(column: impl Into<String>) -> Self {
        Self::new(column, SortOrder::Descending)
    }

    pub fn with_collation(mut self, collation: Collation) -> Self {
        self.collation = collation;
        self
    }
}

/// Parameters of one render pass.
///
/// The default spec is a no-op: no allow-list, no search, no column filters,
/// no sort and every column visible.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterSpec {
    /// Case-insensitive substring matched against every column.
    pub search: String,
    /// Column name to case-insensitive substring. Empty patterns are ignored.
    pub column_filters: BTreeMap<String, String>,
    /// Grade labels to keep. Empty keeps every row.
    pub grades: BTreeSet<String>,
    pub sort: Option<SortKey>,
    /// Visible columns in display order. `None` shows all columns.
    pub columns: Option<Vec<String>>,
}

impl FilterSpec {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_search(mut self, search: impl Into<String>) -> Self {
        self.search = search.into();
        self
    }

    pub fn with_column_filter(mut self, column: impl Into<String>, pattern: impl Into<String>) -> Self {
        self.column_filters.insert(column.into(), pattern.into());
        self
    }

    pub fn with_grades<I, S>(mut self, grades: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.grades = grades.into_iter().map(Into::into).collect();
        self
    }

    pub fn sorted_by(mut self, key: SortKey) -> Self {
        self.sort = Some(key);
        self
    }

    pub fn with_columns<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.columns = Some(columns.into_iter().map(Into::into).collect());
        self
    }

    /// Check every column the spec refers to against `table`.
    ///
    /// Returns the first unknown column as [`TableError::UnknownColumn`].
    pub fn validate(&self, table: &Table) -> TableResult<()> {
        let check = |name: &str| {
            if table.has_column(name) {
                Ok(())
            } else {
                Err(TableError::UnknownColumn(name.to_string()))
            }
        };

        if !self.grades.is_empty() {
            check(GRADE)?;
        }
        for column in self.column_filters.keys() {
            check(column)?;
        }
        if let Some(key) = &self.sort {
            check(&key.column)?;
        }
        if let Some(columns) = &self.columns {
            for column in columns {
                check(column)?;
            }
        }
        Ok(())
    }
}

/// Run the full pipeline: grades, search, column filters, sort, projection.
///
/// The spec is validated before any stage runs. A table with no columns (a
/// cleared dataset) yields an empty copy regardless of the spec.
pub fn apply(table: &Table, spec: &FilterSpec) -> TableResult<Table> {
    if table.has_no_columns() {
        return Ok(table.clone());
    }
    spec.validate(table)?;

    let mut work = filter_grades(table, &spec.grades)?;
    work = search(&work, &spec.search)?;
    work = filter_columns(&work, &spec.column_filters)?;
    if let Some(key) = &spec.sort {
        work = sort(&work, key)?;
    }
    if let Some(columns) = &spec.columns {
        work = project(&work, columns)?;
    }

    log::debug!(
        "filter pipeline on '{}': {} -> {} rows",
        table.name(),
        table.len(),
        work.len()
    );
    Ok(work)
}

/// Keep rows whose `grade` cell is one of `grades`. An empty set keeps all rows.
pub fn filter_grades(table: &Table, grades: &BTreeSet<String>) -> TableResult<Table> {
    if grades.is_empty() {
        return Ok(table.clone());
    }

    let col = table
        .column(GRADE)
        .ok_or_else(|| TableError::UnknownColumn(GRADE.to_string()))?;
    let keep: Vec<usize> = col
        .iter()
        .enumerate()
        .filter(|(_, g)| grades.contains(*g))
        .map(|(i, _)| i)
        .collect();

    table.take_rows(&keep)
}

/// Keep rows where any cell contains `needle`, ignoring case. Empty is a no-op.
pub fn search(table: &Table, needle: &str) -> TableResult<Table> {
    if needle.is_empty() {
        return Ok(table.clone());
    }

    let needle = needle.to_lowercase();
    let keep: Vec<usize> = (0..table.len())
        .filter(|&row| {
            table.columns().iter().any(|col| {
                col.get(row)
                    .map(|v| v.to_lowercase().contains(&needle))
                    .unwrap_or(false)
            })
        })
        .collect();

    table.take_rows(&keep)
}

/// Keep rows that satisfy every non-empty column pattern, ignoring case.
pub fn filter_columns(table: &Table, filters: &BTreeMap<String, String>) -> TableResult<Table> {
    let mut active = Vec::new();
    for (column, pattern) in filters {
        if pattern.is_empty() {
            continue;
        }
        let col = table
            .column(column)
            .ok_or_else(|| TableError::UnknownColumn(column.clone()))?;
        active.push((col, pattern.to_lowercase()));
    }

    if active.is_empty() {
        return Ok(table.clone());
    }

    let keep: Vec<usize> = (0..table.len())
        .filter(|&row| {
            active.iter().all(|(col, pattern)| {
                col.get(row)
                    .map(|v| v.to_lowercase().contains(pattern.as_str()))
                    .unwrap_or(false)
            })
        })
        .collect();

    table.take_rows(&keep)
}

/// Stable sort on one column.
///
/// Rows with equal keys keep their relative order in both directions.
pub fn sort(table: &Table, key: &SortKey) -> TableResult<Table> {
    let col = table
        .column(&key.column)
        .ok_or_else(|| TableError::UnknownColumn(key.column.clone()))?;

    let mut order: Vec<usize> = (0..table.len()).collect();
    match key.collation {
        Collation::Lexical => {
            let values = col.values();
            order.sort_by(|&a, &b| directed(values[a].cmp(&values[b]), key.order));
        }
        Collation::GradeRank => {
            let grades = GradeOrder::standard();
            let ranks: Vec<usize> = col.iter().map(|g| grades.rank(g)).collect();
            // Unknown labels stay last in either direction.
            let unknown = |r: usize| r >= grades.len();
            order.sort_by(|&a, &b| {
                let (ra, rb) = (ranks[a], ranks[b]);
                unknown(ra)
                    .cmp(&unknown(rb))
                    .then_with(|| directed(ra.cmp(&rb), key.order))
            });
        }
    }

    table.take_rows(&order)
}

fn directed(cmp: Ordering, order: SortOrder) -> Ordering {
    match order {
        SortOrder::Ascending => cmp,
        SortOrder::Descending => cmp.reverse(),
    }
}

/// Keep only `columns`, in that order. Never renames.
pub fn project(table: &Table, columns: &[String]) -> TableResult<Table> {
    table.select(columns)
}
