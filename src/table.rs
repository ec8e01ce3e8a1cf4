/// Table Implementation
///
/// A Table is an ordered collection of named string columns that all share one
/// row count. Tables are treated as values: every pipeline stage builds a new
/// table rather than mutating its input.
///
/// # Examples
///
/// ```
/// use ngss_toolkit::Table;
///
/// let mut table = Table::with_columns("standards", &["code", "title"]);
/// table.append_row(vec!["MS-ESS1-1".to_string(), "Earth's place".to_string()]).unwrap();
///
/// assert_eq!(table.len(), 1);
/// assert_eq!(table.get_value(0, "code").unwrap(), "MS-ESS1-1");
/// ```

use crate::column::Column;
use crate::error::{TableError, TableResult};
use std::collections::HashSet;

/// Root table owning its columns.
#[derive(Clone, PartialEq, Eq)]
pub struct Table {
    name: String,
    columns: Vec<Column>,
    row_count: usize,
}

impl Table {
    /// Create an empty table with no columns and no rows.
    pub fn new(name: impl Into<String>) -> Self {
        Table {
            name: name.into(),
            columns: Vec::new(),
            row_count: 0,
        }
    }

    /// Create an empty table with the given column names.
    ///
    /// Names are taken as given; use [`Table::from_columns`] when the names
    /// come from untrusted input and must be checked for duplicates.
    pub fn with_columns(name: impl Into<String>, column_names: &[&str]) -> Self {
        Table {
            name: name.into(),
            columns: column_names.iter().map(|c| Column::new(*c)).collect(),
            row_count: 0,
        }
    }

    /// Build a table from pre-populated columns.
    ///
    /// Fails if the columns disagree in length or if two columns share a name.
    pub fn from_columns(name: impl Into<String>, columns: Vec<Column>) -> TableResult<Self> {
        let row_count = columns.first().map(Column::len).unwrap_or(0);

        let mut seen = HashSet::new();
        for col in &columns {
            if col.len() != row_count {
                return Err(TableError::ColumnLengthMismatch {
                    column: col.name().to_string(),
                    expected: row_count,
                    actual: col.len(),
                });
            }
            if !seen.insert(col.name()) {
                return Err(TableError::DuplicateColumn {
                    column: col.name().to_string(),
                    sources: vec![col.name().to_string(), col.name().to_string()],
                });
            }
        }

        Ok(Table {
            name: name.into(),
            columns,
            row_count,
        })
    }

    /// Assemble a table whose columns are already known to be unique and
    /// `row_count` long.
    pub(crate) fn from_parts(name: impl Into<String>, columns: Vec<Column>, row_count: usize) -> Self {
        debug_assert!(columns.iter().all(|c| c.len() == row_count));
        Table {
            name: name.into(),
            columns,
            row_count,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the same table under a different name.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn len(&self) -> usize {
        self.row_count
    }

    pub fn is_empty(&self) -> bool {
        self.row_count == 0
    }

    pub fn num_columns(&self) -> usize {
        self.columns.len()
    }

    /// Returns true if the table has no columns at all (a cleared dataset).
    pub fn has_no_columns(&self) -> bool {
        self.columns.is_empty()
    }

    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(Column::name).collect()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c.name() == name)
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.column_index(name).is_some()
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name() == name)
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn get_value(&self, row: usize, column: &str) -> TableResult<&str> {
        let col = self
            .column(column)
            .ok_or_else(|| TableError::UnknownColumn(column.to_string()))?;

        col.get(row).ok_or(TableError::RowOutOfRange {
            row,
            len: self.row_count,
        })
    }

    /// Returns the cells of one row in column order.
    pub fn row_values(&self, row: usize) -> TableResult<Vec<&str>> {
        if row >= self.row_count {
            return Err(TableError::RowOutOfRange {
                row,
                len: self.row_count,
            });
        }

        Ok(self
            .columns
            .iter()
            .map(|c| c.get(row).unwrap_or_default())
            .collect())
    }

    /// Append one row given as values in column order.
    pub fn append_row(&mut self, values: Vec<String>) -> TableResult<()> {
        if values.len() != self.columns.len() {
            return Err(TableError::RowArity {
                expected: self.columns.len(),
                actual: values.len(),
            });
        }

        for (col, value) in self.columns.iter_mut().zip(values) {
            col.append(value);
        }
        self.row_count += 1;

        Ok(())
    }

    /// Append multiple rows at once.
    ///
    /// All rows are validated before any is inserted, so on error the table
    /// is left unchanged.
    pub fn append_rows(&mut self, rows: Vec<Vec<String>>) -> TableResult<usize> {
        for row in &rows {
            if row.len() != self.columns.len() {
                return Err(TableError::RowArity {
                    expected: self.columns.len(),
                    actual: row.len(),
                });
            }
        }

        let count = rows.len();
        for row in rows {
            self.append_row(row)?;
        }
        Ok(count)
    }

    /// Returns a new table containing the rows at `rows`, in that order.
    pub fn take_rows(&self, rows: &[usize]) -> TableResult<Table> {
        if let Some(&bad) = rows.iter().find(|&&r| r >= self.row_count) {
            return Err(TableError::RowOutOfRange {
                row: bad,
                len: self.row_count,
            });
        }

        Ok(Table {
            name: self.name.clone(),
            columns: self.columns.iter().map(|c| c.take(rows)).collect(),
            row_count: rows.len(),
        })
    }

    /// Returns a new table with only the named columns, in the given order.
    pub fn select(&self, column_names: &[String]) -> TableResult<Table> {
        let mut columns = Vec::with_capacity(column_names.len());
        for name in column_names {
            let col = self
                .column(name)
                .ok_or_else(|| TableError::UnknownColumn(name.clone()))?;
            columns.push(col.clone());
        }

        // Row count survives even an empty selection.
        let mut table = Table::from_columns(self.name.clone(), columns)?;
        table.row_count = self.row_count;
        Ok(table)
    }

    /// Replace (or add, at the end) a column. The column must match the row count.
    pub fn put_column(&mut self, column: Column) -> TableResult<()> {
        if !self.columns.is_empty() && column.len() != self.row_count {
            return Err(TableError::ColumnLengthMismatch {
                column: column.name().to_string(),
                expected: self.row_count,
                actual: column.len(),
            });
        }
        if self.columns.is_empty() {
            self.row_count = column.len();
        }

        match self.column_index(column.name()) {
            Some(idx) => self.columns[idx] = column,
            None => self.columns.push(column),
        }
        Ok(())
    }

    pub fn iter_rows(&self) -> TableRowIterator<'_> {
        TableRowIterator {
            table: self,
            index: 0,
        }
    }
}

pub struct TableRowIterator<'a> {
    table: &'a Table,
    index: usize,
}

impl<'a> Iterator for TableRowIterator<'a> {
    type Item = Vec<&'a str>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.index >= self.table.row_count {
            None
        } else {
            let result = self.table.row_values(self.index).ok();
            self.index += 1;
            result
        }
    }
}

impl std::fmt::Debug for Table {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Table {{ name: '{}', columns: {:?}, rows: {} }}",
            self.name,
            self.column_names(),
            self.row_count
        )
    }
}
