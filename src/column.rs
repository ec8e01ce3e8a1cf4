/// Column Implementation
///
/// A Column is a named, random-access sequence of string cells indexed by row.
///
/// Every cell is stored as text. Uploaded curriculum sheets mix codes, grade
/// labels and prose, and all filtering and sorting operate on the string form,
/// so no type inference is performed on ingest.

/// A named column of string cells.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Column {
    name: String,
    values: Vec<String>,
}

impl Column {
    pub fn new(name: impl Into<String>) -> Self {
        Column {
            name: name.into(),
            values: Vec::new(),
        }
    }

    pub fn from_values(name: impl Into<String>, values: Vec<String>) -> Self {
        Column {
            name: name.into(),
            values,
        }
    }

    /// Create a column holding `len` copies of `value`.
    pub fn filled(name: impl Into<String>, value: &str, len: usize) -> Self {
        Column {
            name: name.into(),
            values: vec![value.to_string(); len],
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns a copy of this column under a different name.
    pub fn renamed(&self, name: impl Into<String>) -> Self {
        Column {
            name: name.into(),
            values: self.values.clone(),
        }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn get(&self, row: usize) -> Option<&str> {
        self.values.get(row).map(String::as_str)
    }

    pub fn append(&mut self, value: impl Into<String>) {
        self.values.push(value.into());
    }

    pub fn values(&self) -> &[String] {
        &self.values
    }

    /// Returns a new column containing the cells at `rows`, in that order.
    ///
    /// Indices must be in range; [`Table::take_rows`](crate::Table::take_rows)
    /// checks them before calling this.
    pub(crate) fn take(&self, rows: &[usize]) -> Self {
        Column {
            name: self.name.clone(),
            values: rows.iter().map(|&i| self.values[i].clone()).collect(),
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.values.iter().map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_column_append_and_get() {
        let mut col = Column::new("code");
        col.append("MS-ESS1-1");
        col.append("HS-PS2-1");

        assert_eq!(col.len(), 2);
        assert_eq!(col.get(0), Some("MS-ESS1-1"));
        assert_eq!(col.get(1), Some("HS-PS2-1"));
        assert_eq!(col.get(2), None);
    }

    #[test]
    fn test_column_take_reorders() {
        let col = Column::from_values(
            "title",
            vec!["a".to_string(), "b".to_string(), "c".to_string()],
        );
        let taken = col.take(&[2, 0]);
        assert_eq!(taken.name(), "title");
        assert_eq!(taken.values(), &["c".to_string(), "a".to_string()]);
    }

    #[test]
    fn test_column_filled_and_renamed() {
        let col = Column::filled("grade", "", 3);
        assert_eq!(col.len(), 3);
        assert!(col.iter().all(|v| v.is_empty()));

        let renamed = col.renamed("level");
        assert_eq!(renamed.name(), "level");
        assert_eq!(col.name(), "grade");
    }
}
