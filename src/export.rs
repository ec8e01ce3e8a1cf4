/// CSV export
///
/// Writes a table as UTF-8, comma-delimited CSV: one header row with the
/// column names in table order, no row index, and quoting only where a cell
/// contains the delimiter, a quote or a line break.

use crate::error::{TableError, TableResult};
use crate::table::Table;
use csv::{QuoteStyle, WriterBuilder};

/// A downloadable CSV document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CsvExport {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

impl CsvExport {
    /// The CSV content as text. Exports are always valid UTF-8.
    pub fn as_str(&self) -> &str {
        std::str::from_utf8(&self.bytes).unwrap_or_default()
    }
}

/// Serialize `table` to CSV bytes.
///
/// ```
/// use ngss_toolkit::{to_csv_bytes, Table};
///
/// let mut table = Table::with_columns("t", &["code", "title"]);
/// table.append_row(vec!["A-1".to_string(), "Forces, motion".to_string()]).unwrap();
///
/// let bytes = to_csv_bytes(&table).unwrap();
/// assert_eq!(bytes, b"code,title\nA-1,\"Forces, motion\"\n");
/// ```
pub fn to_csv_bytes(table: &Table) -> TableResult<Vec<u8>> {
    // A column-less table (a cleared dataset) exports as an empty document.
    if table.has_no_columns() {
        return Ok(Vec::new());
    }

    let mut writer = WriterBuilder::new()
        .quote_style(QuoteStyle::Necessary)
        .from_writer(Vec::new());

    writer.write_record(table.column_names())?;
    for row in table.iter_rows() {
        writer.write_record(row)?;
    }

    writer
        .into_inner()
        .map_err(|e| TableError::Io(e.into_error()))
}
