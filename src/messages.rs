/// WebSocket message types for client-server communication
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::dataset::ViewKind;
use crate::filter::{FilterSpec, SortOrder};
use crate::ingest::{CsvFile, FileSummary, IngestWarning};
use crate::table::Table;

/// An uploaded file as sent over the wire. Content is the CSV text.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct UploadedFile {
    pub name: String,
    pub content: String,
}

impl From<UploadedFile> for CsvFile {
    fn from(file: UploadedFile) -> Self {
        CsvFile::new(file.name, file.content)
    }
}

/// Filter settings as the client sends them. Every field is optional.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct WireFilter {
    pub search: String,
    pub column_filters: BTreeMap<String, String>,
    pub grades: Vec<String>,
    pub sort_column: Option<String>,
    pub sort_direction: SortOrder,
    pub columns: Option<Vec<String>>,
}

impl WireFilter {
    /// Convert to a [`FilterSpec`], using the sort collation of `view`.
    pub fn to_filter_spec(&self, view: ViewKind) -> FilterSpec {
        let mut spec = FilterSpec::new()
            .with_search(self.search.clone())
            .with_grades(self.grades.iter().cloned());
        for (column, pattern) in &self.column_filters {
            spec = spec.with_column_filter(column.clone(), pattern.clone());
        }
        if let Some(column) = self.sort_column.as_ref().filter(|c| !c.is_empty()) {
            spec = spec.sorted_by(view.sort_key(column.clone(), self.sort_direction));
        }
        if let Some(columns) = &self.columns {
            spec = spec.with_columns(columns.iter().cloned());
        }
        spec
    }
}

/// Messages sent from client to server
#[derive(Debug, Deserialize)]
#[serde(tag = "type")]
pub enum ClientMessage {
    /// Switch the current view
    SelectView { view: ViewKind },

    /// Add uploaded files to a view
    Upload {
        view: ViewKind,
        files: Vec<UploadedFile>,
        #[serde(default)]
        default_grade: String,
    },

    /// Load every CSV in the server's data directory into a view
    LoadDirectory {
        view: ViewKind,
        #[serde(default)]
        default_grade: String,
    },

    /// Drop a view's dataset
    Clear { view: ViewKind },

    /// Render a view through the filter pipeline
    Query {
        view: ViewKind,
        #[serde(default)]
        filter: WireFilter,
    },

    /// Render a view and return it as CSV
    Export {
        view: ViewKind,
        #[serde(default)]
        filter: WireFilter,
    },

    /// Request the grade allow-list choices of a view
    GradeOptions { view: ViewKind },
}

/// Messages sent from server to client
#[derive(Debug, Serialize, Clone, PartialEq, Eq)]
#[serde(tag = "type")]
pub enum ServerMessage {
    /// Current view changed
    ViewSelected { view: ViewKind },

    /// A batch load finished
    Ingested {
        view: ViewKind,
        rows_added: usize,
        total_rows: usize,
        files: Vec<FileSummary>,
        warnings: Vec<IngestWarning>,
    },

    /// A dataset was cleared
    Cleared { view: ViewKind },

    /// Rendered rows in response to Query
    TableData {
        view: ViewKind,
        columns: Vec<String>,
        rows: Vec<Vec<String>>,
        /// Rows left after filtering.
        matched: usize,
        /// Rows in the dataset before filtering.
        total: usize,
    },

    /// CSV document in response to Export
    CsvExport { file_name: String, content: String },

    /// Distinct grade labels of a view
    GradeOptions { view: ViewKind, grades: Vec<String> },

    /// Error occurred
    Error { message: String },
}

impl ServerMessage {
    pub fn table_data(view: ViewKind, table: &Table, total: usize) -> Self {
        ServerMessage::TableData {
            view,
            columns: table.column_names().iter().map(|c| c.to_string()).collect(),
            rows: table
                .iter_rows()
                .map(|row| row.into_iter().map(str::to_string).collect())
                .collect(),
            matched: table.len(),
            total,
        }
    }

    pub fn error(message: impl std::fmt::Display) -> Self {
        ServerMessage::Error {
            message: message.to_string(),
        }
    }
}
