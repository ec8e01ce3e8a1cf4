/// NGSS Toolkit - Curriculum CSV Curation
///
/// Loads loosely formatted NGSS standards and skills spreadsheets, maps their
/// headers onto a canonical vocabulary, backfills missing grades, accumulates
/// uploads into per-view datasets and renders filtered, sorted, projected
/// views that can be exported back to CSV.
///
/// All cells are strings. Every pipeline stage takes a table by reference and
/// returns a new one.

pub mod error;
pub mod column;
pub mod table;
pub mod header;
pub mod alias;
pub mod grade;
pub mod filter;
pub mod ingest;
pub mod export;
pub mod dataset;
pub mod config;

pub use error::{TableError, TableResult};
pub use column::Column;
pub use table::{Table, TableRowIterator};
pub use header::normalize_header;
pub use alias::{canonicalize, AliasTable, FieldAliases, CCC, CODE, DCI, DOMAIN, GRADE, NOTES, PRACTICE, SEP, TITLE};
pub use grade::{backfill_grade, grade_options, GradeOrder};
pub use filter::{apply, filter_columns, filter_grades, project, search, sort, Collation, FilterSpec, SortKey, SortOrder};
pub use ingest::{ingest_directory, ingest_files, prepare, read_csv, read_csv_file, CsvFile, FileSummary, IngestReport, IngestWarning};
pub use export::{to_csv_bytes, CsvExport};
pub use dataset::{append, Dataset, Session, ViewKind};
pub use config::{ConfigError, ServerConfig};

// WebSocket server modules - only when server feature is enabled
#[cfg(feature = "server")]
pub mod messages;
#[cfg(feature = "server")]
pub mod websocket;
#[cfg(feature = "server")]
pub mod server;
