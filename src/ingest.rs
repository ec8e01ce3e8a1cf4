/// CSV ingest
///
/// Reads CSV bytes into string tables and loads batches of files into one
/// canonical table. Uploads and directory scans follow the same recovery
/// policy: a file that cannot be read, parsed or canonicalized is skipped with
/// a warning naming it, and the rest of the batch still loads.

use crate::alias::{canonicalize, AliasTable};
use crate::column::Column;
use crate::dataset::append;
use crate::error::{TableError, TableResult};
use crate::grade::backfill_grade;
use crate::table::Table;
use csv::ReaderBuilder;
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};

const UTF8_BOM: char = '\u{feff}';

/// One uploaded file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CsvFile {
    pub name: String,
    pub content: Vec<u8>,
}

impl CsvFile {
    pub fn new(name: impl Into<String>, content: impl Into<Vec<u8>>) -> Self {
        CsvFile {
            name: name.into(),
            content: content.into(),
        }
    }
}

/// A file that was skipped during a batch load.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IngestWarning {
    pub file: String,
    pub message: String,
}

impl std::fmt::Display for IngestWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Could not read {}: {}", self.file, self.message)
    }
}

/// Row count contributed by one file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileSummary {
    pub file: String,
    pub rows: usize,
}

/// Outcome of a batch load.
#[derive(Debug, Clone)]
pub struct IngestReport {
    /// Every successfully loaded file, concatenated in batch order.
    pub table: Table,
    pub files: Vec<FileSummary>,
    pub warnings: Vec<IngestWarning>,
}

impl IngestReport {
    fn empty(name: &str) -> Self {
        IngestReport {
            table: Table::new(name),
            files: Vec::new(),
            warnings: Vec::new(),
        }
    }

    /// Total rows loaded.
    pub fn rows(&self) -> usize {
        self.table.len()
    }

    /// True when no file was skipped.
    pub fn is_clean(&self) -> bool {
        self.warnings.is_empty()
    }

    fn push(&mut self, file: &str, result: TableResult<Table>) {
        match result {
            Ok(table) => {
                log::info!("loaded {} rows from {}", table.len(), file);
                self.files.push(FileSummary {
                    file: file.to_string(),
                    rows: table.len(),
                });
                self.table = append(&self.table, &table);
            }
            Err(e) => {
                log::warn!("could not read {}: {}", file, e);
                self.warnings.push(IngestWarning {
                    file: file.to_string(),
                    message: e.to_string(),
                });
            }
        }
    }
}

/// Parse CSV bytes into a table of string cells.
///
/// The first record is the header row. Cells are kept verbatim (no trimming,
/// no type inference). Records shorter than the header are padded with empty
/// cells; longer records are errors. Empty header cells are named
/// `Unnamed: N` after their position.
///
/// ```
/// use ngss_toolkit::read_csv;
///
/// let table = read_csv("upload.csv", b"PE Code,Title\nMS-ESS1-1,\"Earth, Moon\"\n").unwrap();
/// assert_eq!(table.column_names(), vec!["PE Code", "Title"]);
/// assert_eq!(table.get_value(0, "Title").unwrap(), "Earth, Moon");
/// ```
pub fn read_csv(name: &str, bytes: &[u8]) -> TableResult<Table> {
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(bytes);

    let headers = reader.headers()?.clone();
    if headers.is_empty() {
        return Err(TableError::EmptyCsv(name.to_string()));
    }

    let mut columns: Vec<Column> = headers
        .iter()
        .enumerate()
        .map(|(i, h)| {
            let h = if i == 0 { h.trim_start_matches(UTF8_BOM) } else { h };
            if h.is_empty() {
                Column::new(unnamed(i))
            } else {
                Column::new(h)
            }
        })
        .collect();

    for record in reader.records() {
        let record = record?;
        if record.len() > columns.len() {
            return Err(TableError::RecordTooLong {
                line: record.position().map(|p| p.line()).unwrap_or_default(),
                expected: columns.len(),
                actual: record.len(),
            });
        }
        for (i, col) in columns.iter_mut().enumerate() {
            col.append(record.get(i).unwrap_or_default());
        }
    }

    Table::from_columns(name, columns)
}

/// Placeholder name for a header with no usable text.
pub(crate) fn unnamed(position: usize) -> String {
    format!("Unnamed: {}", position)
}

/// Read a CSV file from disk.
pub fn read_csv_file(path: &Path) -> TableResult<Table> {
    let bytes = fs::read(path)?;
    read_csv(&display_name(path), &bytes)
}

/// Canonicalize a raw table and backfill its grades.
pub fn prepare(raw: &Table, aliases: &AliasTable, default_grade: &str) -> TableResult<Table> {
    let table = canonicalize(raw, aliases)?;
    backfill_grade(&table, default_grade)
}

/// Load a batch of uploaded files.
pub fn ingest_files(files: &[CsvFile], aliases: &AliasTable, default_grade: &str) -> IngestReport {
    let mut report = IngestReport::empty("upload");
    for file in files {
        let result = read_csv(&file.name, &file.content)
            .and_then(|raw| prepare(&raw, aliases, default_grade));
        report.push(&file.name, result);
    }
    report
}

/// Load every `*.csv` file directly inside `dir`, in path order.
///
/// Only an invalid directory pattern fails the whole call; unreadable files
/// become warnings.
pub fn ingest_directory(dir: &Path, aliases: &AliasTable, default_grade: &str) -> TableResult<IngestReport> {
    let pattern = format!(
        "{}/*.csv",
        glob::Pattern::escape(&dir.to_string_lossy())
    );

    let mut report = IngestReport::empty("directory");
    let mut paths: Vec<PathBuf> = Vec::new();
    for entry in glob::glob(&pattern)? {
        match entry {
            Ok(path) => paths.push(path),
            Err(e) => {
                let file = display_name(e.path());
                log::warn!("could not read {}: {}", file, e.error());
                report.warnings.push(IngestWarning {
                    file,
                    message: e.error().to_string(),
                });
            }
        }
    }
    paths.sort();

    if paths.is_empty() {
        log::info!("no CSV files found in {}", dir.display());
    }

    for path in &paths {
        let result = read_csv_file(path).and_then(|raw| prepare(&raw, aliases, default_grade));
        report.push(&display_name(path), result);
    }

    Ok(report)
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_read_csv_keeps_cells_verbatim() {
        let csv = "Code, Title ,Grade\nA-1,\" padded \",\nB-2,\"multi\nline\",3\n";
        let table = read_csv("t.csv", csv.as_bytes()).unwrap();

        assert_eq!(table.column_names(), vec!["Code", " Title ", "Grade"]);
        assert_eq!(table.len(), 2);
        assert_eq!(table.get_value(0, " Title ").unwrap(), " padded ");
        assert_eq!(table.get_value(0, "Grade").unwrap(), "");
        assert_eq!(table.get_value(1, " Title ").unwrap(), "multi\nline");
    }

    #[test]
    fn test_read_csv_pads_short_records() {
        let table = read_csv("t.csv", b"PE Code,Title,Notes\nA,Alpha\nB,Beta,n\nC\n").unwrap();
        assert_eq!(table.len(), 3);
        assert_eq!(table.column("Title").unwrap().values(), &["Alpha", "Beta", ""]);
        assert_eq!(table.column("Notes").unwrap().values(), &["", "n", ""]);
    }

    #[test]
    fn test_ingest_keeps_files_with_short_rows() {
        let files = [CsvFile::new("s.csv", "PE Code,Title,Notes\nA,Alpha\nB,Beta,n\n")];
        let report = ingest_files(&files, AliasTable::standards(), "");

        assert!(report.is_clean());
        assert_eq!(report.rows(), 2);
        assert_eq!(report.table.column("notes").unwrap().values(), &["", "n"]);
    }

    #[test]
    fn test_csv_errors_keep_their_own_message() {
        let err = read_csv("latin1.csv", b"title\ncaf\xe9\n").unwrap_err();
        match &err {
            TableError::Csv(inner) => assert_eq!(err.to_string(), inner.to_string()),
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_read_csv_names_blank_headers() {
        let table = read_csv("t.csv", b",code,\n1,A,x\n").unwrap();
        assert_eq!(table.column_names(), vec!["Unnamed: 0", "code", "Unnamed: 2"]);
    }

    #[test]
    fn test_read_csv_strips_bom() {
        let table = read_csv("t.csv", "\u{feff}Grade,Code\n4,X\n".as_bytes()).unwrap();
        assert_eq!(table.column_names(), vec!["Grade", "Code"]);
    }

    #[test]
    fn test_read_csv_errors() {
        assert!(matches!(read_csv("empty.csv", b""), Err(TableError::EmptyCsv(_))));
        assert!(matches!(
            read_csv("ragged.csv", b"a,b\n1,2\n1,2,3\n"),
            Err(TableError::RecordTooLong { line: 3, expected: 2, actual: 3 })
        ));
        assert!(matches!(
            read_csv("dup.csv", b"code,code\n1,2\n"),
            Err(TableError::DuplicateColumn { .. })
        ));
        assert!(read_csv("latin1.csv", b"title\ncaf\xe9\n").is_err());
    }

    #[test]
    fn test_ingest_files_recovers_per_file() {
        let files = vec![
            CsvFile::new("good.csv", "PE Code,Grade\nA,\nB,4\n"),
            CsvFile::new("bad.csv", "a,b\n1,2,3\n"),
            CsvFile::new("clash.csv", "PE Code,NGSS\nx,y\n"),
            CsvFile::new("more.csv", "code,notes\nC,extra\n"),
        ];
        let report = ingest_files(&files, AliasTable::standards(), "K");

        assert_eq!(report.rows(), 3);
        assert_eq!(report.table.column_names(), vec!["grade", "code", "notes"]);
        assert_eq!(report.table.column("grade").unwrap().values(), &["K", "4", "K"]);
        assert_eq!(report.table.column("notes").unwrap().values(), &["", "", "extra"]);

        let skipped: Vec<&str> = report.warnings.iter().map(|w| w.file.as_str()).collect();
        assert_eq!(skipped, vec!["bad.csv", "clash.csv"]);
        assert_eq!(
            report.files,
            vec![
                FileSummary { file: "good.csv".to_string(), rows: 2 },
                FileSummary { file: "more.csv".to_string(), rows: 1 },
            ]
        );
        assert!(!report.is_clean());
        assert!(report.warnings[0].to_string().starts_with("Could not read bad.csv"));
    }

    #[test]
    fn test_ingest_directory_sorted_and_recovering() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("b.csv"), "code\nB1\nB2\n").unwrap();
        fs::write(dir.path().join("a.csv"), "code\nA1\n").unwrap();
        fs::write(dir.path().join("broken.csv"), "code,title\nx,y,z\n").unwrap();
        fs::write(dir.path().join("notes.txt"), "ignored").unwrap();

        let report = ingest_directory(dir.path(), AliasTable::standards(), "").unwrap();

        assert_eq!(report.table.column("code").unwrap().values(), &["A1", "B1", "B2"]);
        assert_eq!(report.warnings.len(), 1);
        assert_eq!(report.warnings[0].file, "broken.csv");
    }

    #[test]
    fn test_ingest_directory_without_csv_files() {
        let dir = tempfile::tempdir().unwrap();
        let report = ingest_directory(dir.path(), AliasTable::standards(), "").unwrap();
        assert_eq!(report.rows(), 0);
        assert!(report.table.has_no_columns());
        assert!(report.is_clean());
    }
}
