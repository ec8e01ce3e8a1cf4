/// Dataset accumulation and session state.
///
/// A [`Dataset`] is the growing table behind one view (Skills or Standards).
/// A [`Session`] owns both datasets and the current view selector; it is the
/// only mutable state in the system and is passed explicitly to whatever
/// drives it.

use crate::alias::{AliasTable, GRADE};
use crate::column::Column;
use crate::error::TableResult;
use crate::export::{to_csv_bytes, CsvExport};
use crate::filter::{apply, Collation, FilterSpec, SortKey, SortOrder};
use crate::grade::grade_options;
use crate::ingest::{ingest_directory, ingest_files, CsvFile, IngestReport};
use crate::table::Table;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::str::FromStr;

/// Concatenate `incoming` after `existing`.
///
/// Columns are the union of both sides: `existing` order first, then columns
/// only `incoming` has, in its order. Cells missing on either side are empty
/// strings. The result keeps the name of `existing`.
pub fn append(existing: &Table, incoming: &Table) -> Table {
    if incoming.has_no_columns() {
        return existing.clone();
    }
    if existing.has_no_columns() {
        return incoming.clone().with_name(existing.name());
    }

    let mut names: Vec<&str> = existing.column_names();
    for name in incoming.column_names() {
        if !names.contains(&name) {
            names.push(name);
        }
    }

    let columns: Vec<Column> = names
        .into_iter()
        .map(|name| {
            let mut values: Vec<String> = Vec::with_capacity(existing.len() + incoming.len());
            for side in [existing, incoming] {
                match side.column(name) {
                    Some(col) => values.extend(col.values().iter().cloned()),
                    None => values.extend(std::iter::repeat(String::new()).take(side.len())),
                }
            }
            Column::from_values(name, values)
        })
        .collect();

    Table::from_parts(existing.name(), columns, existing.len() + incoming.len())
}

/// One of the two independent workflows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ViewKind {
    Skills,
    #[default]
    Standards,
}

impl ViewKind {
    pub const ALL: [ViewKind; 2] = [ViewKind::Skills, ViewKind::Standards];

    pub fn as_str(&self) -> &'static str {
        match self {
            ViewKind::Skills => "skills",
            ViewKind::Standards => "standards",
        }
    }

    /// Header vocabulary used when ingesting into this view.
    pub fn alias_table(&self) -> &'static AliasTable {
        match self {
            ViewKind::Skills => AliasTable::skills(),
            ViewKind::Standards => AliasTable::standards(),
        }
    }

    /// File name offered for a filtered export of this view.
    pub fn export_file_name(&self) -> String {
        format!("ngss_{}_filtered.csv", self.as_str())
    }

    /// Sort key for `column` as this view sorts it.
    ///
    /// The Skills view ranks grades by [`crate::GradeOrder`]; everything else
    /// sorts lexically.
    pub fn sort_key(&self, column: impl Into<String>, order: SortOrder) -> SortKey {
        let key = SortKey::new(column, order);
        if *self == ViewKind::Skills && key.column == GRADE {
            key.with_collation(Collation::GradeRank)
        } else {
            key
        }
    }
}

impl fmt::Display for ViewKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ViewKind::Skills => write!(f, "Skills"),
            ViewKind::Standards => write!(f, "Standards"),
        }
    }
}

impl FromStr for ViewKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "skills" => Ok(ViewKind::Skills),
            "standards" => Ok(ViewKind::Standards),
            _ => Err(format!("Unknown view: '{}'. Use 'skills' or 'standards'", s)),
        }
    }
}

/// The accumulated table for one view.
#[derive(Debug, Clone)]
pub struct Dataset {
    view: ViewKind,
    table: Table,
}

impl Dataset {
    pub fn new(view: ViewKind) -> Self {
        Dataset {
            view,
            table: Table::new(view.as_str()),
        }
    }

    pub fn view(&self) -> ViewKind {
        self.view
    }

    pub fn table(&self) -> &Table {
        &self.table
    }

    pub fn len(&self) -> usize {
        self.table.len()
    }

    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }

    /// Append `incoming` rows after the current rows.
    pub fn append(&mut self, incoming: &Table) {
        self.table = append(&self.table, incoming);
    }

    /// Drop every row and column.
    pub fn clear(&mut self) {
        self.table = Table::new(self.view.as_str());
    }
}

/// Per-session application state: both datasets and the current view.
#[derive(Debug, Clone)]
pub struct Session {
    skills: Dataset,
    standards: Dataset,
    current: ViewKind,
    aliases: Option<AliasTable>,
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

impl Session {
    pub fn new() -> Self {
        Session {
            skills: Dataset::new(ViewKind::Skills),
            standards: Dataset::new(ViewKind::Standards),
            current: ViewKind::default(),
            aliases: None,
        }
    }

    /// Use `aliases` for both views instead of the built-in vocabularies.
    pub fn with_alias_table(mut self, aliases: AliasTable) -> Self {
        self.aliases = Some(aliases);
        self
    }

    pub fn current(&self) -> ViewKind {
        self.current
    }

    pub fn set_current(&mut self, view: ViewKind) {
        self.current = view;
    }

    pub fn dataset(&self, view: ViewKind) -> &Dataset {
        match view {
            ViewKind::Skills => &self.skills,
            ViewKind::Standards => &self.standards,
        }
    }

    fn dataset_mut(&mut self, view: ViewKind) -> &mut Dataset {
        match view {
            ViewKind::Skills => &mut self.skills,
            ViewKind::Standards => &mut self.standards,
        }
    }

    fn alias_table(&self, view: ViewKind) -> &AliasTable {
        self.aliases.as_ref().unwrap_or_else(|| view.alias_table())
    }

    /// Ingest uploaded files into `view`. Unreadable files are reported, not fatal.
    pub fn add_uploads(&mut self, view: ViewKind, files: &[CsvFile], default_grade: &str) -> IngestReport {
        let report = ingest_files(files, self.alias_table(view), default_grade);
        self.absorb(view, &report);
        report
    }

    /// Ingest every `*.csv` in `dir` into `view`.
    pub fn load_directory(&mut self, view: ViewKind, dir: &Path, default_grade: &str) -> TableResult<IngestReport> {
        let report = ingest_directory(dir, self.alias_table(view), default_grade)?;
        self.absorb(view, &report);
        Ok(report)
    }

    fn absorb(&mut self, view: ViewKind, report: &IngestReport) {
        if report.rows() == 0 && report.table.has_no_columns() {
            return;
        }
        let dataset = self.dataset_mut(view);
        dataset.append(&report.table);
        log::info!(
            "added {} rows to {} ({} total, {} files skipped)",
            report.rows(),
            view,
            dataset.len(),
            report.warnings.len()
        );
    }

    pub fn clear(&mut self, view: ViewKind) {
        self.dataset_mut(view).clear();
        log::info!("cleared {} dataset", view);
    }

    /// Clear both datasets and return to the default view.
    pub fn reset(&mut self) {
        for view in ViewKind::ALL {
            self.dataset_mut(view).clear();
        }
        self.current = ViewKind::default();
    }

    /// Run the filter pipeline over `view`.
    pub fn render(&self, view: ViewKind, spec: &FilterSpec) -> TableResult<Table> {
        apply(self.dataset(view).table(), spec)
    }

    /// Render `view` and serialize the result for download.
    pub fn export(&self, view: ViewKind, spec: &FilterSpec) -> TableResult<CsvExport> {
        let table = self.render(view, spec)?;
        Ok(CsvExport {
            file_name: view.export_file_name(),
            bytes: to_csv_bytes(&table)?,
        })
    }

    /// Grade labels available for the allow-list of `view`.
    pub fn grade_options(&self, view: ViewKind) -> Vec<String> {
        grade_options(self.dataset(view).table())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::TableError;

    fn table(headers: &[&str], rows: &[&[&str]]) -> Table {
        let mut t = Table::with_columns("incoming", headers);
        for row in rows {
            t.append_row(row.iter().map(|s| s.to_string()).collect())
                .unwrap();
        }
        t
    }

    #[test]
    fn test_append_to_empty() {
        let incoming = table(&["grade", "code"], &[&["1", "A"]]);
        let merged = append(&Table::new("standards"), &incoming);
        assert_eq!(merged.name(), "standards");
        assert_eq!(merged.columns(), incoming.columns());

        let unchanged = append(&incoming, &Table::new("empty"));
        assert_eq!(unchanged, incoming);
    }

    #[test]
    fn test_append_unions_columns() {
        let existing = table(&["grade", "code", "notes"], &[&["1", "A", "n"]]);
        let incoming = table(&["grade", "title", "code"], &[&["2", "T", "B"], &["3", "U", "C"]]);
        let merged = append(&existing, &incoming);

        assert_eq!(merged.column_names(), vec!["grade", "code", "notes", "title"]);
        assert_eq!(merged.len(), 3);
        assert_eq!(merged.column("code").unwrap().values(), &["A", "B", "C"]);
        assert_eq!(merged.column("notes").unwrap().values(), &["n", "", ""]);
        assert_eq!(merged.column("title").unwrap().values(), &["", "T", "U"]);
    }

    #[test]
    fn test_dataset_append_and_clear() {
        let mut ds = Dataset::new(ViewKind::Standards);
        let ten = table(&["code"], &(0..10).map(|_| &["x"][..]).collect::<Vec<_>>());
        let five = table(&["code"], &(0..5).map(|_| &["y"][..]).collect::<Vec<_>>());

        ds.append(&ten);
        ds.append(&five);
        assert_eq!(ds.len(), 15);
        assert_eq!(ds.table().get_value(9, "code").unwrap(), "x");
        assert_eq!(ds.table().get_value(10, "code").unwrap(), "y");

        ds.clear();
        assert!(ds.is_empty());
        assert!(ds.table().has_no_columns());
    }

    #[test]
    fn test_view_kind() {
        assert_eq!("Skills".parse::<ViewKind>(), Ok(ViewKind::Skills));
        assert!("other".parse::<ViewKind>().is_err());
        assert_eq!(
            ViewKind::Standards.export_file_name(),
            "ngss_standards_filtered.csv"
        );
        assert_eq!(
            ViewKind::Skills.sort_key("grade", SortOrder::Ascending).collation,
            Collation::GradeRank
        );
        assert_eq!(
            ViewKind::Standards.sort_key("grade", SortOrder::Ascending).collation,
            Collation::Lexical
        );
        assert_eq!(
            ViewKind::Skills.sort_key("code", SortOrder::Descending).collation,
            Collation::Lexical
        );
    }

    #[test]
    fn test_session_views_are_independent() {
        let mut session = Session::new();
        let files = [CsvFile::new("s.csv", "Skill,Grade\nModeling,\n")];

        let report = session.add_uploads(ViewKind::Skills, &files, "3");
        assert!(report.is_clean());
        assert_eq!(session.dataset(ViewKind::Skills).len(), 1);
        assert!(session.dataset(ViewKind::Standards).is_empty());

        let skills = session.dataset(ViewKind::Skills).table();
        assert_eq!(skills.column_names(), vec!["grade", "practice"]);
        assert_eq!(skills.get_value(0, "grade").unwrap(), "3");

        session.clear(ViewKind::Standards);
        assert_eq!(session.dataset(ViewKind::Skills).len(), 1);

        session.set_current(ViewKind::Skills);
        session.reset();
        assert!(session.dataset(ViewKind::Skills).is_empty());
        assert_eq!(session.current(), ViewKind::Standards);
    }

    #[test]
    fn test_session_skips_bad_uploads() {
        let mut session = Session::new();
        let files = [
            CsvFile::new("ok.csv", "code\nA\n"),
            CsvFile::new("broken.csv", "code,title\nA,B,C\n"),
        ];
        let report = session.add_uploads(ViewKind::Standards, &files, "");

        assert_eq!(report.warnings.len(), 1);
        assert_eq!(session.dataset(ViewKind::Standards).len(), 1);

        let only_bad = [CsvFile::new("broken.csv", "code,title\nA,B,C\n")];
        session.add_uploads(ViewKind::Standards, &only_bad, "");
        assert_eq!(session.dataset(ViewKind::Standards).len(), 1);
    }

    #[test]
    fn test_session_render_and_export() {
        let mut session = Session::new();
        let files = [CsvFile::new(
            "std.csv",
            "PE Code,Grade,Topic\nA,5,Waves\nB,4,Energy\nC,5,Energy\n",
        )];
        session.add_uploads(ViewKind::Standards, &files, "");

        assert_eq!(session.grade_options(ViewKind::Standards), vec!["4", "5"]);

        let spec = FilterSpec::new()
            .with_grades(["5"])
            .with_columns(["code", "domain"]);
        let out = session.render(ViewKind::Standards, &spec).unwrap();
        assert_eq!(out.column_names(), vec!["code", "domain"]);
        assert_eq!(out.len(), 2);

        let export = session.export(ViewKind::Standards, &spec).unwrap();
        assert_eq!(export.file_name, "ngss_standards_filtered.csv");
        assert_eq!(export.as_str(), "code,domain\nA,Waves\nC,Energy\n");

        let bad = FilterSpec::new().sorted_by(SortKey::ascending("nope"));
        assert!(matches!(
            session.export(ViewKind::Standards, &bad),
            Err(TableError::UnknownColumn(_))
        ));
    }

    #[test]
    fn test_session_custom_alias_table() {
        let aliases = AliasTable::from_json(
            r#"{"fields": [{"name": "code", "aliases": ["Standard"]}, {"name": "grade"}]}"#,
        )
        .unwrap();
        let mut session = Session::new().with_alias_table(aliases);
        session.add_uploads(
            ViewKind::Skills,
            &[CsvFile::new("c.csv", "Standard,Skill\nX,Y\n")],
            "",
        );
        let table = session.dataset(ViewKind::Skills).table();
        assert_eq!(table.column_names(), vec!["code", "grade", "skill"]);
    }
}
