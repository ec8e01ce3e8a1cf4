/// Column canonicalization against a fixed alias vocabulary.
///
/// An [`AliasTable`] lists canonical fields in declaration order, each with
/// the raw header spellings that refer to it. [`canonicalize`] renames the
/// columns of an ingested table to canonical names, keeps unknown columns
/// under their normalized header, guarantees a `grade` column and reorders
/// the result so canonical fields come first.
///
/// # Examples
///
/// ```
/// use ngss_toolkit::{canonicalize, AliasTable, Column, Table};
///
/// let raw = Table::from_columns("upload", vec![
///     Column::from_values("PE Code", vec!["MS-ESS1-1".to_string()]),
///     Column::from_values("Performance Expectation", vec!["Develop a model".to_string()]),
/// ]).unwrap();
///
/// let table = canonicalize(&raw, AliasTable::standards()).unwrap();
/// assert_eq!(table.column_names(), vec!["grade", "code", "title"]);
/// ```

use crate::column::Column;
use crate::error::{TableError, TableResult};
use crate::header::normalize_header;
use crate::ingest::unnamed;
use crate::table::Table;
use once_cell::sync::Lazy;
use serde::Deserialize;
use std::collections::HashMap;

pub const GRADE: &str = "grade";
pub const CODE: &str = "code";
pub const TITLE: &str = "title";
pub const DOMAIN: &str = "domain";
pub const DCI: &str = "dci";
pub const SEP: &str = "sep";
pub const CCC: &str = "ccc";
pub const NOTES: &str = "notes";
pub const PRACTICE: &str = "practice";

/// Canonical fields of the Standards vocabulary, in declaration order.
const STANDARDS_FIELDS: &[(&str, &[&str])] = &[
    (CODE, &["code", "ngss", "id", "pe_code", "pe"]),
    (TITLE, &["title", "statement", "performance_expectation", "pe_statement"]),
    (DOMAIN, &["domain", "topic", "disciplinary_core_idea", "dci_domain"]),
    (DCI, &["dci", "disciplinary_core_idea", "core_idea"]),
    (SEP, &["sep", "science_and_engineering_practices", "practice"]),
    (CCC, &["ccc", "crosscutting_concepts", "crosscutting"]),
    (NOTES, &["notes", "description", "comment"]),
    (GRADE, &["grade", "gr", "g"]),
];

const STANDARDS_ORDER: &[&str] = &[GRADE, CODE, TITLE, DOMAIN, DCI, SEP, CCC, NOTES];

/// Skills vocabulary. `practice` is a field of its own here, so `sep` gives
/// up the bare `practice` spelling.
const SKILLS_FIELDS: &[(&str, &[&str])] = &[
    (CODE, &["code", "ngss", "id", "pe_code", "pe"]),
    (TITLE, &["title", "statement", "performance_expectation", "pe_statement"]),
    (DOMAIN, &["domain", "topic", "disciplinary_core_idea", "dci_domain"]),
    (DCI, &["dci", "disciplinary_core_idea", "core_idea"]),
    (SEP, &["sep", "science_and_engineering_practices"]),
    (CCC, &["ccc", "crosscutting_concepts", "crosscutting"]),
    (NOTES, &["notes", "description", "comment"]),
    (GRADE, &["grade", "gr", "g"]),
    (PRACTICE, &["practice", "skill", "skills_practice", "practice_name"]),
    ("a0", &["a0", "activity_0", "level_0"]),
    ("a1", &["a1", "activity_1", "level_1"]),
    ("a2", &["a2", "activity_2", "level_2"]),
    ("a3", &["a3", "activity_3", "level_3"]),
    ("a4", &["a4", "activity_4", "level_4"]),
    ("a5", &["a5", "activity_5", "level_5"]),
    ("a6", &["a6", "activity_6", "level_6"]),
];

const SKILLS_ORDER: &[&str] = &[
    GRADE, CODE, TITLE, PRACTICE, DOMAIN, DCI, SEP, CCC, "a0", "a1", "a2", "a3", "a4", "a5",
    "a6", NOTES,
];

static STANDARDS: Lazy<AliasTable> =
    Lazy::new(|| AliasTable::from_static(STANDARDS_FIELDS, STANDARDS_ORDER));

static SKILLS: Lazy<AliasTable> =
    Lazy::new(|| AliasTable::from_static(SKILLS_FIELDS, SKILLS_ORDER));

/// One canonical field and its recognized spellings (stored normalized).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldAliases {
    pub name: String,
    pub aliases: Vec<String>,
}

/// Ordered mapping from canonical field to header aliases.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AliasTable {
    fields: Vec<FieldAliases>,
    preferred_order: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct AliasTableConfig {
    fields: Vec<FieldConfig>,
    #[serde(default)]
    order: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct FieldConfig {
    name: String,
    #[serde(default)]
    aliases: Vec<String>,
}

impl AliasTable {
    /// Build an alias table.
    ///
    /// `fields` are in declaration order, which decides ties when a header
    /// matches more than one field. `order` is the preferred output column
    /// order; when empty, declaration order is used. Every field name is also
    /// an alias of itself.
    pub fn new(fields: Vec<(String, Vec<String>)>, order: Vec<String>) -> TableResult<Self> {
        let mut declared: Vec<FieldAliases> = Vec::with_capacity(fields.len());

        for (name, aliases) in fields {
            if name.is_empty() || normalize_header(&name) != name {
                return Err(TableError::AliasConfig(format!(
                    "field name '{}' is not a normalized header",
                    name
                )));
            }
            if declared.iter().any(|f| f.name == name) {
                return Err(TableError::AliasConfig(format!(
                    "field '{}' declared twice",
                    name
                )));
            }
            declared.push(Self::field(&name, aliases.iter().map(String::as_str)));
        }

        let preferred_order = if order.is_empty() {
            declared.iter().map(|f| f.name.clone()).collect()
        } else {
            for (i, name) in order.iter().enumerate() {
                if !declared.iter().any(|f| &f.name == name) {
                    return Err(TableError::AliasConfig(format!(
                        "order lists undeclared field '{}'",
                        name
                    )));
                }
                if order[..i].contains(name) {
                    return Err(TableError::AliasConfig(format!(
                        "order lists field '{}' twice",
                        name
                    )));
                }
            }
            order
        };

        Ok(AliasTable {
            fields: declared,
            preferred_order,
        })
    }

    /// Parse an alias table from JSON:
    /// `{"fields": [{"name": "code", "aliases": ["pe_code"]}], "order": ["code"]}`.
    pub fn from_json(json: &str) -> TableResult<Self> {
        let config: AliasTableConfig =
            serde_json::from_str(json).map_err(|e| TableError::AliasConfig(e.to_string()))?;

        Self::new(
            config
                .fields
                .into_iter()
                .map(|f| (f.name, f.aliases))
                .collect(),
            config.order,
        )
    }

    /// The Standards vocabulary: `grade, code, title, domain, dci, sep, ccc, notes`.
    pub fn standards() -> &'static AliasTable {
        &STANDARDS
    }

    /// The Skills vocabulary: the Standards fields plus `practice` and `a0`..`a6`.
    pub fn skills() -> &'static AliasTable {
        &SKILLS
    }

    fn from_static(fields: &[(&str, &[&str])], order: &[&str]) -> Self {
        AliasTable {
            fields: fields
                .iter()
                .map(|(name, aliases)| Self::field(name, aliases.iter().copied()))
                .collect(),
            preferred_order: order.iter().map(|s| s.to_string()).collect(),
        }
    }

    fn field<'a>(name: &'a str, aliases: impl Iterator<Item = &'a str>) -> FieldAliases {
        let mut normalized: Vec<String> = Vec::new();
        for alias in aliases.chain(std::iter::once(name)) {
            let alias = normalize_header(alias);
            if !alias.is_empty() && !normalized.contains(&alias) {
                normalized.push(alias);
            }
        }
        FieldAliases {
            name: name.to_string(),
            aliases: normalized,
        }
    }

    pub fn fields(&self) -> &[FieldAliases] {
        &self.fields
    }

    pub fn preferred_order(&self) -> &[String] {
        &self.preferred_order
    }

    pub fn is_canonical(&self, name: &str) -> bool {
        self.fields.iter().any(|f| f.name == name)
    }

    /// Returns the canonical field for an already-normalized header.
    ///
    /// The first declared field whose aliases contain the header wins.
    pub fn resolve(&self, normalized: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|f| f.aliases.iter().any(|a| a == normalized))
            .map(|f| f.name.as_str())
    }
}

/// Rename, complete and reorder the columns of `table`.
///
/// Fails with [`TableError::DuplicateColumn`] when two source columns resolve
/// to the same name, instead of letting one silently replace the other.
pub fn canonicalize(table: &Table, aliases: &AliasTable) -> TableResult<Table> {
    let mut renamed: Vec<Column> = Vec::with_capacity(table.num_columns() + 1);
    let mut sources: HashMap<String, Vec<String>> = HashMap::new();

    for (i, col) in table.columns().iter().enumerate() {
        let mut normalized = normalize_header(col.name());
        if normalized.is_empty() {
            normalized = normalize_header(&unnamed(i));
        }
        let name = aliases
            .resolve(&normalized)
            .map(str::to_string)
            .unwrap_or(normalized);

        sources
            .entry(name.clone())
            .or_default()
            .push(col.name().to_string());
        renamed.push(col.renamed(name));
    }

    if let Some(dup) = renamed.iter().find(|c| sources[c.name()].len() > 1) {
        return Err(TableError::DuplicateColumn {
            column: dup.name().to_string(),
            sources: sources[dup.name()].clone(),
        });
    }

    if !renamed.iter().any(|c| c.name() == GRADE) {
        renamed.push(Column::filled(GRADE, "", table.len()));
    }

    let mut ordered: Vec<Column> = Vec::with_capacity(renamed.len());
    for name in aliases.preferred_order() {
        if let Some(pos) = renamed.iter().position(|c| c.name() == name) {
            ordered.push(renamed.remove(pos));
        }
    }
    ordered.extend(renamed);

    Table::from_columns(table.name(), ordered)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw_table(headers: &[&str], rows: &[&[&str]]) -> Table {
        let mut table = Table::with_columns("raw", headers);
        for row in rows {
            table
                .append_row(row.iter().map(|s| s.to_string()).collect())
                .unwrap();
        }
        table
    }

    #[test]
    fn test_canonicalize_maps_aliases() {
        let raw = raw_table(
            &["Notes", "PE Code", "Performance Expectation", "Grade"],
            &[&["n1", "MS-ESS1-1", "Students who demonstrate...", ""]],
        );
        let table = canonicalize(&raw, AliasTable::standards()).unwrap();

        assert_eq!(table.column_names(), vec!["grade", "code", "title", "notes"]);
        assert_eq!(table.get_value(0, "code").unwrap(), "MS-ESS1-1");
        assert_eq!(table.get_value(0, "notes").unwrap(), "n1");
    }

    #[test]
    fn test_canonicalize_keeps_unmapped_columns_in_order() {
        let raw = raw_table(
            &["Extra B", "Title", "Extra A"],
            &[&["b", "t", "a"]],
        );
        let table = canonicalize(&raw, AliasTable::standards()).unwrap();

        assert_eq!(table.column_names(), vec!["grade", "title", "extra_b", "extra_a"]);
        assert_eq!(table.get_value(0, "extra_a").unwrap(), "a");
    }

    #[test]
    fn test_canonicalize_names_symbol_only_headers() {
        let raw = raw_table(&["Code", "#", "?"], &[&["A", "1", "2"]]);
        let table = canonicalize(&raw, AliasTable::standards()).unwrap();
        assert_eq!(table.column_names(), vec!["grade", "code", "unnamed_1", "unnamed_2"]);

        let again = canonicalize(&table, AliasTable::standards()).unwrap();
        assert_eq!(again.columns(), table.columns());
    }

    #[test]
    fn test_canonicalize_synthesizes_grade() {
        let raw = raw_table(&["code"], &[&["A"], &["B"]]);
        let table = canonicalize(&raw, AliasTable::standards()).unwrap();

        assert_eq!(table.column_names(), vec!["grade", "code"]);
        assert_eq!(table.column("grade").unwrap().values(), &["", ""]);
    }

    #[test]
    fn test_canonicalize_does_not_mutate_input() {
        let raw = raw_table(&["PE Code"], &[&["A"]]);
        let before = raw.clone();
        let _ = canonicalize(&raw, AliasTable::standards()).unwrap();
        assert_eq!(raw, before);
    }

    #[test]
    fn test_earlier_declared_field_wins() {
        // `disciplinary_core_idea` is an alias of both `domain` and `dci`.
        let orders: [&[&str]; 2] = [
            &["Disciplinary Core Idea", "Code"],
            &["Code", "Disciplinary Core Idea"],
        ];
        for headers in orders {
            let raw = raw_table(headers, &[&["x", "y"]]);
            let table = canonicalize(&raw, AliasTable::standards()).unwrap();
            assert!(table.has_column("domain"));
            assert!(!table.has_column("dci"));
        }
    }

    #[test]
    fn test_duplicate_resolution_is_rejected() {
        let raw = raw_table(&["PE Code", "NGSS"], &[&["a", "b"]]);
        let err = canonicalize(&raw, AliasTable::standards()).unwrap_err();
        match err {
            TableError::DuplicateColumn { column, sources } => {
                assert_eq!(column, "code");
                assert_eq!(sources, vec!["PE Code".to_string(), "NGSS".to_string()]);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_duplicate_unmapped_headers_are_rejected() {
        let raw = raw_table(&["Foo Bar", "foo-bar"], &[&["a", "b"]]);
        assert!(matches!(
            canonicalize(&raw, AliasTable::standards()),
            Err(TableError::DuplicateColumn { .. })
        ));
    }

    #[test]
    fn test_skills_vocabulary() {
        let raw = raw_table(
            &["A3", "Practice", "SEP", "Activity 0", "Code"],
            &[&["x", "p", "s", "y", "c"]],
        );
        let table = canonicalize(&raw, AliasTable::skills()).unwrap();

        assert_eq!(
            table.column_names(),
            vec!["grade", "code", "practice", "sep", "a0", "a3"]
        );
        assert_eq!(table.get_value(0, "practice").unwrap(), "p");
        assert_eq!(table.get_value(0, "sep").unwrap(), "s");

        // The standards vocabulary files the same header under `sep`.
        let raw = raw_table(&["Practice"], &[&["p"]]);
        let table = canonicalize(&raw, AliasTable::standards()).unwrap();
        assert_eq!(table.column_names(), vec!["grade", "sep"]);
    }

    #[test]
    fn test_canonical_names_resolve_to_themselves() {
        for aliases in [AliasTable::standards(), AliasTable::skills()] {
            for field in aliases.fields() {
                assert_eq!(aliases.resolve(&field.name), Some(field.name.as_str()));
            }
            for name in aliases.preferred_order() {
                assert!(aliases.is_canonical(name));
            }
        }
    }

    #[test]
    fn test_alias_table_from_json() {
        let json = r#"{
            "fields": [
                {"name": "code", "aliases": ["Standard ID", "pe"]},
                {"name": "grade", "aliases": ["Grade Level"]}
            ],
            "order": ["grade", "code"]
        }"#;
        let aliases = AliasTable::from_json(json).unwrap();

        assert_eq!(aliases.resolve("standard_id"), Some("code"));
        assert_eq!(aliases.resolve("grade_level"), Some("grade"));
        assert_eq!(aliases.resolve("code"), Some("code"));
        assert_eq!(aliases.preferred_order(), &["grade", "code"]);
    }

    #[test]
    fn test_alias_table_rejects_bad_config() {
        assert!(AliasTable::from_json("not json").is_err());
        assert!(AliasTable::from_json(r#"{"fields": [{"name": "Code"}]}"#).is_err());
        assert!(AliasTable::from_json(
            r#"{"fields": [{"name": "code"}], "order": ["title"]}"#
        )
        .is_err());
        assert!(AliasTable::from_json(
            r#"{"fields": [{"name": "code"}, {"name": "code"}]}"#
        )
        .is_err());
    }
}
