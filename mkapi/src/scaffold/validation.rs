//! Request validation rules derived from column metadata
//!
//! Each rule is a pipe-joined token list in the order: presence, type class,
//! naming conventions. An empty rule is valid and means "no constraints".

use crate::conventions::VALIDATION_EXCLUSIONS;
use crate::schema::{ColumnMetadata, TableMetadata};
use once_cell::sync::Lazy;
use regex::Regex;
use std::fmt;

static CHARACTER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)varchar|text|char").expect("Invalid regex"));

static DECLARED_LENGTH: Lazy<Regex> = Lazy::new(|| Regex::new(r"\((\d+)\)").expect("Invalid regex"));

static INTEGER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)int|bigint|tinyint|smallint").expect("Invalid regex"));

static FRACTIONAL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)decimal|float|double").expect("Invalid regex"));

static TEMPORAL: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)date|timestamp").expect("Invalid regex"));

/// Derive the rule for one column of `table`
///
/// # Examples
///
/// ```
/// # use mkapi::schema::ColumnMetadata;
/// # use mkapi::scaffold::validation::synthesize;
/// let email = ColumnMetadata::new("email", "varchar(255)").not_null();
/// assert_eq!(synthesize(&email, "users"), "required|string|max:255|email|unique:users");
/// ```
#[must_use]
pub fn synthesize(column: &ColumnMetadata, table: &str) -> String {
    let mut tokens: Vec<String> = Vec::new();

    if !column.nullable {
        tokens.push("required".to_string());
    }

    let raw_type = column.raw_type.as_str();
    if CHARACTER.is_match(raw_type) {
        tokens.push("string".to_string());
        if let Some(length) = DECLARED_LENGTH.captures(raw_type) {
            tokens.push(format!("max:{}", &length[1]));
        }
    } else if INTEGER.is_match(raw_type) || FRACTIONAL.is_match(raw_type) {
        tokens.push("numeric".to_string());
    } else if TEMPORAL.is_match(raw_type) {
        tokens.push("date".to_string());
    }

    if column.name == "email" {
        tokens.push("email".to_string());
        tokens.push(format!("unique:{table}"));
    }

    tokens.join("|")
}

/// Ordered column-to-rule map for one table
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RuleSet {
    rules: Vec<(String, String)>,
}

impl RuleSet {
    /// Rules for every column of `table` outside the exclusion set, in column order
    #[must_use]
    pub fn for_table(table: &TableMetadata) -> Self {
        let rules = table
            .columns()
            .iter()
            .filter(|column| !VALIDATION_EXCLUSIONS.contains(&column.name.as_str()))
            .map(|column| (column.name.clone(), synthesize(column, &table.name)))
            .collect();

        Self { rules }
    }

    /// Rule for `column`, if it has one
    #[must_use]
    pub fn get(&self, column: &str) -> Option<&str> {
        self.rules
            .iter()
            .find(|(name, _)| name == column)
            .map(|(_, rule)| rule.as_str())
    }

    /// Number of columns with a rule
    #[must_use]
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// Whether no column has a rule
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

/// Renders as the PHP short-array literal passed to `$request->validate()`
impl fmt::Display for RuleSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "[")?;
        for (column, rule) in &self.rules {
            writeln!(f, "            '{}' => '{}',", php_quote(column), php_quote(rule))?;
        }
        write!(f, "        ]")
    }
}

fn php_quote(value: &str) -> String {
    value.replace('\\', "\\\\").replace('\'', "\\'")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn column(name: &str, raw_type: &str) -> ColumnMetadata {
        ColumnMetadata::new(name, raw_type)
    }

    #[test]
    fn test_character_types() {
        assert_eq!(synthesize(&column("title", "varchar(120)"), "posts"), "string|max:120");
        assert_eq!(synthesize(&column("body", "text"), "posts"), "string");
        assert_eq!(synthesize(&column("code", "char(2)"), "posts"), "string|max:2");
    }

    #[test]
    fn test_required_prefix() {
        let title = column("title", "varchar(120)").not_null();
        assert_eq!(synthesize(&title, "posts"), "required|string|max:120");
    }

    #[test]
    fn test_numeric_and_temporal_types() {
        assert_eq!(synthesize(&column("views", "bigint unsigned"), "posts"), "numeric");
        assert_eq!(synthesize(&column("price", "decimal(8,2)"), "posts"), "numeric");
        assert_eq!(synthesize(&column("published", "datetime"), "posts"), "date");
        assert_eq!(synthesize(&column("seen_at", "timestamp"), "posts"), "date");
    }

    #[test]
    fn test_unconstrained_column_yields_empty_rule() {
        assert_eq!(synthesize(&column("payload", "json"), "posts"), "");
        assert_eq!(synthesize(&column("flag", "boolean"), "posts"), "");
    }

    #[test]
    fn test_email_regardless_of_type() {
        assert_eq!(synthesize(&column("email", "json"), "users"), "email|unique:users");
        assert_eq!(
            synthesize(&column("email", "varchar(255)"), "users"),
            "string|max:255|email|unique:users"
        );
    }

    #[test]
    fn test_rule_set_skips_excluded_columns() {
        let table = TableMetadata::with_columns(
            "posts",
            vec![
                column("id", "bigint unsigned").not_null(),
                column("title", "varchar(120)").not_null(),
                column("created_at", "timestamp"),
                column("updated_at", "timestamp"),
                column("deleted_at", "timestamp"),
            ],
        );
        let rules = RuleSet::for_table(&table);

        assert_eq!(rules.len(), 1);
        assert_eq!(rules.get("title"), Some("required|string|max:120"));
        assert_eq!(rules.get("id"), None);
    }

    #[test]
    fn test_rule_set_rendering() {
        let table = TableMetadata::with_columns(
            "posts",
            vec![column("title", "varchar(120)"), column("body", "text").not_null()],
        );

        assert_eq!(
            RuleSet::for_table(&table).to_string(),
            "[\n            'title' => 'string|max:120',\n            'body' => 'required|string',\n        ]"
        );
    }

    #[test]
    fn test_empty_rule_set_rendering() {
        let table = TableMetadata::with_columns("tags", vec![column("id", "int")]);
        let rules = RuleSet::for_table(&table);

        assert!(rules.is_empty());
        assert_eq!(rules.to_string(), "[\n        ]");
    }

    #[test]
    fn test_quotes_are_escaped() {
        assert_eq!(php_quote(r"it's\here"), r"it\'s\\here");
    }
}
