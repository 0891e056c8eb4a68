//! Parser for the pretend-mode migration dump
//!
//! The dump is trusted, locally generated text, so parsing is permissive:
//! anything that does not look like a `create table` statement is ignored and
//! malformed input simply yields fewer tables.
//!
//! # Example
//!
//! ```
//! let ddl = "  ⇂ create table `posts` (`id` int not null auto_increment primary key, \
//!            `title` varchar(120)) default character set utf8mb4";
//! let tables = mkapi::schema::parse(ddl);
//! let posts = &tables["posts"];
//! assert_eq!(posts.columns()[1].raw_type, "varchar(120)");
//! assert!(!posts.columns()[0].nullable);
//! ```

use super::{ColumnMetadata, KeyKind, TableMetadata};
use crate::conventions::is_reserved_table;
use once_cell::sync::Lazy;
use regex::Regex;
use indexmap::IndexMap;

/// Separator the migration runner prints in front of each pretended statement
pub const PRETEND_MARKER: &str = "  ⇂ ";

static CREATE_TABLE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)create table `([^`]+)` \((.*?)\) default character set").expect("Invalid regex")
});

// Type token is alphanumerics and parentheses only; `enum('a','b')` and
// `decimal(8, 2)` are cut short at the first other character.
static COLUMN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"`([^`]+)`\s+([a-zA-Z0-9()]+)([^,]*),?").expect("Invalid regex"));

static NOT_NULL: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)\bnot null\b").expect("Invalid regex"));

static PRIMARY_KEY: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\bprimary key\b").expect("Invalid regex"));

static AUTO_INCREMENT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\bauto_increment\b").expect("Invalid regex"));

static DEFAULT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\bdefault\s+('[^']*'|\S+)").expect("Invalid regex"));

/// Put every pretended statement on its own line
#[must_use]
pub fn normalize(raw: &str) -> String {
    raw.replace(PRETEND_MARKER, "\n")
}

/// Parse a raw dump into per-table column metadata, in dump order
///
/// Reserved tables are skipped. Input without any `create table` statement
/// produces an empty map.
#[must_use]
pub fn parse(raw: &str) -> IndexMap<String, TableMetadata> {
    let normalized = normalize(raw);
    let statements = normalized
        .lines()
        .filter(|line| line.to_ascii_lowercase().contains("create table"))
        .collect::<Vec<_>>()
        .join("\n");

    let mut tables = IndexMap::new();
    for captures in CREATE_TABLE.captures_iter(&statements) {
        let name = &captures[1];
        if is_reserved_table(name) {
            tracing::debug!(table = name, "Skipping reserved table");
            continue;
        }

        let table = parse_columns(name, &captures[2]);
        tracing::debug!(table = name, columns = table.columns().len(), "Parsed table");
        tables.insert(name.to_string(), table);
    }

    tables
}

fn parse_columns(table: &str, body: &str) -> TableMetadata {
    let mut metadata = TableMetadata::new(table);

    for captures in COLUMN.captures_iter(body) {
        let clause = &captures[3];
        let mut column = ColumnMetadata::new(&captures[1], &captures[2]);

        column.nullable = !NOT_NULL.is_match(clause);
        if PRIMARY_KEY.is_match(clause) {
            column.key = KeyKind::Primary;
        }
        if AUTO_INCREMENT.is_match(clause) {
            column.extra = "auto_increment".to_string();
        }
        column.default_value = DEFAULT
            .captures(clause)
            .map(|c| c[1].trim_matches('\'').to_string());

        metadata.upsert(column);
    }

    metadata
}

#[cfg(test)]
mod tests {
    use super::*;

    const LARAVEL_DUMP: &str = "  2014_10_12_000000_create_users_table ........ 3.21ms DONE\n  ⇂ create table `users` (`id` bigint unsigned not null auto_increment primary key, `name` varchar(255) not null, `email` varchar(255) not null, `email_verified_at` timestamp null, `remember_token` varchar(100) null, `created_at` timestamp null, `updated_at` timestamp null) default character set utf8mb4 collate 'utf8mb4_unicode_ci'  ⇂ alter table `users` add unique `users_email_unique`(`email`)\n  ⇂ create table `migrations` (`id` int unsigned not null auto_increment primary key, `migration` varchar(255) not null, `batch` int not null) default character set utf8mb4 collate 'utf8mb4_unicode_ci'\n";

    #[test]
    fn test_normalize_splits_statements() {
        let normalized = normalize("a  ⇂ b  ⇂ c");
        assert_eq!(normalized, "a\nb\nc");
    }

    #[test]
    fn test_parse_laravel_dump() {
        let tables = parse(LARAVEL_DUMP);
        assert_eq!(tables.len(), 1);

        let users = &tables["users"];
        let names: Vec<_> = users.columns().iter().map(|c| c.name.as_str()).collect();
        assert_eq!(
            names,
            [
                "id",
                "name",
                "email",
                "email_verified_at",
                "remember_token",
                "created_at",
                "updated_at"
            ]
        );

        let id = users.column("id").unwrap();
        assert_eq!(id.raw_type, "bigint");
        assert_eq!(id.key, KeyKind::Primary);
        assert_eq!(id.extra, "auto_increment");
        assert!(!id.nullable);

        let token = users.column("remember_token").unwrap();
        assert_eq!(token.raw_type, "varchar(100)");
        assert!(token.nullable);
    }

    #[test]
    fn test_tables_keep_dump_order() {
        let dump = "  ⇂ create table `zones` (`id` int) default character set utf8mb4  ⇂ create table `accounts` (`id` int) default character set utf8mb4  ⇂ create table `invoices` (`id` int) default character set utf8mb4";
        let names: Vec<_> = parse(dump).keys().cloned().collect();
        assert_eq!(names, ["zones", "accounts", "invoices"]);
    }

    #[test]
    fn test_reserved_table_skipped() {
        assert!(!parse(LARAVEL_DUMP).contains_key("migrations"));
    }

    #[test]
    fn test_marker_is_case_insensitive() {
        let tables = parse("CREATE TABLE `tags` (`label` varchar(20)) DEFAULT CHARACTER SET utf8mb4");
        assert_eq!(tables["tags"].columns()[0].raw_type, "varchar(20)");
    }

    #[test]
    fn test_no_create_table_yields_empty() {
        assert!(parse("").is_empty());
        assert!(parse("alter table `users` add index").is_empty());
        assert!(parse("create table `broken` (`id` int").is_empty());
    }

    #[test]
    fn test_table_without_columns() {
        let tables = parse("create table `empty` () default character set utf8mb4");
        assert!(tables["empty"].columns().is_empty());
    }

    #[test]
    fn test_default_value_captured() {
        let tables = parse(
            "create table `orders` (`state` tinyint not null default '1', `note` text null) default character set utf8mb4",
        );
        let state = tables["orders"].column("state").unwrap();
        assert_eq!(state.default_value.as_deref(), Some("1"));
        assert!(!state.nullable);
        assert_eq!(tables["orders"].column("note").unwrap().default_value, None);
    }

    #[test]
    fn test_type_token_limitation_is_preserved() {
        let tables = parse(
            "create table `prices` (`amount` decimal(8, 2) not null, `kind` enum('a', 'b') not null) default character set utf8mb4",
        );
        let prices = &tables["prices"];
        assert_eq!(prices.column("amount").unwrap().raw_type, "decimal(8");
        assert_eq!(prices.column("kind").unwrap().raw_type, "enum(");
    }
}
