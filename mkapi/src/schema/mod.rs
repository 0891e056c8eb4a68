//! Table and column metadata captured from a schema snapshot
//!
//! Two views of the same schema exist side by side:
//! - the **catalog**, read column-by-column from the live temporary schema,
//!   carrying nullability, key, default and collation details;
//! - the **DDL tables**, parsed from the pretend-mode migration dump by
//!   [`ddl::parse`], which is what documentation is rendered from.

pub mod ddl;
pub mod snapshot;

use crate::error::{MkApiError, Result};
use indexmap::IndexMap;
use std::collections::BTreeMap;

pub use ddl::parse;
pub use snapshot::{with_snapshot, MySqlSnapshotProvider, SnapshotProvider};

/// Index participation of a column, as reported by `information_schema.COLUMNS`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum KeyKind {
    /// Not part of any index
    #[default]
    None,
    /// Primary key
    Primary,
    /// Unique index
    Unique,
    /// Non-unique index
    Multiple,
}

impl KeyKind {
    /// Parse a `COLUMN_KEY` value
    #[must_use]
    pub fn from_column_key(value: &str) -> Self {
        match value {
            "PRI" => Self::Primary,
            "UNI" => Self::Unique,
            "MUL" => Self::Multiple,
            _ => Self::None,
        }
    }
}

/// One column of one table
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnMetadata {
    /// Column name
    pub name: String,
    /// Raw type token, e.g. `varchar(255)`
    pub raw_type: String,
    /// Whether the column accepts NULL
    pub nullable: bool,
    /// Index participation
    pub key: KeyKind,
    /// Default value literal
    pub default_value: Option<String>,
    /// Extra attributes (e.g. `auto_increment`)
    pub extra: String,
    /// Column collation
    pub collation: Option<String>,
    /// Column comment
    pub comment: Option<String>,
}

impl ColumnMetadata {
    /// Nullable, unkeyed column with no extra attributes
    #[must_use]
    pub fn new(name: impl Into<String>, raw_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            raw_type: raw_type.into(),
            nullable: true,
            key: KeyKind::None,
            default_value: None,
            extra: String::new(),
            collation: None,
            comment: None,
        }
    }

    /// Mark the column `NOT NULL`
    #[must_use]
    pub const fn not_null(mut self) -> Self {
        self.nullable = false;
        self
    }
}

/// A table with its columns in dump order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TableMetadata {
    /// Table name (plural, `snake_case`)
    pub name: String,
    columns: Vec<ColumnMetadata>,
}

impl TableMetadata {
    /// Empty table
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            columns: Vec::new(),
        }
    }

    /// Table built from an ordered column list
    #[must_use]
    pub fn with_columns(name: impl Into<String>, columns: Vec<ColumnMetadata>) -> Self {
        let mut table = Self::new(name);
        for column in columns {
            table.upsert(column);
        }
        table
    }

    /// Insert a column, or replace the one with the same name in place
    pub fn upsert(&mut self, column: ColumnMetadata) {
        match self.columns.iter_mut().find(|c| c.name == column.name) {
            Some(existing) => *existing = column,
            None => self.columns.push(column),
        }
    }

    /// Columns in dump order
    #[must_use]
    pub fn columns(&self) -> &[ColumnMetadata] {
        &self.columns
    }

    /// Look up a column by name
    #[must_use]
    pub fn column(&self, name: &str) -> Option<&ColumnMetadata> {
        self.columns.iter().find(|c| c.name == name)
    }
}

/// Everything captured from one temporary schema
#[derive(Debug, Clone, Default)]
pub struct SchemaSnapshot {
    /// Per-table column details read from the live schema
    pub catalog: BTreeMap<String, TableMetadata>,
    /// Pretend-mode migration output
    pub ddl: String,
}

impl SchemaSnapshot {
    /// Catalog entry for `table`
    ///
    /// # Errors
    ///
    /// Returns [`MkApiError::UnknownTable`] when the snapshot has no such table
    pub fn table(&self, table: &str) -> Result<&TableMetadata> {
        self.catalog
            .get(table)
            .ok_or_else(|| MkApiError::UnknownTable(table.to_string()))
    }

    /// Tables parsed from the DDL dump in migration order, reserved tables excluded
    #[must_use]
    pub fn ddl_tables(&self) -> IndexMap<String, TableMetadata> {
        ddl::parse(&self.ddl)
    }
}
