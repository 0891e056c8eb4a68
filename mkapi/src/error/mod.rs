//! Error types and error handling

use std::path::PathBuf;
use thiserror::Error;

/// Engine error type
#[derive(Debug, Error)]
pub enum MkApiError {
    /// The temporary schema could not be created, replayed or destroyed
    #[error("Provisioning error: {0}")]
    Provisioning(String),

    /// A generated artifact has no file to be spliced into
    #[error("Target file not found: {}", path.display())]
    TargetNotFound {
        /// Resolved path that does not exist
        path: PathBuf,
    },

    /// A required insertion point is missing from the target file
    #[error("No {anchor} found in {}", path.display())]
    AnchorNotFound {
        /// Human-readable anchor name
        anchor: String,
        /// File that was searched
        path: PathBuf,
    },

    /// Metadata was requested for a table the snapshot does not contain
    #[error("Table '{0}' does not exist in the schema snapshot")]
    UnknownTable(String),

    /// Template registration or rendering failed
    #[error("Template error: {0}")]
    Template(String),

    /// An anchor pattern could not be compiled
    #[error("Anchor error: {0}")]
    Anchor(#[from] regex::Error),

    /// Database error
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(#[from] Box<figment::Error>),

    /// Filesystem error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl MkApiError {
    /// Whether this error must abort the whole batch
    ///
    /// Snapshot lifecycle and configuration failures are fatal. Everything
    /// else is scoped to a single table and is reported as a warning.
    #[must_use]
    pub const fn is_fatal(&self) -> bool {
        matches!(
            self,
            Self::Provisioning(_) | Self::Database(_) | Self::Config(_)
        )
    }
}

impl From<handlebars::TemplateError> for MkApiError {
    fn from(err: handlebars::TemplateError) -> Self {
        Self::Template(err.to_string())
    }
}

impl From<handlebars::RenderError> for MkApiError {
    fn from(err: handlebars::RenderError) -> Self {
        Self::Template(err.to_string())
    }
}

impl From<figment::Error> for MkApiError {
    fn from(err: figment::Error) -> Self {
        Self::Config(Box::new(err))
    }
}

/// Result alias used throughout the engine
pub type Result<T> = std::result::Result<T, MkApiError>;
