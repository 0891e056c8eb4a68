//! mkapi: schema-driven OpenAPI annotations and CRUD scaffolding for Laravel
//!
//! The engine replays a project's migrations into a disposable MySQL schema,
//! reads the resulting table definitions, and splices generated text into the
//! project's existing model and controller files:
//! - `@OA\Schema` blocks above model classes
//! - `@OA\Get`/`Post`/`Put`/`Delete` doc comments on the five resource methods
//! - optionally, CRUD bodies with request validation derived from the columns
//!
//! # Pipeline
//!
//! ```text
//! SnapshotProvider -> ddl::parse -> ArtifactRenderer -> patch -> file
//!                                     |
//!                        DocType / ExampleValue / RuleSet
//! ```
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use mkapi::batch::{self, ArtifactKind, BatchJob, PathResolver, TableFilter};
//! use mkapi::patch::PatchOptions;
//! use mkapi::schema::MySqlSnapshotProvider;
//! use mkapi::MkApiConfig;
//!
//! # async fn example() -> mkapi::Result<()> {
//! let config = MkApiConfig::load()?;
//! let mut provider = MySqlSnapshotProvider::new(&config);
//! let job = BatchJob {
//!     kind: ArtifactKind::Model,
//!     filter: TableFilter::parse("all"),
//!     options: PatchOptions::default(),
//!     paths: PathResolver::from_config(&config),
//! };
//!
//! let now = chrono::Local::now().naive_local();
//! let report = batch::run(&mut provider, &job, now).await?;
//! println!("{} files written", report.written);
//! # Ok(())
//! # }
//! ```

pub mod batch;
pub mod config;
pub mod conventions;
pub mod error;
pub mod observability;
pub mod patch;
pub mod scaffold;
pub mod schema;

pub use config::MkApiConfig;
pub use error::{MkApiError, Result};

pub mod prelude {
    //! Convenience re-exports for common types and traits
    //!
    //! ```rust
    //! use mkapi::prelude::*;
    //! ```

    pub use crate::batch::{
        ArtifactKind, BatchJob, BatchReport, Diagnostic, PathResolver, Severity, TableFilter,
    };
    pub use crate::config::MkApiConfig;
    pub use crate::error::{MkApiError, Result};
    pub use crate::patch::{PatchOptions, PatchOutcome, PatchTarget};
    pub use crate::scaffold::{ArtifactRenderer, ArtifactSet, CrudOperation, EntityNames, RuleSet};
    pub use crate::schema::{
        with_snapshot, ColumnMetadata, MySqlSnapshotProvider, SchemaSnapshot, SnapshotProvider,
        TableMetadata,
    };
}
