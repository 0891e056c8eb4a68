//! Per-table batch driver
//!
//! One batch takes a single schema snapshot and patches one model or
//! controller file per discovered table. Failures on one table are recorded
//! as diagnostics and never stop the remaining tables; only snapshot
//! lifecycle errors abort the batch.

use crate::config::MkApiConfig;
use crate::error::{MkApiError, Result};
use crate::patch::{apply_controller, apply_model_schema, PatchOptions, PatchOutcome, PatchTarget};
use crate::scaffold::{ArtifactRenderer, EntityNames, RuleSet, TemplateHelpers};
use crate::schema::{with_snapshot, SchemaSnapshot, SnapshotProvider, TableMetadata};
use chrono::NaiveDateTime;
use std::fmt;
use std::path::{Path, PathBuf};
use tracing::instrument;

/// Which tables a batch covers
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TableFilter {
    /// Every non-reserved table
    All,
    /// One table, by plural name
    Table(String),
}

impl TableFilter {
    /// Parse a command-line name
    ///
    /// `all` selects every table; anything else is lower-cased and pluralized,
    /// so `Post`, `post` and `posts` all select `posts`.
    #[must_use]
    pub fn parse(name: &str) -> Self {
        let name = name.trim().to_lowercase();
        if name == "all" {
            Self::All
        } else {
            Self::Table(TemplateHelpers::pluralize(&name))
        }
    }

    /// Whether `table` is selected
    #[must_use]
    pub fn matches(&self, table: &str) -> bool {
        match self {
            Self::All => true,
            Self::Table(name) => name == table,
        }
    }
}

impl fmt::Display for TableFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::All => f.write_str("all"),
            Self::Table(name) => f.write_str(name),
        }
    }
}

/// Maps a table to the files generated for it
#[derive(Debug, Clone)]
pub struct PathResolver {
    models_dir: PathBuf,
    controllers_dir: PathBuf,
}

impl PathResolver {
    /// Resolver rooted at explicit directories
    #[must_use]
    pub fn new(models_dir: impl Into<PathBuf>, controllers_dir: impl Into<PathBuf>) -> Self {
        Self {
            models_dir: models_dir.into(),
            controllers_dir: controllers_dir.into(),
        }
    }

    /// Resolver for the project described by `config`
    #[must_use]
    pub fn from_config(config: &MkApiConfig) -> Self {
        Self::new(config.models_path(), config.controllers_path())
    }

    /// Use `dir` for controllers instead of the configured directory
    #[must_use]
    pub fn with_controllers_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.controllers_dir = dir.into();
        self
    }

    /// `<models_dir>/<Entity>.php`
    #[must_use]
    pub fn model_path(&self, names: &EntityNames) -> PathBuf {
        self.models_dir.join(format!("{}.php", names.entity))
    }

    /// `<controllers_dir>/<Entity>Controller.php`
    #[must_use]
    pub fn controller_path(&self, names: &EntityNames) -> PathBuf {
        self.controllers_dir
            .join(format!("{}Controller.php", names.entity))
    }
}

/// Diagnostic severity
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    /// Progress
    Info,
    /// One table was not processed
    Warning,
    /// Something that needs attention beyond one table
    Error,
}

/// One human-readable progress line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    /// Severity
    pub severity: Severity,
    /// Table the line is about, if any
    pub table: Option<String>,
    /// Message text
    pub message: String,
}

/// What a batch did
#[derive(Debug, Clone, Default)]
pub struct BatchReport {
    diagnostics: Vec<Diagnostic>,
    /// Files written back
    pub written: usize,
    /// Files left alone because they were already annotated
    pub skipped: usize,
    /// Tables whose target file does not exist
    pub missing: usize,
    /// Tables that failed for any other reason
    pub failed: usize,
}

impl BatchReport {
    /// Diagnostics in the order they were produced
    #[must_use]
    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    /// Whether any warning or error was recorded
    #[must_use]
    pub fn has_problems(&self) -> bool {
        self.diagnostics
            .iter()
            .any(|d| d.severity >= Severity::Warning)
    }

    fn push(&mut self, severity: Severity, table: Option<&str>, message: impl Into<String>) {
        self.diagnostics.push(Diagnostic {
            severity,
            table: table.map(str::to_string),
            message: message.into(),
        });
    }

    fn record(&mut self, table: &str, path: &Path, result: Result<PatchOutcome>) {
        match result {
            Ok(PatchOutcome::Written { changed }) => {
                self.written += 1;
                let verb = if changed { "updated" } else { "rewritten unchanged" };
                self.push(
                    Severity::Info,
                    Some(table),
                    format!("Annotations {verb} in {}", path.display()),
                );
            }
            Ok(PatchOutcome::Skipped) => {
                self.skipped += 1;
                self.push(
                    Severity::Info,
                    Some(table),
                    format!("{} is already annotated", path.display()),
                );
            }
            Err(err @ MkApiError::TargetNotFound { .. }) => {
                self.missing += 1;
                tracing::warn!(table, error = %err, "Skipping table");
                self.push(Severity::Warning, Some(table), err.to_string());
            }
            Err(err) => {
                self.failed += 1;
                let severity = if err.is_fatal() {
                    Severity::Error
                } else {
                    Severity::Warning
                };
                tracing::warn!(table, error = %err, "Table failed");
                self.push(severity, Some(table), err.to_string());
            }
        }
    }
}

/// Which artifact a batch produces
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArtifactKind {
    /// Model `@OA\Schema` blocks
    Model,
    /// Controller operation docs, optionally with bodies
    Controller,
}

/// Everything a batch needs besides the snapshot
#[derive(Debug, Clone)]
pub struct BatchJob {
    /// Artifact to produce
    pub kind: ArtifactKind,
    /// Tables to cover
    pub filter: TableFilter,
    /// Patch mode flags
    pub options: PatchOptions,
    /// Target file locations
    pub paths: PathResolver,
}

/// Take a snapshot, run `job` against it and tear the snapshot down
///
/// Timestamp examples are fixed to `generated_at` for the whole batch.
///
/// # Errors
///
/// Returns an error only if templates fail to compile or the snapshot cannot
/// be provisioned or torn down. Per-table failures are in the report.
#[instrument(skip(provider, job), fields(kind = ?job.kind, filter = %job.filter))]
pub async fn run<P>(provider: &mut P, job: &BatchJob, generated_at: NaiveDateTime) -> Result<BatchReport>
where
    P: SnapshotProvider + ?Sized,
{
    let renderer = ArtifactRenderer::new(generated_at)?;
    with_snapshot(provider, |snapshot| match job.kind {
        ArtifactKind::Model => run_models(snapshot, &renderer, job),
        ArtifactKind::Controller => run_controllers(snapshot, &renderer, job),
    })
    .await
}

/// Patch one model file per selected table
#[must_use]
pub fn run_models(snapshot: &SchemaSnapshot, renderer: &ArtifactRenderer, job: &BatchJob) -> BatchReport {
    run_tables(snapshot, job, |table, report| {
        let names = EntityNames::from_table(&table.name);
        let path = job.paths.model_path(&names);
        let result = patch_model(renderer, table, &path, job.options);
        report.record(&table.name, &path, result);
    })
}

/// Patch one controller file per selected table
#[must_use]
pub fn run_controllers(
    snapshot: &SchemaSnapshot,
    renderer: &ArtifactRenderer,
    job: &BatchJob,
) -> BatchReport {
    run_tables(snapshot, job, |table, report| {
        let names = EntityNames::from_table(&table.name);
        let path = job.paths.controller_path(&names);
        let result = patch_controller(snapshot, renderer, table, &path, job.options);
        report.record(&table.name, &path, result);
    })
}

fn run_tables<F>(snapshot: &SchemaSnapshot, job: &BatchJob, mut each: F) -> BatchReport
where
    F: FnMut(&TableMetadata, &mut BatchReport),
{
    let mut report = BatchReport::default();
    let tables = snapshot.ddl_tables();

    let mut selected = 0;
    for table in tables.values().filter(|t| job.filter.matches(&t.name)) {
        selected += 1;
        each(table, &mut report);
    }

    if selected == 0 {
        report.push(
            Severity::Warning,
            None,
            format!("No table matches `{}`", job.filter),
        );
    }

    tracing::info!(
        tables = selected,
        written = report.written,
        skipped = report.skipped,
        missing = report.missing,
        failed = report.failed,
        "Batch finished"
    );
    report
}

#[instrument(skip(renderer, table), fields(table = %table.name))]
fn patch_model(
    renderer: &ArtifactRenderer,
    table: &TableMetadata,
    path: &Path,
    options: PatchOptions,
) -> Result<PatchOutcome> {
    let mut target = PatchTarget::load(path)?;
    let schema = renderer.render_model_schema(table)?;

    let outcome = apply_model_schema(&mut target, &schema, options)?;
    if matches!(outcome, PatchOutcome::Written { .. }) {
        target.save()?;
    }
    Ok(outcome)
}

#[instrument(skip(snapshot, renderer, table), fields(table = %table.name))]
fn patch_controller(
    snapshot: &SchemaSnapshot,
    renderer: &ArtifactRenderer,
    table: &TableMetadata,
    path: &Path,
    options: PatchOptions,
) -> Result<PatchOutcome> {
    let mut target = PatchTarget::load(path)?;

    let artifacts = if options.code {
        let rules = RuleSet::for_table(snapshot.table(&table.name)?);
        renderer.render_with_code(table, &rules)?
    } else {
        renderer.render(table)?
    };

    let outcome = apply_controller(&mut target, &artifacts, options)?;
    target.save()?;
    Ok(outcome)
}
