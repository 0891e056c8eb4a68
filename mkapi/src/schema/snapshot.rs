//! Disposable schema snapshots
//!
//! A snapshot is taken by creating a uniquely named temporary database,
//! replaying the project's migrations into it, reading its column catalog and
//! capturing the pretend-mode DDL. The temporary database must not outlive the
//! command, so callers go through [`with_snapshot`], which tears it down on
//! every exit path.

use super::{ColumnMetadata, KeyKind, SchemaSnapshot, TableMetadata};
use crate::config::{ArtisanSettings, DatabaseSettings, MkApiConfig};
use crate::error::{MkApiError, Result};
use async_trait::async_trait;
use sqlx::mysql::{MySqlConnectOptions, MySqlPool, MySqlPoolOptions};
use sqlx::Row;
use std::collections::BTreeMap;
use std::panic::{self, AssertUnwindSafe};
use std::path::PathBuf;
use tokio::process::Command;
use tracing::instrument;

// Text columns are cast because some servers report information_schema
// strings as VARBINARY, which does not decode into `String`.
const CATALOG_QUERY: &str = "SELECT CAST(TABLE_NAME AS CHAR(255)) AS table_name, \
     CAST(COLUMN_NAME AS CHAR(255)) AS column_name, \
     CAST(COLUMN_TYPE AS CHAR(255)) AS column_type, \
     CAST(IS_NULLABLE AS CHAR(3)) AS is_nullable, \
     CAST(COLUMN_KEY AS CHAR(3)) AS column_key, \
     CAST(COLUMN_DEFAULT AS CHAR(1024)) AS column_default, \
     CAST(EXTRA AS CHAR(255)) AS extra, \
     CAST(COLLATION_NAME AS CHAR(255)) AS collation_name, \
     CAST(COLUMN_COMMENT AS CHAR(1024)) AS column_comment \
     FROM information_schema.COLUMNS WHERE TABLE_SCHEMA = ? \
     ORDER BY TABLE_NAME, ORDINAL_POSITION";

/// Source of schema snapshots
///
/// `teardown` must be safe to call after a failed or partial `provision`.
#[async_trait]
pub trait SnapshotProvider: Send {
    /// Create the temporary schema and capture its catalog and DDL
    async fn provision(&mut self) -> Result<SchemaSnapshot>;

    /// Remove whatever `provision` created
    async fn teardown(&mut self) -> Result<()>;
}

/// Run `body` against a fresh snapshot, always tearing the snapshot down
///
/// A panic in `body` is caught long enough to tear down, then resumed.
///
/// # Errors
///
/// Returns the provisioning error if the snapshot cannot be taken, or the
/// teardown error if cleanup fails. A provisioning error wins over a teardown
/// error; the latter is still logged.
pub async fn with_snapshot<P, F, T>(provider: &mut P, body: F) -> Result<T>
where
    P: SnapshotProvider + ?Sized,
    F: FnOnce(&SchemaSnapshot) -> T + Send,
{
    let outcome = provider
        .provision()
        .await
        .map(|snapshot| panic::catch_unwind(AssertUnwindSafe(|| body(&snapshot))));
    let released = provider.teardown().await;

    let outcome = match outcome {
        Ok(Ok(value)) => Ok(value),
        Ok(Err(payload)) => {
            if let Err(err) = &released {
                tracing::error!(error = %err, "Snapshot teardown failed after panic");
            }
            panic::resume_unwind(payload);
        }
        Err(err) => Err(err),
    };

    match (outcome, released) {
        (Ok(value), Ok(())) => Ok(value),
        (Ok(_), Err(err)) | (Err(err), Ok(())) => Err(err),
        (Err(err), Err(teardown_err)) => {
            tracing::error!(error = %teardown_err, "Snapshot teardown failed after provisioning error");
            Err(err)
        }
    }
}

/// Snapshot provider backed by a MySQL server and `php artisan migrate`
pub struct MySqlSnapshotProvider {
    database: DatabaseSettings,
    artisan: ArtisanSettings,
    project_root: PathBuf,
    admin: Option<MySqlPool>,
    temp_schema: Option<String>,
}

impl MySqlSnapshotProvider {
    /// Provider for the server and project described by `config`
    #[must_use]
    pub fn new(config: &MkApiConfig) -> Self {
        Self {
            database: config.database.clone(),
            artisan: config.artisan.clone(),
            project_root: config.project.root.clone(),
            admin: None,
            temp_schema: None,
        }
    }

    /// Name of the temporary schema while one exists
    #[must_use]
    pub fn temp_schema(&self) -> Option<&str> {
        self.temp_schema.as_deref()
    }

    fn connect_options(&self) -> MySqlConnectOptions {
        MySqlConnectOptions::new()
            .host(&self.database.host)
            .port(self.database.port)
            .username(&self.database.username)
            .password(&self.database.password)
            .charset(&self.database.charset)
    }

    /// Run one artisan subcommand against the temporary schema, returning stdout
    async fn artisan(&self, schema: &str, args: &[&str]) -> Result<String> {
        tracing::debug!(?args, schema, "Running artisan");

        let output = Command::new(&self.artisan.program)
            .arg(&self.artisan.script)
            .args(args)
            .current_dir(&self.project_root)
            .env("DB_CONNECTION", "mysql")
            .env("DB_HOST", &self.database.host)
            .env("DB_PORT", self.database.port.to_string())
            .env("DB_USERNAME", &self.database.username)
            .env("DB_PASSWORD", &self.database.password)
            .env("DB_DATABASE", schema)
            .output()
            .await
            .map_err(|e| {
                MkApiError::Provisioning(format!(
                    "Failed to run {} {}: {e}",
                    self.artisan.program, self.artisan.script
                ))
            })?;

        if !output.status.success() {
            return Err(MkApiError::Provisioning(format!(
                "`{} {} {}` exited with {}: {}",
                self.artisan.program,
                self.artisan.script,
                args.join(" "),
                output.status,
                String::from_utf8_lossy(&output.stderr).trim()
            )));
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }

    async fn read_catalog(
        admin: &MySqlPool,
        schema: &str,
    ) -> Result<BTreeMap<String, TableMetadata>> {
        let rows = sqlx::query(CATALOG_QUERY)
            .bind(schema)
            .fetch_all(admin)
            .await?;

        let mut catalog: BTreeMap<String, TableMetadata> = BTreeMap::new();
        for row in rows {
            let table: String = row.try_get("table_name")?;
            let nullable: String = row.try_get("is_nullable")?;
            let key: String = row.try_get("column_key")?;
            let comment: Option<String> = row.try_get("column_comment")?;

            let column = ColumnMetadata {
                name: row.try_get("column_name")?,
                raw_type: row.try_get("column_type")?,
                nullable: nullable != "NO",
                key: KeyKind::from_column_key(&key),
                default_value: row.try_get("column_default")?,
                extra: row.try_get::<Option<String>, _>("extra")?.unwrap_or_default(),
                collation: row.try_get("collation_name")?,
                comment: comment.filter(|c| !c.is_empty()),
            };

            catalog
                .entry(table.clone())
                .or_insert_with(|| TableMetadata::new(table))
                .upsert(column);
        }

        Ok(catalog)
    }
}

#[async_trait]
impl SnapshotProvider for MySqlSnapshotProvider {
    #[instrument(skip(self), fields(host = %self.database.host))]
    async fn provision(&mut self) -> Result<SchemaSnapshot> {
        let schema = temp_schema_name(&self.database.temp_prefix);

        let admin = MySqlPoolOptions::new()
            .max_connections(1)
            .connect_with(self.connect_options())
            .await
            .map_err(|e| MkApiError::Provisioning(format!("Cannot connect to database server: {e}")))?;
        self.admin = Some(admin.clone());

        sqlx::raw_sql(&format!(
            "CREATE DATABASE `{schema}` CHARACTER SET {} COLLATE {}",
            self.database.charset, self.database.collation
        ))
        .execute(&admin)
        .await
        .map_err(|e| MkApiError::Provisioning(format!("Cannot create {schema}: {e}")))?;
        self.temp_schema = Some(schema.clone());
        tracing::info!(schema = %schema, "Created temporary schema");

        self.artisan(&schema, &["migrate", "--force"]).await?;
        let catalog = Self::read_catalog(&admin, &schema).await?;

        self.artisan(&schema, &["migrate:reset", "--force"]).await?;
        let ddl = self
            .artisan(&schema, &["migrate", "--pretend", "--force"])
            .await?;

        tracing::info!(tables = catalog.len(), "Captured schema snapshot");
        Ok(SchemaSnapshot { catalog, ddl })
    }

    #[instrument(skip(self))]
    async fn teardown(&mut self) -> Result<()> {
        if let (Some(schema), Some(admin)) = (self.temp_schema.take(), self.admin.as_ref()) {
            sqlx::raw_sql(&format!("DROP DATABASE IF EXISTS `{schema}`"))
                .execute(admin)
                .await
                .map_err(|e| MkApiError::Provisioning(format!("Cannot drop {schema}: {e}")))?;
            tracing::info!(schema = %schema, "Dropped temporary schema");
        }

        if let Some(admin) = self.admin.take() {
            admin.close().await;
        }

        Ok(())
    }
}

/// Unique temporary schema name: `prefix` followed by 8 hex characters
#[must_use]
pub fn temp_schema_name(prefix: &str) -> String {
    let id = uuid::Uuid::new_v4().simple().to_string();
    format!("{prefix}{}", &id[..8])
}
