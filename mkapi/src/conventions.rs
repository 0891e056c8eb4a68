//! Fixed names and exclusion sets shared by every stage
//!
//! Parser, renderer, rule synthesizer and patcher all read their lists from
//! here so the exclusions hold uniformly across a batch.

/// Framework bookkeeping tables that never produce artifacts
pub const RESERVED_TABLES: &[&str] = &[
    "migrations",
    "password_resets",
    "password_reset_tokens",
    "jobs",
    "failed_jobs",
    "job_batches",
    "sessions",
    "cache",
    "cache_locks",
    "personal_access_tokens",
    "pulse_aggregates",
    "pulse_entries",
    "pulse_values",
];

/// Columns left out of controller request-body documentation
pub const CONTROLLER_PROPERTY_EXCLUSIONS: &[&str] = &["id", "created_at", "updated_at"];

/// Columns left out of model schema documentation
pub const MODEL_PROPERTY_EXCLUSIONS: &[&str] = &["deleted_at"];

/// Columns that never receive a validation rule
pub const VALIDATION_EXCLUSIONS: &[&str] = &["id", "deleted_at", "created_at", "updated_at"];

/// Shared error response schema
pub const ERROR_MODEL: &str = "ErrorModel";

/// Shared success response schema
pub const SUCCESS_MODEL: &str = "SuccessModel";

/// Marker left in generated stub bodies
pub const STUB_MARKER: &str = "// Your code here";

/// Prefix shared by every generated annotation
pub const DOC_MARKER: &str = "@OA\\";

/// Annotation that marks a model as already documented
pub const SCHEMA_MARKER: &str = "@OA\\Schema";

/// Interface a controller implements once the middleware hook is injected
pub const MIDDLEWARE_CAPABILITY: &str = "HasMiddleware";

/// Whether `table` is framework bookkeeping
#[must_use]
pub fn is_reserved_table(table: &str) -> bool {
    RESERVED_TABLES.contains(&table)
}

/// Schema reference name for an entity (`Post` becomes `PostModel`)
#[must_use]
pub fn entity_model(entity: &str) -> String {
    format!("{entity}Model")
}
