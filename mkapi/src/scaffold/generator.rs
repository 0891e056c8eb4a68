//! Artifact renderer
//!
//! Turns one table's metadata into the text blocks spliced into a Laravel
//! project:
//! - the model-level `@OA\Schema` block
//! - one documentation-plus-stub block per CRUD operation
//! - optionally one implementation body per CRUD operation
//!
//! Rendering is a pure function of the table metadata and the generation
//! timestamp fixed at construction.

use super::field_type::{DocType, ExampleValue};
use super::helpers::EntityNames;
use super::templates::TemplateRegistry;
use super::validation::RuleSet;
use crate::conventions::{
    entity_model, CONTROLLER_PROPERTY_EXCLUSIONS, ERROR_MODEL, MODEL_PROPERTY_EXCLUSIONS,
    STUB_MARKER, SUCCESS_MODEL,
};
use crate::error::Result;
use crate::schema::{ColumnMetadata, TableMetadata};
use chrono::NaiveDateTime;
use serde::Serialize;
use std::fmt;

const SECURITY: &str = r#"{{"api_key": {}}}"#;

/// The five resource operations a controller exposes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CrudOperation {
    /// Paginated listing
    List,
    /// Create from request body
    Create,
    /// Fetch one by id
    Read,
    /// Update one by id
    Update,
    /// Delete one by id
    Delete,
}

impl CrudOperation {
    /// Every operation, in the order they are patched
    pub const ALL: [Self; 5] = [
        Self::List,
        Self::Create,
        Self::Read,
        Self::Update,
        Self::Delete,
    ];

    /// Controller method name
    #[must_use]
    pub const fn method(self) -> &'static str {
        match self {
            Self::List => "index",
            Self::Create => "store",
            Self::Read => "show",
            Self::Update => "update",
            Self::Delete => "destroy",
        }
    }

    /// Opening words of the doc comment in a freshly generated resource controller
    #[must_use]
    pub const fn legacy_lead(self) -> &'static str {
        match self {
            Self::List => "Display a",
            Self::Create => "Store a",
            Self::Read => "Display the",
            Self::Update => "Update the",
            Self::Delete => "Remove the",
        }
    }

    const fn doc_template(self) -> &'static str {
        match self {
            Self::List => "index_doc",
            Self::Create => "store_doc",
            Self::Read => "show_doc",
            Self::Update => "update_doc",
            Self::Delete => "destroy_doc",
        }
    }

    const fn code_template(self) -> &'static str {
        match self {
            Self::List => "index_code",
            Self::Create => "store_code",
            Self::Read => "show_code",
            Self::Update => "update_code",
            Self::Delete => "destroy_code",
        }
    }
}

impl fmt::Display for CrudOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.method())
    }
}

/// Rendered text for one operation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artifact {
    /// Operation the text belongs to
    pub operation: CrudOperation,
    /// Doc comment followed by a stub method
    pub documentation: String,
    /// Method with a real body, present in code mode
    pub implementation: Option<String>,
}

/// Artifacts for all five operations of one table
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactSet {
    /// Names derived from the table
    pub names: EntityNames,
    artifacts: Vec<Artifact>,
}

impl ArtifactSet {
    /// Artifact for `operation`
    #[must_use]
    pub fn get(&self, operation: CrudOperation) -> Option<&Artifact> {
        self.artifacts.iter().find(|a| a.operation == operation)
    }

    /// Artifacts in patch order
    pub fn iter(&self) -> impl Iterator<Item = &Artifact> {
        self.artifacts.iter()
    }
}

#[derive(Serialize)]
struct PropertyContext<'a> {
    name: &'a str,
    #[serde(rename = "type")]
    kind: &'static str,
    format: &'static str,
    example: String,
}

#[derive(Serialize)]
struct OperationContext<'a> {
    #[serde(flatten)]
    names: &'a EntityNames,
    entity_model: String,
    error_model: &'static str,
    success_model: &'static str,
    security: &'static str,
    stub_marker: &'static str,
    properties: &'a str,
    rules: String,
}

#[derive(Serialize)]
struct SchemaContext<'a> {
    entity_model: String,
    properties: &'a str,
}

/// Renders artifacts from table metadata
pub struct ArtifactRenderer {
    templates: TemplateRegistry,
    generated_at: NaiveDateTime,
}

impl ArtifactRenderer {
    /// Renderer whose timestamp examples all read `generated_at`
    ///
    /// # Errors
    ///
    /// Returns an error if the embedded templates fail to compile
    pub fn new(generated_at: NaiveDateTime) -> Result<Self> {
        Ok(Self {
            templates: TemplateRegistry::new()?,
            generated_at,
        })
    }

    /// Model-level schema block
    ///
    /// # Errors
    ///
    /// Returns an error if template rendering fails
    pub fn render_model_schema(&self, table: &TableMetadata) -> Result<String> {
        let names = EntityNames::from_table(&table.name);
        let properties = self
            .properties(table, MODEL_PROPERTY_EXCLUSIONS, "model_property")?
            .join("\n");

        self.templates.render(
            "model_schema",
            &SchemaContext {
                entity_model: entity_model(&names.entity),
                properties: &properties,
            },
        )
    }

    /// Documentation artifacts for every operation
    ///
    /// # Errors
    ///
    /// Returns an error if template rendering fails
    pub fn render(&self, table: &TableMetadata) -> Result<ArtifactSet> {
        self.render_set(table, None)
    }

    /// Documentation and implementation artifacts for every operation
    ///
    /// `rules` are embedded in the `store` and `update` bodies.
    ///
    /// # Errors
    ///
    /// Returns an error if template rendering fails
    pub fn render_with_code(&self, table: &TableMetadata, rules: &RuleSet) -> Result<ArtifactSet> {
        self.render_set(table, Some(rules))
    }

    fn render_set(&self, table: &TableMetadata, rules: Option<&RuleSet>) -> Result<ArtifactSet> {
        let names = EntityNames::from_table(&table.name);
        let properties = self
            .properties(table, CONTROLLER_PROPERTY_EXCLUSIONS, "request_property")?
            .concat();

        let context = OperationContext {
            names: &names,
            entity_model: entity_model(&names.entity),
            error_model: ERROR_MODEL,
            success_model: SUCCESS_MODEL,
            security: SECURITY,
            stub_marker: STUB_MARKER,
            properties: &properties,
            rules: rules.map(ToString::to_string).unwrap_or_default(),
        };

        let artifacts = CrudOperation::ALL
            .into_iter()
            .map(|operation| -> Result<Artifact> {
                let documentation = self.templates.render(operation.doc_template(), &context)?;
                let implementation = rules
                    .map(|_| self.templates.render(operation.code_template(), &context))
                    .transpose()?;

                Ok(Artifact {
                    operation,
                    documentation,
                    implementation,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        tracing::debug!(table = %table.name, code = rules.is_some(), "Rendered artifacts");

        Ok(ArtifactSet { names, artifacts })
    }

    fn properties(
        &self,
        table: &TableMetadata,
        exclusions: &[&str],
        template: &str,
    ) -> Result<Vec<String>> {
        table
            .columns()
            .iter()
            .filter(|column| !exclusions.contains(&column.name.as_str()))
            .map(|column| self.templates.render(template, &self.property(column)))
            .collect()
    }

    fn property<'a>(&self, column: &'a ColumnMetadata) -> PropertyContext<'a> {
        let doc_type = DocType::from_raw(&column.raw_type);
        PropertyContext {
            name: &column.name,
            kind: doc_type.kind,
            format: doc_type.format,
            example: ExampleValue::for_column(&column.name, self.generated_at).to_string(),
        }
    }
}
