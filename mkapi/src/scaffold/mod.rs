//! Artifact generation
//!
//! Maps table metadata to the annotation blocks, stub methods and CRUD
//! bodies spliced into a Laravel project.

pub mod field_type;
pub mod generator;
pub mod helpers;
pub mod templates;
pub mod validation;

pub use field_type::{DocType, ExampleValue};
pub use generator::{Artifact, ArtifactRenderer, ArtifactSet, CrudOperation};
pub use helpers::{EntityNames, TemplateHelpers};
pub use validation::{synthesize, RuleSet};
