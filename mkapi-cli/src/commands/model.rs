//! `mkapi model` - annotate model classes
//!
//! # Example
//!
//! ```bash
//! mkapi model post
//! mkapi model all --force
//! ```

use super::run_batch;
use anyhow::Result;
use console::style;
use mkapi::batch::{ArtifactKind, BatchJob, PathResolver, TableFilter};
use mkapi::patch::PatchOptions;
use mkapi::MkApiConfig;

pub struct ModelCommand {
    name: String,
    force: bool,
}

impl ModelCommand {
    pub const fn new(name: String, force: bool) -> Self {
        Self { name, force }
    }

    pub async fn execute(&self, config: &MkApiConfig) -> Result<()> {
        let filter = TableFilter::parse(&self.name);

        println!(
            "\n{} {} {}",
            style("Annotating").cyan().bold(),
            style(&filter).green().bold(),
            style("models...").cyan().bold()
        );

        let job = BatchJob {
            kind: ArtifactKind::Model,
            filter,
            options: PatchOptions {
                force: self.force,
                code: false,
            },
            paths: PathResolver::from_config(config),
        };

        run_batch(config, &job).await?;
        Ok(())
    }
}
