//! `mkapi controller` - document resource controllers
//!
//! # Example
//!
//! ```bash
//! mkapi controller post
//! mkapi controller all --code
//! mkapi controller post --force --path app/Http/Controllers/Api
//! ```

use super::run_batch;
use anyhow::Result;
use console::style;
use mkapi::batch::{ArtifactKind, BatchJob, PathResolver, TableFilter};
use mkapi::patch::PatchOptions;
use mkapi::MkApiConfig;
use std::path::PathBuf;

pub struct ControllerCommand {
    name: String,
    force: bool,
    code: bool,
    path: Option<PathBuf>,
}

impl ControllerCommand {
    pub const fn new(name: String, force: bool, code: bool, path: Option<PathBuf>) -> Self {
        Self {
            name,
            force,
            code,
            path,
        }
    }

    pub async fn execute(&self, config: &MkApiConfig) -> Result<()> {
        let filter = TableFilter::parse(&self.name);

        println!(
            "\n{} {} {}",
            style("Documenting").cyan().bold(),
            style(&filter).green().bold(),
            style("controllers...").cyan().bold()
        );

        let mut paths = PathResolver::from_config(config);
        if let Some(dir) = &self.path {
            paths = paths.with_controllers_dir(dir);
        }

        let job = BatchJob {
            kind: ArtifactKind::Controller,
            filter,
            options: PatchOptions {
                force: self.force,
                code: self.code,
            },
            paths,
        };

        let report = run_batch(config, &job).await?;

        if self.code && report.written > 0 {
            println!("\n{}", style("Next steps:").cyan().bold());
            println!(
                "  1. Make sure the base controller defines {} and {}",
                style("success()").yellow(),
                style("error()").yellow()
            );
            println!(
                "  2. Regenerate the API docs: {}",
                style("php artisan l5-swagger:generate").yellow()
            );
        }

        Ok(())
    }
}
