//! mkapi CLI tool

#![forbid(unsafe_code)]
#![deny(clippy::all, clippy::pedantic, clippy::nursery)]
#![warn(clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

mod commands;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use commands::{ControllerCommand, ModelCommand};
use mkapi::MkApiConfig;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "mkapi")]
#[command(version)]
#[command(about = "OpenAPI annotations and CRUD scaffolding for Laravel projects", long_about = None)]
struct Cli {
    /// Configuration file (defaults to ./mkapi.toml)
    #[arg(long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Log debug output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Add `@OA\Schema` blocks to model classes
    Model {
        /// Table or model name, or `all`
        name: String,
        /// Replace existing schema blocks
        #[arg(long)]
        force: bool,
    },
    /// Document controller resource methods
    Controller {
        /// Table or model name, or `all`
        name: String,
        /// Strip and regenerate existing annotations
        #[arg(long)]
        force: bool,
        /// Also generate CRUD method bodies
        #[arg(long)]
        code: bool,
        /// Controller directory (overrides the configured one)
        #[arg(long, value_name = "DIR")]
        path: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    mkapi::observability::init(cli.verbose)?;

    let config = match &cli.config {
        Some(path) => MkApiConfig::load_from(path),
        None => MkApiConfig::load(),
    }
    .context("Failed to load configuration")?;
    tracing::debug!(root = %config.project.root.display(), "Configuration loaded");

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("Failed to start async runtime")?;

    match cli.command {
        Commands::Model { name, force } => {
            let cmd = ModelCommand::new(name, force);
            runtime.block_on(cmd.execute(&config))?;
        }
        Commands::Controller {
            name,
            force,
            code,
            path,
        } => {
            let cmd = ControllerCommand::new(name, force, code, path);
            runtime.block_on(cmd.execute(&config))?;
        }
    }

    Ok(())
}
