//! source-prep CLI - prepares the source tree before a native build
//!
//! Usage:
//!   source-prep fetch [-C DIR] [-c FILE]   Fetch, verify and extract external sources
//!   source-prep list                       Show the artifact catalog
//!   source-prep hash <file>                Print the SHA-256 of a file
//!   source-prep requirements               Show package requirements and settings

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use source_prep::artifact::{INTERNAL_ARTIFACTS, PUBLIC_ARTIFACTS};
use source_prep::core::lock;
use source_prep::helpers::hash;
use source_prep::{output, requirements, EnvConfig, HttpConnector, Pipeline, Settings};
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "source-prep")]
#[command(about = "Fetch and verify external sources the build does not vendor")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch, verify and materialize all required artifacts
    Fetch {
        /// Working directory (the source tree root)
        #[arg(short = 'C', long, env = "SOURCE_PREP_WORKDIR", default_value = ".")]
        workdir: PathBuf,

        /// Settings file (defaults to <workdir>/source-prep.toml if present)
        #[arg(short, long, env = "SOURCE_PREP_CONFIG")]
        config: Option<PathBuf>,
    },

    /// List the artifact catalog
    List,

    /// Print the SHA-256 of a file
    Hash {
        /// File to hash
        file: PathBuf,
    },

    /// Show package requirements and build settings
    Requirements,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Fetch { workdir, config } => fetch(&workdir, config.as_deref()),
        Commands::List => {
            list();
            Ok(())
        }
        Commands::Hash { file } => {
            let digest = hash::sha256_file(&file)
                .with_context(|| format!("Failed to hash {}", file.display()))?;
            println!("{}  {}", digest, file.display());
            Ok(())
        }
        Commands::Requirements => {
            show_requirements();
            Ok(())
        }
    }
}

fn fetch(workdir: &Path, config: Option<&Path>) -> Result<()> {
    std::fs::create_dir_all(workdir)
        .with_context(|| format!("Failed to create working directory: {}", workdir.display()))?;
    let _lock = lock::acquire_workdir_lock(workdir)?;

    let settings = match config {
        Some(path) => Settings::load(path)?,
        None => Settings::load_from_workdir(workdir)?,
    };
    let env = EnvConfig::from_env();

    output::action(&format!("Preparing sources in {}", workdir.display()));
    if env.internal_mode {
        output::info("internal mode enabled");
    }

    let connector = HttpConnector::new(&settings);
    let report = Pipeline::new(workdir, env, settings)
        .run(&connector)
        .context("Source preparation failed")?;

    let outputs: usize = report.jobs.iter().map(|j| j.outputs.len()).sum();
    output::success(&format!(
        "{} artifact(s) prepared, {} file(s) written",
        report.jobs.len(),
        outputs
    ));
    Ok(())
}

fn list() {
    for spec in PUBLIC_ARTIFACTS.iter().chain(INTERNAL_ARTIFACTS) {
        let target = match spec.relocations {
            [] => format!("{}/", spec.destination),
            relocations => relocations
                .iter()
                .map(|r| r.destination)
                .collect::<Vec<_>>()
                .join(", "),
        };
        output::list_item(
            spec.name,
            &format!(
                "[{}] {}@{} -> {}",
                spec.scope,
                spec.repository,
                spec.short_revision(),
                target
            ),
        );
    }
}

fn show_requirements() {
    output::info(&format!(
        "settings: {} (generator: {})",
        requirements::SETTINGS.join(", "),
        requirements::GENERATOR
    ));
    for requirement in requirements::REQUIREMENTS {
        output::list_item(requirement.name, &requirement.reference());
    }
}
