//! CLI command definitions and handlers

mod analyze;
mod artifacts;
mod init;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::config::{load_config_file, load_project_config, ProjectConfig};
use crate::reporters::OutputFormat;
use crate::store::ArtifactStore;

/// Parse and validate workers count (1-64)
fn parse_workers(s: &str) -> Result<usize, String> {
    let n: usize = s
        .parse()
        .map_err(|_| format!("'{}' is not a valid number", s))?;
    if n == 0 {
        Err("workers must be at least 1".to_string())
    } else if n > 64 {
        Err("workers cannot exceed 64".to_string())
    } else {
        Ok(n)
    }
}

fn parse_format(s: &str) -> Result<OutputFormat, String> {
    s.parse::<OutputFormat>().map_err(|e| e.to_string())
}

/// attackpath - attack path and chain analysis for vehicle architectures
///
/// Runs locally against an inventory file. Results are kept in a local
/// artifact store for later inspection.
#[derive(Parser, Debug)]
#[command(name = "attackpath")]
#[command(
    version,
    about = "Attack path and chain analysis for automotive component architectures",
    after_help = "\
Examples:
  attackpath init                                          Write an example attackpath.toml
  attackpath analyze -i vehicle.json -p tcu                Analyze every component in the inventory
  attackpath analyze -i vehicle.json -p gw -c gw,ivi,bcm   Analyze a subset
  attackpath paths <ANALYSIS_ID> --limit 10                First ten paths of an analysis
  attackpath path <PATH_ID>                                Steps of one path
  attackpath delete <ANALYSIS_ID>                          Remove an analysis and its artifacts"
)]
pub struct Cli {
    /// Project directory (config lookup and default store location)
    #[arg(long, global = true, default_value = ".")]
    pub project: PathBuf,

    /// Explicit config file (TOML or JSON)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Artifact store directory (default: user cache dir)
    #[arg(long, global = true, env = "ATTACKPATH_STORE")]
    pub store: Option<PathBuf>,

    /// Log level (error, warn, info, debug, trace)
    #[arg(long, global = true, default_value = "warn", value_parser = ["error", "warn", "info", "debug", "trace"])]
    pub log_level: String,

    /// Number of parallel workers (1-64)
    #[arg(long, global = true, value_parser = parse_workers)]
    pub workers: Option<usize>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Write an attackpath.toml with the default settings
    Init,

    /// Run an analysis over an inventory
    Analyze {
        /// Inventory file (JSON or TOML)
        #[arg(long, short = 'i')]
        inventory: PathBuf,

        /// Primary component id
        #[arg(long, short = 'p')]
        primary: String,

        /// Component subset (default: every component in the inventory)
        #[arg(long, short = 'c', value_delimiter = ',')]
        components: Vec<String>,

        /// Entry point overrides
        #[arg(long, value_delimiter = ',')]
        entry_points: Option<Vec<String>>,

        /// Target overrides
        #[arg(long, value_delimiter = ',')]
        targets: Option<Vec<String>>,

        /// Context file with assumptions, constraints and threat scenarios
        #[arg(long)]
        context: Option<PathBuf>,

        /// Extra constraints, e.g. exclude_component_type:sensor
        #[arg(long = "constraint")]
        constraints: Vec<String>,

        /// Vulnerability ids to attach to steps
        #[arg(long = "vuln", value_delimiter = ',')]
        vulnerabilities: Vec<String>,

        /// Skip chain aggregation
        #[arg(long)]
        no_chains: bool,

        /// Maximum edges per path
        #[arg(long)]
        max_depth: Option<usize>,

        /// Caller-chosen analysis id
        #[arg(long)]
        analysis_id: Option<String>,

        /// Scope id recorded on every artifact
        #[arg(long)]
        scope: Option<String>,

        /// Output format
        #[arg(long, short = 'f', default_value = "text", value_parser = parse_format)]
        format: OutputFormat,

        /// Write the report to a file instead of stdout
        #[arg(long, short = 'o')]
        output: Option<PathBuf>,
    },

    /// List stored analyses
    List {
        #[arg(long, short = 'f', default_value = "text", value_parser = parse_format)]
        format: OutputFormat,
    },

    /// List the paths of an analysis
    Paths {
        analysis_id: String,

        #[arg(long, default_value = "0")]
        skip: usize,

        #[arg(long)]
        limit: Option<usize>,

        #[arg(long, short = 'f', default_value = "text", value_parser = parse_format)]
        format: OutputFormat,
    },

    /// List the chains of an analysis
    Chains {
        analysis_id: String,

        #[arg(long, default_value = "0")]
        skip: usize,

        #[arg(long)]
        limit: Option<usize>,

        #[arg(long, short = 'f', default_value = "text", value_parser = parse_format)]
        format: OutputFormat,
    },

    /// Show one path with its steps
    Path {
        path_id: String,

        #[arg(long, short = 'f', default_value = "text", value_parser = parse_format)]
        format: OutputFormat,
    },

    /// Show one chain
    Chain {
        chain_id: String,

        #[arg(long, short = 'f', default_value = "text", value_parser = parse_format)]
        format: OutputFormat,
    },

    /// Delete an analysis with all of its paths and chains
    Delete { analysis_id: String },
}

/// Run the CLI with parsed arguments
pub fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Init => init::run(&cli.project),

        Commands::Analyze {
            ref inventory,
            ref primary,
            ref components,
            ref entry_points,
            ref targets,
            ref context,
            ref constraints,
            ref vulnerabilities,
            no_chains,
            max_depth,
            ref analysis_id,
            ref scope,
            format,
            ref output,
        } => {
            let config = resolve_config(&cli)?;
            let store = open_store(&cli)?;
            analyze::run(
                analyze::AnalyzeArgs {
                    inventory,
                    primary,
                    components,
                    entry_points: entry_points.as_deref(),
                    targets: targets.as_deref(),
                    context: context.as_deref(),
                    constraints,
                    vulnerabilities,
                    no_chains,
                    max_depth,
                    analysis_id: analysis_id.as_deref(),
                    scope: scope.as_deref(),
                },
                config,
                store,
                format,
                output.as_deref(),
            )
        }

        Commands::List { format } => artifacts::list(&*open_store(&cli)?, format),

        Commands::Paths {
            ref analysis_id,
            skip,
            limit,
            format,
        } => artifacts::paths(&*open_store(&cli)?, analysis_id, skip, limit, format),

        Commands::Chains {
            ref analysis_id,
            skip,
            limit,
            format,
        } => artifacts::chains(&*open_store(&cli)?, analysis_id, skip, limit, format),

        Commands::Path {
            ref path_id,
            format,
        } => artifacts::path(&*open_store(&cli)?, path_id, format),

        Commands::Chain {
            ref chain_id,
            format,
        } => artifacts::chain(&*open_store(&cli)?, chain_id, format),

        Commands::Delete { ref analysis_id } => artifacts::delete(&*open_store(&cli)?, analysis_id),
    }
}

/// Config from `--config`, else discovered in the project directory
fn resolve_config(cli: &Cli) -> Result<ProjectConfig> {
    let mut config = match &cli.config {
        Some(path) => load_config_file(path)?,
        None => load_project_config(&cli.project),
    };
    if let Some(workers) = cli.workers {
        config.analysis.workers = workers;
    }
    Ok(config)
}

/// `--store` if given, else the per-project cache directory
fn store_dir(cli: &Cli) -> Result<PathBuf> {
    match &cli.store {
        Some(dir) => Ok(dir.clone()),
        None => crate::cache::ensure_store_dir(&cli.project)
            .with_context(|| "Failed to create artifact store directory"),
    }
}

fn open_store(cli: &Cli) -> Result<Arc<ArtifactStore>> {
    let dir = store_dir(cli)?;
    open_store_at(&dir)
}

fn open_store_at(dir: &Path) -> Result<Arc<ArtifactStore>> {
    let store = ArtifactStore::new(dir)
        .with_context(|| format!("Failed to open artifact store at {}", dir.display()))?;
    Ok(Arc::new(store))
}
