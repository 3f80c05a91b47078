//! Analyze command - run one analysis over an inventory file

use anyhow::{Context, Result};
use console::style;
use serde::Deserialize;
use std::path::Path;
use std::sync::Arc;
use tracing::info;

use crate::analysis::AttackPathAnalyzer;
use crate::config::ProjectConfig;
use crate::inventory::Inventory;
use crate::models::{AnalysisRequest, Assumptions, ThreatScenario};
use crate::reporters::{self, OutputFormat};
use crate::store::ArtifactStore;

/// Arguments of `attackpath analyze`, borrowed from the parsed CLI
pub struct AnalyzeArgs<'a> {
    pub inventory: &'a Path,
    pub primary: &'a str,
    pub components: &'a [String],
    pub entry_points: Option<&'a [String]>,
    pub targets: Option<&'a [String]>,
    pub context: Option<&'a Path>,
    pub constraints: &'a [String],
    pub vulnerabilities: &'a [String],
    pub no_chains: bool,
    pub max_depth: Option<usize>,
    pub analysis_id: Option<&'a str>,
    pub scope: Option<&'a str>,
}

/// Analysis context supplied as a file
#[derive(Debug, Default, Deserialize)]
struct ContextFile {
    #[serde(default)]
    assumptions: Assumptions,
    #[serde(default)]
    constraints: Vec<String>,
    #[serde(default)]
    threat_scenarios: Vec<ThreatScenario>,
}

impl ContextFile {
    fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read context file {}", path.display()))?;
        let is_toml = path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case("toml"));
        if is_toml {
            toml::from_str(&content)
                .with_context(|| format!("Failed to parse TOML context {}", path.display()))
        } else {
            serde_json::from_str(&content)
                .with_context(|| format!("Failed to parse JSON context {}", path.display()))
        }
    }
}

/// Translate CLI arguments into an analysis request
fn build_request(args: &AnalyzeArgs<'_>, inventory: &Inventory) -> Result<AnalysisRequest> {
    let context = match args.context {
        Some(path) => ContextFile::load(path)?,
        None => ContextFile::default(),
    };

    let component_ids = if args.components.is_empty() {
        inventory.component_ids()
    } else {
        args.components.to_vec()
    };

    let mut constraints = context.constraints;
    constraints.extend(args.constraints.iter().cloned());

    Ok(AnalysisRequest {
        analysis_id: args.analysis_id.map(str::to_string),
        scope_id: args.scope.map(str::to_string),
        primary_component_id: args.primary.to_string(),
        component_ids,
        entry_point_ids: args.entry_points.map(<[String]>::to_vec),
        target_ids: args.targets.map(<[String]>::to_vec),
        assumptions: context.assumptions,
        constraints,
        threat_scenarios: context.threat_scenarios,
        vulnerability_ids: args.vulnerabilities.to_vec(),
        include_chains: args.no_chains.then_some(false),
        max_depth: args.max_depth,
    })
}

/// Run the analyze command
pub fn run(
    args: AnalyzeArgs<'_>,
    config: ProjectConfig,
    store: Arc<ArtifactStore>,
    format: OutputFormat,
    output: Option<&Path>,
) -> Result<()> {
    let inventory = Arc::new(Inventory::load(args.inventory)?);
    let request = build_request(&args, &inventory)?;

    info!(
        "Analyzing {} components from {}",
        request.component_ids.len(),
        args.inventory.display()
    );

    let analyzer = AttackPathAnalyzer::new(inventory.clone(), inventory, store).with_config(config);
    let outcome = analyzer
        .analyze(&request)
        .with_context(|| format!("Analysis of {} failed", args.inventory.display()))?;

    let rendered = reporters::render_outcome(&outcome, format)?;
    match output {
        Some(path) => {
            std::fs::write(path, &rendered)
                .with_context(|| format!("Failed to write report to {}", path.display()))?;
            eprintln!(
                "{} Report written to {}",
                style("✓").green(),
                style(path.display()).cyan()
            );
        }
        None => println!("{}", rendered),
    }

    if format == OutputFormat::Text && outcome.summary.persisted {
        eprintln!(
            "{} Inspect with {}",
            style("→").dim(),
            style(format!("attackpath paths {}", outcome.summary.analysis_id)).bold()
        );
    }

    Ok(())
}
