//! Init command - write a project configuration

use anyhow::{Context, Result};
use console::style;
use std::path::Path;

use crate::config::CONFIG_FILE_NAME;

const DEFAULT_CONFIG: &str = r#"# attackpath configuration

[analysis]
# Maximum edges per path when a request does not set one
max_depth = 5

# Requested depths above this are lowered to it
max_depth_limit = 10

# Aggregate related paths into attack chains
include_chains = true

# Paths and chains at or above this risk score are counted as high risk
high_risk_threshold = 7.0

# Above this many candidate paths per pair, single-hop paths are dropped
direct_path_prune_threshold = 5

# Enumeration caps
max_paths_per_pair = 1000
max_explored_per_pair = 100000
max_total_paths = 10000

# Worker threads for pair enumeration (0 = auto)
workers = 0

[constraints]
# Prune entry points that rely on excluded access (remote, physical, wireless)
enforce_access_constraints = false

[scoring]
# Scale likelihood by the assumed attacker skill level
apply_attacker_skill = true
"#;

/// Run the init command
pub fn run(path: &Path) -> Result<()> {
    let project = path
        .canonicalize()
        .with_context(|| format!("Path does not exist: {}", path.display()))?;

    if !project.is_dir() {
        anyhow::bail!("Path is not a directory: {}", project.display());
    }

    println!("\n{} Initializing attackpath\n", style("▶").bold());

    let config_path = project.join(CONFIG_FILE_NAME);
    if config_path.exists() {
        println!(
            "{} Config already present at {}",
            style("✓").green(),
            style(config_path.display()).cyan()
        );
    } else {
        std::fs::write(&config_path, DEFAULT_CONFIG)
            .with_context(|| format!("Failed to write {}", config_path.display()))?;
        println!(
            "{} Created {}",
            style("✓").green(),
            style(CONFIG_FILE_NAME).cyan()
        );
    }

    let store_dir = crate::cache::get_store_dir(&project);
    println!(
        "{} Artifacts will be stored in {}",
        style("✓").green(),
        style(store_dir.display()).cyan()
    );

    println!(
        "\n{} Run {} to analyze an inventory\n",
        style("→").dim(),
        style("attackpath analyze -i <inventory> -p <primary>").bold()
    );

    Ok(())
}
