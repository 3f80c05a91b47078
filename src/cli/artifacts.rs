//! Read and delete stored artifacts

use anyhow::{Context, Result};
use console::style;

use crate::reporters::{self, OutputFormat};
use crate::store::{ArtifactRepository, ArtifactStore};

/// List stored analyses
pub fn list(store: &ArtifactStore, format: OutputFormat) -> Result<()> {
    let analyses = store.list_analyses().context("Failed to list analyses")?;
    println!("{}", reporters::render_analyses(&analyses, format)?);
    Ok(())
}

/// Page through the paths of an analysis
pub fn paths(
    store: &ArtifactStore,
    analysis_id: &str,
    skip: usize,
    limit: Option<usize>,
    format: OutputFormat,
) -> Result<()> {
    let paths = store
        .list_paths(analysis_id, skip, limit)
        .with_context(|| format!("Failed to list paths of {}", analysis_id))?;
    println!("{}", reporters::render_paths(&paths, format)?);
    Ok(())
}

/// Page through the chains of an analysis
pub fn chains(
    store: &ArtifactStore,
    analysis_id: &str,
    skip: usize,
    limit: Option<usize>,
    format: OutputFormat,
) -> Result<()> {
    let chains = store
        .list_chains(analysis_id, skip, limit)
        .with_context(|| format!("Failed to list chains of {}", analysis_id))?;
    println!("{}", reporters::render_chains(&chains, format)?);
    Ok(())
}

pub fn path(store: &ArtifactStore, path_id: &str, format: OutputFormat) -> Result<()> {
    let Some(path) = store.get_path(path_id)? else {
        anyhow::bail!("Attack path not found: {}", path_id);
    };
    println!("{}", reporters::render_path(&path, format)?);
    Ok(())
}

pub fn chain(store: &ArtifactStore, chain_id: &str, format: OutputFormat) -> Result<()> {
    let Some(chain) = store.get_chain(chain_id)? else {
        anyhow::bail!("Attack chain not found: {}", chain_id);
    };
    println!("{}", reporters::render_chain(&chain, format)?);
    Ok(())
}

/// Delete an analysis and its artifacts
pub fn delete(store: &ArtifactStore, analysis_id: &str) -> Result<()> {
    if store
        .delete_analysis(analysis_id)
        .with_context(|| format!("Failed to delete analysis {}", analysis_id))?
    {
        println!(
            "{} Deleted analysis {}",
            style("✓").green(),
            style(analysis_id).cyan()
        );
        Ok(())
    } else {
        anyhow::bail!("Analysis not found: {}", analysis_id)
    }
}
