//! Output reporters for attackpath results
//!
//! Supports two output formats:
//! - `text` - Terminal output with colors
//! - `json` - Machine-readable JSON

mod json;
mod text;

use crate::analysis::AnalysisOutcome;
use crate::models::{AnalysisSummary, AttackChain, AttackPath};
use anyhow::{anyhow, Result};
use std::str::FromStr;

/// Supported output formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Text,
    Json,
}

impl FromStr for OutputFormat {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" | "txt" | "terminal" => Ok(OutputFormat::Text),
            "json" => Ok(OutputFormat::Json),
            _ => Err(anyhow!("Unknown format '{}'. Valid formats: text, json", s)),
        }
    }
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputFormat::Text => write!(f, "text"),
            OutputFormat::Json => write!(f, "json"),
        }
    }
}

/// Render a finished analysis
pub fn render_outcome(outcome: &AnalysisOutcome, format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Text => Ok(text::render_outcome(outcome)),
        OutputFormat::Json => json::render(outcome),
    }
}

/// Render the stored analyses list
pub fn render_analyses(analyses: &[AnalysisSummary], format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Text => Ok(text::render_analysis_table(analyses)),
        OutputFormat::Json => json::render(&analyses),
    }
}

/// Render a page of paths
pub fn render_paths(paths: &[AttackPath], format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Text => Ok(text::render_path_table(paths)),
        OutputFormat::Json => json::render(&paths),
    }
}

/// Render a page of chains
pub fn render_chains(chains: &[AttackChain], format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Text => Ok(text::render_chain_table(chains)),
        OutputFormat::Json => json::render(&chains),
    }
}

/// Render one path with its steps
pub fn render_path(path: &AttackPath, format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Text => Ok(text::render_path_detail(path)),
        OutputFormat::Json => json::render(path),
    }
}

/// Render one chain
pub fn render_chain(chain: &AttackChain, format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Text => Ok(text::render_chain_detail(chain)),
        OutputFormat::Json => json::render(chain),
    }
}
