//! Summary assembly and persistence
//!
//! The summary is always returned. A store failure is logged and reported
//! through `persisted = false`, never as an error.

use crate::models::{
    AnalysisRecord, AnalysisSummary, AttackChain, AttackPath, ContextAudit, SelectionSource,
};
use crate::store::ArtifactRepository;
use chrono::Utc;
use serde::Serialize;
use tracing::{error, info};

use super::classifier::Classification;

/// Summary plus the artifacts it counts
#[derive(Debug, Clone, Serialize)]
pub struct AnalysisOutcome {
    pub summary: AnalysisSummary,
    pub paths: Vec<AttackPath>,
    pub chains: Vec<AttackChain>,
}

/// Everything an analysis produced, ready to be summarized
#[derive(Debug)]
pub struct AssemblyInput {
    pub analysis_id: String,
    pub scope_id: Option<String>,
    pub component_count: usize,
    pub classification: Classification,
    pub paths: Vec<AttackPath>,
    pub chains: Vec<AttackChain>,
    pub context: ContextAudit,
    pub warnings: Vec<String>,
}

/// Count, summarize and persist one analysis
pub fn assemble(
    input: AssemblyInput,
    high_risk_threshold: f64,
    store: &dyn ArtifactRepository,
) -> AnalysisOutcome {
    let AssemblyInput {
        analysis_id,
        scope_id,
        component_count,
        classification,
        paths,
        chains,
        context,
        mut warnings,
    } = input;

    warnings.extend(classification.warnings.iter().cloned());
    let degraded = classification.is_degraded();

    let high_risk_paths = paths
        .iter()
        .filter(|p| p.risk_score >= high_risk_threshold)
        .count();
    let high_risk_chains = chains
        .iter()
        .filter(|c| c.risk_score >= high_risk_threshold)
        .count();

    let mut summary = AnalysisSummary {
        analysis_id,
        scope_id,
        component_count,
        entry_points: classification.entry_points,
        critical_targets: classification.targets,
        total_paths: paths.len(),
        high_risk_paths,
        total_chains: chains.len(),
        high_risk_chains,
        created_at: Utc::now(),
        entry_point_source: classification.entry_point_source,
        target_source: classification.target_source,
        degraded,
        persisted: true,
        warnings,
    };

    let record = AnalysisRecord {
        summary: summary.clone(),
        context,
    };

    if let Err(e) = store.save_analysis(&record, &paths, &chains) {
        error!(
            "Failed to persist analysis {}: {}",
            summary.analysis_id, e
        );
        summary.persisted = false;
        summary
            .warnings
            .push(format!("Artifacts were not persisted: {}", e));
    }

    info!(
        "Analysis {}: {} paths ({} high risk), {} chains ({} high risk){}",
        summary.analysis_id,
        summary.total_paths,
        summary.high_risk_paths,
        summary.total_chains,
        summary.high_risk_chains,
        if summary.entry_point_source == SelectionSource::Fallback
            || summary.target_source == SelectionSource::Fallback
        {
            " [fallback selection]"
        } else {
            ""
        }
    );

    AnalysisOutcome {
        summary,
        paths,
        chains,
    }
}
