//! Attack path analysis engine
//!
//! The AttackPathAnalyzer runs one analysis end to end:
//! - Validates the request and claims its analysis id
//! - Applies context filters, classifies entry points and targets
//! - Builds and reweights the component graph
//! - Enumerates paths in parallel (rayon) and scores them
//! - Aggregates chains, then summarizes and persists
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │                  AttackPathAnalyzer                     │
//! ├─────────────────────────────────────────────────────────┤
//! │  1. Validate request, reserve analysis id               │
//! │  2. Fetch components, apply constraints                 │
//! │  3. Classify entry points / targets                     │
//! │  4. Build graph, reweight with threat scenarios         │
//! │  5. Enumerate pairs in parallel, score paths            │
//! │  6. Aggregate chains                                    │
//! │  7. Assemble summary, persist artifacts                 │
//! └─────────────────────────────────────────────────────────┘
//! ```

use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::time::Instant;

use tracing::{debug, info, warn};

use super::assembler::{assemble, AnalysisOutcome, AssemblyInput};
use super::chains::aggregate;
use super::classifier::classify;
use super::context::AnalysisContext;
use super::enumerator::{enumerate, EnumerationLimits};
use super::scorer::PathScorer;
use crate::config::ProjectConfig;
use crate::error::{AnalysisError, AnalysisResult, ValidationError};
use crate::graph::ComponentGraph;
use crate::inventory::{ComponentSource, VulnerabilitySource};
use crate::models::{AnalysisRequest, AttackPath, Component, ContextAudit};
use crate::store::ArtifactRepository;

/// Holds an analysis id for the duration of a run
struct Reservation<'a> {
    store: &'a dyn ArtifactRepository,
    analysis_id: String,
}

impl<'a> Reservation<'a> {
    fn claim(store: &'a dyn ArtifactRepository, analysis_id: &str) -> Result<Self, ValidationError> {
        if !store.reserve_analysis_id(analysis_id) {
            return Err(ValidationError::AnalysisIdInUse(analysis_id.to_string()));
        }
        Ok(Self {
            store,
            analysis_id: analysis_id.to_string(),
        })
    }
}

impl Drop for Reservation<'_> {
    fn drop(&mut self) {
        self.store.release_analysis_id(&self.analysis_id);
    }
}

/// Runs attack path analyses against a component inventory
pub struct AttackPathAnalyzer {
    components: Arc<dyn ComponentSource>,
    vulnerabilities: Arc<dyn VulnerabilitySource>,
    store: Arc<dyn ArtifactRepository>,
    config: ProjectConfig,
}

impl AttackPathAnalyzer {
    pub fn new(
        components: Arc<dyn ComponentSource>,
        vulnerabilities: Arc<dyn VulnerabilitySource>,
        store: Arc<dyn ArtifactRepository>,
    ) -> Self {
        Self {
            components,
            vulnerabilities,
            store,
            config: ProjectConfig::default(),
        }
    }

    /// Replace the default configuration
    pub fn with_config(mut self, config: ProjectConfig) -> Self {
        self.config = config;
        self
    }

    pub fn config(&self) -> &ProjectConfig {
        &self.config
    }

    pub fn store(&self) -> &Arc<dyn ArtifactRepository> {
        &self.store
    }

    /// Run one analysis.
    ///
    /// Only request validation and a failed component fetch are errors;
    /// everything else degrades into warnings on a valid summary.
    pub fn analyze(&self, request: &AnalysisRequest) -> AnalysisResult<AnalysisOutcome> {
        let start = Instant::now();
        validate(request)?;

        let analysis_id = request
            .analysis_id
            .clone()
            .filter(|id| !id.trim().is_empty())
            .unwrap_or_else(|| uuid::Uuid::new_v4().to_string());
        let _reservation = Reservation::claim(self.store.as_ref(), &analysis_id)?;

        let primary_id = request.primary_component_id.as_str();
        let mut warnings: Vec<String> = Vec::new();

        let component_ids = dedup(&request.component_ids);
        let fetched = self
            .components
            .fetch_components(&component_ids)
            .map_err(AnalysisError::Source)?;

        if !fetched.iter().any(|c| c.id == primary_id) {
            return Err(ValidationError::UnknownPrimaryComponent(primary_id.to_string()).into());
        }

        let found: HashSet<&str> = fetched.iter().map(|c| c.id.as_str()).collect();
        for id in &component_ids {
            if !found.contains(id.as_str()) {
                let msg = format!("Component '{}' not found; skipping it", id);
                warn!("{}", msg);
                warnings.push(msg);
            }
        }

        let ctx = AnalysisContext::new(request, &self.config.constraints);
        let (components, applied_constraints) = ctx.filter_components(fetched, primary_id);

        let classification = classify(
            &components,
            primary_id,
            request.entry_point_ids.as_deref(),
            request.target_ids.as_deref(),
            &ctx,
        );

        let build = ComponentGraph::build(&components, self.components.as_ref());
        warnings.extend(build.warnings);
        let mut graph = build.graph;
        ctx.reweight(&mut graph);
        debug!("Graph for {}: {:?}", analysis_id, graph.stats());

        let vulnerability_map = self.vulnerability_map(request, &components, &mut warnings);

        let settings = &self.config.analysis;
        let max_depth = match request.max_depth {
            Some(depth) if depth > settings.max_depth_limit => {
                let msg = format!(
                    "Requested max_depth {} lowered to the configured limit {}",
                    depth, settings.max_depth_limit
                );
                warn!("{}", msg);
                warnings.push(msg);
                settings.max_depth_limit
            }
            Some(depth) => depth,
            None => settings.max_depth,
        };
        let limits = EnumerationLimits {
            max_depth,
            prune_threshold: settings.direct_path_prune_threshold,
            max_paths_per_pair: settings.max_paths_per_pair,
            max_explored_per_pair: settings.max_explored_per_pair,
            max_total_paths: settings.max_total_paths,
        };
        let enumeration = enumerate(
            &graph,
            &classification.entry_points,
            &classification.targets,
            &limits,
            self.config.analysis.effective_workers(),
        )?;
        warnings.extend(enumeration.warnings);

        let skill_factor = if self.config.scoring.apply_attacker_skill {
            ctx.skill_factor()
        } else {
            1.0
        };
        let scorer = PathScorer::new(
            &graph,
            &analysis_id,
            request.scope_id.as_deref(),
            skill_factor,
            &vulnerability_map,
        );
        let paths: Vec<AttackPath> = enumeration
            .paths
            .iter()
            .filter_map(|nodes| scorer.score(nodes))
            .collect();

        let include_chains = request
            .include_chains
            .unwrap_or(self.config.analysis.include_chains);
        let chains = if include_chains {
            aggregate(&paths, &graph, &analysis_id, request.scope_id.as_deref())
        } else {
            Vec::new()
        };

        let context = ContextAudit {
            assumptions: ctx.assumptions.clone(),
            constraints: request.constraints.clone(),
            applied_constraints,
            threat_scenarios: ctx.threat_scenarios.clone(),
            vulnerability_ids: request.vulnerability_ids.clone(),
            max_depth,
            include_chains,
        };

        let outcome = assemble(
            AssemblyInput {
                analysis_id,
                scope_id: request.scope_id.clone(),
                component_count: components.len(),
                classification,
                paths,
                chains,
                context,
                warnings,
            },
            self.config.analysis.high_risk_threshold,
            self.store.as_ref(),
        );

        info!(
            "Analysis {} finished in {:.2?} across {} pair(s)",
            outcome.summary.analysis_id,
            start.elapsed(),
            enumeration.pairs_searched
        );

        Ok(outcome)
    }

    /// Request vulnerability ids known to affect each selected component
    fn vulnerability_map(
        &self,
        request: &AnalysisRequest,
        components: &[Component],
        warnings: &mut Vec<String>,
    ) -> HashMap<String, Vec<String>> {
        let mut map = HashMap::new();
        if request.vulnerability_ids.is_empty() {
            return map;
        }

        let requested = dedup(&request.vulnerability_ids);
        let known: HashSet<String> = match self.vulnerabilities.fetch_vulnerabilities(&requested) {
            Ok(found) => found.into_iter().map(|v| v.id).collect(),
            Err(e) => {
                let msg = format!("Vulnerability lookup failed: {}", e);
                warn!("{}", msg);
                warnings.push(msg);
                return map;
            }
        };
        for id in &requested {
            if !known.contains(id) {
                debug!("Ignoring unknown vulnerability id {}", id);
            }
        }

        for component in components {
            match self.vulnerabilities.vulnerabilities_for_component(&component.id) {
                Ok(ids) => {
                    let mut matched: Vec<String> =
                        ids.into_iter().filter(|id| known.contains(id)).collect();
                    matched.sort();
                    matched.dedup();
                    if !matched.is_empty() {
                        map.insert(component.id.clone(), matched);
                    }
                }
                Err(e) => {
                    let msg = format!(
                        "Vulnerability associations for '{}' unavailable: {}",
                        component.id, e
                    );
                    warn!("{}", msg);
                    warnings.push(msg);
                }
            }
        }

        map
    }
}

/// Reject requests that cannot describe an analysis
fn validate(request: &AnalysisRequest) -> Result<(), ValidationError> {
    if request.component_ids.is_empty() {
        return Err(ValidationError::EmptyComponentSet);
    }
    let primary = request.primary_component_id.trim();
    if primary.is_empty() {
        return Err(ValidationError::MissingPrimaryComponent);
    }
    if !request.component_ids.iter().any(|id| id == primary) {
        return Err(ValidationError::PrimaryNotSelected(primary.to_string()));
    }
    Ok(())
}

/// Drop repeated ids, keeping first occurrence order
fn dedup(ids: &[String]) -> Vec<String> {
    let mut seen = HashSet::new();
    ids.iter()
        .filter(|id| seen.insert(id.as_str()))
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::inventory::Inventory;
    use crate::models::{Component, ComponentKind, TrustZone};
    use crate::store::ArtifactStore;

    fn analyzer(components: Vec<Component>) -> AttackPathAnalyzer {
        let inventory = Arc::new(Inventory::new(components));
        AttackPathAnalyzer::new(
            inventory.clone(),
            inventory,
            Arc::new(ArtifactStore::in_memory()),
        )
    }

    fn pair() -> Vec<Component> {
        vec![
            Component::new("a", "A", ComponentKind::Ecu)
                .with_trust_zone(TrustZone::Untrusted)
                .connected_to("b"),
            Component::new("b", "B", ComponentKind::Ecu).with_trust_zone(TrustZone::Critical),
        ]
    }

    #[test]
    fn test_validation_errors() {
        let engine = analyzer(pair());

        let empty = AnalysisRequest::new("a", &[]);
        assert!(matches!(
            engine.analyze(&empty),
            Err(AnalysisError::Validation(ValidationError::EmptyComponentSet))
        ));

        let missing = AnalysisRequest::new("", &["a"]);
        assert!(matches!(
            engine.analyze(&missing),
            Err(AnalysisError::Validation(ValidationError::MissingPrimaryComponent))
        ));

        let outside = AnalysisRequest::new("b", &["a"]);
        assert!(matches!(
            engine.analyze(&outside),
            Err(AnalysisError::Validation(ValidationError::PrimaryNotSelected(_)))
        ));

        let unknown = AnalysisRequest::new("ghost", &["ghost", "a"]);
        let err = engine.analyze(&unknown).expect_err("unknown primary");
        assert!(err.is_validation());
    }

    #[test]
    fn test_reused_analysis_id_rejected() {
        let engine = analyzer(pair());
        let request = AnalysisRequest::new("a", &["a", "b"]).with_analysis_id("fixed");
        engine.analyze(&request).expect("first run");

        assert!(matches!(
            engine.analyze(&request),
            Err(AnalysisError::Validation(ValidationError::AnalysisIdInUse(_)))
        ));
    }

    #[test]
    fn test_reservation_released_after_failure() {
        let engine = analyzer(pair());
        let request = AnalysisRequest::new("ghost", &["ghost"]).with_analysis_id("retry");
        assert!(engine.analyze(&request).is_err());
        assert!(engine.store().reserve_analysis_id("retry"));
    }

    #[test]
    fn test_generated_analysis_id() {
        let engine = analyzer(pair());
        let outcome = engine
            .analyze(&AnalysisRequest::new("a", &["a", "b"]))
            .expect("analysis");
        assert!(!outcome.summary.analysis_id.is_empty());
        assert!(outcome.summary.persisted);
        assert_eq!(outcome.summary.total_paths, 1);
    }

    #[test]
    fn test_duplicate_and_missing_component_ids() {
        let engine = analyzer(pair());
        let request = AnalysisRequest::new("a", &["a", "b", "a", "zz"]);
        let outcome = engine.analyze(&request).expect("analysis");
        assert_eq!(outcome.summary.component_count, 2);
        assert!(outcome.summary.warnings.iter().any(|w| w.contains("zz")));
    }

    #[test]
    fn test_chains_can_be_disabled() {
        let engine = analyzer(vec![
            Component::new("a", "A", ComponentKind::Ecu)
                .with_trust_zone(TrustZone::Untrusted)
                .connected_to("b")
                .connected_to("c"),
            Component::new("b", "B", ComponentKind::Ecu).with_trust_zone(TrustZone::Critical),
            Component::new("c", "C", ComponentKind::Ecu).with_trust_zone(TrustZone::Critical),
        ]);
        let with_chains = engine
            .analyze(&AnalysisRequest::new("a", &["a", "b", "c"]))
            .expect("analysis");
        assert_eq!(with_chains.summary.total_chains, 1);

        let without = engine
            .analyze(&AnalysisRequest::new("a", &["a", "b", "c"]).with_chains(false))
            .expect("analysis");
        assert_eq!(without.summary.total_paths, 2);
        assert_eq!(without.summary.total_chains, 0);
    }

    #[test]
    fn test_dedup_keeps_first_occurrence() {
        let ids = vec!["b".to_string(), "a".to_string(), "b".to_string()];
        assert_eq!(dedup(&ids), vec!["b".to_string(), "a".to_string()]);
    }
}
