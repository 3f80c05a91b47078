//! Text (terminal) reporter with colors and formatting

use crate::analysis::AnalysisOutcome;
use crate::models::{AnalysisSummary, AttackChain, AttackPath, Complexity, SelectionSource};

/// Reset ANSI color
const RESET: &str = "\x1b[0m";
const BOLD: &str = "\x1b[1m";
const DIM: &str = "\x1b[2m";
const RED: &str = "\x1b[31m";
const YELLOW: &str = "\x1b[33m";
const GREEN: &str = "\x1b[32m";

/// Risk colors on the 0-10 scale
fn risk_color(risk: f64) -> &'static str {
    if risk >= 7.0 {
        RED
    } else if risk >= 4.0 {
        YELLOW
    } else {
        GREEN
    }
}

fn complexity_tag(complexity: Complexity) -> &'static str {
    match complexity {
        Complexity::Low => "[L]",
        Complexity::Medium => "[M]",
        Complexity::High => "[H]",
    }
}

fn source_label(source: SelectionSource) -> &'static str {
    match source {
        SelectionSource::Override => "override",
        SelectionSource::Heuristic => "heuristic",
        SelectionSource::Fallback => "fallback",
    }
}

/// Render an analysis summary followed by its paths and chains
pub fn render_outcome(outcome: &AnalysisOutcome) -> String {
    let s = &outcome.summary;
    let mut out = String::new();

    out.push_str(&format!("\n{BOLD}Attack Path Analysis{RESET} {}\n", s.analysis_id));
    out.push_str(&format!(
        "{DIM}──────────────────────────────────────{RESET}\n"
    ));
    if let Some(scope) = &s.scope_id {
        out.push_str(&format!("Scope: {}\n", scope));
    }
    out.push_str(&format!(
        "Components: {}  Created: {}\n",
        s.component_count,
        s.created_at.format("%Y-%m-%d %H:%M:%S UTC")
    ));
    out.push_str(&format!(
        "Entry points ({}): {}\n",
        source_label(s.entry_point_source),
        s.entry_points.join(", ")
    ));
    out.push_str(&format!(
        "Targets ({}): {}\n\n",
        source_label(s.target_source),
        s.critical_targets.join(", ")
    ));

    out.push_str(&format!(
        "{BOLD}PATHS{RESET} {} total, {RED}{}{RESET} high risk\n",
        s.total_paths, s.high_risk_paths
    ));
    out.push_str(&render_path_table(&outcome.paths));
    out.push('\n');

    out.push_str(&format!(
        "{BOLD}CHAINS{RESET} {} total, {RED}{}{RESET} high risk\n",
        s.total_chains, s.high_risk_chains
    ));
    out.push_str(&render_chain_table(&outcome.chains));

    if s.degraded {
        out.push_str(&format!(
            "\n{YELLOW}Endpoint selection fell back to defaults{RESET}\n"
        ));
    }
    if !s.persisted {
        out.push_str(&format!("{RED}Results were not persisted{RESET}\n"));
    }
    if !s.warnings.is_empty() {
        out.push_str(&format!("\n{BOLD}WARNINGS{RESET}\n"));
        for warning in &s.warnings {
            out.push_str(&format!("  {DIM}-{RESET} {}\n", warning));
        }
    }

    out
}

/// One line per stored analysis
pub fn render_analysis_table(analyses: &[AnalysisSummary]) -> String {
    if analyses.is_empty() {
        return format!("  {DIM}(no analyses stored){RESET}\n");
    }

    let mut out = String::new();
    for s in analyses {
        out.push_str(&format!(
            "  {BOLD}{}{RESET} {DIM}{}{RESET}  {} paths ({RED}{}{RESET} high), {} chains\n",
            s.analysis_id,
            s.created_at.format("%Y-%m-%d %H:%M"),
            s.total_paths,
            s.high_risk_paths,
            s.total_chains
        ));
    }
    out
}

/// One line per path
pub fn render_path_table(paths: &[AttackPath]) -> String {
    if paths.is_empty() {
        return format!("  {DIM}(none){RESET}\n");
    }

    let mut out = String::new();
    for path in paths {
        let color = risk_color(path.risk_score);
        out.push_str(&format!(
            "  {color}{:>4.1}{RESET} {} {:<28} {:<20} {DIM}{}{RESET}\n",
            path.risk_score,
            complexity_tag(path.complexity),
            path.name,
            path.path_type.to_string(),
            path.id
        ));
    }
    out
}

/// One line per chain
pub fn render_chain_table(chains: &[AttackChain]) -> String {
    if chains.is_empty() {
        return format!("  {DIM}(none){RESET}\n");
    }

    let mut out = String::new();
    for chain in chains {
        let color = risk_color(chain.risk_score);
        out.push_str(&format!(
            "  {color}{:>4.1}{RESET} {} {:<36} {} paths {DIM}{}{RESET}\n",
            chain.risk_score,
            complexity_tag(chain.complexity),
            chain.attack_goal.to_string(),
            chain.path_ids.len(),
            chain.id
        ));
    }
    out
}

/// A path with its ordered steps
pub fn render_path_detail(path: &AttackPath) -> String {
    let mut out = String::new();
    let color = risk_color(path.risk_score);

    out.push_str(&format!("\n{BOLD}{}{RESET}  {DIM}{}{RESET}\n", path.name, path.id));
    out.push_str(&format!("{}\n", path.description));
    out.push_str(&format!(
        "Type: {}  Complexity: {}  Likelihood: {:.2}  Risk: {color}{:.1}{RESET}\n",
        path.path_type, path.complexity, path.success_likelihood, path.risk_score
    ));
    out.push_str(&format!(
        "Impact: C={} I={} A={}\n\n",
        path.impact.confidentiality, path.impact.integrity, path.impact.availability
    ));

    for step in &path.steps {
        out.push_str(&format!(
            "  {BOLD}{}.{RESET} {} {DIM}[{}]{RESET}\n",
            step.order, step.description, step.component_id
        ));
        for req in &step.prerequisites {
            out.push_str(&format!("     {DIM}requires:{RESET} {}\n", req));
        }
        if !step.vulnerability_ids.is_empty() {
            out.push_str(&format!(
                "     {DIM}vulnerabilities:{RESET} {}\n",
                step.vulnerability_ids.join(", ")
            ));
        }
        if !step.threat_ids.is_empty() {
            out.push_str(&format!(
                "     {DIM}threats:{RESET} {}\n",
                step.threat_ids.join(", ")
            ));
        }
    }

    out
}

/// A chain with its endpoints and members
pub fn render_chain_detail(chain: &AttackChain) -> String {
    let mut out = String::new();
    let color = risk_color(chain.risk_score);
    let join = |set: &std::collections::BTreeSet<String>| {
        set.iter().cloned().collect::<Vec<_>>().join(", ")
    };

    out.push_str(&format!("\n{BOLD}{}{RESET}  {DIM}{}{RESET}\n", chain.name, chain.id));
    out.push_str(&format!("{}\n", chain.description));
    out.push_str(&format!(
        "Goal: {}  Complexity: {}  Likelihood: {:.2}  Risk: {color}{:.1}{RESET}\n",
        chain.attack_goal, chain.complexity, chain.success_likelihood, chain.risk_score
    ));
    out.push_str(&format!(
        "Impact: C={} I={} A={}\n",
        chain.impact.confidentiality, chain.impact.integrity, chain.impact.availability
    ));
    out.push_str(&format!("Entry points: {}\n", join(&chain.entry_points)));
    out.push_str(&format!("Targets: {}\n", join(&chain.targets)));
    out.push_str(&format!("{BOLD}Member paths{RESET}\n"));
    for id in &chain.path_ids {
        out.push_str(&format!("  - {}\n", id));
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reporters::tests::{test_chain, test_outcome, test_path};

    #[test]
    fn test_outcome_text() {
        let text = render_outcome(&test_outcome());
        assert!(text.contains("Attack Path Analysis"));
        assert!(text.contains("Telematics -> Brake ECU"));
        assert!(text.contains("Safety System Compromise"));
        assert!(text.contains("fell back"));
        assert!(text.contains("No critical targets matched"));
    }

    #[test]
    fn test_empty_tables() {
        assert!(render_analysis_table(&[]).contains("no analyses"));
        assert!(render_path_table(&[]).contains("(none)"));
        assert!(render_chain_table(&[]).contains("(none)"));
    }

    #[test]
    fn test_path_detail_lists_steps() {
        let text = render_path_detail(&test_path());
        assert!(text.contains("1."));
        assert!(text.contains("requires:"));
        assert!(text.contains("CVE-2024-0001"));
        assert!(text.contains("threats:"));
    }

    #[test]
    fn test_chain_detail() {
        let text = render_chain_detail(&test_chain());
        assert!(text.contains("brake, steer"));
        assert!(text.contains("path-0002"));
    }

    #[test]
    fn test_risk_colors() {
        assert_eq!(risk_color(9.0), RED);
        assert_eq!(risk_color(5.0), YELLOW);
        assert_eq!(risk_color(1.0), GREEN);
    }
}
