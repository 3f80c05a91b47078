use super::*;
use tempfile::tempdir;

#[test]
fn test_default_config() {
    let config = ProjectConfig::default();

    assert_eq!(config.analysis.max_depth, 5);
    assert!(config.analysis.include_chains);
    assert_eq!(config.analysis.high_risk_threshold, 7.0);
    assert_eq!(config.analysis.direct_path_prune_threshold, 5);
    assert!(!config.constraints.enforce_access_constraints);
    assert!(config.scoring.apply_attacker_skill);
}

#[test]
fn test_parse_toml_config() {
    let toml_content = r#"
[analysis]
max_depth = 3
include_chains = false
high_risk_threshold = 6.5
workers = 2

[constraints]
enforce_access_constraints = true

[scoring]
apply_attacker_skill = false
"#;

    let config: ProjectConfig = toml::from_str(toml_content).expect("parse TOML config");
    assert_eq!(config.analysis.max_depth, 3);
    assert!(!config.analysis.include_chains);
    assert_eq!(config.analysis.high_risk_threshold, 6.5);
    assert_eq!(config.analysis.effective_workers(), 2);
    // Unset keys keep their defaults
    assert_eq!(config.analysis.max_paths_per_pair, 1000);
    assert!(config.constraints.enforce_access_constraints);
    assert!(!config.scoring.apply_attacker_skill);
}

#[test]
fn test_partial_sections_use_defaults() {
    let config: ProjectConfig = toml::from_str("[scoring]\n").expect("parse TOML config");
    assert_eq!(config.analysis.max_depth, 5);
    assert!(config.scoring.apply_attacker_skill);
}

#[test]
fn test_effective_workers_auto() {
    let settings = AnalysisSettings::default();
    let workers = settings.effective_workers();
    assert!((1..=16).contains(&workers));
}

#[test]
fn test_load_from_directory() {
    let dir = tempdir().expect("create temp dir");
    std::fs::write(
        dir.path().join(CONFIG_FILE_NAME),
        "[analysis]\nmax_depth = 4\n",
    )
    .expect("write config");

    let config = load_project_config(dir.path());
    assert_eq!(config.analysis.max_depth, 4);
}

#[test]
fn test_load_json_config() {
    let dir = tempdir().expect("create temp dir");
    std::fs::write(
        dir.path().join(".attackpathrc.json"),
        r#"{"analysis": {"high_risk_threshold": 8.0}}"#,
    )
    .expect("write config");

    let config = load_project_config(dir.path());
    assert_eq!(config.analysis.high_risk_threshold, 8.0);
}

#[test]
fn test_missing_config_returns_defaults() {
    let dir = tempdir().expect("create temp dir");
    let config = load_project_config(dir.path());
    assert_eq!(config.analysis.max_depth, 5);
}

#[test]
fn test_malformed_config_falls_back_to_defaults() {
    let dir = tempdir().expect("create temp dir");
    std::fs::write(dir.path().join(CONFIG_FILE_NAME), "[analysis\nmax_depth = ")
        .expect("write config");

    let config = load_project_config(dir.path());
    assert_eq!(config.analysis.max_depth, 5);
}

#[test]
fn test_invalid_caps_rejected() {
    let dir = tempdir().expect("create temp dir");
    let path = dir.path().join(CONFIG_FILE_NAME);
    std::fs::write(&path, "[analysis]\nmax_paths_per_pair = 0\n").expect("write config");

    assert!(load_config_file(&path).is_err());
    // Directory discovery degrades to defaults instead
    assert_eq!(load_project_config(dir.path()).analysis.max_paths_per_pair, 1000);
}

#[test]
fn test_search_budget_defaults_and_validation() {
    let config = ProjectConfig::default();
    assert_eq!(config.analysis.max_depth_limit, 10);
    assert_eq!(config.analysis.max_explored_per_pair, 100_000);
    assert!(config.validate().is_ok());

    let too_deep: ProjectConfig =
        toml::from_str("[analysis]\nmax_depth = 12\n").expect("parse TOML config");
    assert!(too_deep.validate().is_err());

    let no_budget: ProjectConfig =
        toml::from_str("[analysis]\nmax_explored_per_pair = 0\n").expect("parse TOML config");
    assert!(no_budget.validate().is_err());
}
