//! JSON reporter
//!
//! Pretty-printed JSON of the serialized artifacts, for piping to jq or
//! feeding a TARA report generator.

use anyhow::Result;
use serde::Serialize;

/// Render any artifact as JSON
pub fn render<T: Serialize + ?Sized>(value: &T) -> Result<String> {
    Ok(serde_json::to_string_pretty(value)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reporters::tests::{test_chain, test_outcome, test_path};

    #[test]
    fn test_outcome_json() {
        let json_str = render(&test_outcome()).expect("render JSON");
        let parsed: serde_json::Value = serde_json::from_str(&json_str).expect("parse JSON");
        assert_eq!(parsed["summary"]["total_paths"], 1);
        assert_eq!(parsed["summary"]["target_source"], "fallback");
        assert_eq!(parsed["paths"][0]["complexity"], "MEDIUM");
        assert_eq!(parsed["paths"][0]["path_type"], "multi_step");
    }

    #[test]
    fn test_chain_goal_label() {
        let json_str = render(&test_chain()).expect("render JSON");
        let parsed: serde_json::Value = serde_json::from_str(&json_str).expect("parse JSON");
        assert_eq!(parsed["attack_goal"], "Safety System Compromise");
        assert_eq!(parsed["path_ids"].as_array().expect("ids").len(), 2);
    }

    #[test]
    fn test_path_steps_ordered() {
        let json_str = render(&test_path()).expect("render JSON");
        let parsed: serde_json::Value = serde_json::from_str(&json_str).expect("parse JSON");
        let steps = parsed["steps"].as_array().expect("steps");
        assert_eq!(steps[0]["step_type"], "initial_access");
        assert_eq!(steps[1]["order"], 2);
    }

    #[test]
    fn test_empty_list() {
        let empty: Vec<crate::models::AttackPath> = Vec::new();
        assert_eq!(render(&empty).expect("render JSON"), "[]");
    }
}
