use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StrategyWeights {
    pub irt: f64,
    pub heuristic: f64,
    pub expert: f64,
}

impl Default for StrategyWeights {
    fn default() -> Self {
        Self {
            irt: 0.40,
            heuristic: 0.35,
            expert: 0.25,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeatureFlags {
    pub irt_enabled: bool,
    pub heuristic_enabled: bool,
    pub expert_enabled: bool,
}

impl Default for FeatureFlags {
    fn default() -> Self {
        Self {
            irt_enabled: true,
            heuristic_enabled: true,
            expert_enabled: true,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EngineConfig {
    pub weights: StrategyWeights,
    pub feature_flags: FeatureFlags,
    pub subject_scope: Option<String>,
}

impl EngineConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Applies overrides from `lookup`. Unparseable or negative weights and
    /// unrecognised flag values keep their defaults.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();
        let weight = |key: &str| lookup(key).as_deref().and_then(parse_weight);
        let flag = |key: &str| lookup(key).as_deref().and_then(parse_flag);

        if let Some(val) = weight("ENGINE_IRT_WEIGHT") {
            config.weights.irt = val;
        }
        if let Some(val) = weight("ENGINE_HEURISTIC_WEIGHT") {
            config.weights.heuristic = val;
        }
        if let Some(val) = weight("ENGINE_EXPERT_WEIGHT") {
            config.weights.expert = val;
        }
        if let Some(val) = flag("ENGINE_IRT_ENABLED") {
            config.feature_flags.irt_enabled = val;
        }
        if let Some(val) = flag("ENGINE_HEURISTIC_ENABLED") {
            config.feature_flags.heuristic_enabled = val;
        }
        if let Some(val) = flag("ENGINE_EXPERT_ENABLED") {
            config.feature_flags.expert_enabled = val;
        }
        if let Some(val) = lookup("ENGINE_SUBJECT_SCOPE") {
            let scope = val.trim();
            if !scope.is_empty() {
                config.subject_scope = Some(scope.to_string());
            }
        }

        config
    }
}

/// Accepts `true`/`false`, `1`/`0`, `yes`/`no` and `on`/`off`, ignoring case.
pub fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Some(true),
        "false" | "0" | "no" | "off" => Some(false),
        _ => None,
    }
}

fn parse_weight(value: &str) -> Option<f64> {
    value
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite() && *v >= 0.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_with(vars: &[(&str, &str)]) -> EngineConfig {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        EngineConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_default_weights_sum_to_one() {
        let w = StrategyWeights::default();
        assert!((w.irt + w.heuristic + w.expert - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_default_flags_enable_all_strategies() {
        let flags = EngineConfig::default().feature_flags;
        assert!(flags.irt_enabled && flags.heuristic_enabled && flags.expert_enabled);
    }

    #[test]
    fn test_weight_overrides() {
        let config = config_with(&[
            ("ENGINE_IRT_WEIGHT", "0.6"),
            ("ENGINE_HEURISTIC_WEIGHT", " 0.1 "),
            ("ENGINE_EXPERT_WEIGHT", "0"),
        ]);
        assert_eq!(config.weights.irt, 0.6);
        assert_eq!(config.weights.heuristic, 0.1);
        assert_eq!(config.weights.expert, 0.0);
    }

    #[test]
    fn test_bad_weights_keep_defaults() {
        let config = config_with(&[
            ("ENGINE_IRT_WEIGHT", "-0.2"),
            ("ENGINE_HEURISTIC_WEIGHT", "heavy"),
            ("ENGINE_EXPERT_WEIGHT", "NaN"),
        ]);
        assert_eq!(config.weights.irt, 0.40);
        assert_eq!(config.weights.heuristic, 0.35);
        assert_eq!(config.weights.expert, 0.25);
    }

    #[test]
    fn test_flag_overrides() {
        let config = config_with(&[
            ("ENGINE_IRT_ENABLED", "false"),
            ("ENGINE_HEURISTIC_ENABLED", "maybe"),
            ("ENGINE_EXPERT_ENABLED", "0"),
        ]);
        assert!(!config.feature_flags.irt_enabled);
        assert!(config.feature_flags.heuristic_enabled);
        assert!(!config.feature_flags.expert_enabled);
    }

    #[test]
    fn test_subject_scope_override() {
        assert_eq!(
            config_with(&[("ENGINE_SUBJECT_SCOPE", " physics ")]).subject_scope,
            Some("physics".to_string())
        );
        assert_eq!(config_with(&[("ENGINE_SUBJECT_SCOPE", "  ")]).subject_scope, None);
    }

    #[test]
    fn test_parse_flag() {
        assert_eq!(parse_flag("1"), Some(true));
        assert_eq!(parse_flag("TRUE"), Some(true));
        assert_eq!(parse_flag("0"), Some(false));
        assert_eq!(parse_flag("off"), Some(false));
        assert_eq!(parse_flag(""), None);
    }
}
