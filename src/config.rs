//! # DMP Configuration
//!
//! Model gains, obstacle repulsion, adaptation and reward settings, loaded
//! from TOML. Every field has a default, so an empty file is a valid config.
//!
//! ## Example: TOML Configuration
//!
//! ```toml
//! [model]
//! gain = 25.0
//! basis_count = 10
//! stabilize = true
//!
//! [model.obstacles]
//! enabled = true
//! sign_rule = "cross_product"
//!
//! [adapt]
//! samples = 20
//! rate = 0.5
//! max_iterations = 200
//! seed = 7
//! ```

// src/config.rs - Single configuration file
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::dmp::SignRule;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Main configuration struct for the model, adaptation and reward.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct DmpConfig {
    #[serde(default)]
    pub model: ModelConfig,
    #[serde(default)]
    pub adapt: AdaptConfig,
    #[serde(default)]
    pub reward: RewardConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ModelConfig {
    #[serde(default = "default_gain")]
    pub gain: f64,
    #[serde(default = "default_basis_count")]
    pub basis_count: usize,
    #[serde(default = "default_stabilize")]
    pub stabilize: bool,
    /// Gaussian bandwidth in units of center spacing
    #[serde(default = "default_bandwidth")]
    pub bandwidth: f64,
    #[serde(default)]
    pub obstacles: ObstacleConfig,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            gain: default_gain(),
            basis_count: default_basis_count(),
            stabilize: default_stabilize(),
            bandwidth: default_bandwidth(),
            obstacles: ObstacleConfig::default(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ObstacleConfig {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default = "default_obstacle_gamma")]
    pub gamma: f64,
    #[serde(default = "default_obstacle_beta")]
    pub beta: f64,
    #[serde(default)]
    pub sign_rule: SignRule,
    #[serde(default = "default_reference_axis")]
    pub reference_axis: [f64; 3],
}

impl Default for ObstacleConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            gamma: default_obstacle_gamma(),
            beta: default_obstacle_beta(),
            sign_rule: SignRule::default(),
            reference_axis: default_reference_axis(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AdaptConfig {
    #[serde(default = "default_samples")]
    pub samples: usize,
    #[serde(default = "default_rate")]
    pub rate: f64,
    #[serde(default = "default_max_iterations")]
    pub max_iterations: usize,
    #[serde(default = "default_tolerance")]
    pub tolerance: f64,
    /// Fixed seed for the exploration noise; entropy-seeded when absent
    #[serde(default)]
    pub seed: Option<u64>,
}

impl Default for AdaptConfig {
    fn default() -> Self {
        Self {
            samples: default_samples(),
            rate: default_rate(),
            max_iterations: default_max_iterations(),
            tolerance: default_tolerance(),
            seed: None,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RewardConfig {
    #[serde(default = "default_reward_weight")]
    pub weight: f64,
    #[serde(default = "default_reward_threshold")]
    pub threshold: f64,
}

impl Default for RewardConfig {
    fn default() -> Self {
        Self {
            weight: default_reward_weight(),
            threshold: default_reward_threshold(),
        }
    }
}

impl DmpConfig {
    /// Validate ranges that serde cannot express
    pub fn validate(&self) -> Result<(), ConfigError> {
        let model = &self.model;
        if !model.gain.is_finite() || model.gain <= 0.0 {
            return Err(ConfigError::Invalid(format!("model.gain must be > 0, got {}", model.gain)));
        }
        if model.basis_count < 1 {
            return Err(ConfigError::Invalid("model.basis_count must be >= 1".to_string()));
        }
        if !model.bandwidth.is_finite() || model.bandwidth <= 0.0 {
            return Err(ConfigError::Invalid("model.bandwidth must be > 0".to_string()));
        }
        if model.obstacles.enabled && model.obstacles.beta < 0.0 {
            return Err(ConfigError::Invalid("model.obstacles.beta must be >= 0".to_string()));
        }
        let adapt = &self.adapt;
        if !(adapt.rate > 0.0 && adapt.rate <= 1.0) {
            return Err(ConfigError::Invalid(format!("adapt.rate must be in (0, 1], got {}", adapt.rate)));
        }
        if (adapt.samples as f64 * adapt.rate).floor() < 1.0 {
            return Err(ConfigError::Invalid(format!(
                "adapt.samples = {} at rate {} selects no elites",
                adapt.samples, adapt.rate
            )));
        }
        if adapt.max_iterations == 0 {
            return Err(ConfigError::Invalid("adapt.max_iterations must be >= 1".to_string()));
        }
        if adapt.tolerance.is_nan() || adapt.tolerance <= 0.0 {
            return Err(ConfigError::Invalid("adapt.tolerance must be > 0".to_string()));
        }
        if !(0.0..=1.0).contains(&self.reward.weight) {
            return Err(ConfigError::Invalid("reward.weight must be between 0 and 1".to_string()));
        }
        if !self.reward.threshold.is_finite() || self.reward.threshold < 0.0 {
            return Err(ConfigError::Invalid(format!(
                "reward.threshold must be finite and >= 0, got {}",
                self.reward.threshold
            )));
        }
        Ok(())
    }
}

fn default_gain() -> f64 { 25.0 }
fn default_basis_count() -> usize { 10 }
fn default_stabilize() -> bool { true }
fn default_bandwidth() -> f64 { 1.0 }
fn default_obstacle_gamma() -> f64 { 1200.0 }
fn default_obstacle_beta() -> f64 { 6.3662 }
fn default_reference_axis() -> [f64; 3] { [0.0, 0.0, 1.0] }
fn default_samples() -> usize { 20 }
fn default_rate() -> f64 { 0.5 }
fn default_max_iterations() -> usize { 200 }
fn default_tolerance() -> f64 { 0.01 }
fn default_reward_weight() -> f64 { 0.9 }
fn default_reward_threshold() -> f64 { 0.01 }

pub fn load_config(path: &str) -> Result<DmpConfig, ConfigError> {
    let config: DmpConfig = match std::fs::read_to_string(path) {
        Ok(contents) => match toml::from_str(&contents) {
            Ok(config) => config,
            Err(e) => {
                tracing::error!("Failed to parse config TOML: {}", e);
                return Err(ConfigError::Toml(e));
            }
        },
        Err(e) => {
            tracing::error!("Failed to read config file '{}': {}", path, e);
            return Err(ConfigError::Io(e));
        }
    };
    config.validate()?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_config_uses_defaults() {
        let config: DmpConfig = toml::from_str("").unwrap();
        assert_eq!(config.model.gain, 25.0);
        assert_eq!(config.model.basis_count, 10);
        assert!(config.model.stabilize);
        assert!(!config.model.obstacles.enabled);
        assert_eq!(config.model.obstacles.sign_rule, SignRule::DotProduct);
        assert_eq!(config.adapt.samples, 20);
        assert_eq!(config.adapt.seed, None);
        assert_eq!(config.reward.weight, 0.9);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_config() {
        let toml_str = r#"
            [model]
            gain = 40.0
            stabilize = false

            [model.obstacles]
            enabled = true
            sign_rule = "cross_product"
            reference_axis = [0.0, 1.0, 0.0]

            [adapt]
            samples = 8
            rate = 0.25
            seed = 11
        "#;
        let config: DmpConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.model.gain, 40.0);
        assert_eq!(config.model.basis_count, 10);
        assert!(!config.model.stabilize);
        assert_eq!(config.model.obstacles.sign_rule, SignRule::CrossProduct);
        assert_eq!(config.model.obstacles.reference_axis, [0.0, 1.0, 0.0]);
        assert_eq!(config.model.obstacles.gamma, 1200.0);
        assert_eq!(config.adapt.samples, 8);
        assert_eq!(config.adapt.seed, Some(11));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validation_rejects_bad_ranges() {
        let mut config = DmpConfig::default();
        config.adapt.rate = 0.01;
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));

        let mut config = DmpConfig::default();
        config.model.basis_count = 0;
        assert!(config.validate().is_err());

        let mut config = DmpConfig::default();
        config.model.gain = -3.0;
        assert!(config.validate().is_err());

        let mut config = DmpConfig::default();
        config.reward.weight = 1.1;
        assert!(config.validate().is_err());

        let mut config = DmpConfig::default();
        config.reward.threshold = -0.5;
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_unknown_sign_rule_fails_to_parse() {
        let result: Result<DmpConfig, _> = toml::from_str("[model.obstacles]\nsign_rule = \"sideways\"\n");
        assert!(result.is_err());
    }
}
