// src/dmp/reward.rs - Goal-reaching reward

use serde::{Deserialize, Serialize};

use super::{DmpError, check_len};
use crate::config::RewardConfig;

/// Reward shaping constants
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RewardParams {
    /// Share of the reward given to the final sample
    pub weight: f64,

    /// How close a sample time must be to `tau` to count as final
    pub threshold: f64,
}

impl Default for RewardParams {
    fn default() -> Self {
        Self {
            weight: 0.9,
            threshold: 0.01,
        }
    }
}

impl RewardParams {
    pub fn from_config(config: &RewardConfig) -> Self {
        Self {
            weight: config.weight,
            threshold: config.threshold,
        }
    }

    /// `weight` must lie in [0, 1] and `threshold` must be finite and non-negative
    pub fn validate(&self) -> Result<(), DmpError> {
        if !(0.0..=1.0).contains(&self.weight) {
            return Err(DmpError::invalid(
                "reward",
                format!("weight must be between 0 and 1, got {}", self.weight),
            ));
        }
        if !self.threshold.is_finite() || self.threshold < 0.0 {
            return Err(DmpError::invalid(
                "reward",
                format!("threshold must be finite and >= 0, got {}", self.threshold),
            ));
        }
        Ok(())
    }
}

/// Reward of one trajectory sample
///
/// `w exp(-|goal - position|)` when `time` is within `threshold` of `tau`,
/// otherwise `(1 - w) exp(-|goal - position|) / tau`.
pub fn reward(goal: &[f64], position: &[f64], time: f64, tau: f64, w: f64, threshold: f64) -> f64 {
    let distance = goal
        .iter()
        .zip(position)
        .map(|(g, x)| (g - x) * (g - x))
        .sum::<f64>()
        .sqrt();
    if (time - tau).abs() < threshold {
        w * (-distance).exp()
    } else {
        (1.0 - w) * (-distance).exp() / tau
    }
}

/// Sum of [`reward`] over a whole rollout
///
/// `tau` is the last time sample; `positions` needs one row per sample.
pub fn trajectory_reward(
    goal: &[f64],
    positions: &[Vec<f64>],
    time: &[f64],
    params: &RewardParams,
) -> Result<f64, DmpError> {
    let Some(&tau) = time.last() else {
        return Err(DmpError::invalid("reward", "time has no samples"));
    };
    check_len("reward", "positions", positions.len(), time.len())?;
    Ok(positions
        .iter()
        .zip(time)
        .map(|(x, &t)| reward(goal, x, t, tau, params.weight, params.threshold))
        .sum())
}
