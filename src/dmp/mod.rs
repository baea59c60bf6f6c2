// src/dmp/mod.rs - Dynamic Movement Primitive engine
//!
//! A demonstrated trajectory is encoded as a critically damped point
//! attractor modulated by a learned forcing term. The forcing term is a
//! normalized mixture of Gaussian basis functions laid over a canonical
//! phase signal, so the same weights can be replayed towards new start and
//! goal positions, bent around obstacles, or refined by reward-weighted
//! search.
//!
//! Stages, leaves first:
//! 1. [`phase`] - canonical decay signal
//! 2. [`basis`] - Gaussian basis activations ([`BasisSet`])
//! 3. [`imitate`] - forcing target and locally weighted regression
//! 4. [`generate`] - forward Euler integration of the transformation system
//! 5. [`adapt`] - reward-weighted stochastic search over the weights

pub mod adapt;
pub mod basis;
pub mod generate;
pub mod imitate;
pub mod obstacle;
pub mod phase;
pub mod reward;
pub mod trajectory;

pub use adapt::{AdaptOptions, Adaptation};
pub use basis::BasisSet;
pub use imitate::Imitation;
pub use obstacle::{Obstacle, ObstacleAvoidance, SignRule, obstacles_from_records};
pub use reward::{RewardParams, reward};
pub use trajectory::{Trajectory, Weights, min_jerk};

use crate::config::ModelConfig;
use thiserror::Error;

/// Errors raised by the DMP stages
#[derive(Debug, Error)]
pub enum DmpError {
    #[error("Invalid input to {stage}: {reason}")]
    InvalidInput { stage: &'static str, reason: String },
    #[error("Numeric degeneracy in {stage} at index {index}: {reason}")]
    NumericDegeneracy {
        stage: &'static str,
        index: usize,
        reason: String,
    },
    #[error(
        "Adaptation did not converge after {iterations} iterations (best distance to goal {best_distance:.6})"
    )]
    NonConvergence {
        iterations: usize,
        best_distance: f64,
        reward_trace: Vec<f64>,
    },
}

impl DmpError {
    pub(crate) fn invalid(stage: &'static str, reason: impl Into<String>) -> Self {
        DmpError::InvalidInput {
            stage,
            reason: reason.into(),
        }
    }

    pub(crate) fn degenerate(stage: &'static str, index: usize, reason: impl Into<String>) -> Self {
        DmpError::NumericDegeneracy {
            stage,
            index,
            reason: reason.into(),
        }
    }
}

/// Dynamic Movement Primitive model parameters
///
/// `b` and the canonical decay rate are always derived from the gain `a`
/// at construction and never change afterwards.
#[derive(Debug, Clone)]
pub struct DynamicMovementPrimitive {
    /// Transformation system stiffness
    a: f64,

    /// Damping gain, `a / 4` (critical damping)
    b: f64,

    /// Canonical system decay rate, `a / 3`
    as_deg: f64,

    /// Number of Gaussian basis functions
    ng: usize,

    /// Scale the forcing term by `g - x0` and add the stabilization term
    stabilize: bool,

    /// Obstacle repulsion, `None` when disabled
    obstacles: Option<ObstacleAvoidance>,
}

impl DynamicMovementPrimitive {
    /// Create a new model with obstacle avoidance disabled
    ///
    /// # Arguments
    /// * `a` - Gain of the transformation system
    /// * `ng` - Number of Gaussian basis functions
    /// * `stabilize` - Enable the stabilization term
    pub fn new(a: f64, ng: usize, stabilize: bool) -> Result<Self, DmpError> {
        if !a.is_finite() || a <= 0.0 {
            return Err(DmpError::invalid("model", format!("gain must be positive and finite, got {}", a)));
        }
        if ng < 1 {
            return Err(DmpError::invalid("model", "basis count must be at least 1"));
        }
        Ok(Self {
            a,
            b: a / 4.0,
            as_deg: a / 3.0,
            ng,
            stabilize,
            obstacles: None,
        })
    }

    /// Enable obstacle repulsion during generation
    pub fn with_obstacle_avoidance(mut self, avoidance: ObstacleAvoidance) -> Self {
        self.obstacles = Some(avoidance);
        self
    }

    pub fn from_config(config: &ModelConfig) -> Result<Self, DmpError> {
        let model = Self::new(config.gain, config.basis_count, config.stabilize)?;
        if config.obstacles.enabled {
            Ok(model.with_obstacle_avoidance(ObstacleAvoidance::from_config(&config.obstacles)))
        } else {
            Ok(model)
        }
    }

    pub fn a(&self) -> f64 {
        self.a
    }

    pub fn b(&self) -> f64 {
        self.b
    }

    pub fn as_deg(&self) -> f64 {
        self.as_deg
    }

    pub fn basis_count(&self) -> usize {
        self.ng
    }

    pub fn stabilize(&self) -> bool {
        self.stabilize
    }

    pub fn obstacle_avoidance(&self) -> Option<&ObstacleAvoidance> {
        self.obstacles.as_ref()
    }

    /// Stabilization term and regression signal for one sample and dimension
    ///
    /// Returns `(mod, sigma)`: `(b (g - x0) s, (g - x0) s)` when stabilizing,
    /// `(0, s)` otherwise.
    pub(crate) fn modulation(&self, s: f64, x0: f64, g: f64) -> (f64, f64) {
        if self.stabilize {
            (self.b * (g - x0) * s, (g - x0) * s)
        } else {
            (0.0, s)
        }
    }
}

/// Check that a time vector is usable by every stage
///
/// Requires at least two finite, non-negative, strictly increasing samples.
pub fn validate_time(time: &[f64]) -> Result<(), DmpError> {
    if time.len() < 2 {
        return Err(DmpError::invalid(
            "time",
            format!("need at least 2 samples, got {}", time.len()),
        ));
    }
    for (i, &t) in time.iter().enumerate() {
        if !t.is_finite() || t < 0.0 {
            return Err(DmpError::invalid("time", format!("sample {} is {} (must be finite and >= 0)", i, t)));
        }
        if i > 0 && t <= time[i - 1] {
            return Err(DmpError::invalid(
                "time",
                format!("not strictly increasing at index {} ({} after {})", i, t, time[i - 1]),
            ));
        }
    }
    Ok(())
}

pub(crate) fn check_len(stage: &'static str, what: &str, got: usize, expected: usize) -> Result<(), DmpError> {
    if got != expected {
        return Err(DmpError::invalid(
            stage,
            format!("{} has {} samples, expected {}", what, got, expected),
        ));
    }
    Ok(())
}
