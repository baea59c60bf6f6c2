// src/lib.rs - Dynamic Movement Primitive engine
//!
//! Encode a demonstrated trajectory as a nonlinear dynamical system, replay
//! it towards new start and goal positions, bend it around obstacles, and
//! refine it with reward-weighted search.
//!
//! ```
//! use dmp_rs::{DynamicMovementPrimitive, min_jerk};
//!
//! let dmp = DynamicMovementPrimitive::new(25.0, 10, true)?;
//! let time: Vec<f64> = (0..100).map(|i| i as f64 / 99.0).collect();
//! let s = dmp.phase(&time)?;
//! let basis = dmp.distributions(&s, 1.0)?;
//!
//! let demo = min_jerk(&[0.0], &[1.0], &time)?;
//! let learned = dmp.imitate(&demo, &time, &s, &basis)?;
//! let replay = dmp.generate(&learned.weights, &[0.0], &[2.0], &time, &s, &basis, &[])?;
//! assert!((replay.goal()[0] - 2.0).abs() < 0.05);
//! # Ok::<(), dmp_rs::DmpError>(())
//! ```

pub mod config;
pub mod dmp;

pub use config::{ConfigError, DmpConfig, load_config};
pub use dmp::{
    AdaptOptions, Adaptation, BasisSet, DmpError, DynamicMovementPrimitive, Imitation, Obstacle,
    ObstacleAvoidance, RewardParams, SignRule, Trajectory, Weights, min_jerk, obstacles_from_records, reward,
};
