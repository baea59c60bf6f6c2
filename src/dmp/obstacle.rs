// src/dmp/obstacle.rs - Obstacle repulsion term
//!
//! The repulsion magnitude depends on the angle `phi` between the current
//! velocity and the direction towards each obstacle. The sign of `phi`
//! decides which way the motion is pushed, and there are two rules for it:
//!
//! - [`SignRule::DotProduct`] negates `phi` when the obstacle lies behind
//!   the direction of travel. This is the historical behavior; it only
//!   distinguishes front from back, never left from right, so it does not
//!   carry over to 3-D motion.
//! - [`SignRule::CrossProduct`] negates `phi` when `v x (o - x)` points
//!   against a reference axis (the z axis by default), which is the planar
//!   left/right test and extends to 3-D for a chosen reference.
//!
//! Neither rule is settled as correct for 3-D input, so the rule is a
//! configuration choice.

use serde::{Deserialize, Serialize};

use super::DmpError;
use crate::config::ObstacleConfig;

/// Speeds at or below this produce no repulsion
pub const VELOCITY_THRESHOLD: f64 = 0.00005;

/// How the sign of the steering angle is decided
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum SignRule {
    /// Negative when the obstacle is behind the direction of travel
    #[default]
    DotProduct,
    /// Negative when `v x (o - x)` opposes the reference axis
    CrossProduct,
}

/// Obstacle position; only three components are ever used
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Obstacle {
    pub position: [f64; 3],
}

impl Obstacle {
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self { position: [x, y, z] }
    }

    /// Take the first three components of a record
    pub fn from_record(record: &[f64]) -> Result<Self, DmpError> {
        if record.len() < 3 {
            return Err(DmpError::invalid(
                "obstacle",
                format!("record has {} components, need at least 3", record.len()),
            ));
        }
        if record[..3].iter().any(|v| !v.is_finite()) {
            return Err(DmpError::invalid("obstacle", "record has non-finite coordinates"));
        }
        Ok(Self::new(record[0], record[1], record[2]))
    }
}

/// Convert raw records, skipping the ones that are unusable
pub fn obstacles_from_records(records: &[Vec<f64>]) -> Vec<Obstacle> {
    records
        .iter()
        .enumerate()
        .filter_map(|(i, record)| match Obstacle::from_record(record) {
            Ok(o) => Some(o),
            Err(e) => {
                tracing::warn!("Skipping obstacle {}: {}", i, e);
                None
            }
        })
        .collect()
}

/// Gains and sign rule for the repulsion term
#[derive(Debug, Clone, PartialEq)]
pub struct ObstacleAvoidance {
    /// Repulsion gain
    pub gamma: f64,

    /// Angular sharpness of the repulsion
    pub beta: f64,

    pub sign_rule: SignRule,

    /// Axis used by [`SignRule::CrossProduct`]
    pub reference_axis: [f64; 3],
}

impl Default for ObstacleAvoidance {
    fn default() -> Self {
        Self {
            gamma: 1200.0,
            beta: 6.3662,
            sign_rule: SignRule::DotProduct,
            reference_axis: [0.0, 0.0, 1.0],
        }
    }
}

impl ObstacleAvoidance {
    pub fn from_config(config: &ObstacleConfig) -> Self {
        Self {
            gamma: config.gamma,
            beta: config.beta,
            sign_rule: config.sign_rule,
            reference_axis: config.reference_axis,
        }
    }

    /// Summed repulsion for the current state
    ///
    /// Works in the first `min(D, 3)` components of position, velocity and
    /// goal. Each obstacle closer than the goal contributes
    /// `gamma * phi * exp(-beta |phi|)` to every component of the result.
    pub fn repulsion(&self, x: &[f64], dx: &[f64], g: &[f64], obstacles: &[Obstacle]) -> Result<Vec<f64>, DmpError> {
        if dx.len() != x.len() || g.len() != x.len() {
            return Err(DmpError::invalid(
                "obstacle",
                format!("position has {} components, velocity {}, goal {}", x.len(), dx.len(), g.len()),
            ));
        }
        let mut p = vec![0.0; x.len()];
        if obstacles.is_empty() {
            return Ok(p);
        }
        let m = x.len().min(3);
        let x3 = pad(x, m);
        let v3 = pad(dx, m);
        let g3 = pad(g, m);
        let speed = norm(&v3);
        if speed <= VELOCITY_THRESHOLD {
            return Ok(p);
        }
        let goal_distance = norm(&sub(&g3, &x3));

        for obstacle in obstacles {
            let o3 = pad(&obstacle.position, m);
            let r = sub(&o3, &x3);
            let distance = norm(&r);
            if distance == 0.0 || distance > goal_distance {
                continue;
            }
            let alignment = dot(&v3, &r);
            let phi = (alignment / (distance * speed)).clamp(-1.0, 1.0).acos();
            let negative = match self.sign_rule {
                SignRule::DotProduct => alignment < 0.0,
                SignRule::CrossProduct => dot(&cross(&v3, &r), &self.reference_axis) < 0.0,
            };
            let phi = if negative { -phi } else { phi };
            let dphi = self.gamma * phi * (-self.beta * phi.abs()).exp();
            for component in p.iter_mut() {
                *component += dphi;
            }
        }
        Ok(p)
    }
}

fn pad(v: &[f64], m: usize) -> [f64; 3] {
    let mut out = [0.0; 3];
    out[..m].copy_from_slice(&v[..m]);
    out
}

fn sub(a: &[f64; 3], b: &[f64; 3]) -> [f64; 3] {
    [a[0] - b[0], a[1] - b[1], a[2] - b[2]]
}

fn dot(a: &[f64; 3], b: &[f64; 3]) -> f64 {
    a[0] * b[0] + a[1] * b[1] + a[2] * b[2]
}

fn norm(a: &[f64; 3]) -> f64 {
    dot(a, a).sqrt()
}

fn cross(a: &[f64; 3], b: &[f64; 3]) -> [f64; 3] {
    [
        a[1] * b[2] - a[2] * b[1],
        a[2] * b[0] - a[0] * b[2],
        a[0] * b[1] - a[1] * b[0],
    ]
}
