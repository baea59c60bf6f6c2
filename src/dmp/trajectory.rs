// src/dmp/trajectory.rs - Trajectory and weight containers
use serde::{Deserialize, Serialize};

use super::{DmpError, check_len, validate_time};

/// Position, velocity and acceleration samples of a D-dimensional motion
///
/// Every sample is a row of length D. One-dimensional motion uses D = 1.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trajectory {
    /// Position samples
    pub position: Vec<Vec<f64>>,

    /// Velocity samples
    pub velocity: Vec<Vec<f64>>,

    /// Acceleration samples
    pub acceleration: Vec<Vec<f64>>,
}

impl Trajectory {
    pub fn new(
        position: Vec<Vec<f64>>,
        velocity: Vec<Vec<f64>>,
        acceleration: Vec<Vec<f64>>,
    ) -> Result<Self, DmpError> {
        if position.is_empty() {
            return Err(DmpError::invalid("trajectory", "no samples"));
        }
        check_len("trajectory", "velocity", velocity.len(), position.len())?;
        check_len("trajectory", "acceleration", acceleration.len(), position.len())?;
        let dims = position[0].len();
        if dims == 0 {
            return Err(DmpError::invalid("trajectory", "samples have no components"));
        }
        for (name, series) in [("position", &position), ("velocity", &velocity), ("acceleration", &acceleration)] {
            if let Some(i) = series.iter().position(|row| row.len() != dims) {
                return Err(DmpError::invalid(
                    "trajectory",
                    format!("{} sample {} has {} components, expected {}", name, i, series[i].len(), dims),
                ));
            }
        }
        Ok(Self {
            position,
            velocity,
            acceleration,
        })
    }

    /// Build a one-dimensional trajectory from scalar sequences
    pub fn from_scalar(x: &[f64], dx: &[f64], ddx: &[f64]) -> Result<Self, DmpError> {
        let lift = |v: &[f64]| v.iter().map(|&e| vec![e]).collect::<Vec<_>>();
        Self::new(lift(x), lift(dx), lift(ddx))
    }

    /// Build a trajectory from positions alone
    ///
    /// Velocity and acceleration are finite differences over the (possibly
    /// uneven) time grid: second-order central differences inside, one-sided
    /// differences at both ends.
    pub fn from_positions(time: &[f64], position: Vec<Vec<f64>>) -> Result<Self, DmpError> {
        validate_time(time)?;
        check_len("trajectory", "position", position.len(), time.len())?;
        let velocity = differentiate(time, &position);
        let acceleration = differentiate(time, &velocity);
        Self::new(position, velocity, acceleration)
    }

    pub(crate) fn zeros(len: usize, dims: usize) -> Self {
        Self {
            position: vec![vec![0.0; dims]; len],
            velocity: vec![vec![0.0; dims]; len],
            acceleration: vec![vec![0.0; dims]; len],
        }
    }

    pub fn len(&self) -> usize {
        self.position.len()
    }

    pub fn is_empty(&self) -> bool {
        self.position.is_empty()
    }

    pub fn dims(&self) -> usize {
        self.position.first().map_or(0, |row| row.len())
    }

    /// First position sample
    pub fn start(&self) -> &[f64] {
        &self.position[0]
    }

    /// Last position sample
    pub fn goal(&self) -> &[f64] {
        &self.position[self.position.len() - 1]
    }

    /// Positions of a single dimension
    pub fn column(&self, k: usize) -> Vec<f64> {
        self.position.iter().map(|row| row[k]).collect()
    }
}

fn differentiate(time: &[f64], series: &[Vec<f64>]) -> Vec<Vec<f64>> {
    let n = series.len();
    let dims = series[0].len();
    (0..n)
        .map(|i| {
            (0..dims)
                .map(|k| {
                    if i == 0 {
                        (series[1][k] - series[0][k]) / (time[1] - time[0])
                    } else if i == n - 1 {
                        (series[i][k] - series[i - 1][k]) / (time[i] - time[i - 1])
                    } else {
                        let hs = time[i] - time[i - 1];
                        let hd = time[i + 1] - time[i];
                        (hs * hs * series[i + 1][k] + (hd * hd - hs * hs) * series[i][k] - hd * hd * series[i - 1][k])
                            / (hs * hd * (hd + hs))
                    }
                })
                .collect()
        })
        .collect()
}

/// Basis weights, one row per basis function and one column per dimension
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Weights {
    rows: Vec<Vec<f64>>,
}

impl Weights {
    /// Weights for one-dimensional motion
    pub fn from_vec(w: Vec<f64>) -> Self {
        Self {
            rows: w.into_iter().map(|v| vec![v]).collect(),
        }
    }

    pub fn from_rows(rows: Vec<Vec<f64>>) -> Result<Self, DmpError> {
        let dims = rows.first().map_or(0, |r| r.len());
        if rows.is_empty() || dims == 0 {
            return Err(DmpError::invalid("weights", "weight matrix is empty"));
        }
        if let Some(j) = rows.iter().position(|r| r.len() != dims) {
            return Err(DmpError::invalid(
                "weights",
                format!("row {} has {} columns, expected {}", j, rows[j].len(), dims),
            ));
        }
        Ok(Self { rows })
    }

    pub fn zeros(count: usize, dims: usize) -> Self {
        Self {
            rows: vec![vec![0.0; dims]; count],
        }
    }

    /// Number of basis functions
    pub fn count(&self) -> usize {
        self.rows.len()
    }

    pub fn dims(&self) -> usize {
        self.rows.first().map_or(0, |r| r.len())
    }

    pub fn get(&self, j: usize, k: usize) -> f64 {
        self.rows[j][k]
    }

    pub fn rows(&self) -> &[Vec<f64>] {
        &self.rows
    }

    pub(crate) fn rows_mut(&mut self) -> &mut [Vec<f64>] {
        &mut self.rows
    }

    /// Weights of a single dimension
    pub fn column(&self, k: usize) -> Vec<f64> {
        self.rows.iter().map(|r| r[k]).collect()
    }
}

/// Minimum-jerk point-to-point motion (Flash & Hogan quintic)
///
/// Starts and ends at rest with zero acceleration; each dimension follows
/// `x0 + (g - x0)(10u^3 - 15u^4 + 6u^5)` with `u` the normalized time.
pub fn min_jerk(x0: &[f64], g: &[f64], time: &[f64]) -> Result<Trajectory, DmpError> {
    validate_time(time)?;
    if x0.is_empty() {
        return Err(DmpError::invalid("min_jerk", "start has no components"));
    }
    check_len("min_jerk", "goal", g.len(), x0.len())?;

    let t0 = time[0];
    let duration = time[time.len() - 1] - t0;
    let mut trajectory = Trajectory::zeros(time.len(), x0.len());
    for (i, &t) in time.iter().enumerate() {
        let u = (t - t0) / duration;
        let shape = u.powi(3) * (10.0 - 15.0 * u + 6.0 * u * u);
        let rate = u * u * (30.0 - 60.0 * u + 30.0 * u * u) / duration;
        let curve = u * (60.0 - 180.0 * u + 120.0 * u * u) / (duration * duration);
        for k in 0..x0.len() {
            let span = g[k] - x0[k];
            trajectory.position[i][k] = x0[k] + span * shape;
            trajectory.velocity[i][k] = span * rate;
            trajectory.acceleration[i][k] = span * curve;
        }
    }
    Ok(trajectory)
}
