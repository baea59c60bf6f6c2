// src/dmp/adapt.rs - Reward-weighted policy search over basis weights
use rand::Rng;
use rand_distr::{Distribution, StandardNormal};

use super::reward::trajectory_reward;
use super::{BasisSet, DmpError, DynamicMovementPrimitive, RewardParams, Trajectory, Weights};
use crate::config::DmpConfig;

/// Search settings for [`DynamicMovementPrimitive::adapt`]
#[derive(Debug, Clone)]
pub struct AdaptOptions {
    /// Candidate rollouts per iteration
    pub samples: usize,

    /// Fraction of candidates kept as elites
    pub rate: f64,

    /// Give up after this many iterations
    pub max_iterations: usize,

    /// Required distance between the best elite's final position and the goal
    pub tolerance: f64,

    pub reward: RewardParams,
}

impl Default for AdaptOptions {
    fn default() -> Self {
        Self {
            samples: 20,
            rate: 0.5,
            max_iterations: 200,
            tolerance: 0.01,
            reward: RewardParams::default(),
        }
    }
}

impl AdaptOptions {
    pub fn from_config(config: &DmpConfig) -> Self {
        Self {
            samples: config.adapt.samples,
            rate: config.adapt.rate,
            max_iterations: config.adapt.max_iterations,
            tolerance: config.adapt.tolerance,
            reward: RewardParams::from_config(&config.reward),
        }
    }

    /// `floor(samples * rate)`
    pub fn elite_count(&self) -> usize {
        (self.samples as f64 * self.rate).floor() as usize
    }

    fn validate(&self) -> Result<(), DmpError> {
        if self.samples == 0 {
            return Err(DmpError::invalid("adapt", "samples must be at least 1"));
        }
        if !(self.rate > 0.0 && self.rate <= 1.0) {
            return Err(DmpError::invalid("adapt", format!("rate must be in (0, 1], got {}", self.rate)));
        }
        if self.elite_count() == 0 {
            return Err(DmpError::invalid(
                "adapt",
                format!("{} samples at rate {} leave no elites", self.samples, self.rate),
            ));
        }
        if self.max_iterations == 0 {
            return Err(DmpError::invalid("adapt", "max_iterations must be at least 1"));
        }
        if self.tolerance.is_nan() || self.tolerance <= 0.0 {
            return Err(DmpError::invalid("adapt", "tolerance must be positive"));
        }
        self.reward.validate()
    }
}

/// Outcome of a converged search
#[derive(Debug, Clone)]
pub struct Adaptation {
    /// Rollout of the winning candidate
    pub trajectory: Trajectory,

    /// Weights of the winning candidate
    pub weights: Weights,

    /// Running sum of the best candidate reward per iteration
    pub reward_trace: Vec<f64>,

    pub iterations: usize,
}

impl DynamicMovementPrimitive {
    /// Refine weights until a rollout lands on the goal
    ///
    /// Each iteration perturbs the current weights with Gaussian noise whose
    /// spread for basis `j` is the standard deviation over time of
    /// `psv[j] * w[j]`, rolls out every candidate, scores it with the summed
    /// reward, and moves the weights by the reward-weighted mean of the elite
    /// perturbations. Stops when the best elite ends within
    /// `options.tolerance` of `g`, or fails with
    /// [`DmpError::NonConvergence`] after `options.max_iterations`.
    ///
    /// All noise of an iteration is drawn from `rng` before any rollout, so a
    /// seeded generator gives the same result with or without the
    /// `parallel` feature.
    #[allow(clippy::too_many_arguments)]
    pub fn adapt<R: Rng + ?Sized>(
        &self,
        w: &Weights,
        x0: &[f64],
        g: &[f64],
        time: &[f64],
        s: &[f64],
        basis: &BasisSet,
        options: &AdaptOptions,
        rng: &mut R,
    ) -> Result<Adaptation, DmpError> {
        options.validate()?;
        if w.count() != basis.count() {
            return Err(DmpError::invalid(
                "adapt",
                format!("{} weight rows for {} basis functions", w.count(), basis.count()),
            ));
        }

        let elites = options.elite_count();
        let dims = w.dims();
        let basis_spread: Vec<f64> = basis.rows().iter().map(|row| population_std(row)).collect();

        let mut current = w.clone();
        let mut gains = Vec::new();
        let mut best_distance = f64::INFINITY;

        for iteration in 1..=options.max_iterations {
            let mut exploration = Vec::with_capacity(options.samples);
            for _ in 0..options.samples {
                let mut noise = Weights::zeros(current.count(), dims);
                for (j, row) in noise.rows_mut().iter_mut().enumerate() {
                    for (k, v) in row.iter_mut().enumerate() {
                        let z: f64 = StandardNormal.sample(&mut *rng);
                        *v = z * basis_spread[j] * current.get(j, k).abs();
                    }
                }
                exploration.push(noise);
            }

            let candidates: Vec<Weights> = exploration
                .iter()
                .map(|noise| {
                    let mut candidate = current.clone();
                    for (row, delta) in candidate.rows_mut().iter_mut().zip(noise.rows()) {
                        for (v, d) in row.iter_mut().zip(delta) {
                            *v += d;
                        }
                    }
                    candidate
                })
                .collect();

            let mut rollouts = self.rollouts(&candidates, x0, g, time, s, basis)?;
            let scores = rollouts
                .iter()
                .map(|r| trajectory_reward(g, &r.position, time, &options.reward))
                .collect::<Result<Vec<f64>, DmpError>>()?;

            let order = rank_descending(&scores);
            let elite = &order[..elites];

            let total: f64 = elite.iter().map(|&e| scores[e]).sum();
            if !total.is_finite() || total <= f64::EPSILON {
                return Err(DmpError::degenerate(
                    "adapt",
                    iteration,
                    format!("elite reward sum {} cannot weight an update", total),
                ));
            }
            for (j, row) in current.rows_mut().iter_mut().enumerate() {
                for (k, v) in row.iter_mut().enumerate() {
                    *v += elite
                        .iter()
                        .map(|&e| exploration[e].get(j, k) * scores[e])
                        .sum::<f64>()
                        / total;
                }
            }

            let best = elite[0];
            gains.push(scores[best]);
            let distance = euclidean(rollouts[best].goal(), g);
            best_distance = best_distance.min(distance);
            tracing::debug!(
                "Adapt iteration {}: best reward {:.4}, final distance {:.5}",
                iteration,
                scores[best],
                distance
            );

            if distance < options.tolerance {
                tracing::info!("Adaptation converged after {} iterations", iteration);
                return Ok(Adaptation {
                    trajectory: rollouts.swap_remove(best),
                    weights: candidates[best].clone(),
                    reward_trace: cumulative(&gains),
                    iterations: iteration,
                });
            }
        }

        tracing::warn!(
            "Adaptation stopped after {} iterations, best distance {:.5}",
            options.max_iterations,
            best_distance
        );
        Err(DmpError::NonConvergence {
            iterations: options.max_iterations,
            best_distance,
            reward_trace: cumulative(&gains),
        })
    }

    #[cfg(not(feature = "parallel"))]
    fn rollouts(
        &self,
        candidates: &[Weights],
        x0: &[f64],
        g: &[f64],
        time: &[f64],
        s: &[f64],
        basis: &BasisSet,
    ) -> Result<Vec<Trajectory>, DmpError> {
        candidates
            .iter()
            .map(|c| self.generate(c, x0, g, time, s, basis, &[]))
            .collect()
    }

    #[cfg(feature = "parallel")]
    fn rollouts(
        &self,
        candidates: &[Weights],
        x0: &[f64],
        g: &[f64],
        time: &[f64],
        s: &[f64],
        basis: &BasisSet,
    ) -> Result<Vec<Trajectory>, DmpError> {
        use rayon::prelude::*;

        candidates
            .par_iter()
            .map(|c| self.generate(c, x0, g, time, s, basis, &[]))
            .collect()
    }
}

/// Candidate indices by descending score; ties keep their order and NaN ranks last
fn rank_descending(scores: &[f64]) -> Vec<usize> {
    let mut order: Vec<usize> = (0..scores.len()).collect();
    order.sort_by(|&p, &q| match (scores[p].is_nan(), scores[q].is_nan()) {
        (false, false) => scores[q].total_cmp(&scores[p]),
        (p_nan, q_nan) => p_nan.cmp(&q_nan),
    });
    order
}

fn population_std(values: &[f64]) -> f64 {
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    (values.iter().map(|v| (v - mean) * (v - mean)).sum::<f64>() / n).sqrt()
}

fn euclidean(a: &[f64], b: &[f64]) -> f64 {
    a.iter().zip(b).map(|(p, q)| (p - q) * (p - q)).sum::<f64>().sqrt()
}

fn cumulative(values: &[f64]) -> Vec<f64> {
    values
        .iter()
        .scan(0.0, |acc, v| {
            *acc += v;
            Some(*acc)
        })
        .collect()
}
