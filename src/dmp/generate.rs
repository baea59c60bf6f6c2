// src/dmp/generate.rs - Transformation system integration

use super::{BasisSet, DmpError, DynamicMovementPrimitive, Obstacle, Trajectory, Weights, check_len, validate_time};

impl DynamicMovementPrimitive {
    /// Roll out the transformation system for a set of weights
    ///
    /// Forward Euler over the time samples with step `time[i] - time[i-1]`
    /// (`time[0]` for the first sample), starting at rest at `x0`. Velocity
    /// is updated before position. The forcing term is the activation-
    /// normalized weight mixture scaled by `sigma`; when obstacle avoidance
    /// is enabled, the repulsion is evaluated on the state before the step,
    /// so the first sample sees `x0` at rest and gets no repulsion.
    ///
    /// # Returns
    /// * `Trajectory` - accelerations, velocities and positions per sample
    #[allow(clippy::too_many_arguments)]
    pub fn generate(
        &self,
        w: &Weights,
        x0: &[f64],
        g: &[f64],
        time: &[f64],
        s: &[f64],
        basis: &BasisSet,
        obstacles: &[Obstacle],
    ) -> Result<Trajectory, DmpError> {
        validate_time(time)?;
        check_len("generate", "phase", s.len(), time.len())?;
        check_len("generate", "basis", basis.len(), time.len())?;
        check_len("generate", "basis rows", basis.count(), self.ng)?;
        check_len("generate", "weight rows", w.count(), self.ng)?;
        let dims = x0.len();
        if dims == 0 {
            return Err(DmpError::invalid("generate", "start has no components"));
        }
        if g.len() != dims || w.dims() != dims {
            return Err(DmpError::invalid(
                "generate",
                format!("start has {} components, goal {}, weights {}", dims, g.len(), w.dims()),
            ));
        }

        let n = time.len();
        let tau = time[n - 1];
        let tau2 = tau * tau;
        let avoidance = self.obstacles.as_ref().filter(|_| !obstacles.is_empty());

        let mut out = Trajectory::zeros(n, dims);
        let mut x_r = x0.to_vec();
        let mut dx_r = vec![0.0; dims];
        for i in 0..n {
            let dt = if i == 0 { time[0] } else { time[i] - time[i - 1] };
            let coverage = basis.column_sum(i);
            let repulsion = match avoidance {
                Some(avoid) => avoid.repulsion(&x_r, &dx_r, g, obstacles)?,
                None => vec![0.0; dims],
            };

            for k in 0..dims {
                let (modulation, sigma) = self.modulation(s[i], x0[k], g[k]);
                let mixture = if coverage > 0.0 {
                    (0..self.ng).map(|j| basis.row(j)[i] * w.get(j, k)).sum::<f64>() / coverage
                } else {
                    0.0
                };
                let forcing = mixture * sigma;

                let ddx_r = (self.a * (self.b * (g[k] - x_r[k]) - tau * dx_r[k]) + forcing + modulation + repulsion[k]) / tau2;
                dx_r[k] += ddx_r * dt;
                x_r[k] += dx_r[k] * dt;

                out.acceleration[i][k] = ddx_r;
                out.velocity[i][k] = dx_r[k];
                out.position[i][k] = x_r[k];
            }
        }

        tracing::trace!("Rollout from {:?} towards {:?} ended at {:?}", x0, g, x_r);
        Ok(out)
    }
}
