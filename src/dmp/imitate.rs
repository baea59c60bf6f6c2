// src/dmp/imitate.rs - Imitation learning by locally weighted regression

use super::{BasisSet, DmpError, DynamicMovementPrimitive, Trajectory, Weights, check_len, validate_time};

/// Result of imitating a demonstration
#[derive(Debug, Clone)]
pub struct Imitation {
    /// Target forcing signal, one row per sample
    pub forcing: Vec<Vec<f64>>,

    /// Regressed basis weights
    pub weights: Weights,
}

impl DynamicMovementPrimitive {
    /// Learn basis weights from a demonstrated trajectory
    ///
    /// The target forcing for sample `i` and dimension `k` is
    /// `tau^2 ddx - a (b (g - x) - tau dx) + mod`, with `g`, `x0` taken from
    /// the last and first demonstrated positions and `tau` from the last time
    /// sample. Each weight is the basis-weighted least-squares projection of
    /// that signal onto `sigma`.
    ///
    /// A (basis, dimension) pair whose regression denominator vanishes
    /// relative to `sum p * max sigma^2` gets weight 0 rather than NaN. The
    /// test is scale-free, so a demonstration spanning 1e-9 regresses the
    /// same weights as one spanning 1.
    pub fn imitate(
        &self,
        demo: &Trajectory,
        time: &[f64],
        s: &[f64],
        basis: &BasisSet,
    ) -> Result<Imitation, DmpError> {
        validate_time(time)?;
        check_len("imitate", "trajectory", demo.len(), time.len())?;
        check_len("imitate", "phase", s.len(), time.len())?;
        check_len("imitate", "basis", basis.len(), time.len())?;
        check_len("imitate", "basis rows", basis.count(), self.ng)?;

        let n = time.len();
        let dims = demo.dims();
        let tau = time[n - 1];
        let x0 = demo.start();
        let g = demo.goal();

        let mut forcing = vec![vec![0.0; dims]; n];
        let mut sigma = vec![vec![0.0; dims]; n];
        for i in 0..n {
            for k in 0..dims {
                let (modulation, sig) = self.modulation(s[i], x0[k], g[k]);
                let x = demo.position[i][k];
                let dx = demo.velocity[i][k];
                let ddx = demo.acceleration[i][k];
                forcing[i][k] = tau * tau * ddx - self.a * (self.b * (g[k] - x) - tau * dx) + modulation;
                sigma[i][k] = sig;
            }
        }

        let mut weights = Weights::zeros(self.ng, dims);
        for (j, row) in weights.rows_mut().iter_mut().enumerate() {
            let p = basis.row(j);
            for k in 0..dims {
                let mut num = 0.0;
                let mut den = 0.0;
                let mut support = 0.0;
                let mut peak: f64 = 0.0;
                for i in 0..n {
                    num += sigma[i][k] * p[i] * forcing[i][k];
                    den += sigma[i][k] * p[i] * sigma[i][k];
                    support += p[i];
                    peak = peak.max(sigma[i][k] * sigma[i][k]);
                }
                // floor relative to the activation mass and signal scale
                row[k] = if den > f64::EPSILON * support * peak {
                    num / den
                } else {
                    tracing::warn!("Basis {} has no support in dimension {}, weight set to 0", j, k);
                    0.0
                };
            }
        }

        tracing::debug!("Imitated {} samples x {} dims onto {} bases", n, dims, self.ng);
        Ok(Imitation { forcing, weights })
    }
}
