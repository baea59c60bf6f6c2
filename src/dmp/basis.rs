// src/dmp/basis.rs - Gaussian basis functions over the phase domain

use super::{DmpError, DynamicMovementPrimitive};

/// Gaussian kernel `exp(-h (s - c)^2)`
pub fn psi(h: f64, c: f64, s: f64) -> f64 {
    (-h * (s - c) * (s - c)).exp()
}

/// Precomputed Gaussian activations for one (phase, basis count) pair
///
/// Build once with [`DynamicMovementPrimitive::distributions`] and reuse it
/// across imitation, generation and adaptation on the same phase signal.
#[derive(Debug, Clone)]
pub struct BasisSet {
    /// `ng x N` activations, one row per center, one column per sample
    activations: Vec<Vec<f64>>,

    /// Centers divided by the spacing
    centers: Vec<f64>,

    /// Distance between adjacent centers in the phase domain
    spacing: f64,

    /// Kernel bandwidth
    bandwidth: f64,

    /// `sum_j activations[j][i]` for each sample
    column_sums: Vec<f64>,
}

impl BasisSet {
    /// Number of basis functions
    pub fn count(&self) -> usize {
        self.activations.len()
    }

    /// Number of phase samples
    pub fn len(&self) -> usize {
        self.column_sums.len()
    }

    pub fn is_empty(&self) -> bool {
        self.column_sums.is_empty()
    }

    pub fn row(&self, j: usize) -> &[f64] {
        &self.activations[j]
    }

    pub fn rows(&self) -> &[Vec<f64>] {
        &self.activations
    }

    pub fn centers(&self) -> &[f64] {
        &self.centers
    }

    pub fn spacing(&self) -> f64 {
        self.spacing
    }

    pub fn bandwidth(&self) -> f64 {
        self.bandwidth
    }

    pub fn column_sum(&self, i: usize) -> f64 {
        self.column_sums[i]
    }

    /// Activation of basis `j` at an arbitrary phase value
    pub fn activation(&self, j: usize, s: f64) -> f64 {
        psi(self.bandwidth, self.centers[j], s / self.spacing)
    }
}

impl DynamicMovementPrimitive {
    /// Place `ng` Gaussians evenly over `[min(s), max(s)]`
    ///
    /// Centers and phase samples are both divided by the center spacing
    /// before the kernel is evaluated, so `h` is measured in units of that
    /// spacing. A single basis sits at the midpoint of the phase range and
    /// uses the full range as its spacing.
    pub fn distributions(&self, s: &[f64], h: f64) -> Result<BasisSet, DmpError> {
        if s.is_empty() {
            return Err(DmpError::invalid("basis", "phase signal is empty"));
        }
        if !h.is_finite() || h <= 0.0 {
            return Err(DmpError::invalid("basis", format!("bandwidth must be positive, got {}", h)));
        }
        if let Some(i) = s.iter().position(|v| !v.is_finite()) {
            return Err(DmpError::invalid("basis", format!("phase sample {} is not finite", i)));
        }

        let lo = s.iter().cloned().fold(f64::INFINITY, f64::min);
        let hi = s.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
        let (raw_centers, spacing) = if self.ng == 1 {
            (vec![0.5 * (lo + hi)], hi - lo)
        } else {
            let d = (hi - lo) / (self.ng - 1) as f64;
            ((0..self.ng).map(|k| lo + d * k as f64).collect::<Vec<_>>(), d)
        };
        if spacing.is_nan() || spacing <= 0.0 {
            return Err(DmpError::degenerate(
                "basis",
                0,
                format!("phase range [{}, {}] gives zero center spacing", lo, hi),
            ));
        }

        let centers: Vec<f64> = raw_centers.iter().map(|c| c / spacing).collect();
        let activations: Vec<Vec<f64>> = centers
            .iter()
            .map(|&c| s.iter().map(|&v| psi(h, c, v / spacing)).collect())
            .collect();
        let column_sums: Vec<f64> = (0..s.len())
            .map(|i| activations.iter().map(|row| row[i]).sum())
            .collect();

        tracing::debug!("Built {}x{} basis (spacing {:.4}, h {})", self.ng, s.len(), spacing, h);
        Ok(BasisSet {
            activations,
            centers,
            spacing,
            bandwidth: h,
            column_sums,
        })
    }
}
