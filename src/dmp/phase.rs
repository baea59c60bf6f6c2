// src/dmp/phase.rs - Canonical system

use super::{DmpError, DynamicMovementPrimitive, validate_time};

impl DynamicMovementPrimitive {
    /// Canonical phase for a time vector
    ///
    /// `s[i] = exp(-as_deg * i / (N - 1))`. Only the number of samples
    /// matters, so `s[0] == 1` and the signal decays monotonically to
    /// `exp(-as_deg)` at the last sample.
    pub fn phase(&self, time: &[f64]) -> Result<Vec<f64>, DmpError> {
        validate_time(time)?;
        let last = (time.len() - 1) as f64;
        let s: Vec<f64> = (0..time.len())
            .map(|i| (-self.as_deg * i as f64 / last).exp())
            .collect();
        tracing::debug!("Phase over {} samples decays to {:.3e}", s.len(), s[s.len() - 1]);
        Ok(s)
    }
}
