//! Core traits for HaloMass
//!
//! The mass function only needs σ²(R); it does not care whether that comes
//! from integrating a tabulated power spectrum or from a closed-form model.
//! [`VarianceSource`] is that seam.

use crate::Result;

/// Anything that can produce the smoothed variance σ²(R).
pub trait VarianceSource: Send + Sync {
    /// σ² at each Lagrangian radius (Mpc/h). Output index matches input index.
    ///
    /// Implementations fail the whole batch on the first bad element.
    fn sigma2_at_r_arr(&self, radii: &[f64]) -> Result<Vec<f64>>;

    /// Source name, used in log events.
    fn name(&self) -> &str;
}
