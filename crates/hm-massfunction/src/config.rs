//! Pipeline configuration.

use hm_core::{Error, Result};
use hm_numeric::QuadratureConfig;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Default relative step `δ` of the centered mass finite difference.
///
/// Masses are perturbed to `M(1 ∓ δ/2)`. Much larger steps bias the
/// derivative through the curvature of σ(M); much smaller ones lose digits to
/// cancellation in `ln(σ₋/σ₊)` against the quadrature tolerance.
pub const DEFAULT_FD_STEP: f64 = 1e-6;

/// Largest accepted finite-difference step.
pub const MAX_FD_STEP: f64 = 0.1;

/// Numerical settings shared by every stage of the mass-function pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MassFunctionConfig {
    /// Settings of the σ² integral.
    pub quadrature: QuadratureConfig,
    /// Relative mass step of the d ln σ⁻¹/dM finite difference.
    pub fd_step: f64,
}

impl Default for MassFunctionConfig {
    fn default() -> Self {
        Self { quadrature: QuadratureConfig::default(), fd_step: DEFAULT_FD_STEP }
    }
}

impl MassFunctionConfig {
    /// Parse a configuration from JSON. Missing fields take their defaults.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let cfg: Self = serde_json::from_str(json)?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Read and parse a JSON configuration file.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }

    /// Check every field.
    pub fn validate(&self) -> Result<()> {
        self.quadrature.validate()?;
        validate_fd_step(self.fd_step)
    }
}

/// `fd_step` must lie in `(0, MAX_FD_STEP]`.
pub(crate) fn validate_fd_step(fd_step: f64) -> Result<()> {
    if !fd_step.is_finite() || fd_step <= 0.0 || fd_step > MAX_FD_STEP {
        return Err(Error::Validation(format!(
            "fd_step must be in (0, {MAX_FD_STEP}], got {fd_step}"
        )));
    }
    Ok(())
}
