//! Peak height `ν = δc / σ`.

use crate::config::MassFunctionConfig;
use crate::variance::{sigma2_at_m_arr, sigma2_at_r_arr};
use hm_core::{Cosmology, DELTA_C, Error, PowerSpectrum, Result};

/// `δc / sqrt(σ²)` for each variance. Any `σ² <= 0` is a domain error.
pub fn nu_from_sigma2(sigma2: &[f64]) -> Result<Vec<f64>> {
    sigma2
        .iter()
        .enumerate()
        .map(|(i, &s2)| {
            if !s2.is_finite() || s2 <= 0.0 {
                return Err(Error::domain("nu", i, format!("sigma^2 must be > 0, got {s2}")));
            }
            Ok(DELTA_C / s2.sqrt())
        })
        .collect()
}

/// ν at each radius (Mpc/h).
pub fn nu_at_r_arr(
    radii: &[f64],
    power: PowerSpectrum<'_>,
    config: &MassFunctionConfig,
) -> Result<Vec<f64>> {
    nu_from_sigma2(&sigma2_at_r_arr(radii, power, config)?)
}

/// Scalar form of [`nu_at_r_arr`].
pub fn nu_at_r(radius: f64, power: PowerSpectrum<'_>, config: &MassFunctionConfig) -> Result<f64> {
    Ok(nu_at_r_arr(&[radius], power, config)?[0])
}

/// ν at the Lagrangian radius of each mass (Msun/h).
pub fn nu_at_m_arr(
    masses: &[f64],
    power: PowerSpectrum<'_>,
    cosmo: Cosmology,
    config: &MassFunctionConfig,
) -> Result<Vec<f64>> {
    nu_from_sigma2(&sigma2_at_m_arr(masses, power, cosmo, config)?)
}

/// Scalar form of [`nu_at_m_arr`].
pub fn nu_at_m(
    mass: f64,
    power: PowerSpectrum<'_>,
    cosmo: Cosmology,
    config: &MassFunctionConfig,
) -> Result<f64> {
    Ok(nu_at_m_arr(&[mass], power, cosmo, config)?[0])
}
