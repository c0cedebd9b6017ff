//! Differential halo mass function
//!
//! ```text
//! dn/dM = G(σ(M)) · ρ̄_m / M · d ln σ⁻¹ / dM
//! ```
//!
//! The derivative is a centered finite difference with relative step `δ`:
//! `d ln σ⁻¹/dM ≈ ln(σ(M₋) / σ(M₊)) / (δ M)` with `M∓ = M (1 ∓ δ/2)`.
//! σ at `M`, `M₋` and `M₊` comes from a single batched variance call.

use crate::config::{MassFunctionConfig, validate_fd_step};
use crate::conversion::{check_masses, m_to_r_arr};
use crate::multiplicity::g_at_sigma_arr;
use crate::variance::TopHatVariance;
use hm_core::{Cosmology, Error, MultiplicityParams, PowerSpectrum, Result, VarianceSource};

const STAGE: &str = "dndm_at_m";

/// Variances at the three stencil points of every mass.
struct Stencil {
    center: Vec<f64>,
    lower: Vec<f64>,
    upper: Vec<f64>,
}

fn stencil_sigma2<S>(masses: &[f64], source: &S, cosmo: Cosmology, fd_step: f64) -> Result<Stencil>
where
    S: VarianceSource + ?Sized,
{
    let n = masses.len();
    if n == 0 {
        return Ok(Stencil { center: Vec::new(), lower: Vec::new(), upper: Vec::new() });
    }
    let mut stencil_masses = Vec::with_capacity(3 * n);
    stencil_masses.extend_from_slice(masses);
    stencil_masses.extend(masses.iter().map(|m| m * (1.0 - 0.5 * fd_step)));
    stencil_masses.extend(masses.iter().map(|m| m * (1.0 + 0.5 * fd_step)));

    let radii = m_to_r_arr(&stencil_masses, cosmo)?;
    let mut sigma2 = source.sigma2_at_r_arr(&radii).map_err(|e| match e {
        Error::Domain { index, .. } | Error::Convergence { index, .. } => e.reindex(STAGE, index % n),
        other => other,
    })?;
    if sigma2.len() != 3 * n {
        return Err(Error::Validation(format!(
            "variance source '{}' returned {} values for {} radii",
            source.name(),
            sigma2.len(),
            3 * n
        )));
    }

    let upper = sigma2.split_off(2 * n);
    let lower = sigma2.split_off(n);
    Ok(Stencil { center: sigma2, lower, upper })
}

/// `d ln σ⁻¹ / dM` at each mass (Msun/h) by centered finite difference.
///
/// Fails with a domain error if σ increases with mass anywhere, since the
/// mass function would come out negative there.
pub fn dlnsiginv_dm<S>(masses: &[f64], source: &S, cosmo: Cosmology, fd_step: f64) -> Result<Vec<f64>>
where
    S: VarianceSource + ?Sized,
{
    check_args(masses, cosmo, fd_step)?;
    let stencil = stencil_sigma2(masses, source, cosmo, fd_step)?;
    derivative_from_stencil(masses, &stencil, fd_step)
}

fn check_args(masses: &[f64], cosmo: Cosmology, fd_step: f64) -> Result<()> {
    cosmo.validate()?;
    check_masses(STAGE, masses)?;
    validate_fd_step(fd_step)
}

fn derivative_from_stencil(masses: &[f64], stencil: &Stencil, fd_step: f64) -> Result<Vec<f64>> {
    masses
        .iter()
        .enumerate()
        .map(|(i, &m)| {
            // ln(σ₋/σ₊) = ½ ln(σ²₋/σ²₊)
            let deriv = 0.5 * (stencil.lower[i] / stencil.upper[i]).ln() / (fd_step * m);
            if !deriv.is_finite() || deriv < 0.0 {
                return Err(Error::domain(
                    STAGE,
                    i,
                    format!(
                        "sigma(M) must decrease with mass, got d ln(1/sigma)/dM = {deriv:e} at M={m:e}"
                    ),
                ));
            }
            Ok(deriv)
        })
        .collect()
}

/// dn/dM at each mass with σ² from any [`VarianceSource`].
pub fn dndm_with_source<S>(
    masses: &[f64],
    source: &S,
    cosmo: Cosmology,
    params: &MultiplicityParams,
    fd_step: f64,
) -> Result<Vec<f64>>
where
    S: VarianceSource + ?Sized,
{
    check_args(masses, cosmo, fd_step)?;
    params.validate()?;
    tracing::debug!(stage = STAGE, n = masses.len(), source = source.name(), fd_step, "batch");

    let stencil = stencil_sigma2(masses, source, cosmo, fd_step)?;
    let deriv = derivative_from_stencil(masses, &stencil, fd_step)?;
    let sigmas: Vec<f64> = stencil.center.iter().map(|s2| s2.sqrt()).collect();
    let g = g_at_sigma_arr(&sigmas, params).map_err(|e| match e {
        Error::Domain { index, .. } => e.reindex(STAGE, index),
        other => other,
    })?;

    let rho_m = cosmo.rho_m();
    Ok(masses.iter().zip(g.iter().zip(&deriv)).map(|(m, (g, d))| g * rho_m / m * d).collect())
}

/// dn/dM at each mass (Msun/h) from a tabulated power spectrum.
pub fn dndm_at_m_arr(
    masses: &[f64],
    power: PowerSpectrum<'_>,
    cosmo: Cosmology,
    params: &MultiplicityParams,
    config: &MassFunctionConfig,
) -> Result<Vec<f64>> {
    config.validate()?;
    let source = TopHatVariance::new(power, config.quadrature)?;
    dndm_with_source(masses, &source, cosmo, params, config.fd_step)
}

/// Scalar form of [`dndm_at_m_arr`].
pub fn dndm_at_m(
    mass: f64,
    power: PowerSpectrum<'_>,
    cosmo: Cosmology,
    params: &MultiplicityParams,
    config: &MassFunctionConfig,
) -> Result<f64> {
    Ok(dndm_at_m_arr(&[mass], power, cosmo, params, config)?[0])
}
