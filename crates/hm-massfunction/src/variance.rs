//! Variance of the linear density field smoothed with a spherical top-hat.
//!
//! ```text
//! σ²(R) = 1/(2π²) ∫ k³ P(k) W²(kR) d ln k,     W(x) = 3 (sin x − x cos x) / x³
//! ```
//!
//! P(k) is interpolated with a natural cubic spline over the caller's table and
//! the integral runs over `[ln k_min, ln k_max]` of that table. The caller is
//! responsible for a k range wide enough for the radii requested: large radii
//! need small `k_min`, small radii need large `k_max`.

use crate::config::MassFunctionConfig;
use crate::conversion::{check_masses, check_radii, m_to_r_arr};
use hm_core::{Cosmology, Error, PowerSpectrum, Result, VarianceSource};
use hm_numeric::{AdaptiveIntegrator, CubicSpline, QuadratureConfig};
#[cfg(feature = "parallel")]
use rayon::prelude::*;
use std::f64::consts::PI;

const STAGE: &str = "sigma2_at_r";
const STAGE_DERIV: &str = "dsigma2_dr_at_r";

/// Below this `x` the window and its derivative use their Taylor series.
const SERIES_CUTOFF: f64 = 0.1;

/// Equal pieces of `[ln k_min, ln k_max]` every integral starts from.
const LN_K_PIECES: usize = 32;

/// Fourier transform of the spherical top-hat, `W(x) = 3 (sin x − x cos x) / x³`.
#[inline]
pub fn top_hat_window(x: f64) -> f64 {
    if x.abs() < SERIES_CUTOFF {
        let x2 = x * x;
        return 1.0 + x2 * (-1.0 / 10.0 + x2 * (1.0 / 280.0 - x2 / 15120.0));
    }
    let (s, c) = x.sin_cos();
    3.0 * (s - x * c) / (x * x * x)
}

/// `dW/dx = 3 [(x² − 3) sin x + 3x cos x] / x⁴`.
#[inline]
pub fn top_hat_window_deriv(x: f64) -> f64 {
    if x.abs() < SERIES_CUTOFF {
        let x2 = x * x;
        return x * (-1.0 / 5.0 + x2 * (1.0 / 70.0 - x2 / 2520.0));
    }
    let (s, c) = x.sin_cos();
    let x2 = x * x;
    3.0 * ((x2 - 3.0) * s + 3.0 * x * c) / (x2 * x2)
}

/// σ²(R) from a tabulated power spectrum.
///
/// Holds the P(k) spline and the quadrature tables for one pipeline call.
#[derive(Debug, Clone)]
pub struct TopHatVariance<'a> {
    spline: CubicSpline<'a>,
    ln_k_min: f64,
    ln_k_max: f64,
    integrator: AdaptiveIntegrator,
}

impl<'a> TopHatVariance<'a> {
    /// Fit the P(k) spline and prepare the integrator.
    pub fn new(power: PowerSpectrum<'a>, quadrature: QuadratureConfig) -> Result<Self> {
        let spline = CubicSpline::natural(power.k(), power.p())?;
        let (k_min, k_max) = power.k_range();
        let integrator = AdaptiveIntegrator::new(quadrature)?;
        Ok(Self { spline, ln_k_min: k_min.ln(), ln_k_max: k_max.ln(), integrator })
    }

    /// `k³ P(k)` at `ln k`.
    #[inline]
    fn k3p(&self, ln_k: f64) -> (f64, f64) {
        let k = ln_k.exp();
        (k, k * k * k * self.spline.eval_clamped(k))
    }

    /// Starting partition in `ln k` for radius `R`.
    ///
    /// `W²(kR)` oscillates with period π in `kR`, so the range is cut at
    /// `k = jπ/R` as well as into [`LN_K_PIECES`] equal pieces. At most a
    /// quarter of the subdivision budget goes into the starting partition;
    /// past that the oscillation cuts are thinned to every m-th period.
    fn breakpoints(&self, radius: f64) -> Vec<f64> {
        let cap = self.integrator.config().max_subdivisions / 4;
        let n_uniform = (LN_K_PIECES - 1).min(cap / 2);
        let span = self.ln_k_max - self.ln_k_min;
        let mut points: Vec<f64> = (1..=n_uniform)
            .map(|i| self.ln_k_min + span * i as f64 / (n_uniform + 1) as f64)
            .collect();

        let n_periodic = cap - n_uniform;
        let x_min = self.ln_k_min.exp() * radius / PI;
        let x_max = self.ln_k_max.exp() * radius / PI;
        let j_lo = x_min.floor() as usize + 1;
        let j_hi = (x_max.ceil() as usize).saturating_sub(1);
        if n_periodic > 0 && j_hi >= j_lo {
            let stride = (j_hi - j_lo + 1).div_ceil(n_periodic);
            points.extend((j_lo..=j_hi).step_by(stride).map(|j| (j as f64 * PI / radius).ln()));
        }

        points.retain(|x| *x > self.ln_k_min && *x < self.ln_k_max);
        points.sort_by(f64::total_cmp);
        points.dedup();
        points
    }

    fn sigma2_one(&self, index: usize, radius: f64) -> Result<f64> {
        let integrand = |ln_k: f64| {
            let (k, k3p) = self.k3p(ln_k);
            let w = top_hat_window(k * radius);
            k3p * w * w
        };
        let breaks = self.breakpoints(radius);
        let r = self
            .integrator
            .integrate_with_breakpoints(integrand, self.ln_k_min, self.ln_k_max, &breaks)
            .map_err(|e| e.reindex(STAGE, index))?;
        tracing::trace!(index, radius, n_intervals = r.n_intervals, abs_error = r.abs_error, "sigma2 integral");

        let sigma2 = r.value / (2.0 * PI * PI);
        if !sigma2.is_finite() || sigma2 <= 0.0 {
            return Err(Error::domain(
                STAGE,
                index,
                format!("sigma^2 must be > 0, got {sigma2} at R={radius}"),
            ));
        }
        Ok(sigma2)
    }

    fn dsigma2_dr_one(&self, index: usize, radius: f64) -> Result<f64> {
        let integrand = |ln_k: f64| {
            let (k, k3p) = self.k3p(ln_k);
            let x = k * radius;
            k3p * 2.0 * top_hat_window(x) * top_hat_window_deriv(x) * k
        };
        let breaks = self.breakpoints(radius);
        let r = self
            .integrator
            .integrate_with_breakpoints(integrand, self.ln_k_min, self.ln_k_max, &breaks)
            .map_err(|e| e.reindex(STAGE_DERIV, index))?;
        tracing::trace!(index, radius, n_intervals = r.n_intervals, "dsigma2/dR integral");
        Ok(r.value / (2.0 * PI * PI))
    }

    /// Analytic radial derivative dσ²/dR at each radius (Mpc/h).
    pub fn dsigma2_dr_arr(&self, radii: &[f64]) -> Result<Vec<f64>> {
        check_radii(STAGE_DERIV, radii)?;
        tracing::debug!(stage = STAGE_DERIV, n = radii.len(), "batch");
        map_indexed(radii, |i, r| self.dsigma2_dr_one(i, r))
    }
}

impl VarianceSource for TopHatVariance<'_> {
    fn sigma2_at_r_arr(&self, radii: &[f64]) -> Result<Vec<f64>> {
        check_radii(STAGE, radii)?;
        tracing::debug!(stage = STAGE, n = radii.len(), source = self.name(), "batch");
        map_indexed(radii, |i, r| self.sigma2_one(i, r))
    }

    fn name(&self) -> &str {
        "top-hat"
    }
}

/// Evaluate `f(index, value)` over a batch, stopping at the first error.
#[cfg(not(feature = "parallel"))]
fn map_indexed<F>(values: &[f64], f: F) -> Result<Vec<f64>>
where
    F: Fn(usize, f64) -> Result<f64> + Sync,
{
    values.iter().enumerate().map(|(i, &v)| f(i, v)).collect()
}

/// Evaluate `f(index, value)` over a batch on the rayon pool. Output order
/// matches input order, and a failing batch reports its lowest failing index,
/// as the serial path does.
#[cfg(feature = "parallel")]
fn map_indexed<F>(values: &[f64], f: F) -> Result<Vec<f64>>
where
    F: Fn(usize, f64) -> Result<f64> + Sync,
{
    let results: Vec<Result<f64>> = values.par_iter().enumerate().map(|(i, &v)| f(i, v)).collect();
    results.into_iter().collect()
}

/// σ² at each radius (Mpc/h).
pub fn sigma2_at_r_arr(
    radii: &[f64],
    power: PowerSpectrum<'_>,
    config: &MassFunctionConfig,
) -> Result<Vec<f64>> {
    config.validate()?;
    TopHatVariance::new(power, config.quadrature)?.sigma2_at_r_arr(radii)
}

/// Scalar form of [`sigma2_at_r_arr`].
pub fn sigma2_at_r(radius: f64, power: PowerSpectrum<'_>, config: &MassFunctionConfig) -> Result<f64> {
    Ok(sigma2_at_r_arr(&[radius], power, config)?[0])
}

/// σ² at the Lagrangian radius of each mass (Msun/h).
pub fn sigma2_at_m_arr(
    masses: &[f64],
    power: PowerSpectrum<'_>,
    cosmo: Cosmology,
    config: &MassFunctionConfig,
) -> Result<Vec<f64>> {
    check_masses("sigma2_at_m", masses)?;
    let radii = m_to_r_arr(masses, cosmo)?;
    sigma2_at_r_arr(&radii, power, config)
}

/// Scalar form of [`sigma2_at_m_arr`].
pub fn sigma2_at_m(
    mass: f64,
    power: PowerSpectrum<'_>,
    cosmo: Cosmology,
    config: &MassFunctionConfig,
) -> Result<f64> {
    Ok(sigma2_at_m_arr(&[mass], power, cosmo, config)?[0])
}

/// dσ²/dR at each radius (Mpc/h), integrated directly rather than differenced.
pub fn dsigma2_dr_at_r_arr(
    radii: &[f64],
    power: PowerSpectrum<'_>,
    config: &MassFunctionConfig,
) -> Result<Vec<f64>> {
    config.validate()?;
    TopHatVariance::new(power, config.quadrature)?.dsigma2_dr_arr(radii)
}

/// Scalar form of [`dsigma2_dr_at_r_arr`].
pub fn dsigma2_dr_at_r(
    radius: f64,
    power: PowerSpectrum<'_>,
    config: &MassFunctionConfig,
) -> Result<f64> {
    Ok(dsigma2_dr_at_r_arr(&[radius], power, config)?[0])
}
