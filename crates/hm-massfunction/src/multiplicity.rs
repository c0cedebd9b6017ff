//! Universal multiplicity function
//!
//! ```text
//! G(σ) = B · exp(−g/σ²) · [ (σ/e)^(−d) + σ^(−f) ]
//! B    = 2 / [ eᵈ · g^(−d/2) · Γ(d/2) + g^(−f/2) · Γ(f/2) ]
//! ```
//!
//! B normalizes `∫ G(σ) d ln σ⁻¹` over `(0, ∞)` to one. It is computed as
//! `ln B` on every call; nothing is cached between parameter sets.

use crate::config::MassFunctionConfig;
use crate::variance::sigma2_at_m_arr;
use hm_core::{Cosmology, Error, MultiplicityParams, PowerSpectrum, Result};
use hm_numeric::math::log_add_exp;
use statrs::function::gamma::ln_gamma;

const STAGE: &str = "multiplicity";

/// `ln B` for the shape parameters.
///
/// Built from `ln Γ` and a log-sum, so it stays finite for shape parameters
/// where `Γ(d/2)` or `eᵈ` alone would overflow.
pub fn ln_normalization(params: &MultiplicityParams) -> Result<f64> {
    params.validate()?;
    let MultiplicityParams { d, e, f, g } = *params;
    let d2 = 0.5 * d;
    let f2 = 0.5 * f;
    let ln_g = g.ln();
    let ln_denom = log_add_exp(d * e.ln() - d2 * ln_g + ln_gamma(d2), -f2 * ln_g + ln_gamma(f2));
    let ln_b = std::f64::consts::LN_2 - ln_denom;
    if !ln_b.is_finite() {
        return Err(Error::domain(
            STAGE,
            0,
            format!("normalization is not finite (ln B={ln_b}) for {params:?}"),
        ));
    }
    Ok(ln_b)
}

/// Normalization constant `B` for the shape parameters.
///
/// May underflow to 0 for extreme shapes; [`g_at_sigma_arr`] works from
/// [`ln_normalization`] and is unaffected.
pub fn normalization(params: &MultiplicityParams) -> Result<f64> {
    Ok(ln_normalization(params)?.exp())
}

/// G(σ) for each σ.
///
/// Evaluated as `exp(ln B − g/σ² + ln[(σ/e)^(−d) + σ^(−f)])`, so the power
/// terms never overflow for tiny σ and the result underflows to 0 instead.
pub fn g_at_sigma_arr(sigmas: &[f64], params: &MultiplicityParams) -> Result<Vec<f64>> {
    let ln_b = ln_normalization(params)?;
    let MultiplicityParams { d, e, f, g } = *params;
    sigmas
        .iter()
        .enumerate()
        .map(|(i, &sigma)| {
            if !sigma.is_finite() || sigma <= 0.0 {
                return Err(Error::domain(STAGE, i, format!("sigma must be finite and > 0, got {sigma}")));
            }
            let ln_sigma = sigma.ln();
            let ln_powers = log_add_exp(-d * (ln_sigma - e.ln()), -f * ln_sigma);
            Ok((ln_b - g / (sigma * sigma) + ln_powers).exp())
        })
        .collect()
}

/// Scalar form of [`g_at_sigma_arr`].
pub fn g_at_sigma(sigma: f64, params: &MultiplicityParams) -> Result<f64> {
    Ok(g_at_sigma_arr(&[sigma], params)?[0])
}

/// G(σ(M)) for each mass (Msun/h), with σ from the top-hat variance.
pub fn g_at_m_arr(
    masses: &[f64],
    power: PowerSpectrum<'_>,
    cosmo: Cosmology,
    params: &MultiplicityParams,
    config: &MassFunctionConfig,
) -> Result<Vec<f64>> {
    params.validate()?;
    let sigmas: Vec<f64> =
        sigma2_at_m_arr(masses, power, cosmo, config)?.into_iter().map(f64::sqrt).collect();
    g_at_sigma_arr(&sigmas, params)
}

/// Scalar form of [`g_at_m_arr`].
pub fn g_at_m(
    mass: f64,
    power: PowerSpectrum<'_>,
    cosmo: Cosmology,
    params: &MultiplicityParams,
    config: &MassFunctionConfig,
) -> Result<f64> {
    Ok(g_at_m_arr(&[mass], power, cosmo, params, config)?[0])
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use hm_numeric::{AdaptiveIntegrator, QuadratureConfig};

    fn tinker() -> MultiplicityParams {
        MultiplicityParams::new(1.97, 1.0, 0.51, 1.228).unwrap()
    }

    #[test]
    fn test_normalization_unit_params() {
        // d = e = f = g = 1: B = 2 / (2 Γ(1/2)) = 1/√π.
        let params = MultiplicityParams::new(1.0, 1.0, 1.0, 1.0).unwrap();
        assert_relative_eq!(normalization(&params).unwrap(), 1.0 / std::f64::consts::PI.sqrt(), max_relative = 1e-12);
    }

    #[test]
    fn test_matches_direct_formula() {
        let p = tinker();
        let b = normalization(&p).unwrap();
        for sigma in [0.3, 0.7, 1.0, 2.5] {
            let direct = b
                * (-p.g / (sigma * sigma)).exp()
                * ((sigma / p.e).powf(-p.d) + sigma.powf(-p.f));
            assert_relative_eq!(g_at_sigma(sigma, &p).unwrap(), direct, max_relative = 1e-12);
        }
    }

    #[test]
    fn test_integrates_to_unity() {
        // ∫ G d ln σ⁻¹ = ∫ G(e^{-u}) du over u = ln σ⁻¹ ∈ (-∞, ∞).
        let integ = AdaptiveIntegrator::new(QuadratureConfig { rel_tol: 1e-10, ..Default::default() }).unwrap();
        for p in [tinker(), MultiplicityParams::new(1.0, 1.0, 1.0, 1.0).unwrap(), MultiplicityParams::new(2.3, 0.8, 1.4, 0.6).unwrap()] {
            let total = integ
                .integrate(|u: f64| g_at_sigma((-u).exp(), &p).unwrap(), -40.0, 10.0)
                .unwrap();
            assert_relative_eq!(total.value, 1.0, max_relative = 1e-6);
        }
    }

    #[test]
    fn test_positive_and_vanishing_limits() {
        let p = tinker();
        let sigmas: Vec<f64> = (0..60).map(|i| 10f64.powf(-0.7 + 0.05 * i as f64)).collect();
        let g = g_at_sigma_arr(&sigmas, &p).unwrap();
        assert!(g.iter().all(|v| *v > 0.0 && v.is_finite()));

        assert_eq!(g_at_sigma(1e-3, &p).unwrap(), 0.0);
        assert!(g_at_sigma(1e-10, &p).unwrap().is_finite());
        assert!(g_at_sigma(1e6, &p).unwrap() < 1e-2);
        assert!(g_at_sigma(1e12, &p).unwrap() < 1e-5);
    }

    #[test]
    fn test_invalid_inputs() {
        let p = tinker();
        let err = g_at_sigma_arr(&[0.5, -1.0], &p).unwrap_err();
        assert!(matches!(err, Error::Domain { stage: "multiplicity", index: 1, .. }), "{err}");
        assert!(g_at_sigma(0.0, &p).is_err());
        let bad = MultiplicityParams { d: 1.0, e: 1.0, f: 0.0, g: 1.0 };
        assert!(normalization(&bad).is_err());
        assert!(ln_normalization(&bad).is_err());
        assert!(g_at_sigma(1.0, &bad).is_err());
    }

    #[test]
    fn test_ln_normalization_matches_gamma_form() {
        use statrs::function::gamma::gamma;
        for p in [tinker(), MultiplicityParams::new(2.3, 0.8, 1.4, 0.6).unwrap()] {
            let direct = 2.0
                / (p.e.powf(p.d) * p.g.powf(-0.5 * p.d) * gamma(0.5 * p.d)
                    + p.g.powf(-0.5 * p.f) * gamma(0.5 * p.f));
            assert_relative_eq!(ln_normalization(&p).unwrap(), direct.ln(), max_relative = 1e-12);
            assert_relative_eq!(normalization(&p).unwrap(), direct, max_relative = 1e-12);
        }
    }

    #[test]
    fn test_steep_shape_stays_normalized() {
        // Γ(200) overflows f64; ln B ≈ ln 2 − ln Γ(200) does not.
        let p = MultiplicityParams::new(400.0, 1.0, 1.0, 1.0).unwrap();
        let ln_b = ln_normalization(&p).unwrap();
        assert_relative_eq!(ln_b, std::f64::consts::LN_2 - ln_gamma(200.0), max_relative = 1e-12);
        assert_eq!(normalization(&p).unwrap(), 0.0);

        let g = g_at_sigma(0.07, &p).unwrap();
        assert!(g.is_finite() && g > 0.0, "{g}");

        // The peak sits at ln σ⁻¹ = ½ ln(d / 2g) ≈ 2.65 with width ~0.05.
        let breaks: Vec<f64> = (1..50).map(|i| 1.5 + 0.05 * i as f64).collect();
        let integ = AdaptiveIntegrator::new(QuadratureConfig { rel_tol: 1e-10, ..Default::default() }).unwrap();
        let total = integ
            .integrate_with_breakpoints(|u: f64| g_at_sigma((-u).exp(), &p).unwrap(), 1.5, 4.0, &breaks)
            .unwrap();
        assert_relative_eq!(total.value, 1.0, max_relative = 1e-6);
    }

    #[test]
    fn test_normalization_tracks_parameters() {
        let a = normalization(&tinker()).unwrap();
        let b = normalization(&MultiplicityParams { g: 2.0, ..tinker() }).unwrap();
        assert!((a - b).abs() > 1e-3);
    }
}
