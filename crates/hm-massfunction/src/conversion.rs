//! Lagrangian mass ↔ radius conversion.
//!
//! `M = 4/3 π ρ̄_m R³` with `ρ̄_m = Ω_m · RHO_CRIT`; masses in Msun/h, radii in Mpc/h.

use hm_core::{Cosmology, Error, FOUR_THIRDS_PI, Result};

fn check_positive(stage: &'static str, what: &str, values: &[f64]) -> Result<()> {
    if let Some(i) = values.iter().position(|v| !v.is_finite() || *v <= 0.0) {
        return Err(Error::domain(
            stage,
            i,
            format!("{what} must be finite and > 0, got {}", values[i]),
        ));
    }
    Ok(())
}

pub(crate) fn check_masses(stage: &'static str, masses: &[f64]) -> Result<()> {
    check_positive(stage, "mass", masses)
}

pub(crate) fn check_radii(stage: &'static str, radii: &[f64]) -> Result<()> {
    check_positive(stage, "radius", radii)
}

/// Lagrangian mass (Msun/h) of each radius (Mpc/h).
pub fn r_to_m_arr(radii: &[f64], cosmo: Cosmology) -> Result<Vec<f64>> {
    cosmo.validate()?;
    check_radii("r_to_m", radii)?;
    let volume_to_mass = FOUR_THIRDS_PI * cosmo.rho_m();
    Ok(radii.iter().map(|r| volume_to_mass * r * r * r).collect())
}

/// Lagrangian radius (Mpc/h) of each mass (Msun/h). Exact inverse of [`r_to_m_arr`].
pub fn m_to_r_arr(masses: &[f64], cosmo: Cosmology) -> Result<Vec<f64>> {
    cosmo.validate()?;
    check_masses("m_to_r", masses)?;
    let volume_to_mass = FOUR_THIRDS_PI * cosmo.rho_m();
    Ok(masses.iter().map(|m| (m / volume_to_mass).cbrt()).collect())
}

/// Scalar form of [`r_to_m_arr`].
pub fn r_to_m(radius: f64, cosmo: Cosmology) -> Result<f64> {
    Ok(r_to_m_arr(&[radius], cosmo)?[0])
}

/// Scalar form of [`m_to_r_arr`].
pub fn m_to_r(mass: f64, cosmo: Cosmology) -> Result<f64> {
    Ok(m_to_r_arr(&[mass], cosmo)?[0])
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use hm_core::RHO_CRIT;
    use rand::prelude::*;

    #[test]
    fn test_known_value() {
        let cosmo = Cosmology::new(0.3).unwrap();
        let m = r_to_m(1.0, cosmo).unwrap();
        assert_relative_eq!(m, 4.0 / 3.0 * std::f64::consts::PI * RHO_CRIT * 0.3, max_relative = 1e-15);
        // 1 Mpc/h sphere at Ω_m = 0.3 holds ~3.5e11 Msun/h.
        assert!(m > 3.4e11 && m < 3.6e11);
    }

    #[test]
    fn test_roundtrip_random() {
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..1000 {
            let r = 10f64.powf(rng.random_range(-3.0..3.0));
            let om = rng.random_range(0.05..1.0);
            let cosmo = Cosmology::new(om).unwrap();
            let back = m_to_r(r_to_m(r, cosmo).unwrap(), cosmo).unwrap();
            assert_relative_eq!(back, r, max_relative = 1e-14);
        }
    }

    #[test]
    fn test_array_matches_scalar() {
        let cosmo = Cosmology::new(0.27).unwrap();
        let masses = [1e12, 3e13, 1e15];
        let radii = m_to_r_arr(&masses, cosmo).unwrap();
        for (m, r) in masses.iter().zip(&radii) {
            assert_eq!(m_to_r(*m, cosmo).unwrap(), *r);
        }
        assert!(radii.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn test_rejects_non_positive() {
        let cosmo = Cosmology::new(0.3).unwrap();
        let err = m_to_r_arr(&[1e13, 0.0, 1e14], cosmo).unwrap_err();
        assert!(matches!(err, Error::Domain { stage: "m_to_r", index: 1, .. }), "{err}");
        assert!(r_to_m(-1.0, cosmo).is_err());
        assert!(r_to_m(f64::NAN, cosmo).is_err());
        assert!(m_to_r(1e13, Cosmology { omega_m: -0.3 }).is_err());
    }

    #[test]
    fn test_empty_input() {
        let cosmo = Cosmology::new(0.3).unwrap();
        assert!(m_to_r_arr(&[], cosmo).unwrap().is_empty());
    }
}
