//! Common data types for HaloMass

use crate::{Error, Result};
use serde::{Deserialize, Serialize};

/// Check that `xs` is a usable interpolation grid: at least `min_len` finite
/// points in strictly increasing order.
pub fn validate_grid(name: &str, xs: &[f64], min_len: usize) -> Result<()> {
    if xs.len() < min_len {
        return Err(Error::Validation(format!(
            "{name} requires at least {min_len} points, got {}",
            xs.len()
        )));
    }
    if let Some(i) = xs.iter().position(|x| !x.is_finite()) {
        return Err(Error::Validation(format!("{name}[{i}] is not finite: {}", xs[i])));
    }
    for i in 1..xs.len() {
        if xs[i] <= xs[i - 1] {
            return Err(Error::Validation(format!(
                "{name} must be strictly increasing, but {name}[{}]={} >= {name}[{}]={}",
                i - 1,
                xs[i - 1],
                i,
                xs[i]
            )));
        }
    }
    Ok(())
}

/// Tabulated linear matter power spectrum `P(k)`.
///
/// Borrows the caller's arrays for the duration of one pipeline call.
/// `k` is in h/Mpc and `P(k)` in (Mpc/h)³.
#[derive(Debug, Clone, Copy)]
pub struct PowerSpectrum<'a> {
    k: &'a [f64],
    p: &'a [f64],
}

impl<'a> PowerSpectrum<'a> {
    /// Minimum number of samples (a natural cubic spline needs three knots).
    pub const MIN_POINTS: usize = 3;

    /// Validate and wrap a `(k, P(k))` table.
    ///
    /// `k` must be positive and strictly increasing, `P(k)` finite and `>= 0`.
    pub fn new(k: &'a [f64], p: &'a [f64]) -> Result<Self> {
        if k.len() != p.len() {
            return Err(Error::Validation(format!(
                "power spectrum: k length ({}) != P length ({})",
                k.len(),
                p.len()
            )));
        }
        validate_grid("k", k, Self::MIN_POINTS)?;
        if k[0] <= 0.0 {
            return Err(Error::Validation(format!("k must be > 0, got k[0]={}", k[0])));
        }
        if let Some(i) = p.iter().position(|v| !v.is_finite() || *v < 0.0) {
            return Err(Error::Validation(format!(
                "P(k) must be finite and >= 0, got P[{i}]={}",
                p[i]
            )));
        }
        Ok(Self { k, p })
    }

    /// Wavenumbers (h/Mpc).
    pub fn k(&self) -> &'a [f64] {
        self.k
    }

    /// Power at each wavenumber ((Mpc/h)³).
    pub fn p(&self) -> &'a [f64] {
        self.p
    }

    /// Number of samples.
    pub fn len(&self) -> usize {
        self.k.len()
    }

    /// Always `false` for a validated table.
    pub fn is_empty(&self) -> bool {
        self.k.is_empty()
    }

    /// `(k_min, k_max)`.
    pub fn k_range(&self) -> (f64, f64) {
        (self.k[0], self.k[self.k.len() - 1])
    }
}

/// Tabulated differential mass function `(M, dn/dM)`.
///
/// Masses in Msun/h, strictly increasing. Input to the binned integrator only.
#[derive(Debug, Clone, Copy)]
pub struct MassFunctionTable<'a> {
    masses: &'a [f64],
    dndm: &'a [f64],
}

impl<'a> MassFunctionTable<'a> {
    /// Minimum number of rows.
    pub const MIN_POINTS: usize = 3;

    /// Validate and wrap a mass-function table.
    pub fn new(masses: &'a [f64], dndm: &'a [f64]) -> Result<Self> {
        if masses.len() != dndm.len() {
            return Err(Error::Validation(format!(
                "mass function table: masses length ({}) != dndm length ({})",
                masses.len(),
                dndm.len()
            )));
        }
        validate_grid("masses", masses, Self::MIN_POINTS)?;
        if masses[0] <= 0.0 {
            return Err(Error::Validation(format!(
                "masses must be > 0, got masses[0]={}",
                masses[0]
            )));
        }
        if let Some(i) = dndm.iter().position(|v| !v.is_finite()) {
            return Err(Error::Validation(format!("dndm[{i}] is not finite: {}", dndm[i])));
        }
        Ok(Self { masses, dndm })
    }

    /// Masses (Msun/h).
    pub fn masses(&self) -> &'a [f64] {
        self.masses
    }

    /// dn/dM at each mass.
    pub fn dndm(&self) -> &'a [f64] {
        self.dndm
    }

    /// `(M_min, M_max)` support of the table.
    pub fn support(&self) -> (f64, f64) {
        (self.masses[0], self.masses[self.masses.len() - 1])
    }
}

/// Background cosmology needed to convert between mass and radius.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Cosmology {
    /// Matter density fraction today.
    pub omega_m: f64,
}

impl Cosmology {
    /// Create a validated cosmology.
    pub fn new(omega_m: f64) -> Result<Self> {
        let cosmo = Self { omega_m };
        cosmo.validate()?;
        Ok(cosmo)
    }

    /// Parse and validate a cosmology from JSON, e.g. `{"omega_m": 0.3}`.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let cosmo: Self = serde_json::from_str(json)?;
        cosmo.validate()?;
        Ok(cosmo)
    }

    /// Check `omega_m` is finite and positive.
    pub fn validate(&self) -> Result<()> {
        if !self.omega_m.is_finite() || self.omega_m <= 0.0 {
            return Err(Error::domain(
                "cosmology",
                0,
                format!("omega_m must be finite and > 0, got {}", self.omega_m),
            ));
        }
        Ok(())
    }

    /// Mean matter density `omega_m * RHO_CRIT` (Msun h² / Mpc³).
    pub fn rho_m(&self) -> f64 {
        self.omega_m * crate::RHO_CRIT
    }
}

/// Shape parameters `(d, e, f, g)` of the multiplicity function
/// `G(σ) = B exp(-g/σ²) [(σ/e)^-d + σ^-f]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MultiplicityParams {
    /// Slope of the `(σ/e)^-d` term.
    pub d: f64,
    /// Pivot of the `(σ/e)^-d` term.
    pub e: f64,
    /// Slope of the `σ^-f` term.
    pub f: f64,
    /// Exponential cutoff scale.
    pub g: f64,
}

impl MultiplicityParams {
    /// Create validated shape parameters.
    pub fn new(d: f64, e: f64, f: f64, g: f64) -> Result<Self> {
        let params = Self { d, e, f, g };
        params.validate()?;
        Ok(params)
    }

    /// Parse and validate shape parameters from JSON with keys `d`, `e`, `f`, `g`.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let params: Self = serde_json::from_str(json)?;
        params.validate()?;
        Ok(params)
    }

    /// All four parameters must be finite and `> 0`.
    pub fn validate(&self) -> Result<()> {
        for (name, v) in [("d", self.d), ("e", self.e), ("f", self.f), ("g", self.g)] {
            if !v.is_finite() || v <= 0.0 {
                return Err(Error::domain(
                    "multiplicity",
                    0,
                    format!("shape parameter {name} must be finite and > 0, got {v}"),
                ));
            }
        }
        Ok(())
    }
}
