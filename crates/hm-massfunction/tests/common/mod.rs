//! Shared fixtures for the pipeline integration tests.

#![allow(dead_code)]

use hm_massfunction::{
    Cosmology, MassFunctionConfig, MultiplicityParams, PowerSpectrum, sigma2_at_r,
};

pub const SIGMA8: f64 = 0.8;

/// `n` log-spaced points from `lo` to `hi` inclusive.
pub fn log_grid(lo: f64, hi: f64, n: usize) -> Vec<f64> {
    let (a, b) = (lo.ln(), hi.ln());
    (0..n).map(|i| (a + (b - a) * i as f64 / (n - 1) as f64).exp()).collect()
}

/// Owned (k, P) table; borrow it as a [`PowerSpectrum`] per call.
pub struct Spectrum {
    pub k: Vec<f64>,
    pub p: Vec<f64>,
}

impl Spectrum {
    pub fn power(&self) -> PowerSpectrum<'_> {
        PowerSpectrum::new(&self.k, &self.p).unwrap()
    }
}

/// P(k) = 1 on k ∈ [1e-4, 1e2] with 1000 log points.
pub fn flat() -> Spectrum {
    let k = log_grid(1e-4, 1e2, 1000);
    let p = vec![1.0; k.len()];
    Spectrum { k, p }
}

/// BBKS transfer function for shape parameter `gamma`.
fn bbks_transfer(k: f64, gamma: f64) -> f64 {
    let q = k / gamma;
    let poly = 1.0 + 3.89 * q + (16.1 * q).powi(2) + (5.46 * q).powi(3) + (6.71 * q).powi(4);
    (1.0 + 2.34 * q).ln() / (2.34 * q) * poly.powf(-0.25)
}

/// `k^n T²(k)` with Γ = 0.21, n = 0.96, rescaled so σ(8 Mpc/h) = [`SIGMA8`].
pub fn bbks() -> Spectrum {
    let k = log_grid(1e-4, 1e2, 1000);
    let shape: Vec<f64> = k.iter().map(|&k| k.powf(0.96) * bbks_transfer(k, 0.21).powi(2)).collect();
    let unit = PowerSpectrum::new(&k, &shape).unwrap();
    let s2 = sigma2_at_r(8.0, unit, &MassFunctionConfig::default()).unwrap();
    let scale = SIGMA8 * SIGMA8 / s2;
    let p = shape.iter().map(|p| p * scale).collect();
    Spectrum { k, p }
}

pub fn cosmology() -> Cosmology {
    Cosmology::new(0.3).unwrap()
}

pub fn tinker() -> MultiplicityParams {
    MultiplicityParams::new(1.97, 1.0, 0.51, 1.228).unwrap()
}

pub fn unit_params() -> MultiplicityParams {
    MultiplicityParams::new(1.0, 1.0, 1.0, 1.0).unwrap()
}
