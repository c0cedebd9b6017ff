//! # hm-massfunction
//!
//! Halo mass function pipeline from a tabulated linear power spectrum.
//!
//! - [`variance`]: σ²(R) of the top-hat smoothed density field
//! - [`conversion`]: Lagrangian mass ↔ radius
//! - [`peak_height`]: ν = δc / σ
//! - [`multiplicity`]: the normalized multiplicity function G(σ)
//! - [`dndm`]: dn/dM = G(σ) ρ̄_m / M · d ln σ⁻¹/dM
//! - [`bins`]: halo counts in mass bins from a tabulated dn/dM
//!
//! Every array operation is the primitive; scalar forms are one-element calls.
//! All state lives for a single call. Numerical settings come from
//! [`MassFunctionConfig`].
//!
//! ```no_run
//! use hm_massfunction::{Cosmology, MassFunctionConfig, MultiplicityParams, PowerSpectrum, dndm_at_m_arr};
//!
//! # fn main() -> hm_massfunction::Result<()> {
//! let k: Vec<f64> = (0..500).map(|i| 10f64.powf(-4.0 + 6.0 * i as f64 / 499.0)).collect();
//! let p: Vec<f64> = k.iter().map(|k| 2e4 * k / (1.0 + (k / 0.02).powi(3))).collect();
//! let power = PowerSpectrum::new(&k, &p)?;
//! let cosmo = Cosmology::new(0.3)?;
//! let params = MultiplicityParams::new(1.97, 1.0, 0.51, 1.228)?;
//! let dndm = dndm_at_m_arr(&[1e13, 1e14, 1e15], power, cosmo, &params, &MassFunctionConfig::default())?;
//! # let _ = dndm;
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod bins;
pub mod config;
pub mod conversion;
pub mod dndm;
pub mod multiplicity;
pub mod peak_height;
pub mod variance;

pub use bins::{n_in_bin, n_in_bins};
pub use config::{DEFAULT_FD_STEP, MAX_FD_STEP, MassFunctionConfig};
pub use conversion::{m_to_r, m_to_r_arr, r_to_m, r_to_m_arr};
pub use dndm::{dlnsiginv_dm, dndm_at_m, dndm_at_m_arr, dndm_with_source};
pub use multiplicity::{
    g_at_m, g_at_m_arr, g_at_sigma, g_at_sigma_arr, ln_normalization, normalization,
};
pub use peak_height::{nu_at_m, nu_at_m_arr, nu_at_r, nu_at_r_arr, nu_from_sigma2};
pub use variance::{
    TopHatVariance, dsigma2_dr_at_r, dsigma2_dr_at_r_arr, sigma2_at_m, sigma2_at_m_arr,
    sigma2_at_r, sigma2_at_r_arr, top_hat_window, top_hat_window_deriv,
};

pub use hm_core::{
    Cosmology, DELTA_C, Error, MultiplicityParams, PowerSpectrum, RHO_CRIT, Result, VarianceSource,
};
pub use hm_numeric::{QuadratureConfig, QuadratureOrder};
