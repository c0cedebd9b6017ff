//! Physical constants shared by every stage of the pipeline.
//!
//! Units follow the usual little-h convention: masses in Msun/h, lengths in
//! Mpc/h, wavenumbers in h/Mpc.

/// Critical density of the universe today, `3 H0² / (8πG)` with `H0 = 100 h km/s/Mpc`.
///
/// Units: Msun h² / Mpc³. The mean matter density is `omega_m * RHO_CRIT`.
pub const RHO_CRIT: f64 = 2.775_337_426_39e11;

/// Linear overdensity threshold for spherical collapse.
pub const DELTA_C: f64 = 1.686;

/// `4π/3`, the volume factor of the Lagrangian sphere.
pub const FOUR_THIRDS_PI: f64 = 4.0 * std::f64::consts::PI / 3.0;
