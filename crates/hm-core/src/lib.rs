//! # hm-core
//!
//! Shared foundations for the HaloMass workspace: the error type, physical
//! constants, validated input tables and the [`VarianceSource`] trait.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod constants;
pub mod error;
pub mod traits;
pub mod types;

pub use constants::{DELTA_C, FOUR_THIRDS_PI, RHO_CRIT};
pub use error::{Error, Result};
pub use traits::VarianceSource;
pub use types::{Cosmology, MassFunctionTable, MultiplicityParams, PowerSpectrum, validate_grid};
