//! Numerical building blocks for HaloMass.
//!
//! - natural cubic splines with exact piecewise integration
//! - globally adaptive Gauss-Legendre quadrature
//! - small numeric helpers (stable log/exp primitives)

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod math;
pub mod quadrature;
pub mod spline;

pub use quadrature::{AdaptiveIntegrator, QuadratureConfig, QuadratureOrder, QuadratureResult};
pub use spline::CubicSpline;
