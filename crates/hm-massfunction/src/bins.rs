//! Halo counts in mass bins from a tabulated dn/dM.
//!
//! The table is interpolated with a natural cubic spline and each bin's count
//! is the exact integral of that spline between its edges. Edges must lie in
//! the table's mass range; nothing is extrapolated.

use hm_core::{Error, MassFunctionTable, Result, validate_grid};
use hm_numeric::CubicSpline;

const STAGE: &str = "n_in_bins";

fn validate_edges(edges: &[f64], table: &MassFunctionTable<'_>) -> Result<()> {
    validate_grid("bin edges", edges, 2)?;
    let (lo, hi) = table.support();
    let first = edges[0];
    let last = edges[edges.len() - 1];
    if first < lo || last > hi {
        return Err(Error::Validation(format!(
            "{STAGE}: bin edges [{first:e}, {last:e}] outside mass table support [{lo:e}, {hi:e}]"
        )));
    }
    Ok(())
}

/// Number density of halos in each bin `[edges[i], edges[i+1]]`.
///
/// `masses` (Msun/h, strictly increasing) and `dndm` are the tabulated mass
/// function. Returns `edges.len() - 1` values.
pub fn n_in_bins(edges: &[f64], masses: &[f64], dndm: &[f64]) -> Result<Vec<f64>> {
    let table = MassFunctionTable::new(masses, dndm)?;
    validate_edges(edges, &table)?;
    tracing::debug!(stage = STAGE, n_bins = edges.len() - 1, n_table = masses.len(), "batch");

    let spline = CubicSpline::natural(table.masses(), table.dndm())?;
    edges.windows(2).map(|w| spline.integrate(w[0], w[1])).collect()
}

/// Number density of halos with mass in `[m_lo, m_hi]`.
pub fn n_in_bin(m_lo: f64, m_hi: f64, masses: &[f64], dndm: &[f64]) -> Result<f64> {
    Ok(n_in_bins(&[m_lo, m_hi], masses, dndm)?[0])
}
