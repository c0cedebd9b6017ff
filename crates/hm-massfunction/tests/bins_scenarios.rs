//! Binned halo counts from a dn/dM table produced by the full pipeline.

mod common;

use approx::assert_relative_eq;
use common::{bbks, cosmology, log_grid, tinker};
use hm_massfunction::{Error, MassFunctionConfig, dndm_at_m_arr, n_in_bin, n_in_bins};

fn table(n: usize) -> (Vec<f64>, Vec<f64>) {
    let spectrum = bbks();
    let masses = log_grid(1e12, 1e16, n);
    let dndm = dndm_at_m_arr(&masses, spectrum.power(), cosmology(), &tinker(), &MassFunctionConfig::default())
        .unwrap();
    (masses, dndm)
}

#[test]
fn counts_converge_under_table_refinement() {
    let edges = [1e13, 1e14, 1e15];
    let (m50, d50) = table(50);
    let (m200, d200) = table(200);

    let coarse = n_in_bins(&edges, &m50, &d50).unwrap();
    let fine = n_in_bins(&edges, &m200, &d200).unwrap();

    assert_eq!(coarse.len(), 2);
    assert!(coarse.iter().chain(&fine).all(|v| *v >= 0.0), "{coarse:?} {fine:?}");
    for (c, f) in coarse.iter().zip(&fine) {
        assert!((c - f).abs() / f < 0.01, "coarse {c:e} vs fine {f:e}");
    }
    // Lighter halos are more abundant.
    assert!(coarse[0] > coarse[1]);
}

#[test]
fn bins_are_additive_and_match_single_bin() {
    let (m, d) = table(50);
    let parts = n_in_bins(&[1e13, 1e14, 1e15], &m, &d).unwrap();
    let whole = n_in_bin(1e13, 1e15, &m, &d).unwrap();
    assert_relative_eq!(whole, parts[0] + parts[1], max_relative = 1e-10);
    assert_eq!(n_in_bin(1e13, 1e14, &m, &d).unwrap(), parts[0]);
}

#[test]
fn edges_beyond_table_are_rejected() {
    let (m, d) = table(50);
    let err = n_in_bins(&[1e11, 1e13], &m, &d).unwrap_err();
    assert!(matches!(err, Error::Validation(_)), "{err}");
    assert!(n_in_bins(&[1e15, 2e16], &m, &d).is_err());
}
