#![no_main]

use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if data.len() < 8 {
        return;
    }

    // First byte splits the remaining f64s into table knots and bin edges.
    let split = data[0] as usize;
    let values: Vec<f64> = data[1..]
        .chunks_exact(8)
        .take(256)
        .map(|c| f64::from_le_bytes([c[0], c[1], c[2], c[3], c[4], c[5], c[6], c[7]]))
        .collect();
    let n_table = (split % (values.len() / 2 + 1)).min(values.len() / 2);
    let (table, edges) = values.split_at(2 * n_table);
    let (masses, dndm) = table.split_at(n_table);

    if let Ok(spline) = hm_numeric::CubicSpline::natural(masses, dndm) {
        let (lo, hi) = spline.support();
        let _ = spline.integrate(lo, hi);
        for &x in edges {
            let _ = spline.eval(x);
        }
    }

    // Accepted input yields one count per bin.
    if let Ok(counts) = hm_massfunction::n_in_bins(edges, masses, dndm) {
        assert_eq!(counts.len(), edges.len() - 1);
    }
});
