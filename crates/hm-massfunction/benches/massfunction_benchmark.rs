use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use hm_massfunction::{
    Cosmology, MassFunctionConfig, MultiplicityParams, PowerSpectrum, dndm_at_m_arr, g_at_sigma_arr,
    n_in_bins, sigma2_at_r_arr,
};
use std::hint::black_box;

fn log_grid(lo: f64, hi: f64, n: usize) -> Vec<f64> {
    let (a, b) = (lo.ln(), hi.ln());
    (0..n).map(|i| (a + (b - a) * i as f64 / (n - 1) as f64).exp()).collect()
}

fn spectrum() -> (Vec<f64>, Vec<f64>) {
    let k = log_grid(1e-4, 1e2, 1000);
    let p = k.iter().map(|k| 2e4 * k.powf(0.96) / (1.0 + (k / 0.02).powi(3))).collect();
    (k, p)
}

fn bench_sigma2(c: &mut Criterion) {
    let (k, p) = spectrum();
    let power = PowerSpectrum::new(&k, &p).unwrap();
    let cfg = MassFunctionConfig::default();
    let mut group = c.benchmark_group("sigma2_at_r");

    for n in [10usize, 100] {
        let radii = log_grid(0.1, 50.0, n);
        group.bench_with_input(BenchmarkId::from_parameter(n), &n, |b, _| {
            b.iter(|| black_box(sigma2_at_r_arr(&radii, power, &cfg).unwrap()))
        });
    }
    group.finish();
}

fn bench_multiplicity(c: &mut Criterion) {
    let params = MultiplicityParams::new(1.97, 1.0, 0.51, 1.228).unwrap();
    let sigmas = log_grid(0.05, 10.0, 10_000);
    c.bench_function("g_at_sigma_10k", |b| {
        b.iter(|| black_box(g_at_sigma_arr(&sigmas, &params).unwrap()))
    });
}

fn bench_dndm_and_bins(c: &mut Criterion) {
    let (k, p) = spectrum();
    let power = PowerSpectrum::new(&k, &p).unwrap();
    let cosmo = Cosmology::new(0.3).unwrap();
    let params = MultiplicityParams::new(1.97, 1.0, 0.51, 1.228).unwrap();
    let cfg = MassFunctionConfig::default();
    let masses = log_grid(1e12, 1e16, 50);

    c.bench_function("dndm_at_m_50", |b| {
        b.iter(|| black_box(dndm_at_m_arr(&masses, power, cosmo, &params, &cfg).unwrap()))
    });

    let dndm = dndm_at_m_arr(&masses, power, cosmo, &params, &cfg).unwrap();
    let edges = log_grid(1e12, 1e16, 21);
    c.bench_function("n_in_bins_20", |b| {
        b.iter(|| black_box(n_in_bins(&edges, &masses, &dndm).unwrap()))
    });
}

criterion_group!(benches, bench_sigma2, bench_multiplicity, bench_dndm_and_bins);
criterion_main!(benches);
