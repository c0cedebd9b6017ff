//! Globally adaptive Gauss-Legendre quadrature on bounded 1-D intervals.
//!
//! Each interval is integrated with a pair of Gauss-Legendre rules of order
//! `n` and `2n`; the `2n` result is kept and `|G₂ₙ - Gₙ|` is the interval's
//! error estimate. The interval with the largest estimate is bisected until
//! the summed estimate drops below `max(abs_tol, rel_tol·|I|)` or the
//! subdivision budget runs out, which is an error rather than a degraded result.
//! Callers may seed the partition with breakpoints (see
//! [`AdaptiveIntegrator::integrate_with_breakpoints`]).

use hm_core::{Error, Result};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::BinaryHeap;

/// Gauss-Legendre order of the low rule (the high rule uses twice as many nodes).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum QuadratureOrder {
    /// 8/16 nodes per interval.
    N8,
    /// 16/32 nodes per interval (default).
    #[default]
    N16,
    /// 32/64 nodes per interval.
    N32,
    /// 64/128 nodes per interval (strongly oscillating integrands).
    N64,
}

impl QuadratureOrder {
    /// Number of nodes in the low-order rule.
    pub fn n(self) -> usize {
        match self {
            Self::N8 => 8,
            Self::N16 => 16,
            Self::N32 => 32,
            Self::N64 => 64,
        }
    }
}

/// Tolerances and budget for [`AdaptiveIntegrator`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct QuadratureConfig {
    /// Absolute error target.
    pub abs_tol: f64,
    /// Relative error target.
    pub rel_tol: f64,
    /// Maximum number of intervals before giving up.
    pub max_subdivisions: usize,
    /// Rule pair used on each interval.
    pub order: QuadratureOrder,
}

impl Default for QuadratureConfig {
    fn default() -> Self {
        Self { abs_tol: 0.0, rel_tol: 1e-6, max_subdivisions: 8000, order: QuadratureOrder::N16 }
    }
}

impl QuadratureConfig {
    /// Reject tolerances that can never be met or never be violated.
    pub fn validate(&self) -> Result<()> {
        if !self.abs_tol.is_finite() || self.abs_tol < 0.0 {
            return Err(Error::Validation(format!(
                "quadrature abs_tol must be finite and >= 0, got {}",
                self.abs_tol
            )));
        }
        if !self.rel_tol.is_finite() || self.rel_tol < 0.0 {
            return Err(Error::Validation(format!(
                "quadrature rel_tol must be finite and >= 0, got {}",
                self.rel_tol
            )));
        }
        if self.abs_tol == 0.0 && self.rel_tol < 50.0 * f64::EPSILON {
            return Err(Error::Validation(format!(
                "quadrature needs abs_tol > 0 or rel_tol >= {:e}, got abs_tol={}, rel_tol={}",
                50.0 * f64::EPSILON,
                self.abs_tol,
                self.rel_tol
            )));
        }
        if self.max_subdivisions == 0 {
            return Err(Error::Validation("quadrature max_subdivisions must be >= 1".into()));
        }
        Ok(())
    }
}

/// Outcome of a converged integral.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct QuadratureResult {
    /// Integral estimate.
    pub value: f64,
    /// Summed error estimate over all intervals.
    pub abs_error: f64,
    /// Number of intervals in the final partition.
    pub n_intervals: usize,
    /// Number of integrand evaluations.
    pub n_evaluations: usize,
}

/// Compute Gauss-Legendre nodes and weights on `[-1, 1]` for the given order.
///
/// Uses Newton iteration to find roots of the Legendre polynomial P_n(x),
/// then computes weights from the derivative P'_n at each root.
/// Exploits symmetry: only computes half the roots.
pub fn gauss_legendre_nodes_weights(n: usize) -> (Vec<f64>, Vec<f64>) {
    let mut nodes = vec![0.0f64; n];
    let mut weights = vec![0.0f64; n];

    if n == 0 {
        return (nodes, weights);
    }
    if n == 1 {
        weights[0] = 2.0;
        return (nodes, weights);
    }

    let nf = n as f64;
    let m = n.div_ceil(2);

    for i in 0..m {
        // Chebyshev-like initial guess for the i-th largest root.
        let mut x = ((std::f64::consts::PI * (i as f64 + 0.75)) / (nf + 0.5)).cos();
        let mut dp = 1.0;

        for _ in 0..100 {
            let (p_n, p_nm1) = legendre_pair(n, x);
            dp = nf * (x * p_n - p_nm1) / (x * x - 1.0);
            let dx = p_n / dp;
            x -= dx;
            if dx.abs() < 1e-15 {
                let (p_n, p_nm1) = legendre_pair(n, x);
                dp = nf * (x * p_n - p_nm1) / (x * x - 1.0);
                break;
            }
        }

        let w = 2.0 / ((1.0 - x * x) * dp * dp);
        nodes[i] = -x;
        nodes[n - 1 - i] = x;
        weights[i] = w;
        weights[n - 1 - i] = w;
    }

    (nodes, weights)
}

/// `(P_n(x), P_{n-1}(x))` by the three-term recurrence.
#[inline]
fn legendre_pair(n: usize, x: f64) -> (f64, f64) {
    let mut p0 = 1.0f64;
    let mut p1 = x;
    for j in 2..=n {
        let jf = j as f64;
        let p2 = ((2.0 * jf - 1.0) * x * p1 - (jf - 1.0) * p0) / jf;
        p0 = p1;
        p1 = p2;
    }
    (p1, p0)
}

fn check_breakpoints(a: f64, b: f64, breakpoints: &[f64]) -> Result<()> {
    let mut prev = a;
    for (i, &x) in breakpoints.iter().enumerate() {
        if !x.is_finite() || x <= prev || x >= b {
            return Err(Error::Validation(format!(
                "quadrature breakpoint {i} ({x}) must be finite, increasing and inside ({a}, {b})"
            )));
        }
        prev = x;
    }
    Ok(())
}

#[derive(Debug, Clone)]
struct Rule {
    nodes: Vec<f64>,
    weights: Vec<f64>,
}

impl Rule {
    fn new(n: usize) -> Self {
        let (nodes, weights) = gauss_legendre_nodes_weights(n);
        Self { nodes, weights }
    }

    #[inline]
    fn apply<F: FnMut(f64) -> f64>(&self, f: &mut F, a: f64, b: f64) -> f64 {
        let half = 0.5 * (b - a);
        let mid = 0.5 * (a + b);
        let mut acc = 0.0;
        for (&x, &w) in self.nodes.iter().zip(&self.weights) {
            acc += w * f(mid + half * x);
        }
        acc * half
    }
}

#[derive(Debug, Clone, Copy)]
struct Interval {
    a: f64,
    b: f64,
    value: f64,
    error: f64,
}

impl PartialEq for Interval {
    fn eq(&self, other: &Self) -> bool {
        self.error.total_cmp(&other.error) == Ordering::Equal
    }
}

impl Eq for Interval {}

impl PartialOrd for Interval {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Interval {
    fn cmp(&self, other: &Self) -> Ordering {
        self.error.total_cmp(&other.error)
    }
}

/// Reusable adaptive integrator. Node tables are computed once at construction.
#[derive(Debug, Clone)]
pub struct AdaptiveIntegrator {
    config: QuadratureConfig,
    low: Rule,
    high: Rule,
}

impl AdaptiveIntegrator {
    /// Build an integrator from a validated configuration.
    pub fn new(config: QuadratureConfig) -> Result<Self> {
        config.validate()?;
        let n = config.order.n();
        Ok(Self { config, low: Rule::new(n), high: Rule::new(2 * n) })
    }

    /// Configuration in use.
    pub fn config(&self) -> &QuadratureConfig {
        &self.config
    }

    /// Integrate `f` over `[a, b]`.
    ///
    /// Fails with [`Error::Convergence`] (stage `"quadrature"`, index 0) when
    /// the subdivision budget is exhausted, an interval can no longer be
    /// bisected in floating point, or the integrand returns a non-finite value.
    pub fn integrate<F: FnMut(f64) -> f64>(&self, f: F, a: f64, b: f64) -> Result<QuadratureResult> {
        self.integrate_with_breakpoints(f, a, b, &[])
    }

    /// Integrate `f` over `[a, b]`, starting from the partition at `breakpoints`.
    ///
    /// `breakpoints` must be strictly increasing and strictly inside `(a, b)`,
    /// and the starting intervals count against `max_subdivisions`. Oscillating
    /// integrands should be split at least once per period: a rule pair spread
    /// over several periods can agree by accident and stop early.
    pub fn integrate_with_breakpoints<F: FnMut(f64) -> f64>(
        &self,
        mut f: F,
        a: f64,
        b: f64,
        breakpoints: &[f64],
    ) -> Result<QuadratureResult> {
        if !a.is_finite() || !b.is_finite() || b <= a {
            return Err(Error::Validation(format!(
                "quadrature requires finite bounds with a < b, got [{a}, {b}]"
            )));
        }
        check_breakpoints(a, b, breakpoints)?;
        if breakpoints.len() >= self.config.max_subdivisions {
            return Err(Error::Validation(format!(
                "quadrature: {} starting intervals exceed the subdivision budget ({})",
                breakpoints.len() + 1,
                self.config.max_subdivisions
            )));
        }

        let evals_per_interval = self.low.nodes.len() + self.high.nodes.len();
        let mut n_evaluations = 0usize;
        let mut estimate = |f: &mut F, a: f64, b: f64| -> Result<Interval> {
            n_evaluations += evals_per_interval;
            let coarse = self.low.apply(f, a, b);
            let fine = self.high.apply(f, a, b);
            if !fine.is_finite() || !coarse.is_finite() {
                return Err(Error::convergence(
                    "quadrature",
                    0,
                    format!("integrand is not finite on [{a}, {b}]"),
                ));
            }
            Ok(Interval { a, b, value: fine, error: (fine - coarse).abs() })
        };

        let mut heap = BinaryHeap::with_capacity(self.config.max_subdivisions.min(1024));
        let mut result = 0.0;
        let mut error = 0.0;
        let mut lo = a;
        for &hi in breakpoints.iter().chain(std::iter::once(&b)) {
            let piece = estimate(&mut f, lo, hi)?;
            result += piece.value;
            error += piece.error;
            heap.push(piece);
            lo = hi;
        }

        loop {
            let tol = self.config.abs_tol.max(self.config.rel_tol * result.abs());
            if error <= tol {
                break;
            }
            if heap.len() >= self.config.max_subdivisions {
                return Err(Error::convergence(
                    "quadrature",
                    0,
                    format!(
                        "subdivision budget ({}) exhausted: estimate {result:e}, error {error:e} > tolerance {tol:e}",
                        self.config.max_subdivisions
                    ),
                ));
            }

            let Some(worst) = heap.pop() else { break };
            let mid = 0.5 * (worst.a + worst.b);
            if !(worst.a < mid && mid < worst.b) {
                return Err(Error::convergence(
                    "quadrature",
                    0,
                    format!(
                        "interval [{}, {}] cannot be bisected further: error {error:e} > tolerance {tol:e}",
                        worst.a, worst.b
                    ),
                ));
            }
            let left = estimate(&mut f, worst.a, mid)?;
            let right = estimate(&mut f, mid, worst.b)?;
            result += left.value + right.value - worst.value;
            error += left.error + right.error - worst.error;
            heap.push(left);
            heap.push(right);
        }

        // Re-sum to drop the drift of the running totals.
        let value = heap.iter().map(|iv| iv.value).sum();
        let abs_error = heap.iter().map(|iv| iv.error).sum();
        Ok(QuadratureResult { value, abs_error, n_intervals: heap.len(), n_evaluations })
    }
}
