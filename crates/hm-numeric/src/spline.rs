//! Natural cubic spline interpolation with exact definite integrals.

use hm_core::{Error, Result, validate_grid};

/// Natural cubic spline through knots `(x₀, y₀) … (xₖ, yₖ)`.
///
/// Second derivatives vanish at both ends. The knot arrays are borrowed; only
/// the second derivatives are owned. Evaluation and integration are restricted
/// to `[x₀, xₖ]`: the spline never extrapolates.
#[derive(Debug, Clone)]
pub struct CubicSpline<'a> {
    x: &'a [f64],
    y: &'a [f64],
    /// Second derivative at each knot.
    y2: Vec<f64>,
}

impl<'a> CubicSpline<'a> {
    /// Minimum number of knots.
    pub const MIN_KNOTS: usize = 3;

    /// Fit a natural cubic spline.
    ///
    /// `x` must be finite and strictly increasing with at least
    /// [`Self::MIN_KNOTS`] points; `y` must be finite and the same length.
    pub fn natural(x: &'a [f64], y: &'a [f64]) -> Result<Self> {
        if x.len() != y.len() {
            return Err(Error::Validation(format!(
                "CubicSpline: x length ({}) != y length ({})",
                x.len(),
                y.len()
            )));
        }
        validate_grid("CubicSpline x", x, Self::MIN_KNOTS)?;
        if let Some(i) = y.iter().position(|v| !v.is_finite()) {
            return Err(Error::Validation(format!(
                "CubicSpline: knot {i} has non-finite value y={}",
                y[i]
            )));
        }

        let y2 = natural_second_derivatives(x, y);
        Ok(Self { x, y, y2 })
    }

    /// `(x₀, xₖ)`.
    pub fn support(&self) -> (f64, f64) {
        (self.x[0], self.x[self.x.len() - 1])
    }

    /// Evaluate the spline at `x`, rejecting points outside the support.
    pub fn eval(&self, x: f64) -> Result<f64> {
        self.check_in_support(x)?;
        Ok(self.eval_clamped(x))
    }

    /// Evaluate the spline at `x` clamped into the support.
    ///
    /// For callers that generate abscissae from the support itself (e.g. a
    /// quadrature over `[ln x₀, ln xₖ]`) where `exp(ln xₖ)` may land one ulp outside.
    #[inline]
    pub fn eval_clamped(&self, x: f64) -> f64 {
        let (lo, hi) = self.support();
        let x = x.clamp(lo, hi);
        let i = self.segment(x);
        let (b, c, d) = self.coefficients(i);
        let t = x - self.x[i];
        self.y[i] + t * (b + t * (c + t * d))
    }

    /// Exact integral of the spline over `[a, b]`.
    ///
    /// Requires `x₀ <= a <= b <= xₖ`. The integral is summed segment by
    /// segment from the closed-form antiderivative of each cubic.
    pub fn integrate(&self, a: f64, b: f64) -> Result<f64> {
        self.check_in_support(a)?;
        self.check_in_support(b)?;
        if b < a {
            return Err(Error::Validation(format!(
                "CubicSpline: integration bounds reversed (a={a} > b={b})"
            )));
        }
        if a == b {
            return Ok(0.0);
        }

        let first = self.segment(a);
        let last = self.segment(b);
        let mut total = 0.0;
        for i in first..=last {
            let lo = a.max(self.x[i]);
            let hi = b.min(self.x[i + 1]);
            if hi > lo {
                total += self.integrate_segment(i, lo - self.x[i], hi - self.x[i]);
            }
        }
        Ok(total)
    }

    fn check_in_support(&self, x: f64) -> Result<()> {
        let (lo, hi) = self.support();
        if !(lo..=hi).contains(&x) {
            return Err(Error::Validation(format!(
                "CubicSpline: x={x} outside interpolation range [{lo}, {hi}]"
            )));
        }
        Ok(())
    }

    /// Index `i` of the segment `[x_i, x_{i+1}]` containing `x` (last segment for `x = xₖ`).
    #[inline]
    fn segment(&self, x: f64) -> usize {
        let n = self.x.len();
        self.x.partition_point(|&v| v <= x).saturating_sub(1).min(n - 2)
    }

    /// `(b, c, d)` of `S(t) = y_i + b t + c t² + d t³`, `t = x - x_i`.
    #[inline]
    fn coefficients(&self, i: usize) -> (f64, f64, f64) {
        let h = self.x[i + 1] - self.x[i];
        let slope = (self.y[i + 1] - self.y[i]) / h;
        let b = slope - h * (2.0 * self.y2[i] + self.y2[i + 1]) / 6.0;
        let c = 0.5 * self.y2[i];
        let d = (self.y2[i + 1] - self.y2[i]) / (6.0 * h);
        (b, c, d)
    }

    /// `∫ S(t) dt` over `[t0, t1]` within segment `i`.
    #[inline]
    fn integrate_segment(&self, i: usize, t0: f64, t1: f64) -> f64 {
        let (b, c, d) = self.coefficients(i);
        let y0 = self.y[i];
        let antideriv =
            |t: f64| t * (y0 + t * (0.5 * b + t * (c / 3.0 + t * (0.25 * d))));
        antideriv(t1) - antideriv(t0)
    }
}

/// Second derivatives of the natural cubic spline.
///
/// Solves the symmetric tridiagonal system for the interior knots with the
/// Thomas algorithm; `y2[0] = y2[k] = 0`.
fn natural_second_derivatives(x: &[f64], y: &[f64]) -> Vec<f64> {
    let n = x.len();
    debug_assert!(n >= 3);

    let h: Vec<f64> = x.windows(2).map(|w| w[1] - w[0]).collect();
    let delta: Vec<f64> = (0..n - 1).map(|i| (y[i + 1] - y[i]) / h[i]).collect();

    let m = n - 2;
    let mut c_prime = vec![0.0f64; m];
    let mut d_prime = vec![0.0f64; m];
    for j in 0..m {
        let i = j + 1;
        let sub = h[i - 1];
        let diag = 2.0 * (h[i - 1] + h[i]);
        let sup = h[i];
        let rhs = 6.0 * (delta[i] - delta[i - 1]);
        if j == 0 {
            c_prime[j] = sup / diag;
            d_prime[j] = rhs / diag;
        } else {
            let denom = diag - sub * c_prime[j - 1];
            c_prime[j] = sup / denom;
            d_prime[j] = (rhs - sub * d_prime[j - 1]) / denom;
        }
    }

    let mut y2 = vec![0.0f64; n];
    y2[m] = d_prime[m - 1];
    for j in (0..m - 1).rev() {
        y2[j + 1] = d_prime[j] - c_prime[j] * y2[j + 2];
    }
    y2
}
