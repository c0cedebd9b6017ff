//! Small numerically-stable math utilities.

/// Stable `log(1 + exp(x))`.
///
/// Branchless: `log(1+exp(x)) = max(x,0) + log(1+exp(-|x|))`.
#[inline]
pub fn log1pexp(x: f64) -> f64 {
    let abs_x = x.abs();
    let e = (-abs_x).exp(); // always in (0, 1], no overflow
    x.max(0.0) + e.ln_1p()
}

/// Stable `log(exp(a) + exp(b))`.
///
/// Either argument may be `-inf` (an exact zero term).
#[inline]
pub fn log_add_exp(a: f64, b: f64) -> f64 {
    if a == f64::NEG_INFINITY {
        return b;
    }
    if b == f64::NEG_INFINITY {
        return a;
    }
    let hi = a.max(b);
    hi + log1pexp(a.min(b) - hi)
}
