//! Numerically careful primitives for discrete posterior math.

/// Stable log(sum(exp(values))).
///
/// Returns NEG_INFINITY for empty input or all -inf inputs.
pub fn log_sum_exp(values: &[f64]) -> f64 {
    if values.is_empty() {
        return f64::NEG_INFINITY;
    }
    if values.iter().any(|v| v.is_nan()) {
        return f64::NAN;
    }
    let max = values.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
    if max == f64::NEG_INFINITY {
        return f64::NEG_INFINITY;
    }
    if max == f64::INFINITY {
        return f64::INFINITY;
    }
    let mut sum = 0.0;
    for v in values {
        sum += (*v - max).exp();
    }
    max + sum.ln()
}

/// Natural log of a probability.
///
/// Zero maps to NEG_INFINITY; negative or NaN input maps to NaN.
pub fn ln_prob(p: f64) -> f64 {
    if p.is_nan() || p < 0.0 {
        return f64::NAN;
    }
    if p == 0.0 {
        return f64::NEG_INFINITY;
    }
    p.ln()
}

/// Normalize non-negative linear-domain weights so they sum to one.
///
/// Returns `None` when the input is empty, contains a negative or
/// non-finite weight, or sums to exactly zero. Callers must treat `None`
/// as a hard error; there is no meaningful distribution to return.
pub fn normalize_probs(weights: &[f64]) -> Option<Vec<f64>> {
    if weights.is_empty() {
        return None;
    }
    if weights.iter().any(|w| !w.is_finite() || *w < 0.0) {
        return None;
    }
    let total: f64 = weights.iter().sum();
    if total == 0.0 || !total.is_finite() {
        return None;
    }
    Some(weights.iter().map(|w| w / total).collect())
}

/// Absolute-or-relative approximate equality.
pub fn approx_eq(a: f64, b: f64, tol: f64) -> bool {
    if a.is_nan() || b.is_nan() {
        return false;
    }
    if a.is_infinite() || b.is_infinite() {
        return a == b;
    }
    (a - b).abs() <= tol.max(tol * a.abs().max(b.abs()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn log_sum_exp_empty_is_neg_inf() {
        assert_eq!(log_sum_exp(&[]), f64::NEG_INFINITY);
    }

    #[test]
    fn log_sum_exp_matches_naive_for_small_values() {
        let values = [0.1f64.ln(), 0.2f64.ln(), 0.7f64.ln()];
        assert!(approx_eq(log_sum_exp(&values), 0.0, 1e-12));
    }

    #[test]
    fn log_sum_exp_ignores_neg_inf_terms() {
        let values = [f64::NEG_INFINITY, 0.5f64.ln(), 0.5f64.ln()];
        assert!(approx_eq(log_sum_exp(&values), 0.0, 1e-12));
    }

    #[test]
    fn log_sum_exp_propagates_nan() {
        assert!(log_sum_exp(&[0.0, f64::NAN]).is_nan());
    }

    #[test]
    fn ln_prob_edges() {
        assert_eq!(ln_prob(0.0), f64::NEG_INFINITY);
        assert_eq!(ln_prob(1.0), 0.0);
        assert!(ln_prob(-0.1).is_nan());
        assert!(ln_prob(f64::NAN).is_nan());
    }

    #[test]
    fn normalize_probs_basic() {
        let p = normalize_probs(&[0.18, 0.03, 0.112, 0.036, 0.005]).expect("normalizes");
        assert!(approx_eq(p.iter().sum::<f64>(), 1.0, 1e-12));
        assert!(approx_eq(p[0], 0.18 / 0.363, 1e-12));
    }

    #[test]
    fn normalize_probs_zero_total_is_none() {
        assert_eq!(normalize_probs(&[0.0, 0.0, 0.0]), None);
    }

    #[test]
    fn normalize_probs_rejects_bad_weights() {
        assert_eq!(normalize_probs(&[]), None);
        assert_eq!(normalize_probs(&[0.5, -0.1]), None);
        assert_eq!(normalize_probs(&[0.5, f64::NAN]), None);
        assert_eq!(normalize_probs(&[0.5, f64::INFINITY]), None);
    }

    #[test]
    fn normalize_probs_keeps_zero_weights_zero() {
        let p = normalize_probs(&[0.0, 2.0, 0.0]).expect("normalizes");
        assert_eq!(p, vec![0.0, 1.0, 0.0]);
    }

    #[test]
    fn approx_eq_relative() {
        assert!(approx_eq(1e6, 1e6 + 1e-4, 1e-9));
        assert!(!approx_eq(1.0, 1.1, 1e-9));
        assert!(!approx_eq(f64::NAN, f64::NAN, 1.0));
        assert!(approx_eq(f64::NEG_INFINITY, f64::NEG_INFINITY, 1e-9));
    }
}
