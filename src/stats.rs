//! Canonical-ensemble numerics: the Binomial convolution kernel and the
//! Beta-quantile confidence bounds for the spanning probability.
//!
//! Leans on `statrs` for the two primitives the convolution needs
//! (`Discrete::pmf`, `ContinuousCDF::inverse_cdf`) rather than hand-rolling
//! a Binomial PMF or an incomplete-Beta solver. Kept as its own small
//! module with a table-driven test suite, the same way other isolated
//! numeric computations in this crate are organized.

use statrs::distribution::{Beta, Binomial, ContinuousCDF, Discrete};

/// One standard deviation's worth of tail mass under a standard normal,
/// used for the `[mean - sigma, mean + sigma]` spanning-probability CI.
const ONE_SIGMA_TAIL: f64 = 0.158_655_253_931_457;

/// Returns `Binomial(m, p).pmf(n)` for every `n` in `0..=m`.
///
/// `p` is clamped to `[0, 1]` and `m` may be `0` (a single-point
/// distribution at `n = 0`).
#[must_use]
pub(crate) fn binomial_pmf_table(m: u64, p: f64) -> Vec<f64> {
    let clamped_p = p.clamp(0.0, 1.0);
    // Binomial::new only rejects p outside [0, 1] or non-finite values;
    // both are already excluded by the clamp above.
    let dist = Binomial::new(clamped_p, m).expect("clamped p is always in [0, 1]");
    (0..=m).map(|n| dist.pmf(n)).collect()
}

/// Convolves a length-`(m + 1)` Binomial PMF table against `baseline`
/// (the `n = 0` observable) followed by `values` (`values[i]` is the
/// observable at `n = i + 1` main edges added).
///
/// Panics if `values.len() + 1 != pmf_table.len()`.
#[must_use]
pub(crate) fn convolve(pmf_table: &[f64], baseline: f64, values: &[f64]) -> f64 {
    assert_eq!(
        values.len() + 1,
        pmf_table.len(),
        "pmf table must cover baseline plus every value"
    );
    pmf_table[0] * baseline
        + pmf_table[1..]
            .iter()
            .zip(values)
            .map(|(&weight, &value)| weight * value)
            .sum::<f64>()
}

/// The Laplace-smoothed (Beta(1,1) posterior mean) spanning-probability
/// estimate for `successes` spanning realizations out of `runs`.
#[must_use]
pub(crate) fn laplace_mean(successes: u32, runs: u32) -> f64 {
    (f64::from(successes) + 1.0) / (f64::from(runs) + 2.0)
}

/// The two-sided `1 - 2 * ONE_SIGMA_TAIL` credible interval for the
/// spanning probability, as a `Beta(successes + 1, runs - successes + 1)`
/// quantile pair. Both bounds are clamped to `[0, 1]`: `statrs`'s
/// `inverse_cdf` can return values fractionally outside that range at the
/// extremes (`successes == 0` or `successes == runs`) due to floating-point
/// rounding in the incomplete-Beta solver; this is handled by clamping
/// rather than surfaced as an error.
#[must_use]
pub(crate) fn spanning_credible_interval(successes: u32, runs: u32) -> (f64, f64) {
    let alpha = f64::from(successes) + 1.0;
    let beta = f64::from(runs - successes) + 1.0;
    let dist = Beta::new(alpha, beta).expect("alpha and beta are always positive");
    let lo = dist.inverse_cdf(ONE_SIGMA_TAIL).clamp(0.0, 1.0);
    let hi = dist.inverse_cdf(1.0 - ONE_SIGMA_TAIL).clamp(0.0, 1.0);
    (lo, hi)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn pmf_table_sums_to_one() {
        let table = binomial_pmf_table(20, 0.37);
        let total: f64 = table.iter().sum();
        assert!((total - 1.0).abs() < 1e-9);
    }

    #[test]
    fn pmf_table_has_m_plus_one_entries() {
        assert_eq!(binomial_pmf_table(5, 0.5).len(), 6);
        assert_eq!(binomial_pmf_table(0, 0.5).len(), 1);
    }

    #[test]
    fn convolve_with_degenerate_p_zero_selects_baseline() {
        let table = binomial_pmf_table(3, 0.0);
        let result = convolve(&table, 9.0, &[1.0, 2.0, 3.0]);
        assert!((result - 9.0).abs() < 1e-12);
    }

    #[test]
    fn convolve_with_degenerate_p_one_selects_last_value() {
        let table = binomial_pmf_table(3, 1.0);
        let result = convolve(&table, 9.0, &[1.0, 2.0, 3.0]);
        assert!((result - 3.0).abs() < 1e-12);
    }

    #[rstest]
    #[case::no_successes(0, 10)]
    #[case::all_successes(10, 10)]
    #[case::half(5, 10)]
    fn credible_interval_is_ordered_and_bounded(#[case] successes: u32, #[case] runs: u32) {
        let (lo, hi) = spanning_credible_interval(successes, runs);
        assert!((0.0..=1.0).contains(&lo));
        assert!((0.0..=1.0).contains(&hi));
        assert!(lo <= hi);
    }

    #[test]
    fn laplace_mean_is_smoothed_toward_one_half() {
        assert!((laplace_mean(0, 0) - 0.5).abs() < 1e-12);
        assert!((laplace_mean(10, 10) - 11.0 / 12.0).abs() < 1e-12);
    }
}
