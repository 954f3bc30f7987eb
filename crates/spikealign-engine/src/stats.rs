// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Two-sample significance testing
//!
//! Independent two-sample Student's t-test with pooled variance, two-sided.
//! Matches the default behavior of the reference analysis stack: degenerate
//! inputs (fewer than two observations per side, or zero pooled variance)
//! produce a NaN p-value, and NaN is never significant.

use statrs::distribution::{ContinuousCDF, StudentsT};

/// Result of a two-sample t-test
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TTest {
    pub t: f64,
    pub p: f64,
}

impl TTest {
    /// Two-sided significance at level `alpha`; NaN p-values fail the test
    pub fn significant(&self, alpha: f64) -> bool {
        self.p < alpha
    }

    fn degenerate() -> Self {
        TTest {
            t: f64::NAN,
            p: f64::NAN,
        }
    }
}

fn mean(xs: &[f64]) -> f64 {
    xs.iter().sum::<f64>() / xs.len() as f64
}

fn sum_sq_dev(xs: &[f64], m: f64) -> f64 {
    xs.iter().map(|x| (x - m) * (x - m)).sum()
}

/// Independent two-sample t-test, equal variances assumed
pub fn ttest_ind(a: &[f64], b: &[f64]) -> TTest {
    let (n1, n2) = (a.len(), b.len());
    if n1 < 2 || n2 < 2 {
        return TTest::degenerate();
    }

    let (m1, m2) = (mean(a), mean(b));
    let df = (n1 + n2 - 2) as f64;
    let pooled_var = (sum_sq_dev(a, m1) + sum_sq_dev(b, m2)) / df;
    let se = (pooled_var * (1.0 / n1 as f64 + 1.0 / n2 as f64)).sqrt();
    if se == 0.0 || !se.is_finite() {
        return TTest::degenerate();
    }

    let t = (m1 - m2) / se;
    let p = match StudentsT::new(0.0, 1.0, df) {
        Ok(dist) => 2.0 * (1.0 - dist.cdf(t.abs())),
        Err(_) => f64::NAN,
    };
    TTest { t, p }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identical_samples_not_significant() {
        let a = [1.0, 2.0, 3.0, 4.0];
        let result = ttest_ind(&a, &a);
        assert!((result.t).abs() < 1e-12);
        assert!(!result.significant(0.05));
    }

    #[test]
    fn test_separated_samples_significant() {
        let a = [5.0, 5.5, 4.5, 5.2, 4.8, 5.1];
        let b = [1.0, 1.2, 0.8, 1.1, 0.9, 1.0];
        let result = ttest_ind(&a, &b);
        assert!(result.t > 0.0);
        assert!(result.significant(0.05));
    }

    #[test]
    fn test_reference_value() {
        // scipy.stats.ttest_ind([1,2,3,4,5], [3,4,5,6,7]) ->
        // t = -2.0, p = 0.08051623795726259
        let a = [1.0, 2.0, 3.0, 4.0, 5.0];
        let b = [3.0, 4.0, 5.0, 6.0, 7.0];
        let result = ttest_ind(&a, &b);
        assert!((result.t + 2.0).abs() < 1e-12);
        assert!((result.p - 0.080516).abs() < 1e-5);
        assert!(!result.significant(0.05));
    }

    #[test]
    fn test_zero_variance_is_nan_not_significant() {
        let a = [2.0, 2.0, 2.0];
        let b = [2.0, 2.0, 2.0];
        let result = ttest_ind(&a, &b);
        assert!(result.p.is_nan());
        assert!(!result.significant(0.05));
    }

    #[test]
    fn test_undersized_samples_are_degenerate() {
        let result = ttest_ind(&[1.0], &[2.0, 3.0]);
        assert!(result.p.is_nan());
        assert!(!result.significant(0.05));
    }
}
