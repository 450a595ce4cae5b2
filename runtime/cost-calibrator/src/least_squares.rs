/// Ordinary least-squares fit of `ys` against a single explanatory variable.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct LinearFit {
    pub slope: f64,
    pub intercept: f64,
    /// `prediction - observation` for each input point, in input order.
    pub residuals: Vec<f64>,
}

impl LinearFit {
    /// Coefficient of determination of the fit.
    ///
    /// Returns 1 when the observations have no variance at all, since the fit
    /// then reproduces them exactly.
    pub fn r_squared(&self, ys: &[f64]) -> f64 {
        let n = ys.len() as f64;
        let mean = ys.iter().sum::<f64>() / n;
        let total: f64 = ys.iter().map(|y| (y - mean) * (y - mean)).sum();
        let residual: f64 = self.residuals.iter().map(|r| r * r).sum();
        if total == 0.0 {
            return 1.0;
        }
        1.0 - residual / total
    }
}

/// Returns `None` when the inputs do not determine a slope, i.e. when there
/// are fewer than two distinct values in `xs`.
///
/// Sums are accumulated in input order, so identical inputs give bit-identical
/// results.
pub(crate) fn least_squares_method(xs: &[f64], ys: &[f64]) -> Option<LinearFit> {
    debug_assert_eq!(xs.len(), ys.len());
    let n = xs.len();
    if n == 0 {
        return None;
    }
    let n_f = n as f64;

    let mean_x = xs.iter().sum::<f64>() / n_f;
    let mean_y = ys.iter().sum::<f64>() / n_f;

    let mut sum_xy = 0.0; // Sum of centered x * y.
    let mut sum_xx = 0.0; // Sum of centered x^2.
    for i in 0..n {
        let dx = xs[i] - mean_x;
        sum_xy += dx * (ys[i] - mean_y);
        sum_xx += dx * dx;
    }
    if sum_xx == 0.0 {
        return None;
    }

    let slope = sum_xy / sum_xx;
    let intercept = mean_y - slope * mean_x;

    // Compute error estimations
    let residuals = xs.iter().zip(ys).map(|(x, y)| intercept + slope * x - y).collect();

    Some(LinearFit { slope, intercept, residuals })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[track_caller]
    fn check_least_squares_method(xs: &[f64], ys: &[f64], expected: (f64, f64, &[f64])) {
        let fit = least_squares_method(xs, ys).unwrap();

        assert!((fit.slope - expected.0).abs() < 1e-9, "slope {} != {}", fit.slope, expected.0);
        assert!(
            (fit.intercept - expected.1).abs() < 1e-6,
            "intercept {} != {}",
            fit.intercept,
            expected.1
        );
        for (&expected, &actual) in expected.2.iter().zip(fit.residuals.iter()) {
            assert!((actual - expected).abs() < 1e-6, "residual {actual} != {expected}");
        }
    }

    #[test]
    fn test_least_squares_method_perfect_fit() {
        let xs = [10.0, 20.0, 30.0];
        let ys = [990.0, 980.0, 970.0];

        check_least_squares_method(&xs, &ys, (-1.0, 1000.0, &[0.0, 0.0, 0.0]));
    }

    #[test]
    fn test_least_squares_method_imperfect_fit() {
        let xs = [10.0, 1000.0, 2000.0];
        let ys = [1.0, 101.0, 198.0];

        let slope = 0.09899161644389078;
        let intercept = 0.6784115012962526;
        let error = [0.668327661, -1.329972499, 0.661643501];

        check_least_squares_method(&xs, &ys, (slope, intercept, &error));
    }

    #[test]
    fn test_clean_linear_series() {
        let xs = [10.0, 100.0];
        let ys = [100.0, 1000.0];

        check_least_squares_method(&xs, &ys, (10.0, 0.0, &[0.0, 0.0]));
        let fit = least_squares_method(&xs, &ys).unwrap();
        assert_eq!(fit.r_squared(&ys), 1.0);
    }

    #[test]
    fn test_degenerate_inputs() {
        assert_eq!(least_squares_method(&[], &[]), None);
        assert_eq!(least_squares_method(&[5.0], &[7.0]), None);
        assert_eq!(least_squares_method(&[5.0, 5.0], &[7.0, 9.0]), None);
    }

    #[test]
    #[cfg(debug_assertions)]
    #[should_panic]
    fn test_mismatched_lengths() {
        least_squares_method(&[1.0, 2.0, 3.0], &[1.0, 2.0]);
    }

    #[test]
    fn test_r_squared_of_noisy_fit() {
        let xs = [1.0, 2.0, 3.0, 4.0];
        let ys = [2.0, 4.5, 5.5, 8.0];
        let fit = least_squares_method(&xs, &ys).unwrap();
        let r2 = fit.r_squared(&ys);
        assert!(r2 > 0.9 && r2 < 1.0, "{r2}");
    }
}
