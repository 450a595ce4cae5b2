use crate::error::CalibrationError;
use crate::growth_kind::GrowthKind;
use crate::least_squares::least_squares_method;
use crate::report::{BenchmarkReport, SampleSeries};

/// `estimated_cost(size) = a * transform(size) + b`, in nanoseconds.
#[derive(Copy, Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct CostCoefficients {
    pub a: f64,
    pub b: f64,
}

impl CostCoefficients {
    /// Elementwise maximum.
    pub fn max(self, other: CostCoefficients) -> CostCoefficients {
        CostCoefficients { a: self.a.max(other.a), b: self.b.max(other.b) }
    }
}

/// Result of fitting one function.
#[derive(Clone, Debug, PartialEq)]
pub struct Fit {
    pub coefficients: CostCoefficients,
    /// Goodness of fit on the transformed inputs. `None` for constant
    /// functions, which are not regressed against size.
    pub r_squared: Option<f64>,
    /// Number of samples that entered the fit.
    pub points: usize,
    /// The regression produced a negative intercept that was replaced.
    pub intercept_fallback: bool,
}

/// Fits `series` against the transform of `kind`.
///
/// Samples with an undefined runtime are ignored. A negative fitted intercept
/// makes no sense as a fixed cost; it is replaced by
/// `max(runtime(smallest size) - a, 0)`.
pub fn fit(function: &str, series: &SampleSeries, kind: GrowthKind) -> Result<Fit, CalibrationError> {
    let samples: Vec<(u64, f64)> = series.iter().filter(|(_, runtime)| !runtime.is_nan()).collect();
    let points = samples.len();
    let degenerate = |distinct| CalibrationError::DegenerateSeries {
        function: function.to_string(),
        points,
        distinct,
    };
    if samples.is_empty() {
        return Err(degenerate(0));
    }

    if kind.is_constant() {
        let mean = samples.iter().map(|(_, runtime)| runtime).sum::<f64>() / points as f64;
        tracing::debug!(target: "calibrator", function, %kind, b = mean, points, "fitted");
        return Ok(Fit {
            coefficients: CostCoefficients { a: 0.0, b: mean },
            r_squared: None,
            points,
            intercept_fallback: false,
        });
    }

    let xs: Vec<f64> = samples.iter().map(|&(size, _)| kind.transform(size)).collect();
    let ys: Vec<f64> = samples.iter().map(|&(_, runtime)| runtime).collect();
    // Sizes are unique, so every sample is a distinct input.
    let linear_fit = least_squares_method(&xs, &ys).ok_or_else(|| degenerate(points))?;
    let r_squared = linear_fit.r_squared(&ys);

    let a = linear_fit.slope;
    let mut b = linear_fit.intercept;
    let mut intercept_fallback = false;
    if b < 0.0 {
        // `samples` is ordered by size.
        let (smallest_size, smallest_runtime) = samples[0];
        let fallback = (smallest_runtime - a).max(0.0);
        tracing::warn!(
            target: "calibrator",
            function,
            fitted = b,
            fallback,
            smallest_size,
            "negative intercept, recomputed from the smallest sample"
        );
        b = fallback;
        intercept_fallback = true;
    }

    tracing::debug!(target: "calibrator", function, %kind, a, b, r_squared, points, "fitted");
    Ok(Fit { coefficients: CostCoefficients { a, b }, r_squared: Some(r_squared), points, intercept_fallback })
}

/// Looks `function` up in `report` and fits it.
pub fn fit_from_report(
    report: &BenchmarkReport,
    function: &str,
    kind: GrowthKind,
) -> Result<Fit, CalibrationError> {
    let series = report
        .get(function)
        .ok_or_else(|| CalibrationError::MissingData { function: function.to_string() })?;
    fit(function, series, kind)
}
