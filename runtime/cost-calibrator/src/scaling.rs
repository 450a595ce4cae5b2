use num_rational::Ratio;
use num_traits::ToPrimitive;

use crate::error::ConfigError;
use crate::estimator::CostCoefficients;
use crate::growth_kind::GrowthKind;

/// Coefficients in protocol cost units, ready to be written into a formula.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, PartialOrd, Ord)]
pub struct ScaledCoefficients {
    pub a: u64,
    pub b: u64,
}

/// Converts nanosecond-domain coefficients into the unitless runtime
/// dimension used by the block limit.
///
/// Scaling rounds down, then applies two floors:
/// - a strictly positive slope of a non-constant kind is charged at least one
///   unit per step of the transformed size,
/// - a constant-kind function is charged at least one unit.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct ScalingPolicy {
    scale: Ratio<u64>,
}

impl ScalingPolicy {
    pub fn new(numerator: u64, denominator: u64) -> Result<Self, ConfigError> {
        if denominator == 0 {
            return Err(ConfigError::ZeroDenominator);
        }
        if numerator == 0 {
            return Err(ConfigError::ZeroNumerator);
        }
        Ok(Self { scale: Ratio::new(numerator, denominator) })
    }

    pub fn ratio(&self) -> Ratio<u64> {
        self.scale
    }

    /// `floor(value * SCALE)`; negative and undefined values scale to 0.
    pub fn scale_value(&self, value: f64) -> u64 {
        let numer = self.scale.numer().to_f64().unwrap_or(f64::NAN);
        let denom = self.scale.denom().to_f64().unwrap_or(f64::NAN);
        let scaled = (value * numer / denom).floor();
        if scaled.is_nan() || scaled <= 0.0 {
            return 0;
        }
        // Saturates on overflow.
        scaled as u64
    }

    /// Scales reconciled coefficients and applies the floors for `kind`.
    pub fn scale(&self, function: &str, coefficients: CostCoefficients, kind: GrowthKind) -> ScaledCoefficients {
        let CostCoefficients { a, b } = coefficients;
        if kind.is_constant() {
            // Only the intercept is charged for constant functions.
            let b_units = self.scale_value(b).max(1);
            return ScaledCoefficients { a: 0, b: b_units };
        }

        if a < 0.0 {
            tracing::warn!(target: "calibrator", function, a, "negative slope, charging 0 per unit of size");
        }
        let mut a_units = self.scale_value(a);
        if a_units == 0 && a > 0.0 {
            tracing::debug!(target: "calibrator", function, a, "slope floors to 0 units, clamping to 1");
            a_units = 1;
        }
        ScaledCoefficients { a: a_units, b: self.scale_value(b) }
    }
}
