use std::path::PathBuf;

/// Per-function failures of the calibration pipeline.
///
/// None of these abort a run. They are collected into
/// [`crate::pipeline::Diagnostics`] and reported once all functions have been
/// processed.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum CalibrationError {
    /// The function does not appear in the benchmark report at all.
    #[error("function `{function}` not found in the benchmark report")]
    MissingData { function: String },

    /// The trial summary of a single benchmarked size could not be read.
    #[error("malformed sample for `{function}` at size {size} ({}): {reason}", .path.display())]
    MalformedSample { function: String, size: u64, path: PathBuf, reason: String },

    /// The registry declares a growth kind outside of the closed set.
    #[error("unknown growth kind `{kind}` declared for `{function}`")]
    UnknownGrowthKind { function: String, kind: String },

    /// The function has neither a registry entry nor a special-case template.
    #[error("unhandled special case: `{function}` has no growth kind and no template")]
    UnhandledSpecialCase { function: String },

    /// Not enough distinct inputs to fit the declared growth shape.
    #[error("cannot fit `{function}`: {points} usable sample(s) with {distinct} distinct input(s)")]
    DegenerateSeries { function: String, points: usize, distinct: usize },
}

impl CalibrationError {
    /// Generation errors signal that metadata and benchmark coverage drifted
    /// apart. They make the run fail after all artifacts have been written.
    pub fn is_generation_error(&self) -> bool {
        matches!(
            self,
            CalibrationError::UnknownGrowthKind { .. }
                | CalibrationError::UnhandledSpecialCase { .. }
        )
    }

    pub fn function(&self) -> &str {
        match self {
            CalibrationError::MissingData { function }
            | CalibrationError::MalformedSample { function, .. }
            | CalibrationError::UnknownGrowthKind { function, .. }
            | CalibrationError::UnhandledSpecialCase { function }
            | CalibrationError::DegenerateSeries { function, .. } => function,
        }
    }
}

/// Invalid calibration configuration. Fatal before any benchmark is read.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConfigError {
    #[error("scale denominator must not be zero")]
    ZeroDenominator,
    #[error("scale numerator must not be zero")]
    ZeroNumerator,
    #[error("function `{function}` is a member of more than one matched group")]
    OverlappingGroups { function: String },
    #[error("matched group #{index} has fewer than two members")]
    TrivialGroup { index: usize },
    #[error(
        "special case `{function}` has a constant runtime but declares `{dimension}` linear in size"
    )]
    LinearDimensionOnConstantTemplate { function: String, dimension: &'static str },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generation_errors() {
        let unknown =
            CalibrationError::UnknownGrowthKind { function: "cost_add".into(), kind: "quad".into() };
        let unhandled = CalibrationError::UnhandledSpecialCase { function: "cost_foo".into() };
        let missing = CalibrationError::MissingData { function: "cost_bar".into() };
        assert!(unknown.is_generation_error());
        assert!(unhandled.is_generation_error());
        assert!(!missing.is_generation_error());
        assert_eq!(unhandled.function(), "cost_foo");
    }

    #[test]
    fn display_names_the_function() {
        let err = CalibrationError::DegenerateSeries { function: "cost_le".into(), points: 1, distinct: 1 };
        assert_eq!(
            err.to_string(),
            "cannot fit `cost_le`: 1 usable sample(s) with 1 distinct input(s)"
        );
    }
}
