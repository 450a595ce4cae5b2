use crate::config::CalibrationConfig;
use crate::dispatch::{select_route, CostShape, Route};
use crate::error::CalibrationError;
use crate::estimator::CostCoefficients;
use crate::formula::{CostExpr, CostFormula, FixedShape, FunctionDefinition};
use crate::growth_kind::GrowthKind;
use crate::registry::FunctionRegistry;
use crate::scaling::{ScaledCoefficients, ScalingPolicy};
use crate::special_case::{Dimension, RuntimeShape, SpecialCaseTemplate};

/// How a function ended up in (or out of) the formula document.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Outcome {
    Skipped,
    Generic(FunctionDefinition),
    /// Template with a constant runtime: only the scaled intercept is used.
    SingleConstant(FunctionDefinition),
    /// Template with a linear runtime: slope and intercept are used, also for
    /// every storage dimension declared linear.
    TwoConstant(FunctionDefinition),
}

impl Outcome {
    pub fn into_definition(self) -> Option<FunctionDefinition> {
        match self {
            Outcome::Skipped => None,
            Outcome::Generic(definition)
            | Outcome::SingleConstant(definition)
            | Outcome::TwoConstant(definition) => Some(definition),
        }
    }
}

/// Turns the reconciled, pre-scaling coefficients of `function` into its
/// formula.
pub fn synthesize(
    function: &str,
    coefficients: CostCoefficients,
    config: &CalibrationConfig,
    registry: &FunctionRegistry,
    policy: &ScalingPolicy,
) -> Result<Outcome, CalibrationError> {
    let shape = match select_route(function, config, registry)? {
        Route::Skipped => {
            tracing::info!(target: "calibrator", function, "skipped");
            return Ok(Outcome::Skipped);
        }
        Route::Priced(shape) => shape,
    };
    let scaled = policy.scale(function, coefficients, shape.growth_kind());
    let outcome = synthesize_shape(function, shape, scaled);
    tracing::debug!(target: "calibrator", function, a = scaled.a, b = scaled.b, "synthesized");
    Ok(outcome)
}

/// Builds the formula of an already routed function from scaled coefficients.
pub fn synthesize_shape(function: &str, shape: CostShape, scaled: ScaledCoefficients) -> Outcome {
    let name = function.to_string();
    match shape {
        CostShape::Generic(kind) => {
            let formula = match kind {
                GrowthKind::Constant => CostFormula::RuntimeOnly(scaled.b),
                GrowthKind::Linear => CostFormula::Linear(scaled),
                GrowthKind::LogN => CostFormula::LogN(scaled),
                GrowthKind::NLogN => CostFormula::NLogN(scaled),
            };
            Outcome::Generic(FunctionDefinition { name, formula })
        }
        CostShape::SpecialCase(template) => {
            let formula = CostFormula::FixedShape(fill_template(&template, scaled));
            let definition = FunctionDefinition { name, formula };
            match template.runtime {
                RuntimeShape::Constant => Outcome::SingleConstant(definition),
                RuntimeShape::Linear => Outcome::TwoConstant(definition),
            }
        }
    }
}

fn fill_template(template: &SpecialCaseTemplate, scaled: ScaledCoefficients) -> FixedShape {
    let dimension = |dimension: Dimension| match dimension {
        Dimension::Constant(value) => CostExpr::Constant(value),
        Dimension::Linear => CostExpr::Linear(scaled),
    };
    let runtime = match template.runtime {
        RuntimeShape::Constant => CostExpr::Constant(scaled.b),
        RuntimeShape::Linear => CostExpr::Linear(scaled),
    };
    FixedShape {
        runtime,
        write_length: dimension(template.write_length),
        write_count: dimension(template.write_count),
        read_count: dimension(template.read_count),
        read_length: dimension(template.read_length),
    }
}
