use std::str::FromStr;

use crate::config::CalibrationConfig;
use crate::error::CalibrationError;
use crate::growth_kind::GrowthKind;
use crate::registry::FunctionRegistry;
use crate::special_case::SpecialCaseTemplate;

/// How a function is priced. Selected once per function and carried through
/// fitting, scaling and synthesis.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum CostShape {
    /// Runtime-only formula of the declared growth kind.
    Generic(GrowthKind),
    /// Fixed-shape formula with storage dimensions.
    SpecialCase(SpecialCaseTemplate),
}

impl CostShape {
    /// Kind used for the regression transform and for clamping.
    pub fn growth_kind(&self) -> GrowthKind {
        match self {
            CostShape::Generic(kind) => *kind,
            CostShape::SpecialCase(template) => template.growth_kind(),
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Route {
    /// On the skip list: nothing is emitted.
    Skipped,
    Priced(CostShape),
}

/// Decides how `function` is handled: the skip list is checked first, then
/// its cost shape is selected.
pub fn select_route(
    function: &str,
    config: &CalibrationConfig,
    registry: &FunctionRegistry,
) -> Result<Route, CalibrationError> {
    if config.is_skipped(function) {
        return Ok(Route::Skipped);
    }
    select_shape(function, config, registry).map(Route::Priced)
}

/// Cost shape of `function`, regardless of the skip list.
///
/// A special-case template takes precedence over a registry entry, since it
/// also prices storage. Functions in neither are an error, as is a registry
/// entry with an unknown growth kind.
pub fn select_shape(
    function: &str,
    config: &CalibrationConfig,
    registry: &FunctionRegistry,
) -> Result<CostShape, CalibrationError> {
    let declared = registry.declared_kind(function);
    if let Some(template) = config.special_case(function) {
        if let Some(kind) = declared {
            tracing::warn!(
                target: "calibrator",
                function,
                declared = kind,
                "function has both a growth kind and a special-case template, using the template"
            );
        }
        return Ok(CostShape::SpecialCase(*template));
    }

    match declared {
        Some(kind) => GrowthKind::from_str(kind).map(CostShape::Generic).map_err(|_| {
            CalibrationError::UnknownGrowthKind { function: function.to_string(), kind: kind.to_string() }
        }),
        None => Err(CalibrationError::UnhandledSpecialCase { function: function.to_string() }),
    }
}
