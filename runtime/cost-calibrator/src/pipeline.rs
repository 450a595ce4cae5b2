//! The two stages of a calibration run.
//!
//! Estimation fits every benchmarked function. Generation reconciles matched
//! groups on the fitted values, then scales and synthesizes each function.
//! Per-function failures end up in [`Diagnostics`] and never abort a stage.

use std::collections::BTreeSet;
use std::fmt;

use crate::config::CalibrationConfig;
use crate::cost_table::CoefficientTable;
use crate::dispatch::select_shape;
use crate::error::CalibrationError;
use crate::estimator::fit_from_report;
use crate::formula::FunctionDefinition;
use crate::matched_group::reconcile;
use crate::registry::FunctionRegistry;
use crate::report::BenchmarkReport;
use crate::scaling::ScalingPolicy;
use crate::synthesizer::{synthesize, Outcome};

/// What went wrong or was left out during a run.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Diagnostics {
    /// Functions on the skip list, in processing order.
    pub skipped: Vec<String>,
    pub failures: Vec<CalibrationError>,
}

impl Diagnostics {
    pub fn record(&mut self, err: CalibrationError) {
        if err.is_generation_error() {
            tracing::error!(target: "calibrator", "{err}");
        } else {
            tracing::warn!(target: "calibrator", "{err}");
        }
        self.failures.push(err);
    }

    pub fn merge(&mut self, other: Diagnostics) {
        self.skipped.extend(other.skipped);
        self.failures.extend(other.failures);
    }

    /// Metadata and benchmark coverage drifted apart for some function.
    pub fn has_generation_errors(&self) -> bool {
        self.failures.iter().any(CalibrationError::is_generation_error)
    }

    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }

    pub fn is_empty(&self) -> bool {
        self.skipped.is_empty() && self.failures.is_empty()
    }
}

impl fmt::Display for Diagnostics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{} skipped, {} failed", self.skipped.len(), self.failures.len())?;
        if !self.skipped.is_empty() {
            writeln!(f, "skipped: {}", self.skipped.join(", "))?;
        }
        for err in &self.failures {
            let severity = if err.is_generation_error() { "error" } else { "warning" };
            writeln!(f, "{severity}: {err}")?;
        }
        Ok(())
    }
}

/// Fits every function of `report`, or only `only`.
///
/// Functions declared in the registry or by a template but missing from
/// `report` are reported as `MissingData`, unless they are skipped. Skipped
/// functions that were benchmarked are fitted too when they have a cost shape,
/// so the constants table stays complete; skipping happens at generation.
pub fn estimate(
    report: &BenchmarkReport,
    config: &CalibrationConfig,
    registry: &FunctionRegistry,
    only: Option<&str>,
) -> (CoefficientTable, Diagnostics) {
    let mut table = CoefficientTable::default();
    let mut diagnostics = Diagnostics::default();

    let functions: BTreeSet<&str> = match only {
        Some(function) => BTreeSet::from([function]),
        None => {
            let declared = registry
                .functions()
                .chain(config.special_cases.keys().map(String::as_str))
                .filter(|function| report.get(function).is_none() && !config.is_skipped(function));
            report.functions().chain(declared).collect()
        }
    };
    for function in functions {
        let shape = match select_shape(function, config, registry) {
            Ok(shape) => shape,
            Err(_) if config.is_skipped(function) => {
                tracing::debug!(target: "calibrator", function, "no cost shape for skipped function, not fitted");
                continue;
            }
            Err(err) => {
                diagnostics.record(err);
                continue;
            }
        };
        match fit_from_report(report, function, shape.growth_kind()) {
            Ok(fit) => {
                table.add(function, fit.coefficients, fit.r_squared);
            }
            Err(err) => diagnostics.record(err),
        }
    }

    tracing::info!(target: "calibrator", fitted = table.len(), failed = diagnostics.failures.len(), "estimation done");
    (table, diagnostics)
}

/// Turns fitted coefficients into formulas, in table order.
pub fn generate(
    mut table: CoefficientTable,
    config: &CalibrationConfig,
    registry: &FunctionRegistry,
    policy: &ScalingPolicy,
) -> (Vec<FunctionDefinition>, Diagnostics) {
    // Groups share the envelope of their fitted values, scaling comes after.
    reconcile(&mut table, &config.matched_groups);

    let mut definitions = Vec::new();
    let mut diagnostics = Diagnostics::default();
    for row in table.iter() {
        match synthesize(&row.function, row.coefficients(), config, registry, policy) {
            Ok(Outcome::Skipped) => diagnostics.skipped.push(row.function.clone()),
            Ok(outcome) => definitions.extend(outcome.into_definition()),
            Err(err) => diagnostics.record(err),
        }
    }

    tracing::info!(
        target: "calibrator",
        synthesized = definitions.len(),
        skipped = diagnostics.skipped.len(),
        failed = diagnostics.failures.len(),
        "generation done"
    );
    (definitions, diagnostics)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::estimator::CostCoefficients;
    use crate::formula::CostFormula;
    use crate::matched_group::MatchedGroup;
    use crate::report::SampleSeries;
    use crate::scaling::ScaledCoefficients;

    fn report() -> BenchmarkReport {
        let mut report = BenchmarkReport::default();
        report.insert("cost_add", [(10, 100.0), (100, 1000.0)].into_iter().collect::<SampleSeries>());
        report.insert("cost_sqrti", [(1, 50.0), (2, 45.0), (4, 60.0)].into_iter().collect::<SampleSeries>());
        report.insert("cost_sha256", [(1, 9000.0), (2, 9000.0)].into_iter().collect::<SampleSeries>());
        report.insert("cost_mystery", [(1, 10.0), (2, 20.0)].into_iter().collect::<SampleSeries>());
        report
    }

    fn registry() -> FunctionRegistry {
        [("cost_add", "linear"), ("cost_sqrti", "constant"), ("cost_sha256", "constant"), ("cost_le", "linear")]
            .into_iter()
            .collect()
    }

    #[test]
    fn estimate_fits_and_reports_failures() {
        let (table, diagnostics) = estimate(&report(), &CalibrationConfig::default(), &registry(), None);
        let names: Vec<_> = table.iter().map(|row| row.function.as_str()).collect();
        assert_eq!(names, ["cost_add", "cost_sha256", "cost_sqrti"]);
        assert_eq!(
            diagnostics.failures,
            [
                CalibrationError::MissingData { function: "cost_le".into() },
                CalibrationError::UnhandledSpecialCase { function: "cost_mystery".into() },
            ]
        );
        assert!(diagnostics.has_generation_errors());
    }

    #[test]
    fn declared_but_unbenchmarked_is_missing_data() {
        let mut report = BenchmarkReport::default();
        report.insert("cost_add", [(10, 100.0), (100, 1000.0)].into_iter().collect::<SampleSeries>());
        let registry: FunctionRegistry =
            [("cost_add", "linear"), ("cost_sub", "linear"), ("cost_print", "linear")].into_iter().collect();
        let mut config = CalibrationConfig::default();
        config.special_cases.retain(|function, _| function == "cost_fetch_var");
        config.skip.remove("cost_fetch_var");

        let (table, diagnostics) = estimate(&report, &config, &registry, None);
        assert_eq!(table.len(), 1);
        // cost_print is skipped, so its missing samples are not worth a diagnostic.
        assert_eq!(
            diagnostics.failures,
            [
                CalibrationError::MissingData { function: "cost_fetch_var".into() },
                CalibrationError::MissingData { function: "cost_sub".into() },
            ]
        );
        assert!(!diagnostics.has_generation_errors());
    }

    #[test]
    fn estimate_single_function() {
        let config = CalibrationConfig::default();
        let (table, diagnostics) = estimate(&report(), &config, &registry(), Some("cost_add"));
        assert_eq!(table.len(), 1);
        assert!(diagnostics.is_clean());

        let (table, diagnostics) = estimate(&report(), &config, &registry(), Some("cost_le"));
        assert!(table.is_empty());
        assert_eq!(diagnostics.failures, [CalibrationError::MissingData { function: "cost_le".into() }]);
        assert!(!diagnostics.has_generation_errors());
    }

    #[test]
    fn generate_end_to_end() {
        let config = CalibrationConfig::default();
        let registry = registry();
        let (table, _) = estimate(&report(), &config, &registry, None);
        let policy = config.scaling_policy().unwrap();
        let (definitions, diagnostics) = generate(table, &config, &registry, &policy);

        assert_eq!(
            definitions,
            [
                FunctionDefinition {
                    name: "cost_add".into(),
                    formula: CostFormula::Linear(ScaledCoefficients { a: 1, b: 0 }),
                },
                FunctionDefinition { name: "cost_sqrti".into(), formula: CostFormula::RuntimeOnly(1) },
            ]
        );
        assert_eq!(diagnostics.skipped, ["cost_sha256"]);
        assert!(diagnostics.is_clean());
    }

    #[test]
    fn reconcile_happens_before_scaling() {
        let mut config = CalibrationConfig::default();
        config.matched_groups = vec![MatchedGroup::new(["cost_le", "cost_ge"])];
        let registry: FunctionRegistry = [("cost_le", "linear"), ("cost_ge", "linear")].into_iter().collect();
        let mut table = CoefficientTable::default();
        // Each slope alone floors to 0 units; their max does not.
        table.add("cost_le", CostCoefficients { a: 599.0, b: 1200.0 }, None);
        table.add("cost_ge", CostCoefficients { a: 1300.0, b: 30.0 }, None);
        let policy = ScalingPolicy::new(1, 600).unwrap();
        let (definitions, _) = generate(table, &config, &registry, &policy);
        for definition in &definitions {
            assert_eq!(definition.formula, CostFormula::Linear(ScaledCoefficients { a: 2, b: 2 }));
        }
        assert_eq!(definitions.len(), 2);
    }

    #[test]
    fn summary_lists_everything() {
        let mut diagnostics = Diagnostics::default();
        diagnostics.skipped.push("cost_print".into());
        diagnostics.record(CalibrationError::UnhandledSpecialCase { function: "cost_x".into() });
        let text = diagnostics.to_string();
        assert!(text.starts_with("1 skipped, 1 failed\n"));
        assert!(text.contains("skipped: cost_print"));
        assert!(text.contains("error: unhandled special case: `cost_x`"));
    }
}
