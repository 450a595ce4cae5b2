use std::path::{Path, PathBuf};

use cost_calibrator::config::CalibrationConfig;
use cost_calibrator::cost_table::CoefficientTable;
use cost_calibrator::emitter::{write_artifacts, ArtifactPaths, PriorCosts};
use cost_calibrator::pipeline::{self, Diagnostics};
use cost_calibrator::registry::FunctionRegistry;
use cost_calibrator::report::{load_criterion_report, BenchmarkReport};

#[derive(clap::Parser)]
#[clap(version, about = "Turns Criterion benchmark results into calibrated cost formulas")]
pub(crate) struct CalibratorCmd {
    /// JSON calibration config. See `dump-config` for the built-in defaults.
    #[clap(long, global = true)]
    config: Option<PathBuf>,
    /// Log at debug level.
    #[clap(long, short, global = true)]
    pub(crate) verbose: bool,
    #[clap(subcommand)]
    subcmd: SubCommand,
}

#[derive(clap::Subcommand)]
enum SubCommand {
    /// Fit every benchmarked function and write the unscaled constants table.
    Estimate(EstimateCmd),
    /// Reconcile, scale and synthesize a constants table into formulas.
    Generate(GenerateCmd),
    /// Estimate and generate in one pass.
    Run(RunCmd),
    /// List every benchmarked function with its sizes.
    Sizes(SizesCmd),
    /// Print the effective configuration as JSON.
    DumpConfig,
}

#[derive(clap::Args)]
struct EstimateCmd {
    #[clap(flatten)]
    input: BenchmarkArgs,
    /// Fit only this function.
    #[clap(long)]
    function: Option<String>,
    /// Where to write the `function,a,b,r2` table.
    #[clap(long, default_value = "cost_constants.csv")]
    out: PathBuf,
}

#[derive(clap::Args)]
struct GenerateCmd {
    /// Constants table written by `estimate`.
    #[clap(long)]
    constants: PathBuf,
    /// CSV with `function_name,type_name` columns.
    #[clap(long)]
    registry: PathBuf,
    #[clap(flatten)]
    artifacts: ArtifactArgs,
}

#[derive(clap::Args)]
struct RunCmd {
    #[clap(flatten)]
    input: BenchmarkArgs,
    /// Also write the unscaled constants table here.
    #[clap(long)]
    constants_out: Option<PathBuf>,
    #[clap(flatten)]
    artifacts: ArtifactArgs,
}

#[derive(clap::Args)]
struct SizesCmd {
    /// Criterion output directory, usually `target/criterion`.
    #[clap(long)]
    criterion_dir: PathBuf,
}

#[derive(clap::Args)]
struct BenchmarkArgs {
    /// Criterion output directory, usually `target/criterion`.
    #[clap(long)]
    criterion_dir: PathBuf,
    /// CSV with `function_name,type_name` columns.
    #[clap(long)]
    registry: PathBuf,
}

#[derive(clap::Args)]
struct ArtifactArgs {
    /// `function,a,b` table of the scaled constants currently in use.
    #[clap(long)]
    prior: Option<PathBuf>,
    /// Where to write the formula definitions.
    #[clap(long, default_value = "new_costs.clar")]
    out: PathBuf,
    /// Where to write the comparison of new and old formulas.
    #[clap(long, default_value = "cost_comparison.md")]
    table: PathBuf,
}

impl CalibratorCmd {
    pub(crate) fn run(self) -> anyhow::Result<Diagnostics> {
        let config = load_config(self.config.as_deref())?;
        match self.subcmd {
            SubCommand::Estimate(cmd) => cmd.run(&config),
            SubCommand::Generate(cmd) => cmd.run(&config),
            SubCommand::Run(cmd) => cmd.run(&config),
            SubCommand::Sizes(cmd) => cmd.run(),
            SubCommand::DumpConfig => {
                println!("{}", serde_json::to_string_pretty(&config)?);
                Ok(Diagnostics::default())
            }
        }
    }
}

fn load_config(path: Option<&Path>) -> anyhow::Result<CalibrationConfig> {
    match path {
        Some(path) => CalibrationConfig::from_path(path),
        None => {
            let config = CalibrationConfig::default();
            config.validate()?;
            Ok(config)
        }
    }
}

impl EstimateCmd {
    fn run(self, config: &CalibrationConfig) -> anyhow::Result<Diagnostics> {
        let registry = FunctionRegistry::from_path(&self.input.registry)?;
        let (table, diagnostics) = self.input.estimate(config, &registry, self.function.as_deref())?;
        table.write_path(&self.out)?;
        tracing::info!(target: "calibrator", out = %self.out.display(), rows = table.len(), "constants written");
        Ok(diagnostics)
    }
}

impl GenerateCmd {
    fn run(self, config: &CalibrationConfig) -> anyhow::Result<Diagnostics> {
        let registry = FunctionRegistry::from_path(&self.registry)?;
        let table = CoefficientTable::from_path(&self.constants)?;
        self.artifacts.generate(table, config, &registry)
    }
}

impl RunCmd {
    fn run(self, config: &CalibrationConfig) -> anyhow::Result<Diagnostics> {
        let registry = FunctionRegistry::from_path(&self.input.registry)?;
        let (table, mut diagnostics) = self.input.estimate(config, &registry, None)?;
        if let Some(path) = &self.constants_out {
            table.write_path(path)?;
        }
        diagnostics.merge(self.artifacts.generate(table, config, &registry)?);
        Ok(diagnostics)
    }
}

impl SizesCmd {
    fn run(self) -> anyhow::Result<Diagnostics> {
        let (report, dropped) = load_criterion_report(&self.criterion_dir)?;
        print_sizes(&report);
        Ok(Diagnostics { skipped: Vec::new(), failures: dropped })
    }
}

impl BenchmarkArgs {
    fn estimate(
        &self,
        config: &CalibrationConfig,
        registry: &FunctionRegistry,
        only: Option<&str>,
    ) -> anyhow::Result<(CoefficientTable, Diagnostics)> {
        let (report, dropped) = load_criterion_report(&self.criterion_dir)?;
        let (table, diagnostics) = pipeline::estimate(&report, config, registry, only);
        let mut all = Diagnostics { skipped: Vec::new(), failures: dropped };
        all.merge(diagnostics);
        Ok((table, all))
    }
}

impl ArtifactArgs {
    fn generate(
        &self,
        table: CoefficientTable,
        config: &CalibrationConfig,
        registry: &FunctionRegistry,
    ) -> anyhow::Result<Diagnostics> {
        let prior = match &self.prior {
            Some(path) => {
                let prior = PriorCosts::from_path(path)?;
                tracing::info!(target: "calibrator", path = %path.display(), rows = prior.len(), "loaded prior constants");
                prior
            }
            None => PriorCosts::default(),
        };
        let policy = config.scaling_policy()?;
        let (definitions, diagnostics) = pipeline::generate(table, config, registry, &policy);
        let paths = ArtifactPaths { formulas: &self.out, comparison: &self.table };
        write_artifacts(&definitions, &prior, &paths)?;
        Ok(diagnostics)
    }
}

fn print_sizes(report: &BenchmarkReport) {
    for (function, series) in report.iter() {
        let sizes: Vec<String> = series.sizes().iter().map(u64::to_string).collect();
        println!("{:<40} {}", function, sizes.join(" "));
    }
}
