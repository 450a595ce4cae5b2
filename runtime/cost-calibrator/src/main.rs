use std::env;
use std::io;

use clap::Parser;
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::EnvFilter;

mod cli;

fn init_logging(verbose: bool) {
    let default = if verbose { "calibrator=debug" } else { "calibrator=info" };
    let mut env_filter = EnvFilter::new(default).add_directive(LevelFilter::WARN.into());

    if let Ok(rust_log) = env::var("RUST_LOG") {
        for directive in rust_log.split(',').filter_map(|s| match s.parse() {
            Ok(directive) => Some(directive),
            Err(err) => {
                eprintln!("Ignoring directive `{}`: {}", s, err);
                None
            }
        }) {
            env_filter = env_filter.add_directive(directive);
        }
    }
    tracing_subscriber::fmt::Subscriber::builder()
        .with_env_filter(env_filter)
        .with_writer(io::stderr)
        .init();
}

fn main() -> anyhow::Result<()> {
    let cmd = cli::CalibratorCmd::parse();
    init_logging(cmd.verbose);

    let diagnostics = cmd.run()?;
    if !diagnostics.is_empty() {
        eprintln!("{:=^72}", " Calibration summary ");
        eprint!("{diagnostics}");
    }
    if diagnostics.has_generation_errors() {
        // Artifacts are already written, the operator has to triage the rest.
        std::process::exit(1);
    }
    Ok(())
}
