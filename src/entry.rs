//! Process entry: argument parsing, configuration, logging, and the
//! runtime bootstrap.
use std::path::Path;

use clap::{ArgMatches, CommandFactory, FromArgMatches};
use url::Url;

use crate::args::BenchArgs;
use crate::config;
use crate::error::AppResult;
use crate::logger;
use crate::report;
use crate::run::RunController;

/// Parses arguments, validates the configuration, and drives one run.
///
/// # Errors
///
/// Returns an error on invalid configuration (before any worker starts) or
/// when the runtime cannot be built. Request failures observed during the
/// run are counted in the report and never fail the process.
pub fn run() -> AppResult<()> {
    let (mut args, matches) = parse_args()?;

    if let Some(path) = args.config.clone() {
        let file = config::load_config_file(Path::new(&path))?;
        config::apply_config(&mut args, &matches, &file)?;
    }

    logger::init_logging(args.debug, args.no_color);

    // Configuration must be valid before any worker starts.
    let url = args.target_url()?;

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;

    runtime.block_on(run_async(args, url))
}

fn parse_args() -> AppResult<(BenchArgs, ArgMatches)> {
    let matches = BenchArgs::command().get_matches();
    let args = BenchArgs::from_arg_matches(&matches)?;
    Ok((args, matches))
}

async fn run_async(args: BenchArgs, url: Url) -> AppResult<()> {
    for line in report::banner_lines(&args, &url) {
        println!("{line}");
    }

    let output = args.output.clone();
    let mut controller = RunController::new(args, url);
    let run_report = controller.run().await?;
    run_report.print();

    if let Some(path) = output {
        report::write_json(&run_report, Path::new(&path))?;
        tracing::info!("Report written to {}", path);
    }

    Ok(())
}
