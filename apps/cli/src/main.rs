use anyhow::{Context, Result};
use pdfspool_cmdline::{usage, InvocationConfig, ParseError, ParseOutcome};
use pdfspool_printing::{
    run_batch, BatchError, BatchRequest, CupsAdapter, FileReport, SpoolerConfig,
};

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn"))
        .format_timestamp(None)
        .init();

    match run() {
        Ok(code) => std::process::exit(code),
        Err(err) => {
            eprintln!("Error: {err:#}");
            std::process::exit(1);
        }
    }
}

fn run() -> Result<i32> {
    let config = match pdfspool_cmdline::parse(std::env::args_os()) {
        Ok(ParseOutcome::Help) => {
            eprintln!("{}", usage());
            return Ok(0);
        }
        Ok(ParseOutcome::Run(config)) => config,
        Err(err) => {
            report_parse_error(&err);
            return Ok(1);
        }
    };
    for token in &config.unrecognized {
        log::warn!("ignoring unrecognized argument '{token}'");
    }

    let spooler = SpoolerConfig::from_env().context("failed to load spooler configuration")?;
    let adapter = CupsAdapter::new(spooler);
    Ok(execute(&config, &adapter))
}

fn report_parse_error(err: &ParseError) {
    match err {
        ParseError::NoArguments => eprintln!("{err}"),
        _ if err.shows_usage() => eprintln!("Error: {err}\n\n{}", usage()),
        _ => eprintln!("Error: {err}"),
    }
}

fn execute(config: &InvocationConfig, adapter: &CupsAdapter) -> i32 {
    let request = BatchRequest {
        files: &config.files,
        printer: &config.printer,
        scaling: config.scaling,
        paper: config.paper,
        fast_fail: config.fast_fail,
    };

    match run_batch(&request, adapter, print_report) {
        Ok(result) => {
            if result.aborted {
                eprintln!("Stopping after the first failure (--fast-fail).");
            } else if result.any_failure {
                eprintln!(
                    "{} of {} file(s) failed to print.",
                    result.attempted - result.printed,
                    result.attempted
                );
            }
            result.exit_code()
        }
        Err(BatchError::PrinterResolution(err)) => {
            eprintln!("Error: printer '{}' not found.", err.requested);
            if err.available.is_empty() {
                eprintln!("No printers are installed.");
            } else {
                eprintln!("Available printers:");
                for name in &err.available {
                    eprintln!("  {name}");
                }
            }
            1
        }
        Err(err) => {
            eprintln!("Error: {err}");
            1
        }
    }
}

fn print_report(report: FileReport<'_>) {
    match report.outcome {
        Ok(paper) => println!(
            "Printed {} on '{}' ({paper})",
            report.path.display(),
            report.printer
        ),
        Err(err) => eprintln!("Error: {err}"),
    }
}
