//! CUPS implementation of the platform adapter.
//! 以 CUPS 指令列工具實作的平台列印介面。
//!
//! Printers are listed with `lpstat -l -p`, which reports each queue with
//! the description shown in print dialogs, and jobs are queued with `lp`,
//! which returns as soon as the scheduler has accepted the file.
//! 透過 `lpstat -l -p` 取得佇列與其顯示名稱，並以 `lp` 送出作業；排程器接受檔案後即返回。

use std::path::Path;

use once_cell::sync::Lazy;
use pdfspool_runexec::{RunError, RunExecutor, RunSpec};
use regex::Regex;
use thiserror::Error;

use crate::config::SpoolerConfig;
use crate::document::{inspect_pdf, DocumentError, DocumentInfo};
use crate::job::{PaperSize, PrintJobOptions, ScalingMode};
use crate::platform::{PlatformAdapter, PlatformJobHandle};
use crate::printer::PrinterInfo;

// Queue immediately and print on both sides, flipping on the long edge.
const HOLD_OPTION: &str = "job-hold-until=no-hold";
const SIDES_OPTION: &str = "sides=two-sided-long-edge";

// lpstat translates its report; the parser expects the C locale.
const LOCALE_VARS: [&str; 2] = ["LC_ALL", "LANG"];

static PRINTER_LINE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^printer (\S+)").expect("printer line pattern"));
static DESCRIPTION_LINE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\s+Description:(.*)$").expect("description line pattern"));
static REQUEST_ID: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"request id is (\S+)").expect("request id pattern"));

/// Errors raised while talking to the CUPS command-line tools.
/// 與 CUPS 指令列工具互動時可能發生的錯誤。
#[derive(Debug, Error)]
pub enum CupsError {
    #[error(transparent)]
    Run(#[from] RunError),
    #[error(transparent)]
    Document(#[from] DocumentError),
    #[error("'{program}' failed to list printers (exit code {code:?}): {stderr}")]
    Listing {
        program: String,
        code: Option<i32>,
        stderr: String,
    },
    #[error("cannot build print job: {0}")]
    InvalidJob(String),
    #[error("'{program}' rejected the job (exit code {code:?}): {stderr}")]
    Rejected {
        program: String,
        code: Option<i32>,
        stderr: String,
    },
}

/// Print context backed by CUPS.
/// 以 CUPS 為後端的列印環境。
#[derive(Debug, Clone)]
pub struct CupsAdapter {
    config: SpoolerConfig,
}

impl CupsAdapter {
    pub fn new(config: SpoolerConfig) -> Self {
        Self { config }
    }
}

impl PlatformAdapter for CupsAdapter {
    type Error = CupsError;
    type JobHandle = CupsJob;

    fn printers(&self) -> Result<Vec<PrinterInfo>, Self::Error> {
        let spec = LOCALE_VARS
            .iter()
            .fold(RunSpec::new(&self.config.lpstat), |spec, key| {
                spec.with_env(*key, "C")
            })
            .with_args(["-l", "-p"]);
        let result = RunExecutor::execute(&spec)?;
        if result.success() {
            return Ok(parse_printer_list(&result.stdout_text()));
        }

        let stderr = result.stderr_text();
        // lpstat exits non-zero when no queue is configured at all.
        if stderr.contains("No destinations added") {
            return Ok(Vec::new());
        }
        Err(CupsError::Listing {
            program: self.config.lpstat.clone(),
            code: result.exit_code,
            stderr,
        })
    }

    fn inspect(&self, document: &Path) -> Result<DocumentInfo, Self::Error> {
        Ok(inspect_pdf(document)?)
    }

    fn begin_job(&self, options: &PrintJobOptions) -> Result<Self::JobHandle, Self::Error> {
        let args = lp_arguments(options, &self.config.extra_options)?;
        log::debug!("{} configured for {}", options.job_id, options.printer);
        Ok(CupsJob {
            spec: RunSpec::new(&self.config.lp).with_args(args),
        })
    }
}

/// A configured `lp` invocation waiting for its document.
/// 已設定完成、等待文件的 `lp` 指令。
#[derive(Debug, Clone)]
pub struct CupsJob {
    spec: RunSpec,
}

impl PlatformJobHandle for CupsJob {
    type Error = CupsError;

    fn submit(self, document: &Path) -> Result<(), Self::Error> {
        let spec = self.spec.push_arg("--").push_arg(document);
        let result = RunExecutor::execute(&spec)?;
        if !result.success() {
            return Err(CupsError::Rejected {
                program: spec.program,
                code: result.exit_code,
                stderr: result.stderr_text(),
            });
        }
        match parse_request_id(&result.stdout_text()) {
            Some(request) => log::info!("{} accepted as {request}", document.display()),
            None => log::debug!("'{}' printed no request id", spec.program),
        }
        Ok(())
    }
}

/// Reads queues and their descriptions from `lpstat -l -p` output.
///
/// Each queue starts with an unindented `printer <queue> ...` line; its
/// indented `Description:` line, when present and non-blank, becomes the
/// display name.
pub fn parse_printer_list(output: &str) -> Vec<PrinterInfo> {
    let mut printers: Vec<PrinterInfo> = Vec::new();
    for line in output.lines() {
        if let Some(queue) = PRINTER_LINE.captures(line).and_then(|c| c.get(1)) {
            let queue = queue.as_str();
            printers.push(PrinterInfo::new(queue, queue));
        } else if let Some(description) = DESCRIPTION_LINE.captures(line).and_then(|c| c.get(1)) {
            if let Some(current) = printers.last_mut() {
                *current = PrinterInfo::new(current.queue.clone(), description.as_str().trim());
            }
        }
    }
    printers
}

/// Extracts the queue request id (`Office-42`) from the `lp` receipt.
pub fn parse_request_id(receipt: &str) -> Option<&str> {
    REQUEST_ID
        .captures(receipt)
        .and_then(|captures| captures.get(1))
        .map(|id| id.as_str())
}

/// Builds the `lp` arguments (everything but the document) for a job.
pub fn lp_arguments(
    options: &PrintJobOptions,
    extra_options: &[String],
) -> Result<Vec<String>, CupsError> {
    if options.printer.trim().is_empty() {
        return Err(CupsError::InvalidJob("printer name is empty".to_string()));
    }
    if !options.paper.is_valid() {
        return Err(CupsError::InvalidJob(format!(
            "paper size {} is not positive",
            options.paper
        )));
    }

    // `fit` keeps the aspect ratio; `fill` would crop to cover the sheet.
    let scaling = match options.scaling {
        ScalingMode::Fit => "print-scaling=fit",
        ScalingMode::Actual => "print-scaling=none",
    };

    let media = media_option(options.paper);
    let mut args = vec![
        "-d".to_string(),
        options.printer.clone(),
        "-t".to_string(),
        options.job_id.to_string(),
    ];
    for option in [HOLD_OPTION, SIDES_OPTION, media.as_str(), scaling] {
        args.push("-o".to_string());
        args.push(option.to_string());
    }
    for option in extra_options {
        args.push("-o".to_string());
        args.push(option.clone());
    }
    Ok(args)
}

// CUPS reads unit-less custom media dimensions as points.
fn media_option(paper: PaperSize) -> String {
    format!(
        "media=Custom.{}x{}",
        format_points(paper.width_pt),
        format_points(paper.height_pt)
    )
}

fn format_points(value: f64) -> String {
    let text = format!("{value:.2}");
    text.trim_end_matches('0').trim_end_matches('.').to_string()
}
