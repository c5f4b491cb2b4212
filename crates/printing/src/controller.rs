use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::document::{validate_path, DocumentError};
use crate::job::{PaperId, PaperSize, PrintJobOptions, ScalingMode};
use crate::platform::{PlatformAdapter, PlatformJobHandle};
use crate::printer::{require_destination, PrinterResolutionError};

/// Everything the driver needs to print a batch of documents.
/// 執行批次列印所需的設定。
#[derive(Debug, Clone, Copy)]
pub struct BatchRequest<'a> {
    pub files: &'a [PathBuf],
    pub printer: &'a str,
    pub scaling: ScalingMode,
    pub paper: PaperId,
    pub fast_fail: bool,
}

/// Aggregate outcome of a batch that ran to completion or was cut short by
/// fast-fail.
/// 批次列印的整體結果。
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BatchResult {
    pub any_failure: bool,
    pub attempted: usize,
    pub printed: usize,
    /// Set when fast-fail stopped the batch before the last file.
    pub aborted: bool,
}

impl BatchResult {
    pub fn exit_code(&self) -> i32 {
        if self.any_failure {
            1
        } else {
            0
        }
    }
}

/// Failures that end the whole batch before any file is printed.
/// 使整個批次無法繼續的錯誤。
#[derive(Debug, Error)]
pub enum BatchError {
    #[error("failed to list printers: {0}")]
    PrinterDirectory(String),
    #[error(transparent)]
    PrinterResolution(#[from] PrinterResolutionError),
}

/// Recoverable failure while printing a single document.
/// 單一文件列印失敗（可繼續處理其他檔案）。
#[derive(Debug, Error)]
pub enum FileError {
    #[error(transparent)]
    Invalid(#[from] DocumentError),
    #[error("cannot open '{}': {reason}", .path.display())]
    Open { path: PathBuf, reason: String },
    #[error("cannot create print job for '{}': {reason}", .path.display())]
    Job { path: PathBuf, reason: String },
    #[error("printing '{}' failed: {reason}", .path.display())]
    Submit { path: PathBuf, reason: String },
}

/// Per-file report handed to the caller as the batch progresses.
#[derive(Debug)]
pub struct FileReport<'a> {
    pub path: &'a Path,
    /// Display name of the resolved printer.
    pub printer: &'a str,
    pub outcome: Result<PaperSize, FileError>,
}

/// Resolves the printer once, then prints every file in order.
/// 先解析印表機，再依序列印每個檔案。
///
/// Printer problems are returned as [`BatchError`] regardless of
/// `fast_fail`. Per-file failures are passed to `report`; with `fast_fail`
/// the first one stops the batch.
pub fn run_batch<A, F>(
    request: &BatchRequest<'_>,
    adapter: &A,
    mut report: F,
) -> Result<BatchResult, BatchError>
where
    A: PlatformAdapter,
    F: FnMut(FileReport<'_>),
{
    let available = adapter
        .printers()
        .map_err(|err| BatchError::PrinterDirectory(err.to_string()))?;
    let printer = require_destination(request.printer, &available)?;
    log::debug!(
        "printer '{}' resolved to queue '{}' ({})",
        request.printer,
        printer.queue,
        printer.display_name
    );

    let fixed_paper = request.paper.size();
    let mut result = BatchResult::default();

    for (index, path) in request.files.iter().enumerate() {
        result.attempted += 1;
        let outcome = print_file(adapter, &printer.queue, request.scaling, fixed_paper, path);
        let failed = outcome.is_err();
        report(FileReport {
            path,
            printer: &printer.display_name,
            outcome,
        });

        if !failed {
            result.printed += 1;
            continue;
        }
        result.any_failure = true;
        if request.fast_fail {
            result.aborted = index + 1 < request.files.len();
            break;
        }
    }

    Ok(result)
}

fn print_file<A>(
    adapter: &A,
    queue: &str,
    scaling: ScalingMode,
    fixed_paper: Option<PaperSize>,
    path: &Path,
) -> Result<PaperSize, FileError>
where
    A: PlatformAdapter,
{
    validate_path(path)?;

    let info = adapter.inspect(path).map_err(|err| FileError::Open {
        path: path.to_path_buf(),
        reason: err.to_string(),
    })?;
    if info.page_count == 0 {
        return Err(DocumentError::NoPages(path.to_path_buf()).into());
    }

    let paper = fixed_paper.unwrap_or(info.first_page);
    let options = PrintJobOptions::new(queue, paper, scaling);
    log::debug!(
        "{}: {} on '{}' at {} ({})",
        options.job_id,
        path.display(),
        queue,
        paper,
        scaling
    );

    let job = adapter.begin_job(&options).map_err(|err| FileError::Job {
        path: path.to_path_buf(),
        reason: err.to_string(),
    })?;
    job.submit(path).map_err(|err| FileError::Submit {
        path: path.to_path_buf(),
        reason: err.to_string(),
    })?;

    log::info!("{} queued {}", options.job_id, path.display());
    Ok(paper)
}
