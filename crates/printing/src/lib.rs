//! Batch printing of PDF documents through the host print spooler.

pub mod config;
pub mod controller;
pub mod cups;
pub mod document;
pub mod job;
pub mod platform;
pub mod printer;

pub use config::{ConfigError, SpoolerConfig};
pub use controller::{run_batch, BatchError, BatchRequest, BatchResult, FileError, FileReport};
pub use cups::{parse_printer_list, parse_request_id, CupsAdapter, CupsError, CupsJob};
pub use document::{inspect_pdf, validate_path, DocumentError, DocumentInfo};
pub use job::{PaperId, PaperSize, PrintJobId, PrintJobOptions, ScalingMode};
pub use platform::{PlatformAdapter, PlatformJobHandle};
pub use printer::{
    find_destination, require_destination, resolve_printer, PrinterInfo, PrinterResolutionError,
};
