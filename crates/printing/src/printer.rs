//! Printer-name matching against the installed destinations.
//! 依已安裝的印表機清單比對使用者指定的名稱。

use thiserror::Error;

/// One installed destination.
/// 已安裝的列印目的地。
///
/// `queue` is the spooler's identifier (never contains spaces under CUPS);
/// `display_name` is what print dialogs show and falls back to the queue.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrinterInfo {
    pub queue: String,
    pub display_name: String,
}

impl PrinterInfo {
    pub fn new(queue: impl Into<String>, display_name: impl Into<String>) -> Self {
        let queue = queue.into();
        let display_name = display_name.into();
        let display_name = if display_name.trim().is_empty() {
            queue.clone()
        } else {
            display_name
        };
        Self {
            queue,
            display_name,
        }
    }
}

/// Raised when no installed printer matches the requested name.
/// 找不到符合名稱的印表機時回傳的錯誤。
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("printer '{requested}' not found; available printers: {}", format_available(.available))]
pub struct PrinterResolutionError {
    pub requested: String,
    pub available: Vec<String>,
}

fn format_available(available: &[String]) -> String {
    if available.is_empty() {
        "(none)".to_string()
    } else {
        available.join(", ")
    }
}

/// Finds the name in `available` that best matches `requested`.
/// 依序以完全相符、底線轉空白、清單名稱空白轉底線三種方式比對，先符合者優先。
///
/// Matching is attempted in three passes and the first hit wins:
/// an exact match, a match after replacing `_` with a space in the
/// requested name, and a match of the raw requested name against each
/// available name with its spaces replaced by `_`.
pub fn resolve_printer<'a, S>(requested: &str, available: &'a [S]) -> Option<&'a str>
where
    S: AsRef<str>,
{
    let names: Vec<&'a str> = available.iter().map(|name| name.as_ref()).collect();
    match_index(requested, &names).map(|index| names[index])
}

fn match_index(requested: &str, names: &[&str]) -> Option<usize> {
    if let Some(index) = names.iter().position(|name| *name == requested) {
        return Some(index);
    }

    let spaced = requested.replace('_', " ");
    if let Some(index) = names.iter().position(|name| *name == spaced) {
        return Some(index);
    }

    names
        .iter()
        .position(|name| name.replace(' ', "_") == requested)
}

/// Picks the destination for `requested`.
///
/// Display names are tried first; queue names are a second chance for
/// users who type what `lpstat` prints.
pub fn find_destination<'a>(requested: &str, printers: &'a [PrinterInfo]) -> Option<&'a PrinterInfo> {
    let display: Vec<&str> = printers
        .iter()
        .map(|printer| printer.display_name.as_str())
        .collect();
    let queues: Vec<&str> = printers.iter().map(|printer| printer.queue.as_str()).collect();

    match_index(requested, &display)
        .or_else(|| match_index(requested, &queues))
        .map(|index| &printers[index])
}

/// Same as [`find_destination`] but reports the available display names on
/// failure.
pub fn require_destination(
    requested: &str,
    printers: &[PrinterInfo],
) -> Result<PrinterInfo, PrinterResolutionError> {
    find_destination(requested, printers)
        .cloned()
        .ok_or_else(|| PrinterResolutionError {
            requested: requested.to_string(),
            available: printers
                .iter()
                .map(|printer| printer.display_name.clone())
                .collect(),
        })
}
