//! Command-line parser for pdfspool invocations.
//! pdfspool 啟動參數解析器。
//!
//! Flags are matched case-sensitively against a fixed alias list; values
//! for scaling and paper size are matched case-insensitively. A flag whose
//! next token starts with `-` is treated as having no value rather than
//! swallowing the following flag. File values stay OS strings, so names
//! that are not valid UTF-8 survive untouched.
//! 旗標名稱區分大小寫；縮放與紙張值則不區分大小寫。若旗標的下一個參數以 `-`
//! 開頭，視為未提供值，而不會吃掉下一個旗標。

use std::ffi::{OsStr, OsString};
use std::iter::Peekable;
use std::path::PathBuf;

use pdfspool_printing::{PaperId, ScalingMode};
use thiserror::Error;

const FILE_FLAGS: &[&str] = &["-f", "--file", "--File"];
const PRINTER_FLAGS: &[&str] = &["-d", "--printer", "--Printer"];
const SCALING_FLAGS: &[&str] = &["-s", "--scaling", "--Scaling"];
const PAPER_FLAGS: &[&str] = &["-p", "--papersize", "--Papersize"];
const HELP_FLAGS: &[&str] = &["-h", "--help", "--Help"];
const FAST_FAIL_FLAG: &str = "--fast-fail";

const USAGE_WIDTH: usize = 76;

const USAGE_HEAD: &str = "\
Usage:
  pdfspool -f <path>[,<path2>...] -d <printer> -s <fit|actual> [-p <size>] [--fast-fail]
  pdfspool -h | --help

Silently prints PDF documents to an installed printer.

Options:
  -f, --file, --File <path>            PDF to print; repeat the flag or separate paths with commas
  -d, --printer, --Printer <name>      Printer name as shown in print dialogs, or its queue; '_' may stand in for spaces
  -s, --scaling, --Scaling <mode>      fit (scale to the paper) or actual (no scaling)
  -p, --papersize, --Papersize <size>  Paper size (default: pdf, the document's own page size)
      --fast-fail                      Stop at the first file that fails to print
  -h, --help, --Help                   Show this help
";

const USAGE_TAIL: &str = "Both '--flag value' and '--flag=value' forms are accepted.";

/// Full usage block printed for `--help` and usage errors.
/// 顯示於 `--help` 與用法錯誤時的完整說明。
pub fn usage() -> String {
    let mut text = String::from(USAGE_HEAD);
    text.push_str("\nPaper sizes:\n");

    let mut line = String::new();
    for token in PaperId::tokens() {
        if !line.is_empty() && line.len() + token.len() + 2 > USAGE_WIDTH {
            text.push_str("  ");
            text.push_str(&line);
            text.push('\n');
            line.clear();
        }
        if !line.is_empty() {
            line.push(' ');
        }
        line.push_str(token);
        line.push(',');
    }
    line.pop();
    text.push_str("  ");
    text.push_str(&line);
    text.push_str("\n\n");
    text.push_str(USAGE_TAIL);
    text
}

/// Short hint printed when the tool is run without arguments.
pub const MISSING_ARGUMENTS_HINT: &str =
    "Missing arguments. Run 'pdfspool --help' for usage.";

/// Validated configuration for one run.
/// 單次執行所使用的已驗證組態。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvocationConfig {
    pub files: Vec<PathBuf>,
    pub printer: String,
    pub scaling: ScalingMode,
    pub paper: PaperId,
    pub fast_fail: bool,
    /// Tokens that were neither a known flag nor a flag value.
    pub unrecognized: Vec<String>,
}

/// Result of a successful parse.
/// 解析成功後的結果。
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseOutcome {
    Run(InvocationConfig),
    Help,
}

/// Option whose value was not supplied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequiredOption {
    File,
    Printer,
    Scaling,
}

impl RequiredOption {
    fn describe(self) -> &'static str {
        match self {
            RequiredOption::File => "file (-f, --file)",
            RequiredOption::Printer => "printer (-d, --printer)",
            RequiredOption::Scaling => "scaling (-s, --scaling)",
        }
    }
}

/// Errors emitted while parsing CLI arguments.
/// 解析命令列參數時可能回傳的錯誤。
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ParseError {
    #[error("{}", MISSING_ARGUMENTS_HINT)]
    NoArguments,
    #[error("missing required option: {}", .0.describe())]
    Missing(RequiredOption),
    #[error("invalid scaling mode '{0}'; expected 'fit' or 'actual'")]
    InvalidScaling(String),
    #[error("invalid paper size '{0}'; run with --help for the supported sizes")]
    InvalidPaperSize(String),
}

impl ParseError {
    /// Whether the full usage block should accompany the message.
    pub fn shows_usage(&self) -> bool {
        matches!(self, ParseError::Missing(_))
    }
}

/// Parses command-line arguments (program name first) into a [`ParseOutcome`].
/// 將命令列參數（第一個為程式名稱）解析為 [`ParseOutcome`]。
pub fn parse<I, S>(args: I) -> Result<ParseOutcome, ParseError>
where
    I: IntoIterator<Item = S>,
    S: Into<OsString>,
{
    let mut args = args.into_iter().map(Into::<OsString>::into);
    // Program name.
    let _ = args.next();
    let tokens: Vec<OsString> = args.collect();

    if tokens
        .iter()
        .any(|token| token.to_str().is_some_and(|token| HELP_FLAGS.contains(&token)))
    {
        return Ok(ParseOutcome::Help);
    }
    if tokens.is_empty() {
        return Err(ParseError::NoArguments);
    }

    let mut raw = RawOptions::default();
    let mut iter = tokens.into_iter().peekable();
    while let Some(token) = iter.next() {
        parse_token(token, &mut iter, &mut raw);
    }
    raw.validate().map(ParseOutcome::Run)
}

#[derive(Debug, Default)]
struct RawOptions {
    files: Vec<PathBuf>,
    printer: Option<String>,
    scaling: Option<String>,
    paper: Option<String>,
    fast_fail: bool,
    unrecognized: Vec<String>,
}

impl RawOptions {
    fn validate(self) -> Result<InvocationConfig, ParseError> {
        if self.files.is_empty() {
            return Err(ParseError::Missing(RequiredOption::File));
        }
        let printer = self
            .printer
            .ok_or(ParseError::Missing(RequiredOption::Printer))?;
        let scaling_token = self
            .scaling
            .ok_or(ParseError::Missing(RequiredOption::Scaling))?;
        let scaling = ScalingMode::from_token(&scaling_token)
            .ok_or(ParseError::InvalidScaling(scaling_token))?;
        let paper = match self.paper {
            Some(token) => {
                PaperId::from_token(&token).ok_or(ParseError::InvalidPaperSize(token))?
            }
            None => PaperId::Pdf,
        };

        Ok(InvocationConfig {
            files: self.files,
            printer,
            scaling,
            paper,
            fast_fail: self.fast_fail,
            unrecognized: self.unrecognized,
        })
    }
}

fn parse_token<I>(token: OsString, iter: &mut Peekable<I>, raw: &mut RawOptions)
where
    I: Iterator<Item = OsString>,
{
    if token.as_os_str() == OsStr::new(FAST_FAIL_FLAG) {
        raw.fast_fail = true;
        return;
    }

    let (name, inline) = split_name_value(&token);
    let name = name.as_str();
    if FILE_FLAGS.contains(&name) {
        if let Some(value) = fetch_option_value(inline, iter) {
            append_files(&value, &mut raw.files);
        }
    } else if PRINTER_FLAGS.contains(&name) {
        if let Some(value) = fetch_option_value(inline, iter) {
            raw.printer = Some(into_text(value));
        }
    } else if SCALING_FLAGS.contains(&name) {
        if let Some(value) = fetch_option_value(inline, iter) {
            raw.scaling = Some(into_text(value));
        }
    } else if PAPER_FLAGS.contains(&name) {
        if let Some(value) = fetch_option_value(inline, iter) {
            raw.paper = Some(into_text(value));
        }
    } else {
        raw.unrecognized.push(token.to_string_lossy().into_owned());
    }
}

/// Returns the option value from the inline `=` part or the next token.
/// A next token that looks like a flag is left in place.
fn fetch_option_value<I>(inline: Option<OsString>, iter: &mut Peekable<I>) -> Option<OsString>
where
    I: Iterator<Item = OsString>,
{
    if let Some(value) = inline {
        return (!value.to_string_lossy().trim().is_empty()).then_some(value);
    }
    iter.next_if(|next| !next.to_string_lossy().starts_with('-'))
}

fn split_name_value(token: &OsStr) -> (String, Option<OsString>) {
    match os_args::split_once(token, b'=') {
        Some((name, value)) if name.to_string_lossy().starts_with('-') => {
            (name.to_string_lossy().into_owned(), Some(value))
        }
        _ => (token.to_string_lossy().into_owned(), None),
    }
}

fn append_files(value: &OsStr, files: &mut Vec<PathBuf>) {
    files.extend(os_args::split_list(value, b',').into_iter().map(PathBuf::from));
}

// Printer names and scaling or paper tokens are plain text.
fn into_text(value: OsString) -> String {
    value
        .into_string()
        .unwrap_or_else(|raw| raw.to_string_lossy().into_owned())
}

/// Splitting on ASCII separators without decoding the rest of the value.
mod os_args {
    use std::ffi::{OsStr, OsString};

    #[cfg(unix)]
    pub fn split_once(value: &OsStr, separator: u8) -> Option<(OsString, OsString)> {
        use std::os::unix::ffi::OsStrExt;

        let bytes = value.as_bytes();
        let index = bytes.iter().position(|byte| *byte == separator)?;
        Some((
            OsStr::from_bytes(&bytes[..index]).to_os_string(),
            OsStr::from_bytes(&bytes[index + 1..]).to_os_string(),
        ))
    }

    /// Splits on `separator`, trims ASCII whitespace and drops empty parts.
    #[cfg(unix)]
    pub fn split_list(value: &OsStr, separator: u8) -> Vec<OsString> {
        use std::os::unix::ffi::OsStrExt;

        value
            .as_bytes()
            .split(|byte| *byte == separator)
            .map(trim_ascii)
            .filter(|part| !part.is_empty())
            .map(|part| OsStr::from_bytes(part).to_os_string())
            .collect()
    }

    #[cfg(unix)]
    fn trim_ascii(bytes: &[u8]) -> &[u8] {
        let start = bytes
            .iter()
            .position(|byte| !byte.is_ascii_whitespace())
            .unwrap_or(bytes.len());
        let end = bytes
            .iter()
            .rposition(|byte| !byte.is_ascii_whitespace())
            .map_or(start, |index| index + 1);
        &bytes[start..end]
    }

    // Values that are not Unicode are kept whole.
    #[cfg(not(unix))]
    pub fn split_once(value: &OsStr, separator: u8) -> Option<(OsString, OsString)> {
        let (name, rest) = value.to_str()?.split_once(char::from(separator))?;
        Some((name.into(), rest.into()))
    }

    #[cfg(not(unix))]
    pub fn split_list(value: &OsStr, separator: u8) -> Vec<OsString> {
        match value.to_str() {
            Some(text) => text
                .split(char::from(separator))
                .map(str::trim)
                .filter(|part| !part.is_empty())
                .map(OsString::from)
                .collect(),
            None => vec![value.to_os_string()],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(args: &[&str]) -> Result<ParseOutcome, ParseError> {
        parse(std::iter::once("pdfspool").chain(args.iter().copied()))
    }

    fn config(args: &[&str]) -> InvocationConfig {
        match run(args) {
            Ok(ParseOutcome::Run(config)) => config,
            other => panic!("expected a run configuration, got {other:?}"),
        }
    }

    #[test]
    fn parses_basic_invocation() {
        let config = config(&["-f", "a.pdf", "-d", "Office", "-s", "fit"]);
        assert_eq!(config.files, vec![PathBuf::from("a.pdf")]);
        assert_eq!(config.printer, "Office");
        assert_eq!(config.scaling, ScalingMode::Fit);
        assert_eq!(config.paper, PaperId::Pdf);
        assert!(!config.fast_fail);
        assert!(config.unrecognized.is_empty());
    }

    #[test]
    fn aliases_and_value_styles_are_equivalent() {
        let expected = config(&[
            "-f", "a.pdf", "-d", "HP_LaserJet", "-s", "actual", "-p", "a4",
        ]);
        let spellings: [[&str; 4]; 3] = [
            ["-f", "-d", "-s", "-p"],
            ["--file", "--printer", "--scaling", "--papersize"],
            ["--File", "--Printer", "--Scaling", "--Papersize"],
        ];
        let values = ["a.pdf", "HP_LaserJet", "actual", "a4"];

        for flags in spellings {
            let separate: Vec<String> = flags
                .iter()
                .zip(values)
                .flat_map(|(flag, value)| [flag.to_string(), value.to_string()])
                .collect();
            let attached: Vec<String> = flags
                .iter()
                .zip(values)
                .map(|(flag, value)| format!("{flag}={value}"))
                .collect();
            for args in [separate, attached] {
                let refs: Vec<&str> = args.iter().map(String::as_str).collect();
                assert_eq!(config(&refs), expected, "args: {refs:?}");
            }
        }
    }

    #[test]
    fn comma_list_matches_repeated_flags() {
        let listed = config(&["-f", " a.pdf , b.pdf,,c.pdf ", "-d", "Office", "-s", "fit"]);
        let repeated = config(&[
            "-f", "a.pdf", "--file", "b.pdf", "--File=c.pdf", "-d", "Office", "-s", "fit",
        ]);
        assert_eq!(
            listed.files,
            vec![
                PathBuf::from("a.pdf"),
                PathBuf::from("b.pdf"),
                PathBuf::from("c.pdf")
            ]
        );
        assert_eq!(listed, repeated);
    }

    #[test]
    fn lists_and_repetition_concatenate_in_order() {
        let config = config(&["-f", "a.pdf,b.pdf", "-d", "Office", "-f", "c.pdf", "-s", "fit"]);
        assert_eq!(
            config.files,
            vec![
                PathBuf::from("a.pdf"),
                PathBuf::from("b.pdf"),
                PathBuf::from("c.pdf")
            ]
        );
    }

    #[test]
    fn values_are_case_insensitive() {
        let config = config(&["-f", "a.pdf", "-d", "Office", "-s", "FIT", "-p", "Letter"]);
        assert_eq!(config.scaling, ScalingMode::Fit);
        assert_eq!(config.paper, PaperId::Letter);
    }

    #[test]
    fn flag_names_are_case_sensitive() {
        let err = run(&["-f", "a.pdf", "--PRINTER", "Office", "-s", "fit"]).unwrap_err();
        assert_eq!(err, ParseError::Missing(RequiredOption::Printer));
    }

    #[test]
    fn dash_prefixed_next_token_is_not_consumed() {
        let err = run(&["-f", "a.pdf", "-d", "-s", "fit"]).unwrap_err();
        assert_eq!(err, ParseError::Missing(RequiredOption::Printer));

        let config = config(&["-f", "a.pdf", "-d", "Office", "-s", "fit", "-p", "--fast-fail"]);
        assert_eq!(config.paper, PaperId::Pdf);
        assert!(config.fast_fail);
    }

    #[test]
    fn trailing_bare_flag_yields_no_value() {
        let err = run(&["-f", "a.pdf", "-d", "Office", "-s"]).unwrap_err();
        assert_eq!(err, ParseError::Missing(RequiredOption::Scaling));
    }

    #[test]
    fn empty_attached_value_is_unset() {
        let err = run(&["-f", "a.pdf", "--printer=", "Office", "-s", "fit"]).unwrap_err();
        assert_eq!(err, ParseError::Missing(RequiredOption::Printer));
    }

    #[test]
    fn attached_value_keeps_later_equals_signs() {
        let config = config(&["--file=reports/q=1.pdf", "-d", "Office", "-s", "fit"]);
        assert_eq!(config.files, vec![PathBuf::from("reports/q=1.pdf")]);
    }

    #[test]
    fn missing_options_are_reported_in_order() {
        assert_eq!(
            run(&["-d", "Office", "-s", "fit"]).unwrap_err(),
            ParseError::Missing(RequiredOption::File)
        );
        assert_eq!(
            run(&["-f", "a.pdf", "-s", "fit"]).unwrap_err(),
            ParseError::Missing(RequiredOption::Printer)
        );
        assert_eq!(
            run(&["-f", "a.pdf", "-d", "Office"]).unwrap_err(),
            ParseError::Missing(RequiredOption::Scaling)
        );
        assert!(run(&["-f", ","]).unwrap_err().shows_usage());
    }

    #[test]
    fn invalid_values_name_the_token() {
        let err = run(&["-f", "a.pdf", "-d", "Office", "-s", "shrink"]).unwrap_err();
        assert_eq!(err, ParseError::InvalidScaling("shrink".into()));
        assert!(err.to_string().contains("'shrink'"));
        assert!(!err.shows_usage());

        let err = run(&["-f", "a.pdf", "-d", "Office", "-s", "fit", "-p", "a11"]).unwrap_err();
        assert_eq!(err, ParseError::InvalidPaperSize("a11".into()));
        assert!(err.to_string().contains("'a11'"));
    }

    #[test]
    fn help_short_circuits_everything() {
        assert_eq!(run(&["-h"]).unwrap(), ParseOutcome::Help);
        assert_eq!(
            run(&["-s", "bogus", "-p", "nope", "--Help"]).unwrap(),
            ParseOutcome::Help
        );
        assert_eq!(run(&["-f", "a.pdf", "--help", "-d"]).unwrap(), ParseOutcome::Help);
    }

    #[test]
    fn no_arguments_is_a_short_hint() {
        let err = run(&[]).unwrap_err();
        assert_eq!(err, ParseError::NoArguments);
        assert!(!err.shows_usage());
        assert_eq!(err.to_string(), MISSING_ARGUMENTS_HINT);
    }

    #[test]
    fn unknown_tokens_are_collected() {
        let config = config(&["stray.pdf", "-f", "a.pdf", "-d", "Office", "-s", "fit", "--copies=2"]);
        assert_eq!(config.unrecognized, vec!["stray.pdf", "--copies=2"]);
    }

    #[test]
    fn usage_lists_every_paper_token() {
        let text = usage();
        assert!(text.starts_with("Usage:"));
        for token in PaperId::tokens() {
            assert!(
                text.contains(&format!(" {token},")) || text.contains(&format!(" {token}\n")),
                "{token} missing from usage"
            );
        }
        assert!(text.lines().all(|line| line.len() <= 100));
    }

    #[cfg(unix)]
    #[test]
    fn non_utf8_file_names_are_preserved() {
        use std::os::unix::ffi::OsStrExt;

        let name = OsStr::from_bytes(b"caf\xe9.pdf");
        let mut listed = OsString::from("a.pdf, ");
        listed.push(name);
        let mut attached = OsString::from("--file=");
        attached.push(name);
        let args: Vec<OsString> = vec![
            "pdfspool".into(),
            "-f".into(),
            listed,
            attached,
            "-d".into(),
            "Office".into(),
            "-s".into(),
            "fit".into(),
        ];

        match parse(args) {
            Ok(ParseOutcome::Run(config)) => assert_eq!(
                config.files,
                vec![PathBuf::from("a.pdf"), PathBuf::from(name), PathBuf::from(name)]
            ),
            other => panic!("expected a run configuration, got {other:?}"),
        }
    }

    #[test]
    fn last_scalar_value_wins() {
        let config = config(&["-f", "a.pdf", "-d", "Office", "-d", "Lab", "-s", "fit"]);
        assert_eq!(config.printer, "Lab");
    }
}
