//! Spooler command execution helper.
//! （執行列印佇列指令的幫手。）
//!
//! Wraps `std::process::Command` so the CUPS adapter can describe `lp` and
//! `lpstat` invocations as plain data and receive their exit status and
//! captured output. Every call blocks until the child exits.
//! 本模組封裝 `std::process::Command`，讓 CUPS 介面以資料描述 `lp` 與 `lpstat`
//! 的呼叫，並取得結束碼與輸出內容。所有呼叫皆會等待子程序結束。

use std::collections::BTreeMap;
use std::ffi::OsString;
use std::process::{Command, Stdio};
use thiserror::Error;

/// Failures while launching a spooler tool or collecting its output.
/// （啟動列印工具或讀取其輸出時的錯誤。）
#[derive(Debug, Error)]
pub enum RunError {
    #[error("failed to spawn '{program}': {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to read output of '{program}': {source}")]
    Output {
        program: String,
        #[source]
        source: std::io::Error,
    },
}

/// One spooler invocation described as data.
/// （以資料描述的一次列印工具呼叫。）
///
/// Arguments are OS strings so file paths reach the tool byte for byte.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RunSpec {
    pub program: String,
    pub args: Vec<OsString>,
    pub env: BTreeMap<String, String>,
}

impl RunSpec {
    /// Starts an invocation of `program` with no arguments.
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            env: BTreeMap::new(),
        }
    }

    pub fn push_arg(mut self, arg: impl Into<OsString>) -> Self {
        self.args.push(arg.into());
        self
    }

    /// Appends `args` in order.
    pub fn with_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<OsString>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    /// Sets a variable in the child environment only.
    /// （僅對子程序設定環境變數。）
    pub fn with_env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env.insert(key.into(), value.into());
        self
    }

    /// Renders the command line for diagnostics.
    pub fn display_line(&self) -> String {
        let mut line = self.program.clone();
        for arg in &self.args {
            let arg = arg.to_string_lossy();
            line.push(' ');
            if arg.contains(char::is_whitespace) {
                line.push('\'');
                line.push_str(&arg);
                line.push('\'');
            } else {
                line.push_str(&arg);
            }
        }
        line
    }
}

/// Exit status and captured output of a finished tool.
/// （工具結束後的結束碼與輸出。）
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RunResult {
    pub exit_code: Option<i32>,
    pub stdout: Vec<u8>,
    pub stderr: Vec<u8>,
}

impl RunResult {
    /// `true` only for exit code 0; a signal-terminated child has no code.
    pub fn success(&self) -> bool {
        matches!(self.exit_code, Some(0))
    }

    /// Standard output decoded lossily as UTF-8.
    pub fn stdout_text(&self) -> String {
        String::from_utf8_lossy(&self.stdout).into_owned()
    }

    /// Standard error decoded lossily as UTF-8 and trimmed.
    pub fn stderr_text(&self) -> String {
        String::from_utf8_lossy(&self.stderr).trim().to_string()
    }
}

/// Blocking runner for [`RunSpec`] values.
pub struct RunExecutor;

impl RunExecutor {
    /// Spawns the tool with stdin closed and waits for it to exit.
    /// （關閉標準輸入後啟動工具並等待結束。）
    pub fn execute(spec: &RunSpec) -> Result<RunResult, RunError> {
        log::debug!("running {}", spec.display_line());

        let mut command = Command::new(&spec.program);
        command.args(&spec.args);
        command.stdin(Stdio::null());
        command.stdout(Stdio::piped());
        command.stderr(Stdio::piped());
        for (key, value) in &spec.env {
            command.env(key, value);
        }

        let child = command.spawn().map_err(|source| RunError::Spawn {
            program: spec.program.clone(),
            source,
        })?;
        let output = child.wait_with_output().map_err(|source| RunError::Output {
            program: spec.program.clone(),
            source,
        })?;

        let result = RunResult {
            exit_code: output.status.code(),
            stdout: output.stdout,
            stderr: output.stderr,
        };
        log::debug!("{} exited with {:?}", spec.program, result.exit_code);
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str;

    fn run(spec: &RunSpec) -> RunResult {
        RunExecutor::execute(spec).expect("sh should run / 應能執行 sh")
    }

    #[cfg(unix)]
    #[test]
    fn child_sees_environment_override() {
        let spec = RunSpec::new("sh")
            .with_args(["-c", "printf '%s' \"$SPOOL_TEST_MESSAGE\""])
            .with_env("SPOOL_TEST_MESSAGE", "queued");

        let result = run(&spec);
        assert!(result.success());
        assert_eq!(str::from_utf8(&result.stdout), Ok("queued"));
        assert!(result.stderr_text().is_empty());
    }

    #[cfg(unix)]
    #[test]
    fn non_zero_exit_is_reported_with_stderr() {
        let spec = RunSpec::new("sh").with_args(["-c", "echo 'lp: printer offline' >&2; exit 3"]);

        let result = run(&spec);
        assert!(!result.success());
        assert_eq!(result.exit_code, Some(3));
        assert_eq!(result.stderr_text(), "lp: printer offline");
    }

    #[cfg(unix)]
    #[test]
    fn stdin_is_closed() {
        let spec = RunSpec::new("sh").with_args(["-c", "cat; echo done"]);

        assert_eq!(run(&spec).stdout_text(), "done\n");
    }

    #[test]
    fn missing_program_fails_to_spawn() {
        let spec = RunSpec::new("pdfspool-definitely-not-installed");
        match RunExecutor::execute(&spec) {
            Err(RunError::Spawn { program, .. }) => {
                assert_eq!(program, "pdfspool-definitely-not-installed")
            }
            other => panic!("expected spawn failure, got {other:?}"),
        }
    }

    #[test]
    fn display_line_quotes_arguments_with_spaces() {
        let spec = RunSpec::new("lp").push_arg("-d").push_arg("HP LaserJet");
        assert_eq!(spec.display_line(), "lp -d 'HP LaserJet'");
    }

    #[cfg(unix)]
    #[test]
    fn arguments_are_passed_byte_for_byte() {
        use std::ffi::OsStr;
        use std::os::unix::ffi::OsStrExt;

        let name = OsStr::from_bytes(b"caf\xe9.pdf");
        let spec = RunSpec::new("sh")
            .with_args(["-c", "printf '%s' \"$1\"", "sh"])
            .push_arg(name);
        assert_eq!(run(&spec).stdout, b"caf\xe9.pdf");
    }
}
