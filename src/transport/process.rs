//! Subprocess runner for the Cloud Platform command-line tools.
//!
//! Commands are spawned directly, without a shell. Standard output is
//! forwarded to the log at info level and standard error at error level.

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::process::Command;
use tracing::{debug, error, info};

use crate::error::{Result, TransportError};

const REDACTED: &str = "***";

/// A command line to run.
#[derive(Debug, Clone)]
pub struct CliCommand {
    program: PathBuf,
    args: Vec<String>,
    /// Indices into `args` that must not be shown.
    secrets: HashSet<usize>,
    current_dir: Option<PathBuf>,
}

impl CliCommand {
    /// Creates a command for `program`.
    #[must_use]
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            secrets: HashSet::new(),
            current_dir: None,
        }
    }

    /// Appends an argument.
    #[must_use]
    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    /// Appends a flag and its value.
    #[must_use]
    pub fn flag(self, flag: &str, value: impl Into<String>) -> Self {
        self.arg(flag).arg(value)
    }

    /// Appends a flag whose value is hidden when the command is rendered.
    #[must_use]
    pub fn secret_flag(mut self, flag: &str, value: impl Into<String>) -> Self {
        self.args.push(flag.to_string());
        self.secrets.insert(self.args.len());
        self.args.push(value.into());
        self
    }

    /// Sets the working directory.
    #[must_use]
    pub fn current_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.current_dir = Some(dir.into());
        self
    }

    /// Returns the program.
    #[must_use]
    pub fn program(&self) -> &Path {
        &self.program
    }

    /// Returns the arguments, secrets included.
    #[must_use]
    pub fn args(&self) -> &[String] {
        &self.args
    }

    /// Renders the command line for display, with secrets replaced.
    #[must_use]
    pub fn rendered(&self) -> String {
        let mut parts = vec![self.program.display().to_string()];
        parts.extend(self.args.iter().enumerate().map(|(i, arg)| {
            if self.secrets.contains(&i) {
                REDACTED.to_string()
            } else {
                arg.clone()
            }
        }));
        parts.join(" ")
    }

    /// Runs the command to completion.
    ///
    /// # Errors
    ///
    /// Returns `ProcessFailed` if the program cannot be started or exits
    /// with a non-zero code.
    pub async fn run(&self) -> Result<()> {
        let rendered = self.rendered();
        info!("Running {rendered}");

        let mut command = Command::new(&self.program);
        command
            .args(&self.args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        if let Some(dir) = &self.current_dir {
            command.current_dir(dir);
        }

        let mut child = command.spawn().map_err(|e| {
            error!("Failed to start subprocess.");
            TransportError::ProcessFailed {
                command: rendered.clone(),
                message: format!("Failed to start subprocess: {e}"),
            }
        })?;

        let stdout = child.stdout.take();
        let stderr = child.stderr.take();
        let (status, (), ()) = tokio::join!(
            child.wait(),
            async {
                if let Some(out) = stdout {
                    forward(out, false).await;
                }
            },
            async {
                if let Some(err) = stderr {
                    forward(err, true).await;
                }
            },
        );

        let status = status.map_err(|e| TransportError::ProcessFailed {
            command: rendered.clone(),
            message: e.to_string(),
        })?;

        let message = status.code().map_or_else(
            || String::from("Child process was terminated by a signal"),
            |code| format!("Child process exited with code {code}"),
        );
        if status.success() {
            debug!("{message}");
            Ok(())
        } else {
            Err(TransportError::ProcessFailed {
                command: rendered,
                message,
            }
            .into())
        }
    }
}

/// Logs each output line and returns how many were forwarded.
///
/// Lines that are not valid UTF-8 are decoded lossily.
async fn forward<R: AsyncRead + Unpin>(reader: R, is_stderr: bool) -> usize {
    let mut segments = BufReader::new(reader).split(b'\n');
    let mut forwarded = 0;
    while let Ok(Some(segment)) = segments.next_segment().await {
        let line = String::from_utf8_lossy(&segment);
        let line = line.trim_end_matches('\r');
        if is_stderr {
            error!("{line}");
        } else {
            info!("{line}");
        }
        forwarded += 1;
    }
    forwarded
}

/// Resolves a tool binary, inside `cli_path` when one is configured.
#[must_use]
pub fn locate_program(cli_path: Option<&str>, name: &str) -> PathBuf {
    match cli_path.map(str::trim).filter(|p| !p.is_empty()) {
        Some(dir) => Path::new(dir).join(name),
        None => PathBuf::from(name),
    }
}
