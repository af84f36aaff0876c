//! Blocking subprocess invocation for the external collaborators (`git`, `cloc`).
//!
//! Every call returns a [`ToolOutcome`] instead of an error so callers decide
//! how a failure is surfaced.

use crate::error::{PulseError, Result};
use log::{debug, trace};
use std::ffi::OsStr;
use std::io;
use std::path::Path;
use std::process::Command;

#[derive(Debug)]
pub enum ToolOutcome {
    /// Exited with status zero.
    Completed { stdout: String, stderr: String },
    /// Ran, but exited non-zero or was killed by a signal.
    Failed { code: Option<i32>, stderr: String },
    /// Could not be started at all.
    Unavailable(io::Error),
}

impl ToolOutcome {
    /// Converts into stdout, mapping failures to `ExternalTool` errors.
    pub fn into_stdout(self, tool: &str) -> Result<String> {
        match self {
            ToolOutcome::Completed { stdout, .. } => Ok(stdout),
            ToolOutcome::Failed { code, stderr } => {
                let status = code
                    .map(|c| format!("exit status {c}"))
                    .unwrap_or_else(|| "terminated by signal".to_string());
                Err(PulseError::tool(tool, format!("{status}: {}", stderr.trim())))
            }
            ToolOutcome::Unavailable(err) => {
                Err(PulseError::tool(tool, format!("could not be started: {err}")))
            }
        }
    }
}

pub fn run<I, S>(program: &str, args: I, cwd: &Path) -> ToolOutcome
where
    I: IntoIterator<Item = S>,
    S: AsRef<OsStr>,
{
    let mut command = Command::new(program);
    command.args(args).current_dir(cwd);
    debug!("Running {:?} in {}", command, cwd.display());

    let output = match command.output() {
        Ok(output) => output,
        Err(err) => return ToolOutcome::Unavailable(err),
    };

    let stdout = String::from_utf8_lossy(&output.stdout).into_owned();
    let stderr = String::from_utf8_lossy(&output.stderr).into_owned();
    if !stderr.is_empty() {
        trace!("{program} stderr: {}", stderr.trim_end());
    }

    if output.status.success() {
        ToolOutcome::Completed { stdout, stderr }
    } else {
        ToolOutcome::Failed {
            code: output.status.code(),
            stderr,
        }
    }
}
