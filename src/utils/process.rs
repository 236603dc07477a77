//! Process execution utilities
//!
//! Runs external tools with inherited output and maps failures to errors.

use crate::error::{Result, StagerError};
use std::process::{Command, Stdio};
use tracing::{debug, info, instrument};

/// Utility for running external processes
#[derive(Debug)]
pub struct ProcessRunner {
    debug: bool,
}

impl ProcessRunner {
    /// Create a new process runner
    #[must_use]
    pub const fn new(debug: bool) -> Self {
        Self { debug }
    }

    /// Run a command with arguments, inheriting stdout/stderr.
    ///
    /// Only the exit status is inspected; a nonzero status is an error.
    #[instrument(skip(self))]
    pub fn run_command(&self, command: &str, args: &[&str]) -> Result<()> {
        let cmd_str = format!("{} {}", command, args.join(" "));

        if self.debug {
            debug!("Running command: {}", cmd_str);
        } else {
            info!("+ {}", cmd_str);
        }

        let status = Command::new(command)
            .args(args)
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit())
            .status()
            .map_err(|e| {
                StagerError::process(cmd_str.clone(), None, format!("Failed to execute command: {e}"))
            })?;

        if !status.success() {
            let exit_code = status.code();
            return Err(StagerError::process(
                cmd_str,
                exit_code,
                format!("Command failed with exit code: {exit_code:?}"),
            ));
        }

        debug!("Command completed successfully");
        Ok(())
    }
}

impl Default for ProcessRunner {
    fn default() -> Self {
        Self::new(false)
    }
}
