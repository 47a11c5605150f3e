//! # Validator Collaborators
//!
//! After the merged document is written, an external command checks that the
//! file is a usable kubeconfig. The default is `kubectl config view`, run with
//! `KUBECONFIG` pointing at the written file, so kubectl reads nothing else.
//!
//! The [`Validator`] trait keeps the writer independent of how the check is
//! done; tests and `--no-verify` use the simpler implementations.

use std::path::Path;
use std::process::{Command, Stdio};

use log::debug;

use crate::error::{Error, Result};

/// Checks a written kubeconfig file.
pub trait Validator {
    /// Succeeds when the file at `path` is accepted.
    fn validate(&self, path: &Path) -> Result<()>;
}

/// Runs an external program with `KUBECONFIG` set to the file under test.
#[derive(Debug, Clone)]
pub struct CommandValidator {
    program: String,
    args: Vec<String>,
}

impl CommandValidator {
    pub fn new(program: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
        }
    }

    /// `kubectl config view`
    pub fn kubectl() -> Self {
        Self::new("kubectl", vec!["config".to_string(), "view".to_string()])
    }

    /// The command line, for messages.
    pub fn command_line(&self) -> String {
        std::iter::once(self.program.as_str())
            .chain(self.args.iter().map(String::as_str))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

impl Default for CommandValidator {
    fn default() -> Self {
        Self::kubectl()
    }
}

impl Validator for CommandValidator {
    fn validate(&self, path: &Path) -> Result<()> {
        debug!("Running validator: {}", self.command_line());

        let output = Command::new(&self.program)
            .args(&self.args)
            .env("KUBECONFIG", path)
            .stdin(Stdio::null())
            .output()
            .map_err(|e| Error::Validation {
                command: self.command_line(),
                message: format!("cannot run validator: {}", e),
            })?;

        if output.status.success() {
            return Ok(());
        }

        let stderr = String::from_utf8_lossy(&output.stderr);
        let message = match (output.status.code(), stderr.trim()) {
            (Some(code), "") => format!("exited with status {}", code),
            (Some(code), err) => format!("exited with status {}: {}", code, err),
            (None, _) => "terminated by signal".to_string(),
        };
        Err(Error::Validation {
            command: self.command_line(),
            message,
        })
    }
}

/// Accepts every file; used for `--no-verify`.
#[derive(Debug, Clone, Copy, Default)]
pub struct SkipValidation;

impl Validator for SkipValidation {
    fn validate(&self, _path: &Path) -> Result<()> {
        Ok(())
    }
}

/// Re-parses the written file as YAML. No external tools needed.
#[derive(Debug, Clone, Copy, Default)]
pub struct YamlValidator;

impl Validator for YamlValidator {
    fn validate(&self, path: &Path) -> Result<()> {
        let bytes = std::fs::read(path)?;
        crate::phases::parse::parse_fragment(path, &bytes).map(|_| ())
    }
}
