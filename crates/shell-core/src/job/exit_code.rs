//! Códigos de salida distinguidos del job.
//!
//! No son errores del adaptador: describen cómo terminó el comando y se
//! registran en el evento `JobFinalized`.

use serde::{Deserialize, Serialize};

use crate::constants::FILENAME_STATUS;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExitCode {
    pub status: u32,
    pub label: String,
    pub message: String,
}

/// Lectura gruesa de un `ExitCode`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum JobOutcome {
    Success,
    /// Terminó con estado cero pero escribió en stderr.
    Suspicious,
    Failed,
}

impl ExitCode {
    pub const OUTPUT_STATUS_MISSING: u32 = 300;
    pub const OUTPUT_STATUS_INVALID: u32 = 301;
    pub const OUTPUT_STDOUT_MISSING: u32 = 302;
    pub const OUTPUT_FILEPATHS_MISSING: u32 = 303;
    pub const COMMAND_FAILED: u32 = 400;
    pub const STDERR_NOT_EMPTY: u32 = 410;

    fn new(status: u32, label: &str, message: String) -> Self {
        Self { status,
               label: label.to_string(),
               message }
    }

    pub fn success() -> Self {
        Self::new(0, "SUCCESS", String::new())
    }

    pub fn status_missing() -> Self {
        Self::new(Self::OUTPUT_STATUS_MISSING,
                  "ERROR_OUTPUT_STATUS_MISSING",
                  format!("Exit status could not be determined: the `{FILENAME_STATUS}` file was not retrieved."))
    }

    pub fn status_invalid(content: &str) -> Self {
        Self::new(Self::OUTPUT_STATUS_INVALID,
                  "ERROR_OUTPUT_STATUS_INVALID",
                  format!("Exit status could not be determined: `{}` is not a valid integer.", content.trim()))
    }

    pub fn stdout_missing(filename: &str) -> Self {
        Self::new(Self::OUTPUT_STDOUT_MISSING,
                  "ERROR_OUTPUT_STDOUT_MISSING",
                  format!("The working directory did not contain the `{filename}` output file."))
    }

    pub fn filepaths_missing(missing: &[String]) -> Self {
        Self::new(Self::OUTPUT_FILEPATHS_MISSING,
                  "ERROR_OUTPUT_FILEPATHS_MISSING",
                  format!("Not all expected output files were retrieved: {}", missing.join(", ")))
    }

    pub fn command_failed(status: i32, stderr: &str) -> Self {
        Self::new(Self::COMMAND_FAILED,
                  "ERROR_COMMAND_FAILED",
                  format!("The command exited with a non-zero status: {status} {}", stderr.trim()))
    }

    pub fn stderr_not_empty() -> Self {
        Self::new(Self::STDERR_NOT_EMPTY,
                  "ERROR_STDERR_NOT_EMPTY",
                  "The command exited with a zero status but the stderr was not empty.".to_string())
    }

    pub fn outcome(&self) -> JobOutcome {
        match self.status {
            0 => JobOutcome::Success,
            Self::STDERR_NOT_EMPTY => JobOutcome::Suspicious,
            _ => JobOutcome::Failed,
        }
    }

    pub fn is_success(&self) -> bool {
        self.status == 0
    }
}
