use std::path::PathBuf;

use shell_core::ShellJobError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum LaunchError {
    #[error("the path `{0}` specified in `nodes` does not exist")]
    MissingPath(PathBuf),
    #[error(transparent)]
    Job(#[from] ShellJobError),
}

impl LaunchError {
    /// Error del job subyacente, si lo hay.
    pub fn as_job_error(&self) -> Option<&ShellJobError> {
        match self {
            LaunchError::Job(e) => Some(e),
            _ => None,
        }
    }
}
