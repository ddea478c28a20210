//! Errores del core.
//!
//! Taxonomía: validación (antes de crear nada), staging (antes de ejecutar),
//! ejecución (fallos del runner, no del comando) y parsing (parser
//! personalizado). Los fallos del *comando* no son errores: se reportan como
//! `ExitCode` en el registro de ejecución.

use std::io;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::job::JobState;

/// Clase gruesa de un error, persistida en el evento `JobFailed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ErrorClass {
    Validation,
    Staging,
    Execution,
    Parsing,
    Internal,
}

#[derive(Debug, Error)]
pub enum ShellJobError {
    #[error("the command cannot be empty")]
    EmptyCommand,
    #[error("invalid input name `{0}`: only alphanumerics and single underscores are allowed and it cannot start with a digit")]
    InvalidInputName(String),
    #[error("argument `{argument}` is invalid: {reason}")]
    InvalidTemplate { argument: String, reason: String },
    #[error("argument `{0}` is invalid as it contains more than one placeholder")]
    MultiplePlaceholders(String),
    #[error("argument placeholder `{{{0}}}` not specified in `nodes`")]
    UnknownPlaceholder(String),
    #[error("`<` cannot be specified in the `arguments`; to redirect a file to stdin, use the `filename_stdin` option")]
    StdinRedirect,
    #[error("the symbol `>` cannot be specified in the `arguments`; stdout is automatically redirected")]
    StdoutRedirect,
    #[error("`{0}` is a reserved output filename and cannot be used in `outputs`")]
    ReservedOutput(String),
    #[error("invalid output pattern `{pattern}`: {reason}")]
    InvalidOutputPattern { pattern: String, reason: String },
    #[error("Input filename `{filename}` for node `{key}` overlaps with a reserved output filename")]
    ReservedInputFilename { key: String, filename: String },
    #[error("node `{key}` contains the file `{filename}` which overlaps with a reserved output filename")]
    ReservedFolderEntry { key: String, filename: String },
    #[error("`{0}` is not a valid relative path")]
    InvalidRelativePath(String),
    #[error("invalid output label `{0}` returned by the parser")]
    InvalidOutputLabel(String),

    #[error("the path `{0}` specified in `nodes` does not exist")]
    MissingInput(PathBuf),
    #[error("staging failed for `{path}`: {source}")]
    Staging {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("transport error: {0}")]
    Transport(String),
    #[error("failed to determine the absolute path of the command on the computer: {0}")]
    CommandNotFound(String),

    #[error("failed to run `{command}`: {source}")]
    Launch {
        command: String,
        #[source]
        source: io::Error,
    },
    #[error("invalid job state transition {from:?} -> {to:?}")]
    InvalidTransition { from: JobState, to: JobState },

    #[error("callable specified in the `parser` excepted: {0}")]
    Parser(String),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    #[error("internal: {0}")]
    Internal(String),
}

impl ShellJobError {
    /// Clasifica el error según la etapa en la que se produce.
    pub fn class(&self) -> ErrorClass {
        match self {
            Self::EmptyCommand
            | Self::InvalidInputName(_)
            | Self::InvalidTemplate { .. }
            | Self::MultiplePlaceholders(_)
            | Self::UnknownPlaceholder(_)
            | Self::StdinRedirect
            | Self::StdoutRedirect
            | Self::ReservedOutput(_)
            | Self::InvalidOutputPattern { .. }
            | Self::ReservedInputFilename { .. }
            | Self::ReservedFolderEntry { .. }
            | Self::InvalidRelativePath(_) => ErrorClass::Validation,
            Self::MissingInput(_) | Self::Staging { .. } | Self::Transport(_) | Self::CommandNotFound(_) => {
                ErrorClass::Staging
            }
            Self::Launch { .. } | Self::InvalidTransition { .. } => ErrorClass::Execution,
            Self::Parser(_) | Self::InvalidOutputLabel(_) => ErrorClass::Parsing,
            Self::Io(_) | Self::Internal(_) => ErrorClass::Internal,
        }
    }

    /// Atajo para envolver un `io::Error` con la ruta afectada.
    pub fn staging(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Staging { path: path.into(),
                        source }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_placeholder_message_keeps_braces() {
        let err = ShellJobError::UnknownPlaceholder("file_a".into());
        assert_eq!(err.to_string(), "argument placeholder `{file_a}` not specified in `nodes`");
    }

    #[test]
    fn classes_follow_taxonomy() {
        assert_eq!(ShellJobError::StdinRedirect.class(), ErrorClass::Validation);
        assert_eq!(ShellJobError::MissingInput("x".into()).class(), ErrorClass::Staging);
        assert_eq!(ShellJobError::Parser("boom".into()).class(), ErrorClass::Parsing);
        let io_err: ShellJobError = io::Error::other("disk").into();
        assert_eq!(io_err.class(), ErrorClass::Internal);
    }
}
