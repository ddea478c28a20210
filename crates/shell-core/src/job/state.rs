use serde::{Deserialize, Serialize};

use crate::errors::ShellJobError;

/// Estado de un job.
///
/// Las transiciones válidas son:
/// - `Created` -> `Staged`
/// - `Staged` -> `Executed`
/// - `Executed` -> `Parsed`
/// - `Parsed` -> `Finalized`
///
/// No se permiten reversiones ni saltos. Un fallo no es un estado: el
/// registro conserva el último estado alcanzado y el error asociado.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum JobState {
    /// Especificación aceptada, nada creado en disco todavía.
    Created,
    /// Directorio de trabajo preparado con todos los inputs.
    Staged,
    /// El comando terminó (con cualquier código de salida).
    Executed,
    /// Outputs recolectados y parser aplicado.
    Parsed,
    /// Código de salida y fingerprint registrados.
    Finalized,
}

impl JobState {
    pub fn next(self) -> Option<JobState> {
        match self {
            JobState::Created => Some(JobState::Staged),
            JobState::Staged => Some(JobState::Executed),
            JobState::Executed => Some(JobState::Parsed),
            JobState::Parsed => Some(JobState::Finalized),
            JobState::Finalized => None,
        }
    }

    /// Valida y aplica la transición a `to`.
    pub fn transition(self, to: JobState) -> Result<JobState, ShellJobError> {
        if self.next() == Some(to) {
            Ok(to)
        } else {
            Err(ShellJobError::InvalidTransition { from: self, to })
        }
    }

    pub fn is_terminal(self) -> bool {
        self == JobState::Finalized
    }
}
