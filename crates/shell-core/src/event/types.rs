//! Tipos de evento del job y estructura `JobEvent`.
//!
//! Rol en el flujo:
//! - Cada ejecución del `ShellEngine` emite eventos a un `EventStore`
//!   append-only.
//! - Estos eventos permiten reconstruir un `ExecutionRecord` (replay) sin
//!   depender de estructuras mutables.
//! - El enum `JobEventKind` define el contrato observable del adaptador.
use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::ErrorClass;
use crate::job::{ExitCode, JobState};
use crate::staging::RemoteInstruction;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum JobEventKind {
    /// Primer evento de un `job_id`: la especificación ya fue validada.
    JobCreated {
        spec_hash: String,
        command: String,
        process_label: String,
    },
    /// Directorio de trabajo preparado. `staged` son los nombres de primer
    /// nivel presentes antes de ejecutar (quedan fuera de los outputs).
    JobStaged {
        working_dir: String,
        arguments: Vec<String>,
        staged: Vec<String>,
        remote: Vec<RemoteInstruction>,
    },
    /// El proceso terminó; `exit_status` es `None` si el runner no pudo
    /// determinarlo.
    JobExecuted { exit_status: Option<i32> },
    /// Outputs recolectados (label -> hash).
    JobParsed { outputs: BTreeMap<String, String> },
    /// Cierre con código de salida y fingerprint del job.
    JobFinalized { exit_code: ExitCode, fingerprint: String },
    /// Error terminal del adaptador en `state` (último estado alcanzado).
    JobFailed {
        state: JobState,
        class: ErrorClass,
        message: String,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobEvent {
    pub seq: u64, // asignado por el EventStore (orden append)
    pub job_id: Uuid,
    pub kind: JobEventKind,
    pub ts: DateTime<Utc>, // metadato (no entra en fingerprint)
}
