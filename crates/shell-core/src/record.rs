//! Registro de ejecución reconstruido desde eventos.
//!
//! El replay es lineal: consume eventos en orden y actualiza el registro. No
//! guarda artifacts completos, sólo sus hashes por label.
use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::ErrorClass;
use crate::event::{JobEvent, JobEventKind};
use crate::job::{ExitCode, JobOutcome, JobState};

/// Error terminal registrado por `JobFailed`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobFailure {
    pub state: JobState,
    pub class: ErrorClass,
    pub message: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecutionRecord {
    pub job_id: Uuid,
    pub process_label: Option<String>,
    pub spec_hash: Option<String>,
    /// Último estado alcanzado (`None` si no hay eventos).
    pub state: Option<JobState>,
    pub arguments: Vec<String>,
    pub working_dir: Option<String>,
    pub staged: Vec<String>,
    pub exit_status: Option<i32>,
    pub exit_code: Option<ExitCode>,
    pub outputs: BTreeMap<String, String>,
    pub fingerprint: Option<String>,
    pub failure: Option<JobFailure>,
    pub created_at: Option<DateTime<Utc>>,
    pub finished_at: Option<DateTime<Utc>>,
}

impl ExecutionRecord {
    pub fn replay(job_id: Uuid, events: &[JobEvent]) -> Self {
        let mut rec = Self { job_id,
                             process_label: None,
                             spec_hash: None,
                             state: None,
                             arguments: Vec::new(),
                             working_dir: None,
                             staged: Vec::new(),
                             exit_status: None,
                             exit_code: None,
                             outputs: BTreeMap::new(),
                             fingerprint: None,
                             failure: None,
                             created_at: None,
                             finished_at: None };
        for ev in events.iter().filter(|e| e.job_id == job_id) {
            match &ev.kind {
                JobEventKind::JobCreated { spec_hash, process_label, .. } => {
                    rec.state = Some(JobState::Created);
                    rec.spec_hash = Some(spec_hash.clone());
                    rec.process_label = Some(process_label.clone());
                    rec.created_at = Some(ev.ts);
                }
                JobEventKind::JobStaged { working_dir,
                                          arguments,
                                          staged,
                                          .. } => {
                    rec.state = Some(JobState::Staged);
                    rec.working_dir = Some(working_dir.clone());
                    rec.arguments = arguments.clone();
                    rec.staged = staged.clone();
                }
                JobEventKind::JobExecuted { exit_status } => {
                    rec.state = Some(JobState::Executed);
                    rec.exit_status = *exit_status;
                }
                JobEventKind::JobParsed { outputs } => {
                    rec.state = Some(JobState::Parsed);
                    rec.outputs = outputs.clone();
                }
                JobEventKind::JobFinalized { exit_code, fingerprint } => {
                    rec.state = Some(JobState::Finalized);
                    rec.exit_code = Some(exit_code.clone());
                    rec.fingerprint = Some(fingerprint.clone());
                    rec.finished_at = Some(ev.ts);
                }
                JobEventKind::JobFailed { state, class, message } => {
                    rec.failure = Some(JobFailure { state: *state,
                                                    class: *class,
                                                    message: message.clone() });
                    rec.finished_at = Some(ev.ts);
                }
            }
        }
        rec
    }

    /// Finalizado con código de salida cero.
    pub fn is_finished_ok(&self) -> bool {
        self.state == Some(JobState::Finalized) && self.exit_code.as_ref().is_some_and(ExitCode::is_success)
    }

    pub fn is_failed(&self) -> bool {
        self.failure.is_some()
    }

    /// Lectura del código de salida; `None` mientras no haya finalizado.
    pub fn outcome(&self) -> Option<JobOutcome> {
        self.exit_code.as_ref().map(ExitCode::outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::{EventStore, InMemoryEventStore};

    #[test]
    fn replay_full_lifecycle() {
        let mut store = InMemoryEventStore::default();
        let id = Uuid::new_v4();
        store.append_kind(id,
                          JobEventKind::JobCreated { spec_hash: "h".into(),
                                                     command: "/bin/echo".into(),
                                                     process_label: "ShellJob<echo@localhost>".into() });
        store.append_kind(id,
                          JobEventKind::JobStaged { working_dir: "/tmp/w".into(),
                                                    arguments: vec!["hi".into()],
                                                    staged: vec![],
                                                    remote: vec![] });
        store.append_kind(id, JobEventKind::JobExecuted { exit_status: Some(0) });
        store.append_kind(id,
                          JobEventKind::JobParsed { outputs: BTreeMap::from([("stdout".to_string(), "abc".to_string())]) });
        store.append_kind(id,
                          JobEventKind::JobFinalized { exit_code: ExitCode::success(),
                                                       fingerprint: "fp".into() });
        let rec = ExecutionRecord::replay(id, &store.list(id));
        assert_eq!(rec.state, Some(JobState::Finalized));
        assert!(rec.is_finished_ok());
        assert_eq!(rec.arguments, vec!["hi"]);
        assert_eq!(rec.outputs["stdout"], "abc");
        assert_eq!(rec.outcome(), Some(JobOutcome::Success));
    }

    #[test]
    fn replay_failure_keeps_last_state() {
        let id = Uuid::new_v4();
        let mut store = InMemoryEventStore::default();
        store.append_kind(id,
                          JobEventKind::JobCreated { spec_hash: "h".into(),
                                                     command: "x".into(),
                                                     process_label: "ShellJob<x@localhost>".into() });
        store.append_kind(id,
                          JobEventKind::JobFailed { state: JobState::Created,
                                                    class: ErrorClass::Staging,
                                                    message: "boom".into() });
        let rec = ExecutionRecord::replay(id, &store.list(id));
        assert_eq!(rec.state, Some(JobState::Created));
        assert!(rec.is_failed());
        assert!(!rec.is_finished_ok());
        assert_eq!(rec.outcome(), None);
    }
}
