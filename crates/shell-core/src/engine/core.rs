//! Implementación del `ShellEngine`.
//!
//! Un job recorre Created -> Staged -> Executed -> Parsed -> Finalized. Cada
//! transición se registra como evento; un error terminal registra
//! `JobFailed` con el último estado alcanzado y se propaga al llamador. Los
//! errores de validación se devuelven antes de emitir ningún evento.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use log::{error, info};
use uuid::Uuid;

use crate::collect::OutputCollector;
use crate::constants::{ENGINE_VERSION, FILENAME_STATUS, FILENAME_STDERR};
use crate::engine::ShellEngineBuilder;
use crate::errors::ShellJobError;
use crate::event::{EventStore, InMemoryEventStore, JobEvent, JobEventKind};
use crate::hashing::hash_value;
use crate::host::{ExecutionRequest, JobQueue, ProcessRunner, Transport};
use crate::job::{JobFingerprintInput, JobSpec, JobState};
use crate::model::Artifact;
use crate::record::ExecutionRecord;
use crate::staging::{LinkMode, StagingPlan, StagingResolver};

pub struct ShellEngine<E, R, T>
    where E: EventStore,
          R: ProcessRunner,
          T: Transport
{
    event_store: E,
    runner: R,
    transport: T,
    workdir_root: PathBuf,
    default_computer: String,
}

impl<R, T> ShellEngine<InMemoryEventStore, R, T>
    where R: ProcessRunner,
          T: Transport
{
    /// Builder con store de eventos en memoria.
    #[inline]
    pub fn new(runner: R, transport: T) -> ShellEngineBuilder<InMemoryEventStore, R, T> {
        ShellEngine::builder(InMemoryEventStore::default(), runner, transport)
    }
}

impl<E, R, T> ShellEngine<E, R, T>
    where E: EventStore,
          R: ProcessRunner,
          T: Transport
{
    #[inline]
    pub fn builder(event_store: E, runner: R, transport: T) -> ShellEngineBuilder<E, R, T> {
        ShellEngineBuilder { event_store,
                             runner,
                             transport,
                             workdir_root: None,
                             default_computer: None }
    }

    pub(crate) fn from_parts(event_store: E, runner: R, transport: T, workdir_root: PathBuf, default_computer: String) -> Self {
        Self { event_store,
               runner,
               transport,
               workdir_root,
               default_computer }
    }

    pub fn workdir_root(&self) -> &Path {
        &self.workdir_root
    }

    pub fn default_computer(&self) -> &str {
        &self.default_computer
    }

    pub fn event_store(&self) -> &E {
        &self.event_store
    }

    pub fn runner(&self) -> &R {
        &self.runner
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn events_for(&self, job_id: Uuid) -> Vec<JobEvent> {
        self.event_store.list(job_id)
    }

    /// Reconstruye el registro de un job desde su log de eventos.
    pub fn record(&self, job_id: Uuid) -> ExecutionRecord {
        ExecutionRecord::replay(job_id, &self.event_store.list(job_id))
    }

    /// Ejecuta un job nuevo de principio a fin.
    pub fn run(&mut self, spec: JobSpec) -> Result<(IndexMap<String, Artifact>, ExecutionRecord), ShellJobError> {
        self.run_with_id(Uuid::new_v4(), spec)
    }

    /// Ejecuta el job `job_id`. Si el id ya fue registrado por `submit` (y
    /// sigue en `Created`) se continúa desde ahí.
    pub fn run_with_id(&mut self, job_id: Uuid, spec: JobSpec) -> Result<(IndexMap<String, Artifact>, ExecutionRecord), ShellJobError> {
        let plan = self.prepare(&spec)?;
        let existing = self.record(job_id);
        match existing.state {
            None => self.append_created(job_id, &spec),
            Some(JobState::Created) if !existing.is_failed() => {}
            Some(state) => {
                return Err(ShellJobError::Internal(format!("job {job_id} cannot be run again from state {state:?}")));
            }
        }

        let mut state = JobState::Created;
        match self.drive(job_id, &spec, &plan, &mut state) {
            Ok(artifacts) => Ok((artifacts, self.record(job_id))),
            Err(e) => {
                error!("job {job_id} failed in state {state:?}: {e}");
                self.event_store.append_kind(job_id,
                                             JobEventKind::JobFailed { state,
                                                                       class: e.class(),
                                                                       message: e.to_string() });
                Err(e)
            }
        }
    }

    /// Valida y registra el job, y lo encola en `queue`. Devuelve el registro
    /// en estado `Created`; la ejecución queda a cargo de la cola.
    pub fn submit<Q>(&mut self, spec: JobSpec, queue: &mut Q) -> Result<ExecutionRecord, ShellJobError>
        where Q: JobQueue + ?Sized
    {
        self.prepare(&spec)?;
        let job_id = Uuid::new_v4();
        self.append_created(job_id, &spec);
        if let Err(e) = queue.enqueue(job_id, spec) {
            self.event_store.append_kind(job_id,
                                         JobEventKind::JobFailed { state: JobState::Created,
                                                                   class: e.class(),
                                                                   message: e.to_string() });
            return Err(e);
        }
        info!("job {job_id} submitted");
        Ok(self.record(job_id))
    }

    /// Validación completa sin efectos: especificación y plan de staging.
    fn prepare(&self, spec: &JobSpec) -> Result<StagingPlan, ShellJobError> {
        spec.validate()?;
        StagingResolver::new(spec).resolve()
    }

    fn append_created(&mut self, job_id: Uuid, spec: &JobSpec) {
        let process_label = spec.process_label(&self.default_computer);
        info!("{process_label} created as job {job_id}");
        self.event_store.append_kind(job_id,
                                     JobEventKind::JobCreated { spec_hash: spec.spec_hash(),
                                                                command: spec.command.clone(),
                                                                process_label });
    }

    fn advance(&mut self, job_id: Uuid, state: &mut JobState, to: JobState, kind: JobEventKind) -> Result<(), ShellJobError> {
        *state = state.transition(to)?;
        self.event_store.append_kind(job_id, kind);
        info!("job {job_id} -> {to:?}");
        Ok(())
    }

    fn stage(&self, working_dir: &Path, plan: &StagingPlan) -> Result<Vec<String>, ShellJobError> {
        fs::create_dir_all(&self.workdir_root).map_err(|e| ShellJobError::staging(&self.workdir_root, e))?;
        // `create_dir` falla si ya existe: el directorio es exclusivo del job.
        fs::create_dir(working_dir).map_err(|e| ShellJobError::staging(working_dir, e))?;
        for instruction in &plan.remote {
            match instruction.mode {
                LinkMode::Copy => self.transport
                                      .copy_tree(&instruction.computer, &instruction.remote_path, working_dir)?,
                LinkMode::Symlink => self.transport
                                         .symlink_tree(&instruction.computer, &instruction.remote_path, working_dir)?,
            }
        }
        plan.materialize(working_dir)
    }

    fn drive(&mut self, job_id: Uuid, spec: &JobSpec, plan: &StagingPlan, state: &mut JobState) -> Result<IndexMap<String, Artifact>, ShellJobError> {
        let working_dir = self.workdir_root.join(job_id.to_string());
        let staged = self.stage(&working_dir, plan)?;
        self.advance(job_id,
                     state,
                     JobState::Staged,
                     JobEventKind::JobStaged { working_dir: working_dir.display().to_string(),
                                               arguments: plan.arguments.clone(),
                                               staged,
                                               remote: plan.remote.clone() })?;

        let options = &spec.options;
        let request = ExecutionRequest { job_id,
                                         computer: spec.computer(&self.default_computer).to_string(),
                                         prefix: options.mpi.prefix(),
                                         executable: spec.command.clone(),
                                         arguments: plan.arguments.clone(),
                                         working_dir: working_dir.clone(),
                                         stdin: options.filename_stdin.clone(),
                                         stdout_name: options.stdout_filename().to_string(),
                                         stderr_name: (!options.redirect_stderr).then(|| FILENAME_STDERR.to_string()),
                                         status_name: FILENAME_STATUS.to_string() };
        let outcome = self.runner.run(&request)?;
        self.advance(job_id,
                     state,
                     JobState::Executed,
                     JobEventKind::JobExecuted { exit_status: outcome.exit_status })?;

        let collected = OutputCollector::new(&working_dir, spec).collect(job_id, &plan.arguments)?;
        let outputs: BTreeMap<String, String> = collected.artifacts
                                                         .iter()
                                                         .map(|(label, a)| (label.clone(), a.hash().to_string()))
                                                         .collect();
        self.advance(job_id,
                     state,
                     JobState::Parsed,
                     JobEventKind::JobParsed { outputs: outputs.clone() })?;

        let spec_hash = spec.spec_hash();
        let input = JobFingerprintInput { engine_version: ENGINE_VERSION,
                                          spec_hash: &spec_hash,
                                          arguments: &plan.arguments,
                                          outputs: &outputs,
                                          exit_status: collected.exit_code.status };
        let fingerprint = hash_value(&serde_json::to_value(&input).map_err(|e| ShellJobError::Internal(e.to_string()))?);
        info!("job {job_id} finished with exit code {} ({})",
              collected.exit_code.status,
              collected.exit_code.label);
        self.advance(job_id,
                     state,
                     JobState::Finalized,
                     JobEventKind::JobFinalized { exit_code: collected.exit_code,
                                                  fingerprint })?;
        Ok(collected.artifacts)
    }
}
