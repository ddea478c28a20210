//! Cola FIFO en memoria.

use std::collections::VecDeque;

use indexmap::IndexMap;
use log::info;
use shell_core::{Artifact, EventStore, ExecutionRecord, JobQueue, JobSpec, ProcessRunner, ShellEngine, ShellJobError,
                 Transport};
use uuid::Uuid;

type JobResult = Result<(IndexMap<String, Artifact>, ExecutionRecord), ShellJobError>;

#[derive(Debug, Default)]
pub struct InMemoryJobQueue {
    pending: VecDeque<(Uuid, JobSpec)>,
}

impl InMemoryJobQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    pub fn pop(&mut self) -> Option<(Uuid, JobSpec)> {
        self.pending.pop_front()
    }

    /// Ejecuta en orden todos los jobs pendientes y devuelve sus resultados.
    pub fn run_pending<E, R, T>(&mut self, engine: &mut ShellEngine<E, R, T>) -> Vec<(Uuid, JobResult)>
        where E: EventStore,
              R: ProcessRunner,
              T: Transport
    {
        let mut results = Vec::with_capacity(self.pending.len());
        while let Some((job_id, spec)) = self.pop() {
            info!("running queued job {job_id}");
            results.push((job_id, engine.run_with_id(job_id, spec)));
        }
        results
    }
}

impl JobQueue for InMemoryJobQueue {
    fn enqueue(&mut self, job_id: Uuid, spec: JobSpec) -> Result<(), ShellJobError> {
        self.pending.push_back((job_id, spec));
        Ok(())
    }
}
