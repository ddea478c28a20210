use std::collections::HashMap;

use chrono::Utc;
use uuid::Uuid;

use super::{JobEvent, JobEventKind};

/// Almacenamiento de eventos append-only.
pub trait EventStore {
    /// Agrega un evento a partir de su kind y devuelve el evento completo (con seq y ts).
    fn append_kind(&mut self, job_id: Uuid, kind: JobEventKind) -> JobEvent;
    /// Lista eventos de un job (orden ascendente por seq).
    fn list(&self, job_id: Uuid) -> Vec<JobEvent>;
}

#[derive(Default)]
pub struct InMemoryEventStore {
    inner: HashMap<Uuid, Vec<JobEvent>>,
}

impl InMemoryEventStore {
    /// Ids de jobs con al menos un evento.
    pub fn job_ids(&self) -> Vec<Uuid> {
        self.inner.keys().copied().collect()
    }
}

impl EventStore for InMemoryEventStore {
    fn append_kind(&mut self, job_id: Uuid, kind: JobEventKind) -> JobEvent {
        let vec = self.inner.entry(job_id).or_default();
        let seq = vec.len() as u64;
        let ev = JobEvent { seq,
                            job_id,
                            kind,
                            ts: Utc::now() };
        vec.push(ev.clone());
        ev
    }

    fn list(&self, job_id: Uuid) -> Vec<JobEvent> {
        self.inner.get(&job_id).cloned().unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seq_is_per_job_and_monotonic() {
        let mut store = InMemoryEventStore::default();
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        store.append_kind(a, JobEventKind::JobExecuted { exit_status: Some(0) });
        store.append_kind(b, JobEventKind::JobExecuted { exit_status: None });
        let ev = store.append_kind(a, JobEventKind::JobExecuted { exit_status: Some(1) });
        assert_eq!(ev.seq, 1);
        assert_eq!(store.list(a).len(), 2);
        assert_eq!(store.list(b)[0].seq, 0);
        assert!(store.list(Uuid::new_v4()).is_empty());
    }
}
