//! In-memory record of every receipt printed this session.

use indexmap::IndexMap;

use crate::error::PrinterError;
use crate::state_machine::{Job, JobId, JobState, StateMachine};

/// Insertion-ordered, append-only map of jobs.
///
/// The scheduler is the only writer. Readers get clones through
/// [`JobStore::snapshot`], never references into the live map.
#[derive(Debug, Default)]
pub struct JobStore {
    jobs: IndexMap<JobId, Job>,
}

impl JobStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a job at the end of the display order. An id that is already
    /// present is left untouched.
    pub fn insert(&mut self, job: Job) -> bool {
        if self.jobs.contains_key(&job.id) {
            return false;
        }
        self.jobs.insert(job.id, job);
        true
    }

    /// Reveal the next line of `id`, returning the new prefix length.
    pub fn append_line(&mut self, id: JobId) -> Result<usize, PrinterError> {
        let job = self.get_mut(id)?;
        StateMachine::reveal_line(job)
    }

    pub fn set_state(&mut self, id: JobId, state: JobState) -> Result<(), PrinterError> {
        let job = self.get_mut(id)?;
        StateMachine::advance(job, state)
    }

    pub fn get(&self, id: JobId) -> Option<&Job> {
        self.jobs.get(&id)
    }

    /// Copies of all jobs in creation order.
    pub fn snapshot(&self) -> Vec<Job> {
        self.jobs.values().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.jobs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.jobs.is_empty()
    }

    fn get_mut(&mut self, id: JobId) -> Result<&mut Job, PrinterError> {
        self.jobs.get_mut(&id).ok_or(PrinterError::JobNotFound(id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::formatter::Template;

    fn revealing_job(millis: u64, body: &str) -> Job {
        let mut job = Job::new(
            JobId::from_millis(millis),
            Template::assemble(body, None, "ts", 30),
        );
        StateMachine::advance(&mut job, JobState::Revealing).unwrap();
        job
    }

    #[test]
    fn snapshot_keeps_creation_order() {
        let mut store = JobStore::new();
        store.insert(revealing_job(30, "third?"));
        store.insert(revealing_job(10, "first?"));
        store.insert(revealing_job(20, "second?"));

        let ids: Vec<JobId> = store.snapshot().iter().map(|j| j.id).collect();
        assert_eq!(
            ids,
            vec![
                JobId::from_millis(30),
                JobId::from_millis(10),
                JobId::from_millis(20)
            ]
        );
    }

    #[test]
    fn duplicate_insert_is_ignored() {
        let mut store = JobStore::new();
        assert!(store.insert(revealing_job(1, "a")));
        assert!(!store.insert(revealing_job(1, "b")));
        assert_eq!(store.len(), 1);
        assert_eq!(store.get(JobId::from_millis(1)).unwrap().template[3], "a");
    }

    #[test]
    fn append_line_grows_prefix() {
        let mut store = JobStore::new();
        let id = JobId::from_millis(5);
        store.insert(revealing_job(5, "Hello"));

        assert_eq!(store.append_line(id).unwrap(), 1);
        assert_eq!(store.append_line(id).unwrap(), 2);
        assert_eq!(
            store.get(id).unwrap().revealed_lines(),
            &["收据", "ts"]
        );
    }

    #[test]
    fn missing_job_is_reported() {
        let mut store = JobStore::new();
        let id = JobId::from_millis(99);
        assert!(matches!(
            store.append_line(id),
            Err(PrinterError::JobNotFound(missing)) if missing == id
        ));
        assert!(matches!(
            store.set_state(id, JobState::Settled),
            Err(PrinterError::JobNotFound(_))
        ));
        assert!(store.is_empty());
    }

    #[test]
    fn set_state_respects_transition_table() {
        let mut store = JobStore::new();
        let id = JobId::from_millis(6);
        store.insert(revealing_job(6, "Hello"));

        assert!(store.set_state(id, JobState::Settling).is_err());
        while store.get(id).unwrap().revealed < 7 {
            store.append_line(id).unwrap();
        }
        store.set_state(id, JobState::Settling).unwrap();
        store.set_state(id, JobState::Settled).unwrap();
        assert_eq!(store.get(id).unwrap().state, JobState::Settled);
    }

    #[test]
    fn snapshot_is_detached_copy() {
        let mut store = JobStore::new();
        let id = JobId::from_millis(7);
        store.insert(revealing_job(7, "Hello"));

        let before = store.snapshot();
        store.append_line(id).unwrap();
        assert_eq!(before[0].revealed, 0);
        assert_eq!(store.snapshot()[0].revealed, 1);
    }
}
