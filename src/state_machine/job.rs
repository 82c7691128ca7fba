use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::state::JobState;
use crate::formatter::Template;

// Last id handed out, in unix milliseconds.
static LAST_ID: AtomicU64 = AtomicU64::new(0);

/// Identity of a receipt job, derived from its submission time.
///
/// Ids are strictly increasing within a process: two submissions in the
/// same millisecond get consecutive values instead of colliding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct JobId(u64);

impl JobId {
    /// Allocate the next id for a submission happening now.
    pub fn next() -> Self {
        let now = u64::try_from(Utc::now().timestamp_millis()).unwrap_or(0);
        let mut prev = LAST_ID.load(Ordering::Relaxed);
        loop {
            let candidate = now.max(prev + 1);
            match LAST_ID.compare_exchange_weak(prev, candidate, Ordering::SeqCst, Ordering::Relaxed)
            {
                Ok(_) => return Self(candidate),
                Err(actual) => prev = actual,
            }
        }
    }

    pub fn from_millis(millis: u64) -> Self {
        Self(millis)
    }
}

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "receipt-{}", self.0)
    }
}

/// One receipt print request and its reveal progress.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Job {
    pub id: JobId,
    /// Fully assembled lines; fixed once the job exists.
    pub template: Vec<String>,
    /// Number of template lines revealed so far.
    pub revealed: usize,
    pub state: JobState,
    pub state_history: Vec<JobState>,
    pub enriched: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Job {
    pub fn new(id: JobId, template: Template) -> Self {
        let now = Utc::now();
        let enriched = template.has_enrichment();
        Self {
            id,
            template: template.into_lines(),
            revealed: 0,
            state: JobState::Assembling,
            state_history: Vec::new(),
            enriched,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn total_lines(&self) -> usize {
        self.template.len()
    }

    /// The lines printed so far, in template order.
    pub fn revealed_lines(&self) -> &[String] {
        &self.template[..self.revealed]
    }

    /// True while the job still holds the printer.
    pub fn is_active(&self) -> bool {
        self.state != JobState::Settled
    }
}
