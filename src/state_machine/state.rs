use std::fmt;

use chrono::Utc;
use serde::{Deserialize, Serialize};

use super::job::Job;
use crate::error::PrinterError;

/// The four states of a receipt job.
///
/// Each job flows through: ASSEMBLING → REVEALING → SETTLING → SETTLED
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum JobState {
    Assembling,
    Revealing,
    Settling,
    Settled,
}

impl JobState {
    /// The only state this one may advance to, `None` for the terminal state.
    pub fn successor(self) -> Option<JobState> {
        match self {
            JobState::Assembling => Some(JobState::Revealing),
            JobState::Revealing => Some(JobState::Settling),
            JobState::Settling => Some(JobState::Settled),
            JobState::Settled => None,
        }
    }
}

impl fmt::Display for JobState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            JobState::Assembling => write!(f, "ASSEMBLING"),
            JobState::Revealing => write!(f, "REVEALING"),
            JobState::Settling => write!(f, "SETTLING"),
            JobState::Settled => write!(f, "SETTLED"),
        }
    }
}

/// Applies state changes and reveal ticks to a `Job`.
///
/// Every mutation of a job's lifecycle goes through here; anything the
/// transition table does not allow is rejected and leaves the job untouched.
pub struct StateMachine;

impl StateMachine {
    /// Move `job` to `to`.
    ///
    /// - `to` must be the successor of the current state.
    /// - `Settling` additionally requires every template line to be revealed.
    pub fn advance(job: &mut Job, to: JobState) -> Result<(), PrinterError> {
        let allowed = job.state.successor() == Some(to)
            && (to != JobState::Settling || job.revealed == job.total_lines());
        if !allowed {
            return Err(PrinterError::InvalidTransition {
                id: job.id,
                from: job.state,
                to,
            });
        }

        job.state_history.push(job.state);
        job.state = to;
        job.updated_at = Utc::now();
        Ok(())
    }

    /// Reveal the next template line and return the new prefix length.
    ///
    /// Only valid while `Revealing` and before the template is exhausted.
    pub fn reveal_line(job: &mut Job) -> Result<usize, PrinterError> {
        if job.state != JobState::Revealing || job.revealed >= job.total_lines() {
            return Err(PrinterError::RevealRejected {
                id: job.id,
                state: job.state,
                next: job.revealed + 1,
            });
        }

        job.revealed += 1;
        job.updated_at = Utc::now();
        Ok(job.revealed)
    }
}
