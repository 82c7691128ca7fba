use thiserror::Error;

use crate::state_machine::{JobId, JobState};

#[derive(Debug, Error)]
pub enum PrinterError {
    #[error("Config error: {0}")]
    Config(String),

    #[error("Job not found: {0}")]
    JobNotFound(JobId),

    #[error("Job already recorded: {0}")]
    DuplicateJob(JobId),

    #[error("Printer disposed")]
    Disposed,

    #[error("Invalid transition for job {id}: {from} -> {to}")]
    InvalidTransition {
        id: JobId,
        from: JobState,
        to: JobState,
    },

    #[error("Cannot reveal line {next} of job {id} while {state}")]
    RevealRejected {
        id: JobId,
        state: JobState,
        next: usize,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
}
