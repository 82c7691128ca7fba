mod job;
mod state;

pub use job::{Job, JobId};
pub use state::{JobState, StateMachine};
