//! Job lifecycle engine for a simulated receipt printer.
//!
//! Raw text is formatted into a fixed receipt [`Template`](formatter::Template),
//! optionally enriched by a remote chat endpoint, and revealed one line at a
//! time by the [`PrinterScheduler`](scheduler::PrinterScheduler), which then
//! walks the job through its settle delay. One job prints at a time.

pub mod config;
pub mod enrichment;
pub mod error;
pub mod formatter;
pub mod scheduler;
pub mod state_machine;
pub mod store;
