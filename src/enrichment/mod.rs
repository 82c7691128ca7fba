pub mod client;
pub mod error;
pub mod gateway;
pub mod types;

pub use client::{ContentSource, EnrichmentClient};
pub use error::EnrichError;
pub use gateway::Enricher;
