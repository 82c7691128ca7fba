//! Printer configuration loaded from `receipt-matic.toml`.
//!
//! [`PrinterConfig`] holds every tunable; fields missing from the file fall
//! back to the stock printer pacing (200ms per line, 800ms
//! settle). `RECEIPT_MATIC_ENDPOINT` takes precedence over the file for the
//! enrichment endpoint.

use std::path::Path;
use std::time::Duration;

use serde::Deserialize;

use crate::enrichment::client::API_URL;
use crate::error::PrinterError;
use crate::scheduler::Timing;

pub const CONFIG_FILE: &str = "receipt-matic.toml";
pub const ENDPOINT_ENV: &str = "RECEIPT_MATIC_ENDPOINT";

#[derive(Debug, Clone, Deserialize)]
pub struct PrinterConfig {
    /// URL of the enrichment chat endpoint.
    #[serde(default = "default_endpoint")]
    pub endpoint: String,

    /// Whether to call the enrichment endpoint at all.
    #[serde(default = "default_enrich")]
    pub enrich: bool,

    /// Column width at which body and enrichment lines wrap.
    #[serde(default = "default_wrap_width")]
    pub wrap_width: usize,

    #[serde(default = "default_line_interval_ms")]
    pub line_interval_ms: u64,

    #[serde(default = "default_settle_delay_ms")]
    pub settle_delay_ms: u64,

    /// Upper bound on one enrichment call, connect included.
    #[serde(default = "default_enrich_timeout_secs")]
    pub enrich_timeout_secs: u64,
}

fn default_endpoint() -> String {
    API_URL.to_string()
}

fn default_enrich() -> bool {
    true
}

fn default_wrap_width() -> usize {
    30
}

fn default_line_interval_ms() -> u64 {
    200
}

fn default_settle_delay_ms() -> u64 {
    800
}

fn default_enrich_timeout_secs() -> u64 {
    10
}

impl Default for PrinterConfig {
    fn default() -> Self {
        Self {
            endpoint: default_endpoint(),
            enrich: default_enrich(),
            wrap_width: default_wrap_width(),
            line_interval_ms: default_line_interval_ms(),
            settle_delay_ms: default_settle_delay_ms(),
            enrich_timeout_secs: default_enrich_timeout_secs(),
        }
    }
}

impl PrinterConfig {
    /// Load `receipt-matic.toml` from the current directory, or defaults if
    /// there is none.
    pub fn load() -> Result<Self, PrinterError> {
        let path = Path::new(CONFIG_FILE);
        let mut config = if path.exists() {
            Self::from_file(path)?
        } else {
            Self::default()
        };

        if let Ok(endpoint) = std::env::var(ENDPOINT_ENV)
            && !endpoint.is_empty()
        {
            config.endpoint = endpoint;
        }

        config.validate()?;
        Ok(config)
    }

    /// Load an explicit config file; no environment overrides applied.
    pub fn load_from(path: &Path) -> Result<Self, PrinterError> {
        let config = Self::from_file(path)?;
        config.validate()?;
        Ok(config)
    }

    fn from_file(path: &Path) -> Result<Self, PrinterError> {
        let contents = std::fs::read_to_string(path)?;
        Ok(toml::from_str::<PrinterConfig>(&contents)?)
    }

    pub fn validate(&self) -> Result<(), PrinterError> {
        if self.wrap_width == 0 {
            return Err(PrinterError::Config("wrap_width must be at least 1".into()));
        }
        if self.enrich_timeout_secs == 0 {
            return Err(PrinterError::Config(
                "enrich_timeout_secs must be at least 1".into(),
            ));
        }
        Ok(())
    }

    pub fn timing(&self) -> Timing {
        Timing {
            line_interval: Duration::from_millis(self.line_interval_ms.max(1)),
            settle_delay: Duration::from_millis(self.settle_delay_ms),
        }
    }

    pub fn enrich_timeout(&self) -> Duration {
        Duration::from_secs(self.enrich_timeout_secs)
    }
}
