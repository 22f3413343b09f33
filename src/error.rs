use std::time::Duration;

use thiserror::Error;

/// Fatal startup errors. Probe-level failures never surface here; they are
/// recorded as failing probe results instead.
#[derive(Debug, Error)]
pub enum CheckError {
    #[error("invalid config format: {0}")]
    InvalidConfigFormat(String),
}

/// Internal probe failures, converted into a `ProbeResult` by the probe that
/// produced them.
#[derive(Debug, Error)]
pub enum ProbeError {
    #[error("timed out after {0:?}")]
    Timeout(Duration),

    #[error("connection failed: {0}")]
    Connection(#[from] std::io::Error),

    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("upstream service error: {0}")]
    Service(String),
}
