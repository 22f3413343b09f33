use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::parser::ConnectionTarget;

/// Outcome of a single probe. `Error` means the probe itself or its upstream
/// service misbehaved, as opposed to a clean negative answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ProbeStatus {
    Success,
    Failure,
    Error,
}

impl ProbeStatus {
    pub fn is_success(self) -> bool {
        matches!(self, ProbeStatus::Success)
    }
}

/// One probe's result. Built once during execution, never mutated.
#[derive(Debug, Clone, Serialize)]
pub struct ProbeResult {
    pub name: String,
    pub status: ProbeStatus,
    pub latency_ms: Option<u64>,
    pub message: String,
}

impl ProbeResult {
    pub fn success(name: &str, latency_ms: Option<u64>, message: impl Into<String>) -> Self {
        ProbeResult {
            name: name.to_string(),
            status: ProbeStatus::Success,
            latency_ms,
            message: message.into(),
        }
    }

    pub fn failure(name: &str, message: impl Into<String>) -> Self {
        ProbeResult {
            name: name.to_string(),
            status: ProbeStatus::Failure,
            latency_ms: None,
            message: message.into(),
        }
    }

    pub fn error(name: &str, message: impl Into<String>) -> Self {
        ProbeResult {
            name: name.to_string(),
            status: ProbeStatus::Error,
            latency_ms: None,
            message: message.into(),
        }
    }
}

/// Aggregated result of one check invocation. The probe sequence keeps the
/// order in which the probes ran.
#[derive(Debug, Clone, Serialize)]
pub struct Summary {
    pub server: String,
    pub name: String,
    pub timestamp: DateTime<Utc>,
    pub overall: ProbeStatus,
    pub success_rate: String,
    pub probes: Vec<ProbeResult>,
}

impl Summary {
    pub fn new(target: &ConnectionTarget, probes: Vec<ProbeResult>) -> Self {
        let passed = probes.iter().filter(|p| p.status.is_success()).count();
        let overall = if passed == probes.len() {
            ProbeStatus::Success
        } else {
            ProbeStatus::Failure
        };

        Summary {
            server: target.endpoint(),
            name: target.name.clone(),
            timestamp: Utc::now(),
            overall,
            success_rate: format!("{passed}/{}", probes.len()),
            probes,
        }
    }

    pub fn is_success(&self) -> bool {
        self.overall.is_success()
    }
}
