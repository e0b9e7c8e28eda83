//! Probe results and per-domain classification records.

use std::fmt;

use chrono::{DateTime, Local};

/// Result of a single reachability probe.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProbeResult {
    /// `true` only for a completed response with status 200.
    pub success: bool,
    /// Wall-clock time from request start to completion or failure.
    pub latency_ms: u64,
}

impl ProbeResult {
    pub const fn reachable(latency_ms: u64) -> Self {
        Self {
            success: true,
            latency_ms,
        }
    }

    pub const fn unreachable(latency_ms: u64) -> Self {
        Self {
            success: false,
            latency_ms,
        }
    }
}

/// Final classification of a domain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Status {
    /// Reachable over the direct path.
    NotBlocked,
    /// Unreachable directly, reachable through the tunnel.
    Blocked,
    /// Unreachable over both paths.
    NoResponse,
}

impl Status {
    /// Value written to the `estat` column.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::NotBlocked => "not_blocked",
            Self::Blocked => "blocked",
            Self::NoResponse => "no_response",
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One row of the results log.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutcomeRecord {
    pub timestamp: DateTime<Local>,
    pub domain: String,
    pub status: Status,
    pub latency_ms: u64,
}

impl OutcomeRecord {
    /// Stamps a classification with the current local time.
    pub fn now(domain: &str, status: Status, latency_ms: u64) -> Self {
        Self {
            timestamp: Local::now(),
            domain: domain.to_string(),
            status,
            latency_ms,
        }
    }
}
