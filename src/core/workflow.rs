//! Per-domain classification.
//!
//! Each domain is probed directly; a failure is re-checked through the tunnel,
//! which is brought up on demand and held until the end of the run.

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::core::prober::Prober;
use crate::core::report::ResultSink;
use crate::platform::TunnelTool;
use crate::state::{Domain, OutcomeRecord, Status};
use crate::tunnel::{Ensured, Tunnel, TunnelError, TunnelSession};

/// Totals for one run.
#[derive(Debug, Default)]
pub struct RunSummary {
    pub not_blocked: usize,
    pub blocked: usize,
    pub no_response: usize,
    /// Domains left unclassified because the tunnel could not be activated.
    pub skipped: usize,
    /// Rows classified but not persisted.
    pub write_failures: usize,
    /// Stopped by a signal before the list was exhausted.
    pub interrupted: bool,
    pub teardown_failures: Vec<TunnelError>,
}

impl RunSummary {
    fn count(&mut self, status: Status) {
        match status {
            Status::NotBlocked => self.not_blocked += 1,
            Status::Blocked => self.blocked += 1,
            Status::NoResponse => self.no_response += 1,
        }
    }

    /// Domains that received a verdict.
    pub fn classified(&self) -> usize {
        self.not_blocked + self.blocked + self.no_response
    }

    /// True if anything went wrong that the operator should look at.
    pub fn has_problems(&self) -> bool {
        self.skipped > 0
            || self.write_failures > 0
            || self.interrupted
            || !self.teardown_failures.is_empty()
    }
}

impl fmt::Display for RunSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "  {}: {}  {}: {}  {}: {}",
            Status::NotBlocked,
            self.not_blocked,
            Status::Blocked,
            self.blocked,
            Status::NoResponse,
            self.no_response
        )?;
        if self.skipped > 0 {
            writeln!(f, "  skipped (tunnel unavailable): {}", self.skipped)?;
        }
        if self.write_failures > 0 {
            writeln!(f, "  rows not written: {}", self.write_failures)?;
        }
        if self.interrupted {
            writeln!(f, "  interrupted before the end of the list")?;
        }
        for failure in &self.teardown_failures {
            writeln!(f, "  {failure}")?;
        }
        Ok(())
    }
}

/// Sequential classification over a domain list.
pub struct Workflow<'a, P, T> {
    prober: P,
    tunnel: &'a Tunnel<T>,
    stop: &'a AtomicBool,
}

impl<'a, P: Prober, T: TunnelTool> Workflow<'a, P, T> {
    pub fn new(prober: P, tunnel: &'a Tunnel<T>, stop: &'a AtomicBool) -> Self {
        Self {
            prober,
            tunnel,
            stop,
        }
    }

    /// Classifies `domains` in order, appending one record per verdict.
    ///
    /// Any tunnel activated here is torn down before returning, also when the
    /// run is interrupted or unwinds.
    pub fn run(&self, domains: &[Domain], sink: &mut dyn ResultSink) -> RunSummary {
        let mut summary = RunSummary::default();
        let mut session = TunnelSession::new(self.tunnel);

        for (i, domain) in domains.iter().enumerate() {
            if self.stop.load(Ordering::SeqCst) {
                crate::log_warning!(
                    "RUN",
                    "Interrupted, {} of {} domains not checked",
                    domains.len() - i,
                    domains.len()
                );
                summary.interrupted = true;
                break;
            }

            let (status, latency_ms) = match self.classify(&mut session, domain) {
                Ok(verdict) => verdict,
                Err(e) => {
                    crate::log_error!("RUN", "{domain}: no verdict, {e}");
                    summary.skipped += 1;
                    continue;
                }
            };
            crate::log_info!("RUN", "{domain}: {status} ({latency_ms} ms)");
            summary.count(status);

            if let Err(e) = sink.record(&OutcomeRecord::now(domain.as_str(), status, latency_ms)) {
                crate::log_error!("RUN", "{domain}: {e}");
                summary.write_failures += 1;
            }
        }

        if let Err(e) = sink.flush() {
            crate::log_error!("RUN", "{e}");
        }
        if session.pending() > 0 {
            crate::log_debug!("RUN", "Releasing {} tunnel activation(s)", session.pending());
        }
        summary.teardown_failures = session.release();
        summary
    }

    fn classify(
        &self,
        session: &mut TunnelSession<'_, T>,
        domain: &Domain,
    ) -> Result<(Status, u64), TunnelError> {
        let direct = self.prober.probe(domain);
        if direct.success {
            return Ok((Status::NotBlocked, direct.latency_ms));
        }
        crate::log_debug!(
            "RUN",
            "{domain}: direct probe failed after {} ms, retrying through tunnel",
            direct.latency_ms
        );

        if session.ensure_active()? == Ensured::AlreadyActive {
            crate::log_debug!("RUN", "Tunnel already up");
        }

        let tunneled = self.prober.probe(domain);
        let status = if tunneled.success {
            Status::Blocked
        } else {
            Status::NoResponse
        };
        Ok((status, tunneled.latency_ms))
    }
}
