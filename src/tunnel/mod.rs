//! Tunnel lifecycle control.
//!
//! [`Tunnel`] applies the fixed activation and deactivation sequences through a
//! [`TunnelTool`]. [`TunnelSession`] scopes a run's use of the tunnel: every
//! activation it performs is undone exactly once when the session is released
//! or dropped, including on early return and panic.
//!
//! Tunnel state is never cached. It is re-queried from the host each time.

mod step;

pub use step::TunnelStep;

use std::fmt;

use crate::config::TunnelConfig;
use crate::platform::{ToolError, TunnelTool};

/// Which sequence was running when a step failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Activate,
    Deactivate,
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Activate => "activation",
            Self::Deactivate => "deactivation",
        })
    }
}

/// A lifecycle sequence stopped at a failing step.
///
/// Steps listed in `completed` were applied and are NOT rolled back.
#[derive(Debug, thiserror::Error)]
#[error(
    "tunnel {action} failed at '{step}' ({} of {total} steps applied): {source}",
    .completed.len()
)]
pub struct TunnelError {
    pub action: Action,
    pub step: TunnelStep,
    pub completed: Vec<TunnelStep>,
    pub total: usize,
    #[source]
    pub source: ToolError,
}

/// Controller for the configured tunnel interface.
pub struct Tunnel<T> {
    tool: T,
    config: TunnelConfig,
}

impl<T: TunnelTool> Tunnel<T> {
    pub fn new(tool: T, config: TunnelConfig) -> Self {
        Self { tool, config }
    }

    pub fn config(&self) -> &TunnelConfig {
        &self.config
    }

    /// Whether the host reports the configured interface.
    ///
    /// Fail-closed: a failed status query counts as inactive, so callers try to
    /// activate instead of probing through a tunnel that may not exist.
    pub fn is_active(&self) -> bool {
        match self.tool.query_status(&self.config.interface) {
            Ok(output) => reports_interface(&output, &self.config.interface),
            Err(e) => {
                crate::log_debug!("TUNNEL", "Status query treated as inactive: {e}");
                false
            }
        }
    }

    /// Applies [`TunnelStep::ACTIVATE`] in order, stopping at the first failure.
    ///
    /// Not idempotent: fails at the first step if the interface already exists.
    ///
    /// # Errors
    ///
    /// Returns the failing step and the steps already applied.
    pub fn activate(&self) -> Result<(), TunnelError> {
        crate::log_info!(
            "TUNNEL",
            "Activating '{}' (endpoint {}, fwmark {})",
            self.config.interface,
            self.config.endpoint,
            self.config.fwmark
        );
        self.run_sequence(Action::Activate, &TunnelStep::ACTIVATE)?;
        crate::log_info!("TUNNEL", "Tunnel '{}' is up", self.config.interface);
        Ok(())
    }

    /// Applies [`TunnelStep::DEACTIVATE`] in order, stopping at the first failure.
    ///
    /// # Errors
    ///
    /// Returns the failing step and the steps already applied.
    pub fn deactivate(&self) -> Result<(), TunnelError> {
        crate::log_info!("TUNNEL", "Deactivating '{}'", self.config.interface);
        self.run_sequence(Action::Deactivate, &TunnelStep::DEACTIVATE)?;
        crate::log_info!("TUNNEL", "Tunnel '{}' is down", self.config.interface);
        Ok(())
    }

    /// Attempts every deactivation step regardless of failures.
    ///
    /// For manual cleanup after a partial activation. Returns the steps that
    /// failed; on a partially configured host some failures are expected.
    pub fn force_teardown(&self) -> Vec<(TunnelStep, ToolError)> {
        TunnelStep::DEACTIVATE
            .iter()
            .filter_map(|&step| match self.tool.run_step(step, &self.config) {
                Ok(()) => None,
                Err(e) => {
                    crate::log_warning!("TUNNEL", "Teardown step '{step}' failed: {e}");
                    Some((step, e))
                }
            })
            .collect()
    }

    fn run_sequence(&self, action: Action, steps: &[TunnelStep]) -> Result<(), TunnelError> {
        let mut completed = Vec::with_capacity(steps.len());
        for &step in steps {
            crate::log_debug!("TUNNEL", "{action}: {step}");
            if let Err(source) = self.tool.run_step(step, &self.config) {
                return Err(TunnelError {
                    action,
                    step,
                    completed,
                    total: steps.len(),
                    source,
                });
            }
            completed.push(step);
        }
        Ok(())
    }
}

/// True if `wg show` output names exactly `interface`.
fn reports_interface(output: &str, interface: &str) -> bool {
    output
        .lines()
        .filter_map(|line| line.trim().strip_prefix("interface:"))
        .any(|name| name.trim() == interface)
}

/// How [`TunnelSession::ensure_active`] satisfied the request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Ensured {
    /// The interface was already reported; nothing was changed.
    AlreadyActive,
    /// This session activated the tunnel and owes one deactivation.
    Activated,
}

/// A run's claim on the tunnel.
///
/// Counts successful activations and undoes each one exactly once, at
/// [`release`](Self::release) or on drop, whichever comes first.
pub struct TunnelSession<'t, T: TunnelTool> {
    tunnel: &'t Tunnel<T>,
    pending: usize,
}

impl<'t, T: TunnelTool> TunnelSession<'t, T> {
    pub fn new(tunnel: &'t Tunnel<T>) -> Self {
        Self {
            tunnel,
            pending: 0,
        }
    }

    /// Activates the tunnel unless the host already reports it.
    ///
    /// # Errors
    ///
    /// Returns the activation error. No deactivation is owed in that case.
    pub fn ensure_active(&mut self) -> Result<Ensured, TunnelError> {
        if self.tunnel.is_active() {
            return Ok(Ensured::AlreadyActive);
        }
        self.tunnel.activate()?;
        self.pending += 1;
        Ok(Ensured::Activated)
    }

    /// Deactivations still owed.
    pub fn pending(&self) -> usize {
        self.pending
    }

    /// Runs the owed deactivations now and returns their failures.
    pub fn release(mut self) -> Vec<TunnelError> {
        self.teardown()
    }

    fn teardown(&mut self) -> Vec<TunnelError> {
        let mut failures = Vec::new();
        while self.pending > 0 {
            self.pending -= 1;
            if let Err(e) = self.tunnel.deactivate() {
                crate::log_error!("TUNNEL", "{e}");
                failures.push(e);
            }
        }
        failures
    }
}

impl<T: TunnelTool> Drop for TunnelSession<'_, T> {
    fn drop(&mut self) {
        if self.pending > 0 {
            crate::log_warning!(
                "TUNNEL",
                "Session ended without release, tearing down '{}'",
                self.tunnel.config.interface
            );
            let _ = self.teardown();
        }
    }
}
