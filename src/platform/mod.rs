//! Platform abstraction layer for the tunnel tooling.
//!
//! The tunnel controller talks to the host through [`TunnelTool`]; the Linux
//! implementation drives `wg`, `ip` and `sysctl`.
//!
//! Supported platforms:
//! - Linux: kernel WireGuard, iproute2 policy routing

#[cfg(test)]
pub mod fake;
#[cfg(target_os = "linux")]
pub mod linux;

#[cfg(not(target_os = "linux"))]
compile_error!("blockprobe currently only supports Linux");

use crate::config::TunnelConfig;
use crate::tunnel::TunnelStep;

#[cfg(target_os = "linux")]
pub use linux::wireguard::WgTool as SystemTunnelTool;

/// Failure of a single external tool invocation.
#[derive(Debug, thiserror::Error)]
pub enum ToolError {
    /// The program could not be started (missing binary, permissions).
    #[error("failed to run `{command}`: {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },
    /// The program ran and reported failure.
    #[error("`{command}` failed ({status}): {stderr}")]
    Failed {
        command: String,
        status: String,
        stderr: String,
    },
}

/// Verbs the tunnel controller needs from the host.
pub trait TunnelTool {
    /// Raw status report for `interface` (e.g. `wg show <interface>`).
    fn query_status(&self, interface: &str) -> Result<String, ToolError>;

    /// Applies one lifecycle step for the configured tunnel.
    fn run_step(&self, step: TunnelStep, config: &TunnelConfig) -> Result<(), ToolError>;
}

impl<T: TunnelTool + ?Sized> TunnelTool for &T {
    fn query_status(&self, interface: &str) -> Result<String, ToolError> {
        (**self).query_status(interface)
    }

    fn run_step(&self, step: TunnelStep, config: &TunnelConfig) -> Result<(), ToolError> {
        (**self).run_step(step, config)
    }
}
