//! In-memory [`TunnelTool`] for tests.
//!
//! Tracks whether the interface exists the way the kernel would: creating it
//! makes `wg show` report it, deleting it makes the query fail.

use std::cell::{Cell, RefCell};

use crate::config::TunnelConfig;
use crate::platform::{ToolError, TunnelTool};
use crate::tunnel::TunnelStep;

#[derive(Default)]
pub struct FakeTool {
    interface_up: Cell<bool>,
    status_broken: Cell<bool>,
    fail_on: RefCell<Vec<TunnelStep>>,
    executed: RefCell<Vec<TunnelStep>>,
    status_queries: Cell<usize>,
}

impl FakeTool {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts with the interface already present on the host.
    pub fn with_interface_up() -> Self {
        let tool = Self::new();
        tool.interface_up.set(true);
        tool
    }

    /// Make every run of `step` fail.
    pub fn fail_on(&self, step: TunnelStep) {
        self.fail_on.borrow_mut().push(step);
    }

    /// Make status queries fail even if the interface exists.
    pub fn break_status(&self) {
        self.status_broken.set(true);
    }

    /// Simulate the interface disappearing behind our back.
    pub fn drop_interface(&self) {
        self.interface_up.set(false);
    }

    pub fn executed(&self) -> Vec<TunnelStep> {
        self.executed.borrow().clone()
    }

    pub fn count(&self, step: TunnelStep) -> usize {
        self.executed.borrow().iter().filter(|s| **s == step).count()
    }

    pub fn status_queries(&self) -> usize {
        self.status_queries.get()
    }

    pub fn interface_up(&self) -> bool {
        self.interface_up.get()
    }
}

impl TunnelTool for FakeTool {
    fn query_status(&self, interface: &str) -> Result<String, ToolError> {
        self.status_queries.set(self.status_queries.get() + 1);
        if self.status_broken.get() || !self.interface_up.get() {
            return Err(ToolError::Failed {
                command: format!("wg show {interface}"),
                status: "exit 1".to_string(),
                stderr: format!("Unable to access interface: No such device ({interface})"),
            });
        }
        Ok(format!(
            "interface: {interface}\n  public key: FAKEPUB=\n  private key: (hidden)\n  listening port: 40000\n  fwmark: 0xca6c\n"
        ))
    }

    fn run_step(&self, step: TunnelStep, config: &TunnelConfig) -> Result<(), ToolError> {
        self.executed.borrow_mut().push(step);
        if step == TunnelStep::CreateInterface && self.interface_up.get() {
            return Err(ToolError::Failed {
                command: format!("ip link add {} type wireguard", config.interface),
                status: "exit 2".to_string(),
                stderr: "RTNETLINK answers: File exists".to_string(),
            });
        }
        if self.fail_on.borrow().contains(&step) {
            return Err(ToolError::Failed {
                command: format!("fake {step} on {}", config.interface),
                status: "exit 2".to_string(),
                stderr: "RTNETLINK answers: Operation not permitted".to_string(),
            });
        }
        match step {
            TunnelStep::CreateInterface => self.interface_up.set(true),
            TunnelStep::DeleteInterface => self.interface_up.set(false),
            _ => {}
        }
        Ok(())
    }
}
