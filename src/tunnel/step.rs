//! Named steps of the tunnel lifecycle.

use std::fmt;

/// One host-level change applied while bringing the tunnel up or down.
///
/// The platform layer decides which command implements each step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TunnelStep {
    CreateInterface,
    AssignAddress,
    LinkUp,
    ConfigurePeer,
    AddFwmarkRoute,
    AddFwmarkRule,
    AddSuppressRule,
    EnableSrcValidMark,
    DeleteSuppressRule,
    DeleteFwmarkRule,
    DeleteFwmarkRoute,
    DeleteInterface,
}

impl TunnelStep {
    /// Activation order. Later steps depend on earlier ones.
    pub const ACTIVATE: [Self; 8] = [
        Self::CreateInterface,
        Self::AssignAddress,
        Self::LinkUp,
        Self::ConfigurePeer,
        Self::AddFwmarkRoute,
        Self::AddFwmarkRule,
        Self::AddSuppressRule,
        Self::EnableSrcValidMark,
    ];

    /// Deactivation order: routing rules first, interface last.
    ///
    /// The sysctl from activation is left in place.
    pub const DEACTIVATE: [Self; 4] = [
        Self::DeleteSuppressRule,
        Self::DeleteFwmarkRule,
        Self::DeleteFwmarkRoute,
        Self::DeleteInterface,
    ];

    /// Short human-readable name used in logs and errors.
    pub const fn name(self) -> &'static str {
        match self {
            Self::CreateInterface => "create interface",
            Self::AssignAddress => "assign address",
            Self::LinkUp => "set mtu and bring up",
            Self::ConfigurePeer => "configure peer",
            Self::AddFwmarkRoute => "add fwmark table default route",
            Self::AddFwmarkRule => "add fwmark exclusion rule",
            Self::AddSuppressRule => "add main table suppress rule",
            Self::EnableSrcValidMark => "enable src_valid_mark",
            Self::DeleteSuppressRule => "delete main table suppress rule",
            Self::DeleteFwmarkRule => "delete fwmark exclusion rule",
            Self::DeleteFwmarkRoute => "delete fwmark table default route",
            Self::DeleteInterface => "delete interface",
        }
    }
}

impl fmt::Display for TunnelStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
