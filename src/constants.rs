//! Application-wide constants and configuration values.
//!
//! This module defines all static configuration values used throughout blockprobe,
//! including probe timing, tunnel parameters, file defaults, and CLI messages.

// === Application Metadata ===

/// Application name (from Cargo.toml).
pub const APP_NAME: &str = env!("CARGO_PKG_NAME");
/// Current application version (from Cargo.toml).
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

// === Probe ===

/// Timeout for a single reachability probe (seconds).
pub const PROBE_TIMEOUT_SECS: u64 = 5;
/// Scheme prepended to domains that do not carry one.
pub const DEFAULT_SCHEME: &str = "https://";

// === Input / Output Defaults ===

/// Default domain list (JSON array of strings).
pub const DEFAULT_INPUT_FILE: &str = "sites.json";
/// Default CSV results log.
pub const DEFAULT_OUTPUT_FILE: &str = "resultats.csv";
/// Header row written to a new or empty results log.
pub const CSV_HEADER: [&str; 4] = ["hora", "domini", "estat", "latencia_ms"];
/// Timestamp layout used in the results log.
pub const CSV_TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";
/// Dotenv file loaded from the working directory at startup.
pub const DOTENV_FILE: &str = ".env";

// === Tunnel Defaults ===
// Compiled-in defaults. Each is overridable by flag or environment variable.

/// Default WireGuard interface name.
pub const DEFAULT_VPN_INTERFACE: &str = "vpnwg0";
/// Default private key file passed to `wg set`.
pub const DEFAULT_PRIVATE_KEY_PATH: &str = "./privatekey";
/// Default peer public key (placeholder, must be overridden).
pub const DEFAULT_PEER_PUBLIC_KEY: &str = "publickey=";
/// Default peer endpoint.
pub const DEFAULT_ENDPOINT: &str = "example.com:51820";
/// Default local tunnel address.
pub const DEFAULT_VPN_ADDRESS: &str = "10.0.0.1/24";
/// Default fwmark, also used as the routing table id.
pub const DEFAULT_FWMARK: u32 = 51820;

/// MTU applied when bringing the tunnel interface up.
pub const TUNNEL_MTU: u32 = 1420;
/// Routes every destination through the peer.
pub const TUNNEL_ALLOWED_IPS: &str = "0.0.0.0/0";
/// Persistent keepalive interval (seconds).
pub const TUNNEL_KEEPALIVE_SECS: u32 = 25;
/// Kernel setting that lets replies use the fwmark routing table.
pub const SYSCTL_SRC_VALID_MARK: &str = "net.ipv4.conf.all.src_valid_mark=1";
/// Linux limit on interface name length (IFNAMSIZ - 1).
pub const MAX_INTERFACE_NAME_LEN: usize = 15;

// === External Tools ===

/// WireGuard userspace configuration tool.
pub const WG_BIN: &str = "wg";
/// iproute2 binary.
pub const IP_BIN: &str = "ip";
/// Kernel parameter tool.
pub const SYSCTL_BIN: &str = "sysctl";

// === Logging ===

/// Minimum log level when `--debug` is not given.
pub const DEFAULT_LOG_LEVEL: &str = "info";

// === CLI Messages ===

pub const CLI_MSG_TUNNEL_ACTIVE: &str = "Tunnel interface is active: ";
pub const CLI_MSG_TUNNEL_INACTIVE: &str = "Tunnel interface is not active: ";
pub const CLI_MSG_RELEASE_START: &str = "Releasing tunnel ";
pub const CLI_MSG_RELEASE_DONE: &str = "Tunnel routing state removed.";
pub const CLI_MSG_RELEASE_PARTIAL: &str =
    "Some teardown steps failed (they may not have been applied). Inspect with: ip rule; ip route show table ";
/// Separates the domain from its verdict in per-domain output lines.
pub const CLI_MSG_VERDICT_SEP: &str = " -> ";
pub const CLI_MSG_SUMMARY_HEADER: &str = "\nRun summary:";
pub const CLI_MSG_NOT_ROOT: &str =
    "not running as root: tunnel commands will most likely fail (try sudo)";
