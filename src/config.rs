//! Runtime configuration.
//!
//! Settings come from CLI flags, each with an environment variable fallback
//! and a compiled-in default (see [`crate::cli::args::Args`]). A `.env` file in
//! the working directory is merged into the environment before parsing, without
//! overriding variables that are already set.
//!
//! The resolved [`TunnelConfig`] is validated once and then passed by reference
//! to the tunnel controller; nothing reads tunnel settings from globals.

use std::net::IpAddr;
use std::path::{Path, PathBuf};

use crate::cli::args::Args;
use crate::constants;

/// Invalid tunnel settings. All are fatal at startup.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid interface name '{0}': expected 1-{max} characters without whitespace or '/'", max = constants::MAX_INTERFACE_NAME_LEN)]
    InvalidInterface(String),
    #[error("invalid endpoint '{0}': expected host:port")]
    InvalidEndpoint(String),
    #[error("invalid tunnel address '{0}': expected ip or ip/prefix")]
    InvalidAddress(String),
    #[error("peer public key is empty")]
    EmptyPublicKey,
}

/// WireGuard tunnel settings, immutable after startup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TunnelConfig {
    /// Interface created for the tunnel (e.g. `vpnwg0`).
    pub interface: String,
    /// File holding this host's private key, passed to `wg set`.
    pub private_key: PathBuf,
    /// Peer public key (base64).
    pub peer_public_key: String,
    /// Peer endpoint as `host:port`.
    pub endpoint: String,
    /// Local tunnel address, optionally with a prefix length.
    pub address: String,
    /// Packet mark for tunnel traffic; doubles as the routing table id.
    pub fwmark: u32,
}

impl TunnelConfig {
    /// Checks the settings that would otherwise only fail halfway through
    /// activation, after the host has already been modified.
    ///
    /// # Errors
    ///
    /// Returns the first invalid field found.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !is_valid_interface_name(&self.interface) {
            return Err(ConfigError::InvalidInterface(self.interface.clone()));
        }
        if !is_valid_endpoint(&self.endpoint) {
            return Err(ConfigError::InvalidEndpoint(self.endpoint.clone()));
        }
        if !is_valid_address(&self.address) {
            return Err(ConfigError::InvalidAddress(self.address.clone()));
        }
        if self.peer_public_key.trim().is_empty() {
            return Err(ConfigError::EmptyPublicKey);
        }
        Ok(())
    }
}

/// Everything a probe run needs.
#[derive(Debug, Clone)]
pub struct RunConfig {
    pub input: PathBuf,
    pub output: PathBuf,
    pub debug: bool,
    pub tunnel: TunnelConfig,
}

impl RunConfig {
    /// Builds and validates the configuration from parsed arguments.
    ///
    /// # Errors
    ///
    /// Returns an error if the tunnel settings are invalid.
    pub fn from_args(args: &Args) -> Result<Self, ConfigError> {
        let tunnel = TunnelConfig {
            interface: args.vpn_interface.trim().to_string(),
            private_key: args.private_key.clone(),
            peer_public_key: args.public_key.trim().to_string(),
            endpoint: args.endpoint.trim().to_string(),
            address: args.vpn_address.trim().to_string(),
            fwmark: args.fwmark,
        };
        tunnel.validate()?;

        Ok(Self {
            input: args.input.clone(),
            output: args.output.clone(),
            debug: args.debug,
            tunnel,
        })
    }
}

fn is_valid_interface_name(name: &str) -> bool {
    !name.is_empty()
        && name.len() <= constants::MAX_INTERFACE_NAME_LEN
        && name != "."
        && name != ".."
        && !name.chars().any(|c| c.is_whitespace() || c == '/')
}

fn is_valid_endpoint(endpoint: &str) -> bool {
    let Some((host, port)) = endpoint.rsplit_once(':') else {
        return false;
    };
    !host.is_empty() && port.parse::<u16>().is_ok_and(|p| p != 0)
}

fn is_valid_address(address: &str) -> bool {
    let (ip, prefix) = match address.split_once('/') {
        Some((ip, prefix)) => (ip, Some(prefix)),
        None => (address, None),
    };
    let Ok(ip) = ip.parse::<IpAddr>() else {
        return false;
    };
    let max_prefix = if ip.is_ipv4() { 32 } else { 128 };
    prefix.map_or(true, |p| p.parse::<u8>().is_ok_and(|p| p <= max_prefix))
}

// === .env support ===

/// Outcome of loading a `.env` file, reported once logging is configured.
#[derive(Debug)]
pub enum DotenvStatus {
    /// Number of variables applied (already-set variables are not counted).
    Loaded(usize),
    NotFound,
    /// Unreadable or malformed; nothing was applied.
    Invalid(dotenvy::Error),
}

/// Merges `path` into the process environment. Existing variables win.
///
/// The whole file is parsed before anything is applied. Must run before
/// argument parsing and before any thread is spawned.
pub fn load_dotenv(path: &Path) -> DotenvStatus {
    let vars = match dotenvy::from_path_iter(path) {
        Ok(iter) => iter.collect::<Result<Vec<(String, String)>, _>>(),
        Err(e) if e.not_found() => return DotenvStatus::NotFound,
        Err(e) => Err(e),
    };
    let vars = match vars {
        Ok(vars) => vars,
        Err(e) => return DotenvStatus::Invalid(e),
    };

    let mut applied = 0;
    for (key, value) in vars {
        if std::env::var_os(&key).is_none() {
            std::env::set_var(&key, value);
            applied += 1;
        }
    }
    DotenvStatus::Loaded(applied)
}
