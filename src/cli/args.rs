//! Command-line argument definitions.
//!
//! Every option falls back to an environment variable (which a `.env` file in
//! the working directory may provide) and then to a built-in default.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::constants;

/// Detect domain blocking by re-probing failures through a WireGuard tunnel
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// JSON array of domains to check
    #[arg(short, long, value_name = "FILE", env = "INPUT_FILE", default_value = constants::DEFAULT_INPUT_FILE)]
    pub input: PathBuf,

    /// CSV results log (appended to)
    #[arg(short, long, value_name = "FILE", env = "OUTPUT_FILE", default_value = constants::DEFAULT_OUTPUT_FILE)]
    pub output: PathBuf,

    /// Tunnel interface name
    #[arg(long, value_name = "NAME", env = "VPN_INTERFACE", default_value = constants::DEFAULT_VPN_INTERFACE, global = true)]
    pub vpn_interface: String,

    /// File holding this host's WireGuard private key
    #[arg(long, value_name = "FILE", env = "PRIVATE_KEY", default_value = constants::DEFAULT_PRIVATE_KEY_PATH, global = true)]
    pub private_key: PathBuf,

    /// Peer public key
    #[arg(long, value_name = "KEY", env = "PUBLIC_KEY", default_value = constants::DEFAULT_PEER_PUBLIC_KEY, global = true)]
    pub public_key: String,

    /// Peer endpoint as host:port
    #[arg(long, value_name = "HOST:PORT", env = "ENDPOINT", default_value = constants::DEFAULT_ENDPOINT, global = true)]
    pub endpoint: String,

    /// Local tunnel address with prefix length
    #[arg(long, value_name = "CIDR", env = "VPN_ADDRESS", default_value = constants::DEFAULT_VPN_ADDRESS, global = true)]
    pub vpn_address: String,

    /// Packet mark for tunnel traffic, also used as routing table id
    #[arg(long, value_name = "MARK", env = "FWMARK", default_value_t = constants::DEFAULT_FWMARK, global = true)]
    pub fwmark: u32,

    /// Log every external command and probe failure
    #[arg(short, long, global = true)]
    pub debug: bool,

    /// Subcommand to execute (default: probe the domain list)
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available CLI commands
#[derive(Subcommand, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Commands {
    /// Report whether the tunnel interface is up
    Status,
    /// Best-effort removal of the tunnel and its routing rules (use after a failed run)
    ReleaseTunnel,
}

#[cfg(test)]
mod tests {
    use super::*;

    // Env fallbacks make these depend on the process environment, so only
    // options with no variable set in the test environment are asserted.

    #[test]
    fn test_flags_override_defaults() {
        let args = Args::try_parse_from([
            "blockprobe",
            "-i",
            "list.json",
            "-o",
            "out.csv",
            "--vpn-interface",
            "wgtest",
            "--fwmark",
            "7",
            "-d",
        ])
        .unwrap();

        assert_eq!(args.input, PathBuf::from("list.json"));
        assert_eq!(args.output, PathBuf::from("out.csv"));
        assert_eq!(args.vpn_interface, "wgtest");
        assert_eq!(args.fwmark, 7);
        assert!(args.debug);
        assert_eq!(args.command, None);
    }

    #[test]
    fn test_subcommands() {
        let args = Args::try_parse_from(["blockprobe", "status"]).unwrap();
        assert_eq!(args.command, Some(Commands::Status));

        let args =
            Args::try_parse_from(["blockprobe", "release-tunnel", "--vpn-interface", "wgx"])
                .unwrap();
        assert_eq!(args.command, Some(Commands::ReleaseTunnel));
        assert_eq!(args.vpn_interface, "wgx");
    }

    #[test]
    fn test_bad_fwmark_rejected() {
        assert!(Args::try_parse_from(["blockprobe", "--fwmark", "mark"]).is_err());
    }

    #[test]
    fn test_definition_is_consistent() {
        use clap::CommandFactory;
        Args::command().debug_assert();
    }
}
