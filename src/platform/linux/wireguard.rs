//! Linux tunnel tooling via `wg`, `ip` and `sysctl`.

use std::process::{Command, Output};

use crate::config::TunnelConfig;
use crate::constants::{
    IP_BIN, SYSCTL_BIN, SYSCTL_SRC_VALID_MARK, TUNNEL_ALLOWED_IPS, TUNNEL_KEEPALIVE_SECS,
    TUNNEL_MTU, WG_BIN,
};
use crate::platform::{ToolError, TunnelTool};
use crate::tunnel::TunnelStep;
use crate::utils;

/// Kernel WireGuard with iproute2 policy routing.
///
/// Every command runs synchronously; stderr is captured for error reports.
pub struct WgTool;

impl WgTool {
    /// Run a command and return its output if it exited successfully.
    fn run(program: &str, args: &[String]) -> Result<Output, ToolError> {
        let command = utils::command_line(program, args);
        crate::log_debug!("CMD", "Executing: {command}");

        let output = Command::new(program)
            .args(args)
            .output()
            .map_err(|source| ToolError::Spawn {
                command: command.clone(),
                source,
            })?;

        if output.status.success() {
            Ok(output)
        } else {
            Err(ToolError::Failed {
                command,
                status: utils::describe_status(output.status),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            })
        }
    }
}

impl TunnelTool for WgTool {
    fn query_status(&self, interface: &str) -> Result<String, ToolError> {
        let output = Self::run(WG_BIN, &["show".to_string(), interface.to_string()])?;
        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }

    fn run_step(&self, step: TunnelStep, config: &TunnelConfig) -> Result<(), ToolError> {
        let (program, args) = step_command(step, config);
        Self::run(program, &args).map(|_| ())
    }
}

/// Command line implementing `step` for `config`.
pub fn step_command(step: TunnelStep, config: &TunnelConfig) -> (&'static str, Vec<String>) {
    let iface = config.interface.as_str();
    let mark = config.fwmark.to_string();
    let mark = mark.as_str();

    match step {
        TunnelStep::CreateInterface => (IP_BIN, owned(&["link", "add", iface, "type", "wireguard"])),
        TunnelStep::AssignAddress => (
            IP_BIN,
            owned(&["address", "add", config.address.as_str(), "dev", iface]),
        ),
        TunnelStep::LinkUp => {
            let mtu = TUNNEL_MTU.to_string();
            (
                IP_BIN,
                owned(&["link", "set", "mtu", mtu.as_str(), "up", "dev", iface]),
            )
        }
        TunnelStep::ConfigurePeer => {
            let key_path = config.private_key.to_string_lossy();
            let keepalive = TUNNEL_KEEPALIVE_SECS.to_string();
            (
                WG_BIN,
                owned(&[
                    "set",
                    iface,
                    "fwmark",
                    mark,
                    "private-key",
                    key_path.as_ref(),
                    "peer",
                    config.peer_public_key.as_str(),
                    "endpoint",
                    config.endpoint.as_str(),
                    "allowed-ips",
                    TUNNEL_ALLOWED_IPS,
                    "persistent-keepalive",
                    keepalive.as_str(),
                ]),
            )
        }
        TunnelStep::AddFwmarkRoute => (
            IP_BIN,
            owned(&["route", "add", "0.0.0.0/0", "dev", iface, "table", mark]),
        ),
        TunnelStep::AddFwmarkRule => (
            IP_BIN,
            owned(&["rule", "add", "not", "fwmark", mark, "table", mark]),
        ),
        TunnelStep::AddSuppressRule => (
            IP_BIN,
            owned(&["rule", "add", "table", "main", "suppress_prefixlength", "0"]),
        ),
        TunnelStep::EnableSrcValidMark => (SYSCTL_BIN, owned(&["-w", SYSCTL_SRC_VALID_MARK])),
        TunnelStep::DeleteSuppressRule => (
            IP_BIN,
            owned(&["rule", "del", "table", "main", "suppress_prefixlength", "0"]),
        ),
        TunnelStep::DeleteFwmarkRule => (
            IP_BIN,
            owned(&["rule", "del", "not", "fwmark", mark, "table", mark]),
        ),
        TunnelStep::DeleteFwmarkRoute => (
            IP_BIN,
            owned(&["route", "del", "0.0.0.0/0", "dev", iface, "table", mark]),
        ),
        TunnelStep::DeleteInterface => (IP_BIN, owned(&["link", "del", iface])),
    }
}

fn owned(args: &[&str]) -> Vec<String> {
    args.iter().map(|s| (*s).to_string()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn config() -> TunnelConfig {
        TunnelConfig {
            interface: "vpnwg0".to_string(),
            private_key: PathBuf::from("/etc/wg/private.key"),
            peer_public_key: "PEERKEY=".to_string(),
            endpoint: "vpn.example.com:51820".to_string(),
            address: "10.0.0.1/24".to_string(),
            fwmark: 51820,
        }
    }

    fn line(step: TunnelStep) -> String {
        let (program, args) = step_command(step, &config());
        utils::command_line(program, &args)
    }

    #[test]
    fn test_activation_commands() {
        let lines: Vec<String> = TunnelStep::ACTIVATE.iter().map(|s| line(*s)).collect();
        assert_eq!(
            lines,
            vec![
                "ip link add vpnwg0 type wireguard",
                "ip address add 10.0.0.1/24 dev vpnwg0",
                "ip link set mtu 1420 up dev vpnwg0",
                "wg set vpnwg0 fwmark 51820 private-key /etc/wg/private.key peer PEERKEY= \
                 endpoint vpn.example.com:51820 allowed-ips 0.0.0.0/0 persistent-keepalive 25",
                "ip route add 0.0.0.0/0 dev vpnwg0 table 51820",
                "ip rule add not fwmark 51820 table 51820",
                "ip rule add table main suppress_prefixlength 0",
                "sysctl -w net.ipv4.conf.all.src_valid_mark=1",
            ]
        );
    }

    #[test]
    fn test_deactivation_commands() {
        let lines: Vec<String> = TunnelStep::DEACTIVATE.iter().map(|s| line(*s)).collect();
        assert_eq!(
            lines,
            vec![
                "ip rule del table main suppress_prefixlength 0",
                "ip rule del not fwmark 51820 table 51820",
                "ip route del 0.0.0.0/0 dev vpnwg0 table 51820",
                "ip link del vpnwg0",
            ]
        );
    }

    #[test]
    fn test_fwmark_names_the_routing_table() {
        let cfg = TunnelConfig {
            fwmark: 7,
            ..config()
        };
        let (_, args) = step_command(TunnelStep::AddFwmarkRoute, &cfg);
        assert_eq!(args.last().map(String::as_str), Some("7"));
    }

    #[test]
    fn test_missing_binary_is_spawn_error() {
        let err = WgTool::run("blockprobe-no-such-binary", &[]).unwrap_err();
        assert!(matches!(err, ToolError::Spawn { .. }));
        assert!(err.to_string().contains("blockprobe-no-such-binary"));
    }

    #[test]
    fn test_non_zero_exit_is_failed_error() {
        let err = WgTool::run("sh", &["-c".to_string(), "echo boom >&2; exit 3".to_string()])
            .unwrap_err();
        match err {
            ToolError::Failed { status, stderr, .. } => {
                assert_eq!(status, "exit 3");
                assert_eq!(stderr, "boom");
            }
            other => panic!("unexpected error: {other}"),
        }
    }
}
