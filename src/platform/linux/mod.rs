//! Linux platform implementations.
//!
//! Uses kernel WireGuard (`wg`), iproute2 (`ip`) and `sysctl`.

pub mod wireguard;
