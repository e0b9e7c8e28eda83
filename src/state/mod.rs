//! Domain state types for blockprobe.
//!
//! - `domain`: validated domain identifiers and URL normalization
//! - `outcome`: probe results, classification status and log records

mod domain;
mod outcome;

pub use domain::{Domain, DomainError};
pub use outcome::{OutcomeRecord, ProbeResult, Status};
