//! Probe run building blocks.
//!
//! - `prober`: HTTP reachability check
//! - `sites`: domain list loading
//! - `report`: CSV results log
//! - `workflow`: per-domain classification and tunnel coupling

pub mod prober;
pub mod report;
pub mod sites;
pub mod workflow;

pub use prober::HttpProber;
pub use report::CsvSink;
pub use sites::load_domains;
pub use workflow::{RunSummary, Workflow};
