//! CLI command handlers.

use std::io::IsTerminal;

use color_eyre::eyre::WrapErr;
use color_eyre::Result;
use crossterm::style::Stylize;

use crate::cli::args::Commands;
use crate::config::{RunConfig, TunnelConfig};
use crate::constants;
use crate::core::report::{ResultSink, SinkError};
use crate::core::{load_domains, CsvSink, HttpProber, RunSummary, Workflow};
use crate::interrupt;
use crate::platform::{SystemTunnelTool, TunnelTool};
use crate::state::{OutcomeRecord, Status};
use crate::tunnel::Tunnel;

/// Dispatches to the requested command, or the probe run when none is given.
///
/// # Errors
///
/// Returns fatal startup errors (unreadable domain list, unopenable results
/// log, HTTP client setup). Per-domain failures are never errors.
pub fn handle_command(command: Option<Commands>, config: &RunConfig) -> Result<()> {
    match command {
        None => {
            let summary = handle_run(config)?;
            println!("{}", constants::CLI_MSG_SUMMARY_HEADER);
            print!("{summary}");
        }
        Some(Commands::Status) => {
            handle_status(&Tunnel::new(SystemTunnelTool, config.tunnel.clone()));
        }
        Some(Commands::ReleaseTunnel) => {
            handle_release_tunnel(&Tunnel::new(SystemTunnelTool, config.tunnel.clone()));
        }
    }
    Ok(())
}

/// Classifies every domain in the input list and appends the results log.
fn handle_run(config: &RunConfig) -> Result<RunSummary> {
    let domains = load_domains(&config.input)?;
    crate::log_info!(
        "RUN",
        "Loaded {} domains from {}",
        domains.len(),
        config.input.display()
    );

    let mut sink = ConsoleEcho {
        inner: CsvSink::open(&config.output)?,
        color: std::io::stdout().is_terminal(),
    };
    let prober = HttpProber::with_default_timeout().wrap_err("failed to build HTTP client")?;
    let tunnel = Tunnel::new(SystemTunnelTool, config.tunnel.clone());

    let summary = Workflow::new(prober, &tunnel, interrupt::stop_flag()).run(&domains, &mut sink);

    crate::log_info!(
        "RUN",
        "{} of {} domains classified, results in {}",
        summary.classified(),
        domains.len(),
        config.output.display()
    );
    if summary.has_problems() {
        crate::log_warning!("RUN", "Run finished with problems, see summary");
    }
    Ok(summary)
}

/// Prints each verdict to stdout before handing it to the results log.
struct ConsoleEcho<S> {
    inner: S,
    color: bool,
}

impl<S: ResultSink> ResultSink for ConsoleEcho<S> {
    fn record(&mut self, record: &OutcomeRecord) -> Result<(), SinkError> {
        println!("{}", verdict_line(record, self.color));
        self.inner.record(record)
    }

    fn flush(&mut self) -> Result<(), SinkError> {
        self.inner.flush()
    }
}

fn verdict_line(record: &OutcomeRecord, color: bool) -> String {
    let status = match (record.status, color) {
        (Status::Blocked, true) => record.status.as_str().red().to_string(),
        _ => record.status.as_str().to_string(),
    };
    format!(
        "{}{}{status} ({} ms)",
        record.domain,
        constants::CLI_MSG_VERDICT_SEP,
        record.latency_ms
    )
}

fn handle_status<T: TunnelTool>(tunnel: &Tunnel<T>) {
    let name = &tunnel.config().interface;
    if tunnel.is_active() {
        println!("{}{name}", constants::CLI_MSG_TUNNEL_ACTIVE);
    } else {
        println!("{}{name}", constants::CLI_MSG_TUNNEL_INACTIVE);
    }
}

/// Emergency cleanup after a run that left the tunnel half built.
fn handle_release_tunnel<T: TunnelTool>(tunnel: &Tunnel<T>) {
    let TunnelConfig {
        interface, fwmark, ..
    } = tunnel.config();
    println!("{}{interface}...", constants::CLI_MSG_RELEASE_START);

    let failures = tunnel.force_teardown();
    if failures.is_empty() {
        println!("{}", constants::CLI_MSG_RELEASE_DONE);
        return;
    }
    for (step, e) in &failures {
        eprintln!("  {step}: {e}");
    }
    eprintln!("{}{fwmark}", constants::CLI_MSG_RELEASE_PARTIAL);
}
