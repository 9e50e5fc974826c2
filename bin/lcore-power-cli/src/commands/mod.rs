// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Subcommand implementations and shared plumbing.

pub mod list;
pub mod set;
pub mod step;

use lcore_power::{CoreId, PowerBridge, PowerConfig, PowerManager};
use std::future::Future;
use std::path::Path;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

/// How long a command keeps its setting before releasing the core.
#[derive(Debug, Clone, clap::Args)]
pub struct HoldArgs {
    /// Seconds to hold the new frequency before restoring the governor.
    #[arg(long, default_value_t = 0)]
    pub hold: u64,

    /// Hold until Ctrl-C instead of for a fixed time.
    #[arg(long)]
    pub until_interrupt: bool,
}

/// Installs a `tracing` subscriber. `RUST_LOG` wins over `-v`.
pub fn init_tracing(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

/// Loads the configuration file if one was given, else the defaults.
pub fn load_config(path: Option<&Path>) -> anyhow::Result<PowerConfig> {
    match path {
        Some(p) => Ok(PowerConfig::from_file(p)?),
        None => Ok(PowerConfig::default()),
    }
}

/// Waits out the hold period, returning early on Ctrl-C.
pub async fn hold(args: &HoldArgs) -> anyhow::Result<()> {
    if args.until_interrupt {
        println!("  Holding until Ctrl-C...");
        tokio::signal::ctrl_c().await?;
        return Ok(());
    }
    if args.hold == 0 {
        return Ok(());
    }

    println!("  Holding for {}s (Ctrl-C to release early)...", args.hold);
    tokio::select! {
        _ = tokio::time::sleep(Duration::from_secs(args.hold)) => {}
        res = tokio::signal::ctrl_c() => res?,
    }
    Ok(())
}

/// Activates `core`, drives `work` to completion, then deactivates it.
///
/// `work` is not polled until activation succeeds. A failure in `work` is
/// reported ahead of a failure to deactivate.
pub async fn with_active_core<B: PowerBridge>(
    power: &PowerManager<B>,
    core: CoreId,
    work: impl Future<Output = anyhow::Result<()>>,
) -> anyhow::Result<()> {
    power.activate(core)?;
    let outcome = work.await;
    let released = power.deactivate(core);
    if let Err(e) = &released {
        tracing::error!("core {core}: failed to restore governor: {e}");
    }
    outcome?;
    released?;
    Ok(())
}

/// Formats a catalog as a table, marking the current index.
pub fn print_catalog(frequencies: &[u32], current: usize) {
    println!("  Index   Frequency");
    for (i, khz) in frequencies.iter().enumerate() {
        let marker = if i == current { "  <- current" } else { "" };
        println!("  {i:>5}   {:>6} MHz{marker}", khz / 1000);
    }
}
