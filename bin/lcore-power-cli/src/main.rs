// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! # lcore-power
//!
//! Command-line front end for per-core CPU frequency control.
//!
//! ## Usage
//! ```bash
//! # Show the frequency catalog of core 2
//! lcore-power list --core 2
//!
//! # Pin core 2 to its lowest frequency for 30 seconds
//! lcore-power set --core 2 --min --hold 30
//!
//! # Step core 2 two notches down and hold until Ctrl-C
//! lcore-power step --core 2 --down --count 2 --hold 0 --until-interrupt
//! ```
//!
//! Every command activates the core, does its work, and deactivates it on
//! the way out, so the original governor is always restored.

mod commands;

use clap::{ArgGroup, Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "lcore-power",
    about = "Per-core CPU frequency control through cpufreq",
    version,
    author
)]
struct Cli {
    /// Path to a TOML configuration file.
    #[arg(short, long, global = true)]
    config: Option<std::path::PathBuf>,

    /// Enable verbose logging (repeat for more: -v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the frequency catalog and current index of a core.
    List {
        /// Core id.
        #[arg(long)]
        core: usize,

        /// Emit JSON instead of a table.
        #[arg(long)]
        json: bool,
    },

    /// Run a core at a given catalog index, its maximum, or its minimum.
    #[command(group(ArgGroup::new("target").required(true).args(["index", "max", "min"])))]
    Set {
        /// Core id.
        #[arg(long)]
        core: usize,

        /// Catalog index (0 = highest frequency).
        #[arg(short, long)]
        index: Option<usize>,

        /// Highest frequency.
        #[arg(long)]
        max: bool,

        /// Lowest frequency.
        #[arg(long)]
        min: bool,

        #[command(flatten)]
        hold: commands::HoldArgs,
    },

    /// Move a core up or down the catalog one step at a time.
    #[command(group(ArgGroup::new("direction").required(true).args(["up", "down"])))]
    Step {
        /// Core id.
        #[arg(long)]
        core: usize,

        /// Toward higher frequency.
        #[arg(long)]
        up: bool,

        /// Toward lower frequency.
        #[arg(long)]
        down: bool,

        /// Number of steps.
        #[arg(long, default_value_t = 1)]
        count: usize,

        #[command(flatten)]
        hold: commands::HoldArgs,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    commands::init_tracing(cli.verbose);
    let config = commands::load_config(cli.config.as_deref())?;

    match cli.command {
        Commands::List { core, json } => commands::list::execute(&config, core, json),
        Commands::Set {
            core,
            index,
            max,
            min,
            hold,
        } => {
            let target = match (index, max, min) {
                (Some(i), _, _) => commands::set::Target::Index(i),
                (None, true, _) => commands::set::Target::Max,
                _ => commands::set::Target::Min,
            };
            commands::set::execute(&config, core, target, hold).await
        }
        Commands::Step {
            core,
            up,
            down: _,
            count,
            hold,
        } => commands::step::execute(&config, core, up, count, hold).await,
    }
}
