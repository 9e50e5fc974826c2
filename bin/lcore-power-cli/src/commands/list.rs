// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! `lcore-power list` command: print a core's frequency catalog.

use lcore_power::{CoreId, PowerConfig, PowerManager};

pub fn execute(config: &PowerConfig, core: CoreId, json: bool) -> anyhow::Result<()> {
    let power = PowerManager::from_config(config)?;

    power.activate(core)?;
    let status = power.status(core);
    power.deactivate(core)?;
    let status = status?;

    if json {
        println!("{}", serde_json::to_string_pretty(&status)?);
        return Ok(());
    }

    println!("  Core {core} ({})", config.sysfs_root.display());
    println!("   Governor:  {}", status.saved_governor);
    println!(
        "   Range:     {} - {} MHz ({} steps)",
        status.frequencies[status.frequencies.len() - 1] / 1000,
        status.frequencies[0] / 1000,
        status.frequencies.len(),
    );
    println!();
    super::print_catalog(&status.frequencies, status.index);
    Ok(())
}
