// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! `lcore-power set` command: run a core at a fixed catalog entry.

use lcore_power::{CoreId, PowerConfig, PowerManager};

/// Where to put the core.
#[derive(Debug, Clone, Copy)]
pub enum Target {
    Index(usize),
    Max,
    Min,
}

pub async fn execute(
    config: &PowerConfig,
    core: CoreId,
    target: Target,
    hold: super::HoldArgs,
) -> anyhow::Result<()> {
    let power = PowerManager::from_config(config)?;

    super::with_active_core(&power, core, async {
        let before = power.current_frequency(core)?;
        match target {
            Target::Index(i) => power.set_index(core, i)?,
            Target::Max => power.set_max(core)?,
            Target::Min => power.set_min(core)?,
        };
        let status = power.status(core)?;
        println!(
            "  Core {core}: {} MHz -> {} MHz (index {})",
            before / 1000,
            status.frequency_khz / 1000,
            status.index,
        );
        super::hold(&hold).await
    })
    .await?;

    println!("  Core {core}: governor restored");
    Ok(())
}
