// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! `lcore-power step` command: walk a core along its catalog.

use lcore_power::{CoreId, PowerConfig, PowerManager};

pub async fn execute(
    config: &PowerConfig,
    core: CoreId,
    up: bool,
    count: usize,
    hold: super::HoldArgs,
) -> anyhow::Result<()> {
    let power = PowerManager::from_config(config)?;

    super::with_active_core(&power, core, async {
        let start = power.current_index(core)?;
        let mut moved = 0;
        for _ in 0..count {
            let changed = if up {
                power.step_up(core)?
            } else {
                power.step_down(core)?
            };
            if !changed {
                println!("  Core {core}: reached the end of the catalog");
                break;
            }
            moved += 1;
        }

        let status = power.status(core)?;
        println!(
            "  Core {core}: index {start} -> {} ({moved} step(s), now {} MHz)",
            status.index,
            status.frequency_khz / 1000,
        );
        super::print_catalog(&status.frequencies, status.index);
        super::hold(&hold).await
    })
    .await?;

    println!("  Core {core}: governor restored");
    Ok(())
}
