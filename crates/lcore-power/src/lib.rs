// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! # lcore-power
//!
//! Per-logical-core CPU frequency control for core-pinned workers.
//!
//! A worker pinned to a core activates power control on it, then moves the
//! core's clock up and down a catalog of supported frequencies captured at
//! activation. Deciding *when* to scale is left to the caller.
//!
//! # Key Components
//!
//! - [`PowerBridge`]: the only code that touches the OS frequency-scaling
//!   interface. [`SysfsBridge`] speaks Linux cpufreq; [`MemoryBridge`] is an
//!   in-memory fake.
//! - [`CoreRegistry`]: per-core `Uninitialized`/`Active` state, the saved
//!   governor and the catalog, each core behind its own lock.
//! - [`FrequencyCatalog`]: supported frequencies, highest first.
//! - [`PowerManager`]: get/set/step/max/min on top of the registry.
//!
//! # Index Convention
//! ```text
//!  index:     0         1         2         3
//!  kHz:    2400000   2000000   1600000   1200000
//!            max  ── step_down ──►         min
//!                 ◄── step_up ───
//! ```
//!
//! # Example
//! ```
//! use lcore_power::{MemoryBridge, PowerManager};
//!
//! let bridge = MemoryBridge::new(8);
//! bridge.add_core(2, "ondemand", &[2_400_000, 2_000_000, 1_600_000, 1_200_000], 2_400_000);
//!
//! let power = PowerManager::new(bridge, 8);
//! power.activate(2).unwrap();
//! power.set_min(2).unwrap();
//! assert_eq!(power.current_index(2).unwrap(), 3);
//! power.deactivate(2).unwrap();
//! assert_eq!(power.bridge().governor(2).as_deref(), Some("ondemand"));
//! ```

pub mod bridge;
mod catalog;
mod config;
mod controller;
mod error;
pub mod registry;
mod status;

pub use bridge::{BridgeOp, MemoryBridge, PowerBridge, SysfsBridge};
pub use catalog::FrequencyCatalog;
pub use config::PowerConfig;
pub use controller::PowerManager;
pub use error::{BridgeError, ConfigError, PowerError, Result};
pub use registry::CoreRegistry;
pub use status::CoreStatus;

/// Logical CPU core identifier, valid in `[0, max_cores)`.
pub type CoreId = usize;
