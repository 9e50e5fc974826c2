// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Error types for per-core frequency control.
//!
//! Every variant of [`PowerError`] means the operation had no effect: the
//! registry and catalog are only updated after the bridge has applied a
//! change, so an error never leaves recorded state ahead of the hardware.

use crate::CoreId;

/// Errors raised by a [`PowerBridge`](crate::PowerBridge) while talking to
/// the OS frequency-scaling interface.
#[derive(Debug, thiserror::Error)]
pub enum BridgeError {
    /// The expected pseudo-file does not exist (core offline or no cpufreq driver).
    #[error("scaling interface not found: {path}")]
    NotAvailable { path: String },

    /// Failed to read a pseudo-file.
    #[error("failed to read {path}: {source}")]
    ReadError {
        path: String,
        source: std::io::Error,
    },

    /// Failed to write a pseudo-file.
    #[error("failed to write {path}: {source}")]
    WriteError {
        path: String,
        source: std::io::Error,
    },

    /// A pseudo-file held something other than what the contract promises.
    #[error("failed to parse value from {path}: {detail}")]
    ParseError { path: String, detail: String },
}

/// Errors returned by the registry and the controller.
#[derive(Debug, thiserror::Error)]
pub enum PowerError {
    /// The core id is outside `[0, max_cores)`.
    #[error("core {core} is out of range (max cores: {max_cores})")]
    InvalidCore { core: CoreId, max_cores: usize },

    /// `activate` was called on a core that is already active.
    #[error("power control already active on core {0}")]
    AlreadyActive(CoreId),

    /// The operation needs an active core.
    #[error("power control not active on core {0}")]
    NotActive(CoreId),

    /// The frequency index is past the end of the core's catalog.
    #[error("frequency index {index} out of range on core {core} ({len} frequencies)")]
    InvalidIndex {
        core: CoreId,
        index: usize,
        len: usize,
    },

    /// The OS reported no usable frequencies for the core.
    #[error("no frequencies available on core {0}")]
    NoFrequenciesAvailable(CoreId),

    /// The OS reported more distinct frequencies than the catalog accepts.
    #[error("core {core} reports {count} frequencies, more than the limit of {max}")]
    TooManyFrequencies {
        core: CoreId,
        count: usize,
        max: usize,
    },

    /// The underlying pseudo-file I/O failed.
    #[error("power I/O error: {0}")]
    PowerIo(#[from] BridgeError),
}

/// Errors raised while loading or validating a [`PowerConfig`](crate::PowerConfig).
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("cannot read config '{path}': {source}")]
    Read {
        path: String,
        source: std::io::Error,
    },

    #[error("TOML parse error: {0}")]
    Parse(String),

    #[error("TOML serialise error: {0}")]
    Serialise(String),

    #[error("invalid configuration: {0}")]
    Invalid(String),
}

/// Shorthand result for controller and registry operations.
pub type Result<T> = std::result::Result<T, PowerError>;
