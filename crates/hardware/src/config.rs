//! Configuration system for the simulator.
//!
//! This module defines the structures used to parameterize the machine. It
//! provides:
//! 1. **Defaults:** The baseline hardware configuration (queue sizes, memory
//!    size, trace gating).
//! 2. **Structures:** Hierarchical config for pipeline, memory, and general
//!    options.
//!
//! Configuration is supplied as JSON by the CLI (`--config`) or taken from
//! `Config::default()`.

use serde::Deserialize;

use crate::common::constants;

/// Pipeline structure sizes.
#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Issue queue capacity.
    pub iq_size: usize,
    /// Load/store queue capacity.
    pub lsq_size: usize,
    /// Reorder buffer capacity.
    pub rob_size: usize,
    /// Rename (physical tag) pool size.
    pub rename_slots: usize,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            iq_size: constants::IQ_SIZE,
            lsq_size: constants::LSQ_SIZE,
            rob_size: constants::ROB_SIZE,
            rename_slots: constants::RENAME_SLOTS,
        }
    }
}

/// Memory parameters.
#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(default)]
pub struct MemoryConfig {
    /// Number of words in data memory.
    pub data_words: usize,
}

impl Default for MemoryConfig {
    fn default() -> Self {
        Self {
            data_words: constants::DATA_MEMORY_WORDS,
        }
    }
}

/// General simulation options.
#[derive(Debug, Clone, Copy, Deserialize, Default)]
#[serde(default)]
pub struct GeneralConfig {
    /// Gate per-stage stderr diagnostics.
    pub trace: bool,
}

/// Root configuration type.
#[derive(Debug, Clone, Copy, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    /// Pipeline structure sizes.
    pub pipeline: PipelineConfig,
    /// Memory parameters.
    pub memory: MemoryConfig,
    /// General simulation options.
    pub general: GeneralConfig,
}
