//! Run-time configuration shared by the library and the `ibis` CLI.
//!
//! Everything can be loaded from a TOML file; missing sections and fields fall
//! back to their defaults:
//!
//! ```toml
//! [correction]
//! iterative = true
//! max_iterations = 500
//!
//! [ppg]
//! min_delay_s = 0.25
//! ```

use crate::detectors::{ecg::EcgDetectorConfig, ppg::PpgDetectorConfig, resp::RespDetectorConfig};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Controls the classify → correct loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CorrectionConfig {
    /// Repeat passes until a classification repeats.
    pub iterative: bool,
    /// Upper bound on correction passes after the first one.
    pub max_iterations: usize,
}

impl Default for CorrectionConfig {
    fn default() -> Self {
        Self {
            iterative: true,
            max_iterations: 10_000,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct IbisConfig {
    pub correction: CorrectionConfig,
    pub ecg: EcgDetectorConfig,
    pub ppg: PpgDetectorConfig,
    pub resp: RespDetectorConfig,
}

impl IbisConfig {
    pub fn from_toml_str(text: &str) -> Result<Self> {
        toml::from_str(text).context("parsing ibis configuration")
    }

    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        Self::from_toml_str(&text).with_context(|| format!("invalid config {}", path.display()))
    }
}
