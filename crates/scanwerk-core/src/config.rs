// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Run configuration.

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{Result, ScanwerkError};

/// Tunables for a scan run. Loaded once and passed down, never mutated
/// after validation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScanConfig {
    /// Delay before each result poll, in milliseconds.
    pub poll_interval_ms: u64,
    /// Number of result polls before giving up.
    pub max_poll_attempts: u32,
    /// Timeout applied to every HTTP request, in seconds.
    pub request_timeout_secs: u64,
    /// Max scan width used when the scanner does not advertise one
    /// (1/300 inch).
    pub default_max_width: u32,
    /// Max scan height used when the scanner does not advertise one
    /// (1/300 inch).
    pub default_max_height: u32,
    /// Stem of generated output file names.
    pub output_stem: String,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            poll_interval_ms: 2000,
            max_poll_attempts: 50,
            request_timeout_secs: 30,
            default_max_width: 2500,
            default_max_height: 3500,
            output_stem: "scan".into(),
        }
    }
}

impl ScanConfig {
    /// Load a JSON config file. Missing keys keep their defaults.
    pub fn load(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&raw)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject values that would make a run meaningless.
    pub fn validate(&self) -> Result<()> {
        if self.max_poll_attempts == 0 {
            return Err(ScanwerkError::Config(
                "max_poll_attempts must be at least 1".into(),
            ));
        }
        if self.default_max_width == 0 || self.default_max_height == 0 {
            return Err(ScanwerkError::Config(
                "default_max_width and default_max_height must be positive".into(),
            ));
        }
        if self.request_timeout_secs == 0 {
            return Err(ScanwerkError::Config(
                "request_timeout_secs must be positive".into(),
            ));
        }
        if self.output_stem.trim().is_empty() {
            return Err(ScanwerkError::Config("output_stem must not be empty".into()));
        }
        Ok(())
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}
