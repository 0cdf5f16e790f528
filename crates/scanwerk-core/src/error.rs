// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Unified error types for Scanwerk.

use std::path::PathBuf;

use thiserror::Error;

use crate::types::{ErrorClass, ScannerState};

/// Top-level error type for all Scanwerk operations.
#[derive(Debug, Error)]
pub enum ScanwerkError {
    // -- Usage errors --
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    #[error("{0}")]
    InvalidArgument(String),

    #[error("File exists already: {}", .0.display())]
    OutputExists(PathBuf),

    #[error("invalid configuration: {0}")]
    Config(String),

    // -- Capability mismatch --
    #[error("Unsupported format: '{requested}', supported: {}", list(.supported))]
    UnsupportedFormat {
        requested: String,
        supported: Vec<String>,
    },

    #[error("Unsupported color mode: '{requested}', supported: {}", list(.supported))]
    UnsupportedColorMode {
        requested: String,
        supported: Vec<String>,
    },

    #[error(
        "Unsupported resolution: {requested}, supported X: {}, supported Y: {}",
        list(.x_supported),
        list(.y_supported)
    )]
    UnsupportedResolution {
        requested: u32,
        x_supported: Vec<u32>,
        y_supported: Vec<u32>,
    },

    #[error(
        "No resolution is supported on both axes, supported X: {}, supported Y: {}",
        list(.x_supported),
        list(.y_supported)
    )]
    NoCommonResolution {
        x_supported: Vec<u32>,
        y_supported: Vec<u32>,
    },

    #[error("Invalid {dimension}: {requested}, maximum: {max}")]
    RegionTooLarge {
        dimension: &'static str,
        requested: u32,
        max: u32,
    },

    // -- Protocol / transport --
    #[error("HTTP request to {url} failed: {detail}")]
    Transport { url: String, detail: String },

    #[error("HTTP {status} from {url}")]
    HttpStatus { url: String, status: u16 },

    #[error("malformed XML document: {0}")]
    MalformedXml(String),

    #[error("{element} missing from {document}")]
    MissingElement {
        element: &'static str,
        document: &'static str,
    },

    #[error("invalid value for {element}: '{value}'")]
    InvalidElementValue { element: &'static str, value: String },

    #[error("scan job created but the response has no Location header")]
    MissingLocation,

    // -- Device state --
    #[error("Cannot determine scanner state{}", state_suffix(.0))]
    UnknownScannerState(Option<String>),

    #[error("Invalid scanner status: {0}")]
    ScannerNotIdle(ScannerState),

    // -- Job timeout --
    #[error("Giving up after {attempts} attempts to load result from {url}")]
    PollExhausted { attempts: u32, url: String },

    #[error("Polling cancelled after {attempts} attempts, result is at {url}")]
    PollCancelled { attempts: u32, url: String },

    #[error("Scan cancelled before a job was submitted")]
    Cancelled,

    // -- Local I/O --
    #[error("Cannot save scan to {}: {source}", .path.display())]
    SaveFailed {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("file I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl ScanwerkError {
    /// Which stage of a run this error belongs to.
    pub fn class(&self) -> ErrorClass {
        match self {
            Self::InvalidUrl(_)
            | Self::InvalidArgument(_)
            | Self::OutputExists(_)
            | Self::Config(_)
            | Self::Serialization(_) => ErrorClass::Usage,

            Self::UnsupportedFormat { .. }
            | Self::UnsupportedColorMode { .. }
            | Self::UnsupportedResolution { .. }
            | Self::NoCommonResolution { .. }
            | Self::RegionTooLarge { .. } => ErrorClass::CapabilityMismatch,

            Self::Transport { .. }
            | Self::HttpStatus { .. }
            | Self::MalformedXml(_)
            | Self::MissingElement { .. }
            | Self::InvalidElementValue { .. }
            | Self::MissingLocation => ErrorClass::Protocol,

            Self::UnknownScannerState(_) | Self::ScannerNotIdle(_) => ErrorClass::DeviceState,

            Self::PollExhausted { .. } | Self::PollCancelled { .. } | Self::Cancelled => {
                ErrorClass::JobTimeout
            }

            Self::SaveFailed { .. } | Self::Io(_) => ErrorClass::Storage,
        }
    }

    /// The job result URL, for errors that leave a finished scan behind.
    pub fn result_url(&self) -> Option<&str> {
        match self {
            Self::PollExhausted { url, .. } | Self::PollCancelled { url, .. } => Some(url),
            _ => None,
        }
    }
}

fn list<T: std::fmt::Display>(items: &[T]) -> String {
    let joined: Vec<String> = items.iter().map(ToString::to_string).collect();
    format!("[{}]", joined.join(", "))
}

fn state_suffix(raw: &Option<String>) -> String {
    match raw {
        Some(s) => format!(": '{s}'"),
        None => String::new(),
    }
}

/// Alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, ScanwerkError>;
