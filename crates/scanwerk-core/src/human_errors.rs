// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Human-readable diagnostics for the end of a failed run.
//
// Every error prints as one line; where the user can do something about it,
// a second line says what.

use std::path::Path;

use crate::error::ScanwerkError;
use crate::types::ErrorClass;

/// A failure message plus an optional suggestion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HumanError {
    /// One-line summary of what went wrong.
    pub message: String,
    /// What to try next, if anything.
    pub suggestion: Option<String>,
}

impl std::fmt::Display for HumanError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.suggestion {
            Some(s) => write!(f, "{}\n{}", self.message, s),
            None => f.write_str(&self.message),
        }
    }
}

/// Convert an error into the diagnostic printed before exiting.
///
/// `output` is the file the scan would have been written to; it is used for
/// the manual recovery command when a finished scan is left on the device.
pub fn humanize_error(err: &ScanwerkError, output: Option<&Path>) -> HumanError {
    let message = err.to_string();

    if let Some(url) = err.result_url() {
        return HumanError {
            message,
            suggestion: Some(recovery_command(url, output)),
        };
    }

    let suggestion = match err {
        ScanwerkError::SaveFailed { .. } => Some(
            "The scanned document was not saved. Free some space or pick another --out path, then scan again."
                .into(),
        ),
        ScanwerkError::InvalidUrl(_) => Some(
            "Give the scanner address with its scheme, e.g. http://192.168.1.20:8080/".into(),
        ),
        ScanwerkError::OutputExists(_) => {
            Some("Choose another name with --out, or move the existing file away.".into())
        }
        ScanwerkError::ScannerNotIdle(_) => {
            Some("Wait for the scanner to finish its current job, then try again.".into())
        }
        ScanwerkError::Transport { .. } => {
            Some("Check that the scanner is switched on and reachable from this machine.".into())
        }
        _ => match err.class() {
            ErrorClass::CapabilityMismatch => {
                Some("Run with --info to list what this scanner supports.".into())
            }
            _ => None,
        },
    };

    HumanError {
        message,
        suggestion,
    }
}

/// Shell command that fetches a finished job by hand.
pub fn recovery_command(url: &str, output: Option<&Path>) -> String {
    match output {
        Some(path) => format!(
            "Try it manually later: curl -s {url} > {}",
            path.display()
        ),
        None => format!("Try it manually later: curl -s {url}"),
    }
}
