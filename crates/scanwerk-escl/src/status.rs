// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Scanner status parsing (`eSCL/ScannerStatus`).

use serde::Serialize;

use scanwerk_core::error::{Result, ScanwerkError};
use scanwerk_core::types::ScannerState;

use crate::xml::{self, NS_PWG};

/// Parsed scanner status.
///
/// The raw `pwg:State` text is kept as-is so the info dump can show
/// whatever the device reported; [`ScannerStatus::state`] is the strict
/// reading used before submitting a job.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScannerStatus {
    pub raw_state: Option<String>,
}

impl ScannerStatus {
    pub fn from_xml(bytes: &[u8]) -> Result<Self> {
        let doc = xml::parse_document(bytes)?;
        Ok(Self {
            raw_state: xml::first_text(&doc, NS_PWG, "State"),
        })
    }

    /// Interpret the reported state. Missing or unrecognised values mean
    /// the scanner state cannot be determined.
    pub fn state(&self) -> Result<ScannerState> {
        match self.raw_state.as_deref() {
            Some(raw) => raw.parse(),
            None => Err(ScanwerkError::UnknownScannerState(None)),
        }
    }
}
