// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Read-only scanner information dump (`--info`).

use std::fmt::{self, Write as _};

use serde::Serialize;

use scanwerk_core::config::ScanConfig;
use scanwerk_core::error::Result;

use crate::capabilities::ScannerCapabilities;
use crate::client::EsclClient;
use crate::status::ScannerStatus;
use crate::transport::ScannerTransport;

/// Everything we know about a scanner without starting a job.
#[derive(Debug, Clone, Serialize)]
pub struct ScannerInfo {
    pub scanner_url: String,
    pub capabilities: ScannerCapabilities,
    pub status: ScannerStatus,
}

impl ScannerInfo {
    /// Query capabilities and status.
    ///
    /// An unrecognised state is reported as-is rather than rejected; this
    /// dump exists to show what the device says.
    pub async fn gather<T: ScannerTransport>(
        client: &EsclClient<T>,
        config: &ScanConfig,
    ) -> Result<Self> {
        let capabilities = client.capabilities(config).await?;
        let status = client.status().await?;
        Ok(Self {
            scanner_url: client.base().to_string(),
            capabilities,
            status,
        })
    }
}

fn joined<T: fmt::Display>(items: impl IntoIterator<Item = T>) -> String {
    items
        .into_iter()
        .map(|i| i.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

impl fmt::Display for ScannerInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let caps = &self.capabilities;
        let mut out = String::new();
        writeln!(out, "Scanner model: {}", caps.make_and_model)?;
        writeln!(out, "Serial number: {}", caps.serial_number)?;
        writeln!(out, "Scanner URL:   {}", self.scanner_url)?;
        writeln!(out, "Admin URL:     {}", caps.admin_uri)?;
        writeln!(out, "eSCL version:  {}", caps.version)?;
        writeln!(out, "Formats:       {}", joined(&caps.document_formats))?;
        writeln!(out, "Color Modes:   {}", joined(&caps.color_modes))?;
        writeln!(out, "X-Resolutions: {}", joined(&caps.x_resolutions))?;
        writeln!(out, "Y-Resolutions: {}", joined(&caps.y_resolutions))?;
        writeln!(out, "Max width:     {}", caps.max_width)?;
        writeln!(out, "Max height:    {}", caps.max_height)?;
        write!(
            out,
            "Status:        {}",
            self.status.raw_state.as_deref().unwrap_or("-")
        )?;
        f.write_str(&out)
    }
}
