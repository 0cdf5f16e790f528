// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Scanner capability parsing.
//
// Reads `eSCL/ScannerCapabilities` to find out what the scanner actually
// offers. Formats, colour modes and resolutions are collected from every
// input source in the document; the negotiator decides what to ask for.

use std::collections::BTreeSet;

use serde::Serialize;
use tracing::{debug, warn};

use scanwerk_core::config::ScanConfig;
use scanwerk_core::error::{Result, ScanwerkError};

use crate::xml::{self, NS_PWG, NS_SCAN};

/// Parsed scanner capabilities.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScannerCapabilities {
    /// eSCL protocol version, echoed back in the scan settings.
    pub version: String,
    /// Empty when the scanner does not report it.
    pub make_and_model: String,
    /// Empty when the scanner does not report it.
    pub serial_number: String,
    /// Empty when the scanner does not report it.
    pub admin_uri: String,
    /// Supported `pwg:DocumentFormat` MIME types.
    pub document_formats: BTreeSet<String>,
    /// Supported `scan:ColorMode` keywords.
    pub color_modes: BTreeSet<String>,
    pub x_resolutions: BTreeSet<u32>,
    pub y_resolutions: BTreeSet<u32>,
    /// Max scan width in 1/300 inch.
    pub max_width: u32,
    /// Max scan height in 1/300 inch.
    pub max_height: u32,
}

impl ScannerCapabilities {
    /// Parse a capabilities document.
    ///
    /// Serial number, admin URI and model fall back to empty strings; max
    /// width/height fall back to the configured defaults. A missing
    /// `pwg:Version` is an error since no scan request can be built
    /// without it.
    pub fn from_xml(bytes: &[u8], config: &ScanConfig) -> Result<Self> {
        let doc = xml::parse_document(bytes)?;

        let version = xml::first_text(&doc, NS_PWG, "Version").ok_or(
            ScanwerkError::MissingElement {
                element: "pwg:Version",
                document: "scanner capabilities",
            },
        )?;

        let make_and_model = xml::first_text(&doc, NS_PWG, "MakeAndModel").unwrap_or_default();
        let serial_number = xml::first_text(&doc, NS_PWG, "SerialNumber").unwrap_or_default();
        let admin_uri = xml::first_text(&doc, NS_SCAN, "AdminURI").unwrap_or_default();

        let document_formats: BTreeSet<String> =
            xml::all_text(&doc, NS_PWG, "DocumentFormat").into_iter().collect();
        let color_modes: BTreeSet<String> =
            xml::all_text(&doc, NS_SCAN, "ColorMode").into_iter().collect();

        let x_resolutions = parse_resolutions(&doc, "XResolution", "scan:XResolution")?;
        let y_resolutions = parse_resolutions(&doc, "YResolution", "scan:YResolution")?;

        let max_width = parse_size(&doc, "MaxWidth", "scan:MaxWidth")?.unwrap_or_else(|| {
            warn!(
                default = config.default_max_width,
                "scanner does not report MaxWidth, using default"
            );
            config.default_max_width
        });
        let max_height = parse_size(&doc, "MaxHeight", "scan:MaxHeight")?.unwrap_or_else(|| {
            warn!(
                default = config.default_max_height,
                "scanner does not report MaxHeight, using default"
            );
            config.default_max_height
        });

        debug!(
            %version,
            model = %make_and_model,
            formats = document_formats.len(),
            color_modes = color_modes.len(),
            x_resolutions = x_resolutions.len(),
            y_resolutions = y_resolutions.len(),
            max_width,
            max_height,
            "parsed scanner capabilities"
        );

        Ok(Self {
            version,
            make_and_model,
            serial_number,
            admin_uri,
            document_formats,
            color_modes,
            x_resolutions,
            y_resolutions,
            max_width,
            max_height,
        })
    }

    pub fn supports_format(&self, mime_type: &str) -> bool {
        self.document_formats.contains(mime_type)
    }

    pub fn supports_color_mode(&self, keyword: &str) -> bool {
        self.color_modes.contains(keyword)
    }

    /// A resolution is usable only when offered on both axes.
    pub fn supports_resolution(&self, dpi: u32) -> bool {
        self.x_resolutions.contains(&dpi) && self.y_resolutions.contains(&dpi)
    }

    /// Resolutions offered on both axes, ascending.
    pub fn common_resolutions(&self) -> BTreeSet<u32> {
        self.x_resolutions
            .intersection(&self.y_resolutions)
            .copied()
            .collect()
    }

    /// Highest resolution offered on both axes.
    pub fn max_common_resolution(&self) -> Option<u32> {
        self.x_resolutions
            .intersection(&self.y_resolutions)
            .max()
            .copied()
    }
}

fn parse_resolutions(
    doc: &roxmltree::Document<'_>,
    name: &str,
    element: &'static str,
) -> Result<BTreeSet<u32>> {
    xml::all_text(doc, NS_SCAN, name)
        .iter()
        .map(|v| xml::parse_positive(element, v))
        .collect()
}

/// First advertised size; `0` counts as not advertised.
fn parse_size(
    doc: &roxmltree::Document<'_>,
    name: &str,
    element: &'static str,
) -> Result<Option<u32>> {
    match xml::first_text(doc, NS_SCAN, name) {
        None => Ok(None),
        Some(v) if v.trim() == "0" => Ok(None),
        Some(v) => xml::parse_positive(element, &v).map(Some),
    }
}
