// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Scan parameter negotiation.
//
// Checks what the user asked for against what the scanner advertised and
// produces a `ScanRequest`. Unlike a print job there is nothing sensible to
// auto-correct to: asking for a PDF and getting a JPEG is a surprise, so
// every mismatch is an error. No network I/O happens here.

use tracing::debug;

use scanwerk_core::error::{Result, ScanwerkError};
use scanwerk_core::types::{
    ColorMode, DocumentFormat, RegionRequest, ResolutionRequest, ScanParameters,
};

use crate::capabilities::ScannerCapabilities;
use crate::settings::ScanRequest;

/// Validate `params` against `caps` and build the request to submit.
pub fn negotiate(params: &ScanParameters, caps: &ScannerCapabilities) -> Result<ScanRequest> {
    let format = negotiate_format(params.format, caps)?;
    let color_mode = negotiate_color_mode(params.color_mode, caps)?;
    let resolution = negotiate_resolution(params.resolution, caps)?;
    let (width, height) = negotiate_region(params.region, caps)?;

    debug!(version = %caps.version, "scan parameters negotiated");

    Ok(ScanRequest {
        version: caps.version.clone(),
        format,
        color_mode,
        resolution,
        width,
        height,
    })
}

fn negotiate_format(format: DocumentFormat, caps: &ScannerCapabilities) -> Result<DocumentFormat> {
    debug!(
        format = format.mime_type(),
        supported = ?caps.document_formats,
        "format"
    );
    if caps.supports_format(format.mime_type()) {
        Ok(format)
    } else {
        Err(ScanwerkError::UnsupportedFormat {
            requested: format.mime_type().to_string(),
            supported: caps.document_formats.iter().cloned().collect(),
        })
    }
}

fn negotiate_color_mode(mode: ColorMode, caps: &ScannerCapabilities) -> Result<ColorMode> {
    debug!(
        color_mode = mode.escl_keyword(),
        supported = ?caps.color_modes,
        "color mode"
    );
    if caps.supports_color_mode(mode.escl_keyword()) {
        Ok(mode)
    } else {
        Err(ScanwerkError::UnsupportedColorMode {
            requested: mode.escl_keyword().to_string(),
            supported: caps.color_modes.iter().cloned().collect(),
        })
    }
}

/// Pick the resolution: the highest one offered on both axes for `Auto`,
/// otherwise the requested one if both axes offer it.
fn negotiate_resolution(requested: ResolutionRequest, caps: &ScannerCapabilities) -> Result<u32> {
    let resolution = match requested {
        ResolutionRequest::Auto => {
            caps.max_common_resolution()
                .ok_or_else(|| ScanwerkError::NoCommonResolution {
                    x_supported: caps.x_resolutions.iter().copied().collect(),
                    y_supported: caps.y_resolutions.iter().copied().collect(),
                })?
        }
        ResolutionRequest::Dpi(dpi) => dpi,
    };

    debug!(
        resolution,
        x_supported = ?caps.x_resolutions,
        y_supported = ?caps.y_resolutions,
        "resolution"
    );

    if caps.supports_resolution(resolution) {
        Ok(resolution)
    } else {
        Err(ScanwerkError::UnsupportedResolution {
            requested: resolution,
            x_supported: caps.x_resolutions.iter().copied().collect(),
            y_supported: caps.y_resolutions.iter().copied().collect(),
        })
    }
}

/// Resolve the scan region to device units and check it fits the platen.
fn negotiate_region(region: RegionRequest, caps: &ScannerCapabilities) -> Result<(u32, u32)> {
    let (width, height) = match region {
        RegionRequest::Max => (caps.max_width, caps.max_height),
        RegionRequest::Paper(paper) => paper.device_units(),
    };

    if width > caps.max_width {
        return Err(ScanwerkError::RegionTooLarge {
            dimension: "width",
            requested: width,
            max: caps.max_width,
        });
    }
    if height > caps.max_height {
        return Err(ScanwerkError::RegionTooLarge {
            dimension: "height",
            requested: height,
            max: caps.max_height,
        });
    }

    debug!(width, max_width = caps.max_width, height, max_height = caps.max_height, "region");
    Ok((width, height))
}
