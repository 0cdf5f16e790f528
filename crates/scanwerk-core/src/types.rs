// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Core domain types for the Scanwerk eSCL client.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ScanwerkError;

/// Output document formats we can ask a scanner for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DocumentFormat {
    Jpeg,
    Pdf,
}

impl DocumentFormat {
    /// MIME type used for `pwg:DocumentFormat`.
    pub fn mime_type(&self) -> &'static str {
        match self {
            Self::Jpeg => "image/jpeg",
            Self::Pdf => "application/pdf",
        }
    }

    /// File extension (and CLI token) for this format.
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Jpeg => "jpg",
            Self::Pdf => "pdf",
        }
    }

    /// Leading bytes a well-formed document of this format starts with.
    pub fn magic_bytes(&self) -> &'static [u8] {
        match self {
            Self::Jpeg => &[0xFF, 0xD8],
            Self::Pdf => b"%PDF",
        }
    }
}

impl FromStr for DocumentFormat {
    type Err = ScanwerkError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "jpg" | "jpeg" => Ok(Self::Jpeg),
            "pdf" => Ok(Self::Pdf),
            other => Err(ScanwerkError::InvalidArgument(format!(
                "invalid type: {other} (expected jpg or pdf)"
            ))),
        }
    }
}

impl fmt::Display for DocumentFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.mime_type())
    }
}

/// Colour modes, named after the `scan:ColorMode` keywords.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ColorMode {
    Rgb24,
    Grayscale8,
}

impl ColorMode {
    /// eSCL keyword for `scan:ColorMode`.
    pub fn escl_keyword(&self) -> &'static str {
        match self {
            Self::Rgb24 => "RGB24",
            Self::Grayscale8 => "Grayscale8",
        }
    }
}

impl FromStr for ColorMode {
    type Err = ScanwerkError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "r24" | "RGB24" => Ok(Self::Rgb24),
            "g8" | "Grayscale8" => Ok(Self::Grayscale8),
            other => Err(ScanwerkError::InvalidArgument(format!(
                "invalid color mode: {other} (expected r24 or g8)"
            ))),
        }
    }
}

impl fmt::Display for ColorMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.escl_keyword())
    }
}

/// Standard paper sizes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PaperSize {
    A3,
    A4,
    A5,
    B5,
    Letter,
    Legal,
    Custom { width_mm: u32, height_mm: u32 },
}

impl PaperSize {
    /// Dimensions in tenths of a millimetre (width, height).
    ///
    /// Tenths keep the US sizes exact (8.5in = 215.9mm).
    pub fn dimensions_tenth_mm(&self) -> (u32, u32) {
        match self {
            Self::A3 => (2970, 4200),
            Self::A4 => (2100, 2970),
            Self::A5 => (1480, 2100),
            Self::B5 => (1760, 2500),
            Self::Letter => (2159, 2794),
            Self::Legal => (2159, 3556),
            Self::Custom {
                width_mm,
                height_mm,
            } => (width_mm.saturating_mul(10), height_mm.saturating_mul(10)),
        }
    }

    /// Dimensions in device units (1/300 inch), rounded to the nearest unit.
    ///
    /// A4 comes out at 2480x3508, US Letter at 2550x3300.
    pub fn device_units(&self) -> (u32, u32) {
        let (w, h) = self.dimensions_tenth_mm();
        (tenth_mm_to_device_units(w), tenth_mm_to_device_units(h))
    }
}

fn tenth_mm_to_device_units(tenth_mm: u32) -> u32 {
    // 300 units per 254 tenths of a millimetre.
    let scaled = (u64::from(tenth_mm) * 300 + 127) / 254;
    u32::try_from(scaled).unwrap_or(u32::MAX)
}

impl FromStr for PaperSize {
    type Err = ScanwerkError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "a3" => Ok(Self::A3),
            "a4" => Ok(Self::A4),
            "a5" => Ok(Self::A5),
            "b5" => Ok(Self::B5),
            "us" | "letter" => Ok(Self::Letter),
            "legal" => Ok(Self::Legal),
            other => parse_custom_size(other).ok_or_else(|| {
                ScanwerkError::InvalidArgument(format!(
                    "invalid paper size: {other} (expected a3, a4, a5, b5, us, legal, max or <W>x<H> in mm)"
                ))
            }),
        }
    }
}

/// Parse `210x297` style custom sizes (millimetres, both non-zero).
fn parse_custom_size(s: &str) -> Option<PaperSize> {
    let (w, h) = s.split_once('x')?;
    let width_mm: u32 = w.trim().parse().ok()?;
    let height_mm: u32 = h.trim().parse().ok()?;
    if width_mm == 0 || height_mm == 0 {
        return None;
    }
    Some(PaperSize::Custom {
        width_mm,
        height_mm,
    })
}

impl fmt::Display for PaperSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::A3 => f.write_str("A3"),
            Self::A4 => f.write_str("A4"),
            Self::A5 => f.write_str("A5"),
            Self::B5 => f.write_str("B5"),
            Self::Letter => f.write_str("US Letter"),
            Self::Legal => f.write_str("US Legal"),
            Self::Custom {
                width_mm,
                height_mm,
            } => write!(f, "{width_mm}x{height_mm}mm"),
        }
    }
}

/// Requested scan area.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum RegionRequest {
    /// The full platen, as advertised by the scanner.
    #[default]
    Max,
    Paper(PaperSize),
}

impl FromStr for RegionRequest {
    type Err = ScanwerkError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.eq_ignore_ascii_case("max") {
            Ok(Self::Max)
        } else {
            s.parse().map(Self::Paper)
        }
    }
}

/// Requested resolution, shared between X and Y.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ResolutionRequest {
    /// Highest resolution supported on both axes.
    #[default]
    Auto,
    Dpi(u32),
}

impl FromStr for ResolutionRequest {
    type Err = ScanwerkError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() || s.eq_ignore_ascii_case("auto") {
            return Ok(Self::Auto);
        }
        match s.parse::<u32>() {
            Ok(dpi) if dpi > 0 => Ok(Self::Dpi(dpi)),
            _ => Err(ScanwerkError::InvalidArgument(format!(
                "invalid resolution: {s} (expected a positive integer or auto)"
            ))),
        }
    }
}

/// What the user asked for, before it is checked against the scanner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanParameters {
    pub format: DocumentFormat,
    pub color_mode: ColorMode,
    pub resolution: ResolutionRequest,
    pub region: RegionRequest,
}

impl Default for ScanParameters {
    fn default() -> Self {
        Self {
            format: DocumentFormat::Jpeg,
            color_mode: ColorMode::Rgb24,
            resolution: ResolutionRequest::Auto,
            region: RegionRequest::Max,
        }
    }
}

/// Device states reported in `pwg:State`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ScannerState {
    Idle,
    Processing,
    Testing,
    Stopped,
    Down,
}

impl ScannerState {
    /// Only an idle scanner accepts a new job.
    pub fn accepts_jobs(&self) -> bool {
        matches!(self, Self::Idle)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Idle => "Idle",
            Self::Processing => "Processing",
            Self::Testing => "Testing",
            Self::Stopped => "Stopped",
            Self::Down => "Down",
        }
    }
}

impl FromStr for ScannerState {
    type Err = ScanwerkError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "Idle" => Ok(Self::Idle),
            "Processing" => Ok(Self::Processing),
            "Testing" => Ok(Self::Testing),
            "Stopped" => Ok(Self::Stopped),
            "Down" => Ok(Self::Down),
            other => Err(ScanwerkError::UnknownScannerState(Some(other.to_string()))),
        }
    }
}

impl fmt::Display for ScannerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Classification of errors, following the order in which a run can fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ErrorClass {
    /// Bad arguments, configuration or output path; caught before any
    /// network call.
    Usage,
    /// The scanner does not offer what was asked for.
    CapabilityMismatch,
    /// HTTP failure, malformed document, missing header.
    Protocol,
    /// The scanner is busy or broken.
    DeviceState,
    /// The result never arrived, or the run was interrupted.
    JobTimeout,
    /// Local file I/O. Can happen after the scan, when saving the result.
    Storage,
}
