// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Scan settings request (`scan:ScanSettings`) rendering.

use serde::Serialize;

use scanwerk_core::types::{ColorMode, DocumentFormat};

use crate::xml::{NS_PWG, NS_SCAN, escape_text};

/// A scan request that has been checked against the scanner's capabilities.
///
/// Built by [`crate::negotiate::negotiate`]; every value is one the scanner
/// advertised.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScanRequest {
    /// Protocol version copied from the capabilities document.
    pub version: String,
    pub format: DocumentFormat,
    pub color_mode: ColorMode,
    /// Shared X/Y resolution in DPI.
    pub resolution: u32,
    /// Region width in 1/300 inch.
    pub width: u32,
    /// Region height in 1/300 inch.
    pub height: u32,
}

impl ScanRequest {
    /// Render the `scan:ScanSettings` document sent to `eSCL/ScanJobs`.
    ///
    /// The region always starts at the platen origin and the input source is
    /// always the platen.
    pub fn to_xml(&self) -> String {
        format!(
            r#"<?xml version="1.0" encoding="UTF-8"?>
<scan:ScanSettings xmlns:pwg="{ns_pwg}" xmlns:scan="{ns_scan}">
  <pwg:Version>{version}</pwg:Version>
  <pwg:ScanRegions>
    <pwg:ScanRegion>
      <pwg:XOffset>0</pwg:XOffset>
      <pwg:YOffset>0</pwg:YOffset>
      <pwg:Width>{width}</pwg:Width>
      <pwg:Height>{height}</pwg:Height>
      <pwg:ContentRegionUnits>escl:ThreeHundredthsOfInches</pwg:ContentRegionUnits>
    </pwg:ScanRegion>
  </pwg:ScanRegions>
  <pwg:InputSource>Platen</pwg:InputSource>
  <pwg:DocumentFormat>{format}</pwg:DocumentFormat>
  <scan:ColorMode>{color_mode}</scan:ColorMode>
  <scan:XResolution>{resolution}</scan:XResolution>
  <scan:YResolution>{resolution}</scan:YResolution>
</scan:ScanSettings>"#,
            ns_pwg = NS_PWG,
            ns_scan = NS_SCAN,
            version = escape_text(&self.version),
            width = self.width,
            height = self.height,
            format = self.format.mime_type(),
            color_mode = self.color_mode.escl_keyword(),
            resolution = self.resolution,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::xml::{self, first_text};

    fn request() -> ScanRequest {
        ScanRequest {
            version: "2.63".into(),
            format: DocumentFormat::Pdf,
            color_mode: ColorMode::Grayscale8,
            resolution: 300,
            width: 2480,
            height: 3508,
        }
    }

    #[test]
    fn rendered_document_round_trips_through_parser() {
        let body = request().to_xml();
        let doc = xml::parse_document(body.as_bytes()).unwrap();
        let root = doc.root_element();
        assert_eq!(root.tag_name().name(), "ScanSettings");
        assert_eq!(root.tag_name().namespace(), Some(NS_SCAN));

        assert_eq!(first_text(&doc, NS_PWG, "Version").as_deref(), Some("2.63"));
        assert_eq!(first_text(&doc, NS_PWG, "Width").as_deref(), Some("2480"));
        assert_eq!(first_text(&doc, NS_PWG, "Height").as_deref(), Some("3508"));
        assert_eq!(first_text(&doc, NS_PWG, "XOffset").as_deref(), Some("0"));
        assert_eq!(first_text(&doc, NS_PWG, "InputSource").as_deref(), Some("Platen"));
        assert_eq!(
            first_text(&doc, NS_PWG, "DocumentFormat").as_deref(),
            Some("application/pdf")
        );
        assert_eq!(
            first_text(&doc, NS_SCAN, "ColorMode").as_deref(),
            Some("Grayscale8")
        );
        assert_eq!(first_text(&doc, NS_SCAN, "XResolution").as_deref(), Some("300"));
        assert_eq!(first_text(&doc, NS_SCAN, "YResolution").as_deref(), Some("300"));
        assert_eq!(
            first_text(&doc, NS_PWG, "ContentRegionUnits").as_deref(),
            Some("escl:ThreeHundredthsOfInches")
        );
    }

    #[test]
    fn document_starts_with_declaration() {
        assert!(request().to_xml().starts_with("<?xml"));
    }

    #[test]
    fn version_is_escaped() {
        let mut req = request();
        req.version = "2<3".into();
        assert!(req.to_xml().contains("<pwg:Version>2&lt;3</pwg:Version>"));
    }
}
