// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Namespace-aware lookups over eSCL XML documents.

use std::borrow::Cow;

use roxmltree::{Document, Node};

use scanwerk_core::error::{Result, ScanwerkError};

/// PWG semantic model namespace (`pwg:` prefix).
pub const NS_PWG: &str = "http://www.pwg.org/schemas/2010/12/sm";

/// eSCL namespace (`scan:` prefix).
pub const NS_SCAN: &str = "http://schemas.hp.com/imaging/escl/2011/05/03";

/// Parse a response body. Non-UTF-8 input counts as malformed.
pub fn parse_document(bytes: &[u8]) -> Result<Document<'_>> {
    let text = std::str::from_utf8(bytes)
        .map_err(|e| ScanwerkError::MalformedXml(format!("not valid UTF-8: {e}")))?;
    Document::parse(text.trim_start_matches('\u{feff}'))
        .map_err(|e| ScanwerkError::MalformedXml(e.to_string()))
}

fn elements<'a, 'input>(
    doc: &'a Document<'input>,
    namespace: &'a str,
    name: &'a str,
) -> impl Iterator<Item = Node<'a, 'input>> + 'a {
    doc.descendants().filter(move |n| {
        n.is_element() && n.tag_name().name() == name && n.tag_name().namespace() == Some(namespace)
    })
}

/// Trimmed text of every matching element, in document order. Empty
/// elements are skipped.
pub fn all_text(doc: &Document<'_>, namespace: &str, name: &str) -> Vec<String> {
    elements(doc, namespace, name)
        .filter_map(|n| n.text())
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_owned)
        .collect()
}

/// Trimmed text of the first matching, non-empty element.
pub fn first_text(doc: &Document<'_>, namespace: &str, name: &str) -> Option<String> {
    elements(doc, namespace, name)
        .filter_map(|n| n.text())
        .map(str::trim)
        .find(|t| !t.is_empty())
        .map(str::to_owned)
}

/// Parse a positive integer element value.
pub fn parse_positive(element: &'static str, value: &str) -> Result<u32> {
    match value.trim().parse::<u32>() {
        Ok(v) if v > 0 => Ok(v),
        _ => Err(ScanwerkError::InvalidElementValue {
            element,
            value: value.to_string(),
        }),
    }
}

/// Escape character data for substitution into an XML template.
pub fn escape_text(raw: &str) -> Cow<'_, str> {
    if !raw.contains(['&', '<', '>']) {
        return Cow::Borrowed(raw);
    }
    let mut out = String::with_capacity(raw.len() + 8);
    for c in raw.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(c),
        }
    }
    Cow::Owned(out)
}
