// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Output file handling: default naming, conflict checks, and fingerprinting
// of the written document.

use std::fs::OpenOptions;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use chrono::{DateTime, Local};
use sha2::{Digest, Sha256};
use tracing::{info, warn};

use scanwerk_core::error::{Result, ScanwerkError};
use scanwerk_core::types::DocumentFormat;

/// `<stem>_<YYYYmmdd-HHMMSS>.<ext>` for the given local time.
pub fn default_filename(stem: &str, format: DocumentFormat, now: DateTime<Local>) -> PathBuf {
    PathBuf::from(format!(
        "{stem}_{}.{}",
        now.format("%Y%m%d-%H%M%S"),
        format.extension()
    ))
}

/// Fail when something already lives at `path`.
pub fn ensure_absent(path: &Path) -> Result<()> {
    if path.symlink_metadata().is_ok() {
        return Err(ScanwerkError::OutputExists(path.to_path_buf()));
    }
    Ok(())
}

/// SHA-256 of `data` as lowercase hex.
pub fn hash_bytes(data: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(data);
    hex::encode(hasher.finalize())
}

/// Whether `data` starts the way a document of `format` should.
pub fn has_expected_magic(data: &[u8], format: DocumentFormat) -> bool {
    data.starts_with(format.magic_bytes())
}

/// Write the scanned document to a file that must not exist yet.
///
/// Returns the SHA-256 fingerprint of what was written.
pub fn write_document(path: &Path, data: &[u8], format: DocumentFormat) -> Result<String> {
    if !has_expected_magic(data, format) {
        warn!(
            path = %path.display(),
            expected = format.mime_type(),
            "scanner result does not look like the requested format"
        );
    }

    let save_failed = |source: std::io::Error| ScanwerkError::SaveFailed {
        path: path.to_path_buf(),
        source,
    };

    let mut file = OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(path)
        .map_err(|e| match e.kind() {
            ErrorKind::AlreadyExists => ScanwerkError::OutputExists(path.to_path_buf()),
            _ => save_failed(e),
        })?;
    if let Err(e) = file.write_all(data).and_then(|()| file.sync_all()) {
        drop(file);
        // Partial output.
        let _ = std::fs::remove_file(path);
        return Err(save_failed(e));
    }

    let digest = hash_bytes(data);
    info!(path = %path.display(), bytes = data.len(), sha256 = %digest, "scan saved");
    Ok(digest)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn default_name_uses_local_timestamp() {
        let now = Local.with_ymd_and_hms(2026, 3, 9, 14, 5, 7).unwrap();
        assert_eq!(
            default_filename("scan", DocumentFormat::Jpeg, now),
            PathBuf::from("scan_20260309-140507.jpg")
        );
        assert_eq!(
            default_filename("letters", DocumentFormat::Pdf, now),
            PathBuf::from("letters_20260309-140507.pdf")
        );
    }

    #[test]
    fn existing_file_is_refused() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("scan.jpg");
        assert!(ensure_absent(&path).is_ok());

        std::fs::write(&path, b"old").unwrap();
        assert!(matches!(
            ensure_absent(&path),
            Err(ScanwerkError::OutputExists(p)) if p == path
        ));
    }

    #[test]
    fn write_never_overwrites() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("scan.pdf");
        std::fs::write(&path, b"appeared during the scan").unwrap();

        let err = write_document(&path, b"%PDF-1.4", DocumentFormat::Pdf).unwrap_err();
        assert!(matches!(err, ScanwerkError::OutputExists(_)));
        assert_eq!(std::fs::read(&path).unwrap(), b"appeared during the scan");
    }

    #[test]
    fn unwritable_destination_is_a_save_failure() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing-dir").join("scan.jpg");

        let err = write_document(&path, b"JPEGDATA", DocumentFormat::Jpeg).unwrap_err();
        assert!(matches!(&err, ScanwerkError::SaveFailed { path: p, .. } if *p == path));
        assert_eq!(err.class(), scanwerk_core::types::ErrorClass::Storage);
    }

    #[test]
    fn write_stores_exact_bytes_and_fingerprints_them() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("scan.jpg");
        let data = [0xFF, 0xD8, 0xFF, 0xE0, 0x00, 0x10];

        let digest = write_document(&path, &data, DocumentFormat::Jpeg).unwrap();
        assert_eq!(std::fs::read(&path).unwrap(), data);
        assert_eq!(digest, hash_bytes(&data));
        assert_eq!(digest.len(), 64);
    }

    #[test]
    fn unexpected_payload_is_still_written() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("scan.jpg");
        write_document(&path, b"JPEGDATA", DocumentFormat::Jpeg).unwrap();
        assert_eq!(std::fs::read(&path).unwrap(), b"JPEGDATA");
    }

    #[test]
    fn magic_bytes_checked_per_format() {
        assert!(has_expected_magic(&[0xFF, 0xD8, 0xFF], DocumentFormat::Jpeg));
        assert!(has_expected_magic(b"%PDF-1.7\n", DocumentFormat::Pdf));
        assert!(!has_expected_magic(b"%PDF-1.7\n", DocumentFormat::Jpeg));
        assert!(!has_expected_magic(b"", DocumentFormat::Pdf));
    }

    #[test]
    fn sha256_known_value() {
        assert_eq!(
            hash_bytes(b"hello"),
            "2cf24dba5fb0a30e26e83b2ac5b9e29e1b161e5c1fa7425e73043362938b9824"
        );
    }
}
