//! Shared fixtures for integration tests

#![allow(dead_code)]

use mime_validator_rs::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};

pub const PDF_BYTES: &[u8] =
    b"%PDF-1.4\n1 0 obj\n<< /Type /Catalog /Pages 2 0 R >>\nendobj\ntrailer\n<< /Root 1 0 R >>\n%%EOF\n";

pub const PNG_BYTES: &[u8] = &[
    0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A, // signature
    0x00, 0x00, 0x00, 0x0D, 0x49, 0x48, 0x44, 0x52, // IHDR length + type
    0x00, 0x00, 0x00, 0x01, 0x00, 0x00, 0x00, 0x01, // 1x1
    0x08, 0x06, 0x00, 0x00, 0x00, 0x1F, 0x15, 0xC4, 0x89, // depth, color, crc
];

pub const JPEG_BYTES: &[u8] = &[0xFF, 0xD8, 0xFF, 0xE0, 0x00, 0x10, b'J', b'F', b'I', b'F', 0x00];

/// In-process stand-in for `file --mime-type`, sniffing a few magic numbers
pub struct MagicDetector;

impl ContentDetector for MagicDetector {
    fn detect_mime(&self, path: &Path) -> Result<String, DetectorError> {
        let bytes = fs::read(path)?;
        let mime = if bytes.starts_with(b"%PDF-") {
            "application/pdf"
        } else if bytes.starts_with(&PNG_BYTES[..8]) {
            "image/png"
        } else if bytes.starts_with(&[0xFF, 0xD8, 0xFF]) {
            "image/jpeg"
        } else if bytes.starts_with(b"GIF8") {
            "image/gif"
        } else {
            "application/octet-stream"
        };
        Ok(mime.to_string())
    }
}

pub fn write(dir: &Path, name: &str, content: &[u8]) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, content).unwrap();
    path
}

pub fn console() -> ConsoleReporter<Vec<u8>, Vec<u8>> {
    ConsoleReporter::new(Vec::new(), Vec::new())
}

pub fn captured(reporter: ConsoleReporter<Vec<u8>, Vec<u8>>) -> (String, String) {
    let (out, err) = reporter.into_inner();
    (String::from_utf8(out).unwrap(), String::from_utf8(err).unwrap())
}
