//! Upload metadata detection: MIME type and filename parts.
//!
//! Declared metadata is trusted for description only, never for identity;
//! when a declared MIME type is absent the payload bytes are sniffed.

use std::path::Path;

/// Fallback MIME type when nothing can be determined.
pub const OCTET_STREAM: &str = "application/octet-stream";

/// Resolve the MIME type for an upload.
///
/// The declared content-type header wins when present; otherwise the
/// payload magic bytes are sniffed, falling back to
/// `application/octet-stream`.
pub fn resolve_mime(declared: Option<&str>, payload: &[u8]) -> String {
    if let Some(mime) = declared {
        let mime = mime.trim();
        if !mime.is_empty() {
            return mime.to_string();
        }
    }
    infer::get(payload)
        .map(|kind| kind.mime_type().to_string())
        .unwrap_or_else(|| OCTET_STREAM.to_string())
}

/// File extension from an upload filename, lowercased, without the dot.
pub fn extension_of(filename: &str) -> String {
    Path::new(filename)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_lowercase())
        .unwrap_or_default()
}

/// Filename stem, used as the default display name.
pub fn stem_of(filename: &str) -> String {
    Path::new(filename)
        .file_stem()
        .and_then(|stem| stem.to_str())
        .map(str::to_string)
        .unwrap_or_else(|| filename.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    const PNG_MAGIC: &[u8] = &[0x89, 0x50, 0x4e, 0x47, 0x0d, 0x0a, 0x1a, 0x0a];

    #[test]
    fn test_declared_mime_wins() {
        assert_eq!(resolve_mime(Some("text/plain"), PNG_MAGIC), "text/plain");
    }

    #[test]
    fn test_sniffs_payload_when_header_absent() {
        assert_eq!(resolve_mime(None, PNG_MAGIC), "image/png");
    }

    #[test]
    fn test_blank_header_falls_through_to_sniffing() {
        assert_eq!(resolve_mime(Some("  "), PNG_MAGIC), "image/png");
    }

    #[test]
    fn test_unknown_payload_is_octet_stream() {
        assert_eq!(resolve_mime(None, b"plain words"), OCTET_STREAM);
    }

    #[test]
    fn test_extension_of() {
        assert_eq!(extension_of("photo.PNG"), "png");
        assert_eq!(extension_of("archive.tar.gz"), "gz");
        assert_eq!(extension_of("noext"), "");
    }

    #[test]
    fn test_stem_of() {
        assert_eq!(stem_of("photo.png"), "photo");
        assert_eq!(stem_of("noext"), "noext");
        assert_eq!(stem_of("archive.tar.gz"), "archive.tar");
    }
}
