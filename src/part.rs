//! Single fields of a multipart/form-data payload.
//!
//! A `Part` carries the form field name, optional MIME type and filename
//! metadata, a content source, and the exact byte length of that source.
//! The length is computed once at construction and never changes; the whole
//! encoder depends on lengths being known before any byte is read so that
//! absolute stream offsets can be computed without scanning content.

use crate::error::Error;
use crate::source::ByteSource;
use std::fmt::Display;
use std::fs;
use std::path::Path;

/// Fallback MIME type when extension detection yields nothing
const DEFAULT_MIME_TYPE: &str = "application/octet-stream";

/// Text encoding used by `Part::text_with_encoding`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextEncoding {
    Utf8,
    Ascii,
}

/// One named field of a multipart/form-data payload.
///
/// `name`, `mime_type` and `file_name` are interpolated verbatim into the
/// wire header; values containing quotes or CR/LF produce a malformed frame.
/// This is a known limitation, not validated here.
#[derive(Debug)]
pub struct Part {
    pub name: String,
    pub mime_type: Option<String>,
    pub file_name: Option<String>,
    pub(crate) source: ByteSource,
    pub length: u64,
}

impl Part {
    /// Creates a part from the textual representation of a value, encoded
    /// as UTF-8.
    pub fn text<V: Display, S: Into<String>>(value: V, name: S) -> Result<Self, Error> {
        Self::text_with_encoding(value, name, TextEncoding::Utf8)
    }

    /// Creates a part from the textual representation of a value in the
    /// given encoding. Fails with `Error::Encoding` when the rendered text
    /// cannot be represented in that encoding.
    pub fn text_with_encoding<V: Display, S: Into<String>>(
        value: V,
        name: S,
        encoding: TextEncoding,
    ) -> Result<Self, Error> {
        let rendered = value.to_string();
        let data = match encoding {
            TextEncoding::Utf8 => rendered.into_bytes(),
            TextEncoding::Ascii => {
                if !rendered.is_ascii() {
                    return Err(Error::encoding(rendered));
                }
                rendered.into_bytes()
            }
        };

        Ok(Self::bytes(data, name))
    }

    /// Creates a part from an explicit byte buffer.
    pub fn bytes<S: Into<String>>(data: Vec<u8>, name: S) -> Self {
        let length = data.len() as u64;
        Part {
            name: name.into(),
            mime_type: None,
            file_name: None,
            source: ByteSource::memory(data),
            length,
        }
    }

    /// Creates a part backed by a file. The file is not opened here; its
    /// size is queried up front and the handle is opened lazily on the
    /// first read. MIME type defaults from the file extension and the
    /// filename defaults to the path's final component.
    pub fn file<P: AsRef<Path>, S: Into<String>>(path: P, name: S) -> Result<Self, Error> {
        let path = path.as_ref();

        let metadata = fs::metadata(path).map_err(|err| {
            log::debug!("Cannot stat content source {}: {err}", path.display());
            Error::source_unavailable(path)
        })?;

        if !metadata.is_file() {
            return Err(Error::size_unavailable(path));
        }

        let mime_type = path
            .extension()
            .and_then(|ext| ext.to_str())
            .and_then(mime_from_extension)
            .unwrap_or(DEFAULT_MIME_TYPE)
            .to_string();

        let file_name = path
            .file_name()
            .map(|base| base.to_string_lossy().into_owned());

        Ok(Part {
            name: name.into(),
            mime_type: Some(mime_type),
            file_name,
            source: ByteSource::file(path),
            length: metadata.len(),
        })
    }

    /// Overrides the MIME type sent in the part header.
    pub fn with_mime_type<S: Into<String>>(mut self, mime_type: S) -> Self {
        self.mime_type = Some(mime_type.into());
        self
    }

    /// Overrides the filename sent in the part header.
    pub fn with_file_name<S: Into<String>>(mut self, file_name: S) -> Self {
        self.file_name = Some(file_name.into());
        self
    }
}

/// Best-effort extension to MIME type mapping for file-backed parts.
pub fn mime_from_extension(extension: &str) -> Option<&'static str> {
    let mime = match extension.to_ascii_lowercase().as_str() {
        "txt" | "log" | "md" => "text/plain",
        "html" | "htm" => "text/html",
        "css" => "text/css",
        "csv" => "text/csv",
        "js" => "application/javascript",
        "json" => "application/json",
        "xml" => "application/xml",
        "pdf" => "application/pdf",
        "zip" => "application/zip",
        "gz" => "application/gzip",
        "tar" => "application/x-tar",
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "svg" => "image/svg+xml",
        "webp" => "image/webp",
        "ico" => "image/x-icon",
        "mp3" => "audio/mpeg",
        "wav" => "audio/wav",
        "mp4" => "video/mp4",
        "webm" => "video/webm",
        _ => return None,
    };
    Some(mime)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_text_part_length_and_metadata() {
        let part = Part::text("hello", "greeting").unwrap();
        assert_eq!(part.name, "greeting");
        assert_eq!(part.length, 5);
        assert!(part.mime_type.is_none());
        assert!(part.file_name.is_none());
    }

    #[test]
    fn test_text_part_renders_non_string_values() {
        let part = Part::text(42, "answer").unwrap();
        assert_eq!(part.length, 2);
    }

    #[test]
    fn test_ascii_encoding_rejects_non_ascii() {
        let err = Part::text_with_encoding("héllo", "x", TextEncoding::Ascii).unwrap_err();
        assert!(matches!(err, Error::Encoding(_)));

        let ok = Part::text_with_encoding("hello", "x", TextEncoding::Ascii).unwrap();
        assert_eq!(ok.length, 5);
    }

    #[test]
    fn test_bytes_part() {
        let part = Part::bytes(vec![0xDE, 0xAD, 0xBE, 0xEF], "blob");
        assert_eq!(part.length, 4);
        assert!(part.mime_type.is_none());
    }

    #[test]
    fn test_builder_overrides() {
        let part = Part::bytes(b"x".to_vec(), "f")
            .with_mime_type("text/plain")
            .with_file_name("x.txt");
        assert_eq!(part.mime_type.as_deref(), Some("text/plain"));
        assert_eq!(part.file_name.as_deref(), Some("x.txt"));
    }

    #[test]
    fn test_file_part_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("report.csv");
        let mut file = fs::File::create(&path).unwrap();
        file.write_all(b"a,b\n1,2\n").unwrap();

        let part = Part::file(&path, "report").unwrap();
        assert_eq!(part.length, 8);
        assert_eq!(part.mime_type.as_deref(), Some("text/csv"));
        assert_eq!(part.file_name.as_deref(), Some("report.csv"));
    }

    #[test]
    fn test_file_part_unknown_extension_falls_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("data.weird");
        fs::write(&path, b"?").unwrap();

        let part = Part::file(&path, "data").unwrap();
        assert_eq!(part.mime_type.as_deref(), Some("application/octet-stream"));
    }

    #[test]
    fn test_file_part_missing_path() {
        let err = Part::file("/nonexistent/reqforge.bin", "f").unwrap_err();
        assert!(matches!(err, Error::SourceUnavailable(_)));
    }

    #[test]
    fn test_file_part_directory_has_no_size() {
        let dir = tempfile::tempdir().unwrap();
        let err = Part::file(dir.path(), "d").unwrap_err();
        assert!(matches!(err, Error::SizeUnavailable(_)));
    }

    #[test]
    fn test_mime_from_extension_case_insensitive() {
        assert_eq!(mime_from_extension("PNG"), Some("image/png"));
        assert_eq!(mime_from_extension("unknown"), None);
    }
}
