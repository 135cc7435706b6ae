// SPDX-License-Identifier: MIT

use std::fmt;
use std::path::PathBuf;

#[derive(Debug)]
pub enum Error {
    // Body-encoder errors
    Encoding(String),
    SourceUnavailable(PathBuf),
    SizeUnavailable(PathBuf),
    RangeViolation { position: u64, length: u64 },
    UnderlyingRead(std::io::Error),
    StreamNotOpened,
    // Request-building and response-parsing errors
    InvalidBaseUrl(String),
    Json(serde_json::Error),
    InvalidData(String),
    UnacceptableStatusCode(u16),
    ConnectionError(String),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Encoding(value) => {
                write!(f, "Value cannot be encoded as bytes: {value}")
            }
            Error::SourceUnavailable(path) => {
                write!(f, "Content source cannot be opened: {}", path.display())
            }
            Error::SizeUnavailable(path) => {
                write!(
                    f,
                    "Byte length of content source cannot be determined: {}",
                    path.display()
                )
            }
            Error::RangeViolation { position, length } => {
                write!(
                    f,
                    "Illegal range access: position {position} is outside stream of length {length}"
                )
            }
            Error::UnderlyingRead(err) => write!(f, "Content source read failed: {err}"),
            Error::StreamNotOpened => write!(f, "Stream must be opened before reading"),
            Error::InvalidBaseUrl(url) => write!(f, "Invalid base URL: '{url}'"),
            Error::Json(err) => write!(f, "JSON error: {err}"),
            Error::InvalidData(msg) => write!(f, "Invalid response data: {msg}"),
            Error::UnacceptableStatusCode(code) => {
                write!(f, "Unacceptable HTTP status code: {code}")
            }
            Error::ConnectionError(msg) => write!(f, "Connection error: {msg}"),
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::UnderlyingRead(err)
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Json(err)
    }
}

impl From<Error> for std::io::Error {
    fn from(err: Error) -> Self {
        match err {
            Error::UnderlyingRead(io) => io,
            other => std::io::Error::other(other),
        }
    }
}

impl std::error::Error for Error {}

impl Error {
    /// Creates an Encoding error for a value that cannot be rendered as bytes
    pub fn encoding<S: Into<String>>(value: S) -> Self {
        Error::Encoding(value.into())
    }

    /// Creates a SourceUnavailable error for a path that cannot be opened
    pub fn source_unavailable<P: Into<PathBuf>>(path: P) -> Self {
        Error::SourceUnavailable(path.into())
    }

    /// Creates a SizeUnavailable error for a path whose length cannot be queried
    pub fn size_unavailable<P: Into<PathBuf>>(path: P) -> Self {
        Error::SizeUnavailable(path.into())
    }

    /// Creates a ConnectionError from an adapter-level failure
    pub fn connection<S: Into<String>>(msg: S) -> Self {
        Error::ConnectionError(msg.into())
    }

    /// Checks if the error occurred while building the request,
    /// before any body bytes were produced
    pub fn is_build_error(&self) -> bool {
        matches!(
            self,
            Error::Encoding(_)
                | Error::SourceUnavailable(_)
                | Error::SizeUnavailable(_)
                | Error::InvalidBaseUrl(_)
                | Error::Json(_)
        )
    }

    /// Checks if the error occurred while pulling body bytes from a stream
    pub fn is_stream_error(&self) -> bool {
        matches!(
            self,
            Error::RangeViolation { .. } | Error::UnderlyingRead(_) | Error::StreamNotOpened
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encoder_error_display() {
        let errors = [
            Error::encoding("\u{fffd}"),
            Error::source_unavailable("/tmp/missing.bin"),
            Error::size_unavailable("/tmp/pipe"),
            Error::RangeViolation {
                position: 42,
                length: 10,
            },
            Error::StreamNotOpened,
        ];

        let expected = [
            "Value cannot be encoded as bytes: \u{fffd}",
            "Content source cannot be opened: /tmp/missing.bin",
            "Byte length of content source cannot be determined: /tmp/pipe",
            "Illegal range access: position 42 is outside stream of length 10",
            "Stream must be opened before reading",
        ];

        for (error, expected_msg) in errors.iter().zip(expected.iter()) {
            assert_eq!(error.to_string(), *expected_msg);
        }
    }

    #[test]
    fn test_request_error_display() {
        assert_eq!(
            Error::InvalidBaseUrl("not a url".to_string()).to_string(),
            "Invalid base URL: 'not a url'"
        );
        assert_eq!(
            Error::UnacceptableStatusCode(404).to_string(),
            "Unacceptable HTTP status code: 404"
        );
        assert_eq!(
            Error::connection("refused").to_string(),
            "Connection error: refused"
        );
    }

    #[test]
    fn test_is_build_error() {
        let build_errors = vec![
            Error::encoding("x"),
            Error::source_unavailable("/a"),
            Error::size_unavailable("/b"),
            Error::InvalidBaseUrl(String::new()),
        ];

        let stream_errors = vec![
            Error::RangeViolation {
                position: 1,
                length: 0,
            },
            Error::UnderlyingRead(std::io::Error::other("boom")),
            Error::StreamNotOpened,
        ];

        for error in &build_errors {
            assert!(error.is_build_error(), "Expected {error} to be build error");
            assert!(!error.is_stream_error());
        }

        for error in &stream_errors {
            assert!(
                error.is_stream_error(),
                "Expected {error} to be stream error"
            );
            assert!(!error.is_build_error());
        }
    }

    #[test]
    fn test_error_trait_implementation() {
        let error = Error::StreamNotOpened;
        let _: &dyn std::error::Error = &error;
    }

    #[test]
    fn test_io_error_round_trip() {
        let io = std::io::Error::new(std::io::ErrorKind::BrokenPipe, "pipe");
        let err: Error = io.into();
        let back: std::io::Error = err.into();
        assert_eq!(back.kind(), std::io::ErrorKind::BrokenPipe);
    }
}
