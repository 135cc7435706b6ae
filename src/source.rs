//! Pull-based byte sources backing multipart part content.
//!
//! A `ByteSource` is the single capability the encoder composes over:
//! `read(buf) -> Result<usize>`. Two variants exist, an in-memory cursor
//! and a lazily-opened file cursor. The file handle is opened on the first
//! read, not at construction, so the number of concurrently open handles is
//! bounded by the parts actively being read.

use crate::error::Error;
use std::fs::File;
use std::io::Read;
use std::path::PathBuf;

#[derive(Debug)]
pub enum ByteSource {
    /// In-memory buffer with a read cursor.
    Memory { data: Vec<u8>, cursor: usize },
    /// File-backed source. `handle` stays `None` until the first read.
    File {
        path: PathBuf,
        handle: Option<File>,
    },
}

impl ByteSource {
    pub fn memory(data: Vec<u8>) -> Self {
        ByteSource::Memory { data, cursor: 0 }
    }

    pub fn file<P: Into<PathBuf>>(path: P) -> Self {
        ByteSource::File {
            path: path.into(),
            handle: None,
        }
    }

    /// Reads up to `buf.len()` bytes into `buf`, returning the number of
    /// bytes produced. Short reads are legal; `Ok(0)` means the source is
    /// exhausted. An I/O failure (including a lazy open that fails) is
    /// reported as `Error::UnderlyingRead` and must be treated as terminal
    /// by the caller.
    pub fn read(&mut self, buf: &mut [u8]) -> Result<usize, Error> {
        match self {
            ByteSource::Memory { data, cursor } => {
                let remaining = data.len().saturating_sub(*cursor);
                let n = remaining.min(buf.len());
                buf[..n].copy_from_slice(&data[*cursor..*cursor + n]);
                *cursor += n;
                Ok(n)
            }
            ByteSource::File { path, handle } => {
                let file = match handle {
                    Some(file) => file,
                    None => {
                        log::debug!("Opening content source: {}", path.display());
                        handle.insert(File::open(&path).map_err(Error::UnderlyingRead)?)
                    }
                };
                file.read(buf).map_err(Error::UnderlyingRead)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_memory_source_short_reads() {
        let mut source = ByteSource::memory(b"hello".to_vec());
        let mut buf = [0u8; 2];

        assert_eq!(source.read(&mut buf).unwrap(), 2);
        assert_eq!(&buf, b"he");
        assert_eq!(source.read(&mut buf).unwrap(), 2);
        assert_eq!(&buf, b"ll");
        assert_eq!(source.read(&mut buf).unwrap(), 1);
        assert_eq!(buf[0], b'o');
        assert_eq!(source.read(&mut buf).unwrap(), 0);
        assert_eq!(source.read(&mut buf).unwrap(), 0);
    }

    #[test]
    fn test_memory_source_large_capacity() {
        let mut source = ByteSource::memory(b"abc".to_vec());
        let mut buf = [0u8; 64];
        assert_eq!(source.read(&mut buf).unwrap(), 3);
        assert_eq!(&buf[..3], b"abc");
    }

    #[test]
    fn test_file_source_opens_lazily() {
        let mut tmp = tempfile::NamedTempFile::new().unwrap();
        tmp.write_all(b"file content").unwrap();

        let mut source = ByteSource::file(tmp.path());
        if let ByteSource::File { handle, .. } = &source {
            assert!(handle.is_none(), "Handle must not open at construction");
        }

        let mut buf = [0u8; 32];
        assert_eq!(source.read(&mut buf).unwrap(), 12);
        assert_eq!(&buf[..12], b"file content");

        if let ByteSource::File { handle, .. } = &source {
            assert!(handle.is_some());
        }
    }

    #[test]
    fn test_file_source_open_failure_is_read_error() {
        let mut source = ByteSource::file("/nonexistent/reqforge-test-file");
        let mut buf = [0u8; 8];
        let err = source.read(&mut buf).unwrap_err();
        assert!(matches!(err, Error::UnderlyingRead(_)));
    }
}
