// SPDX-License-Identifier: MIT

//! Streaming multipart/form-data body encoder.
//!
//! Composes an ordered list of [`Part`]s into a single sequential byte
//! stream conforming to the multipart/form-data wire format, without
//! materializing the payload. Each part is wrapped in a [`PartFrame`] that
//! adds the boundary header and the CRLF footer around the raw content; a
//! [`MultipartStream`] concatenates all frames plus the closing boundary
//! marker and resolves absolute read positions across them.
//!
//! The stream is pull-based and single-pass: the consumer (transport or
//! buffer drain) issues `read` calls with its own capacity, one at a time,
//! and a stream instance is discarded after one full traversal. Total
//! length is known before the first byte is produced, because every part
//! declares its exact content length at construction.
//!
//! Wire format, per part in order:
//!
//! ```text
//! --{boundary}\r\n
//! Content-Disposition: form-data; name="{name}"[; filename="{file}"]\r\n
//! [Content-Type: {mime}\r\n]
//! \r\n
//! {content}\r\n
//! ```
//!
//! followed by `--{boundary}--\r\n` after the last part.

use crate::body::{BodyEntity, BodyParameters};
use crate::error::Error;
use crate::part::Part;
use std::io::Read;

/// Fixed footer after each part's content
const PART_FOOTER: &[u8] = b"\r\n";

/// Scratch buffer size for draining a stream into a contiguous buffer
const DRAIN_CHUNK_SIZE: usize = 64 * 1024;

/// A [`Part`] wrapped with the header and footer bytes that surround it on
/// the wire. The frame is addressable as three contiguous, gapless
/// sub-ranges of `[0, total_length)`: header, body, footer.
#[derive(Debug)]
pub struct PartFrame {
    header: Vec<u8>,
    part: Part,
    total_length: u64,
}

impl PartFrame {
    pub(crate) fn new(part: Part, boundary: &str) -> Self {
        let name = &part.name;

        // Three header forms, keyed on which metadata fields are present.
        // A filename without a MIME type falls into the bare form; values
        // are interpolated verbatim, unescaped.
        let header = match (&part.mime_type, &part.file_name) {
            (Some(mime_type), Some(file_name)) => format!(
                "--{boundary}\r\nContent-Disposition: form-data; name=\"{name}\"; filename=\"{file_name}\"\r\nContent-Type: {mime_type}\r\n\r\n"
            ),
            (Some(mime_type), None) => format!(
                "--{boundary}\r\nContent-Disposition: form-data; name=\"{name}\"; \r\nContent-Type: {mime_type}\r\n\r\n"
            ),
            (None, _) => {
                format!("--{boundary}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n")
            }
        }
        .into_bytes();

        let total_length = header.len() as u64 + part.length + PART_FOOTER.len() as u64;

        PartFrame {
            header,
            part,
            total_length,
        }
    }

    pub fn total_length(&self) -> u64 {
        self.total_length
    }

    /// Serves one bounded read at the frame-relative `position`. Dispatches
    /// to whichever sub-range contains the position and never crosses into
    /// the next sub-range; the caller issues a fresh dispatch once a
    /// sub-range is exhausted. Body reads delegate to the part's content
    /// source and may be short.
    fn read_at(&mut self, position: u64, buf: &mut [u8]) -> Result<usize, Error> {
        let header_end = self.header.len() as u64;
        let body_end = header_end + self.part.length;

        if position < header_end {
            let start = position as usize;
            let n = buf.len().min(self.header.len() - start);
            buf[..n].copy_from_slice(&self.header[start..start + n]);
            Ok(n)
        } else if position < body_end {
            let capacity = buf.len().min((body_end - position) as usize);
            self.part.source.read(&mut buf[..capacity])
        } else if position < self.total_length {
            let start = (position - body_end) as usize;
            let n = buf.len().min(PART_FOOTER.len() - start);
            buf[..n].copy_from_slice(&PART_FOOTER[start..start + n]);
            Ok(n)
        } else {
            // Unreachable with correct position bookkeeping upstream.
            log::error!(
                "Illegal range access in part frame '{}': {position} >= {}",
                self.part.name,
                self.total_length
            );
            Err(Error::RangeViolation {
                position,
                length: self.total_length,
            })
        }
    }
}

/// Lifecycle of a [`MultipartStream`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamState {
    NotOpened,
    Open,
    Reading,
    AtEnd,
    Closed,
}

/// The composite byte stream over all part frames plus the closing
/// boundary marker.
///
/// Construction performs no I/O; file-backed parts open their handles on
/// first read. The stream serves exactly one consumer for exactly one
/// pass and is not rewindable; build a fresh stream per request attempt.
#[derive(Debug)]
pub struct MultipartStream {
    frames: Vec<PartFrame>,
    closing: Vec<u8>,
    total_length: u64,
    position: u64,
    state: StreamState,
}

impl MultipartStream {
    pub fn new(parts: Vec<Part>, boundary: &str) -> Self {
        let frames: Vec<PartFrame> = parts
            .into_iter()
            .map(|part| PartFrame::new(part, boundary))
            .collect();
        let closing = format!("--{boundary}--\r\n").into_bytes();
        let total_length = frames
            .iter()
            .fold(closing.len() as u64, |sum, frame| sum + frame.total_length);

        MultipartStream {
            frames,
            closing,
            total_length,
            position: 0,
            state: StreamState::NotOpened,
        }
    }

    /// Total number of bytes this stream will yield, known up front.
    pub fn total_length(&self) -> u64 {
        self.total_length
    }

    pub fn state(&self) -> StreamState {
        self.state
    }

    pub fn has_bytes_available(&self) -> bool {
        self.position < self.total_length
    }

    pub fn open(&mut self) {
        if self.state == StreamState::NotOpened {
            log::debug!(
                "Opening multipart stream: {} frame(s), {} bytes total",
                self.frames.len(),
                self.total_length
            );
            self.state = StreamState::Open;
        }
    }

    /// Closes the stream. Terminal: subsequent reads return 0 and never
    /// resume producing bytes.
    pub fn close(&mut self) {
        self.state = StreamState::Closed;
    }

    /// Reads up to `buf.len()` bytes, returning the number produced. May
    /// serve several sub-ranges (and several frames) within one call by
    /// issuing fresh bounded dispatches as each range is exhausted. Returns
    /// 0 only at true end-of-stream (or after `close`). Any error from an
    /// underlying source is terminal; the stream never skips a failed
    /// source and resumes.
    pub fn read(&mut self, buf: &mut [u8]) -> Result<usize, Error> {
        match self.state {
            StreamState::NotOpened => return Err(Error::StreamNotOpened),
            StreamState::Closed => return Ok(0),
            _ => self.state = StreamState::Reading,
        }

        let mut produced = 0;

        while produced < buf.len() && self.position < self.total_length {
            let n = self.dispatch(&mut buf[produced..])?;
            if n == 0 {
                // Source temporarily exhausted; stop rather than spin.
                break;
            }
            produced += n;
            self.position += n as u64;
        }

        if self.state != StreamState::Closed && !self.has_bytes_available() {
            self.state = StreamState::AtEnd;
        }

        Ok(produced)
    }

    /// Locates the frame (or the closing region) covering the current
    /// position by a linear offset scan and issues one bounded read into
    /// it. Body construction typically involves few parts, so no index
    /// structure is kept.
    fn dispatch(&mut self, buf: &mut [u8]) -> Result<usize, Error> {
        let mut offset = 0u64;

        for frame in &mut self.frames {
            let end = offset + frame.total_length;
            if self.position < end {
                return frame.read_at(self.position - offset, buf);
            }
            offset = end;
        }

        let closing_end = offset + self.closing.len() as u64;
        if self.position < closing_end {
            let start = (self.position - offset) as usize;
            let n = buf.len().min(self.closing.len() - start);
            buf[..n].copy_from_slice(&self.closing[start..start + n]);
            return Ok(n);
        }

        log::error!(
            "Illegal range access in multipart stream: {} >= {}",
            self.position,
            self.total_length
        );
        Err(Error::RangeViolation {
            position: self.position,
            length: self.total_length,
        })
    }

    /// Drains the whole stream into one contiguous buffer using a fixed
    /// scratch buffer. Opens the stream if needed; any read failure aborts.
    pub fn into_bytes(mut self) -> Result<Vec<u8>, Error> {
        self.open();

        let mut out = Vec::with_capacity(self.total_length as usize);
        let mut scratch = vec![0u8; DRAIN_CHUNK_SIZE];

        loop {
            let n = self.read(&mut scratch)?;
            if n == 0 {
                break;
            }
            out.extend_from_slice(&scratch[..n]);
        }

        Ok(out)
    }
}

impl Read for MultipartStream {
    fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        MultipartStream::read(self, buf).map_err(std::io::Error::from)
    }
}

/// Hash-seeded xorshift; good enough for boundary strings, avoids an RNG
/// dependency.
fn fast_random() -> u64 {
    use std::cell::Cell;
    use std::collections::hash_map::RandomState;
    use std::hash::{BuildHasher, Hasher};

    fn seed() -> u64 {
        let state = RandomState::new();
        let mut out = 0;
        let mut counter = 0usize;
        while out == 0 {
            counter += 1;
            let mut hasher = state.build_hasher();
            hasher.write_usize(counter);
            out = hasher.finish();
        }
        out
    }

    thread_local! {
        static RNG: Cell<u64> = Cell::new(seed());
    }

    RNG.with(|rng| {
        let mut n = rng.get();
        n ^= n << 13;
        n ^= n >> 7;
        n ^= n << 17;
        rng.set(n);
        n
    })
}

/// Generates a random boundary string. Uniqueness against part content is
/// not checked; that remains the caller's responsibility.
pub fn gen_boundary() -> String {
    let a = fast_random();
    let b = fast_random();
    format!("{a:016x}{b:016x}")
}

/// How the encoded body is presented to the transport.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EntityKind {
    /// Fully materialized buffer. Faster upload path, larger memory usage.
    #[default]
    Buffer,
    /// Pull-based stream. Smaller memory usage; the transport pulls bytes
    /// incrementally while writing the request body.
    Stream,
}

/// Body parameters serializing an ordered list of [`Part`]s as
/// multipart/form-data.
#[derive(Debug)]
pub struct MultipartFormData {
    pub parts: Vec<Part>,
    pub boundary: String,
    pub kind: EntityKind,
}

impl MultipartFormData {
    /// Creates multipart body parameters with a generated boundary and
    /// buffered presentation.
    pub fn new(parts: Vec<Part>) -> Self {
        MultipartFormData {
            parts,
            boundary: gen_boundary(),
            kind: EntityKind::Buffer,
        }
    }

    pub fn with_boundary<S: Into<String>>(parts: Vec<Part>, boundary: S) -> Self {
        MultipartFormData {
            parts,
            boundary: boundary.into(),
            kind: EntityKind::Buffer,
        }
    }

    pub fn kind(mut self, kind: EntityKind) -> Self {
        self.kind = kind;
        self
    }
}

impl BodyParameters for MultipartFormData {
    fn content_type(&self) -> String {
        format!("multipart/form-data; boundary={}", self.boundary)
    }

    fn build_entity(&mut self) -> Result<BodyEntity, Error> {
        let parts = std::mem::take(&mut self.parts);
        let mut stream = MultipartStream::new(parts, &self.boundary);

        match self.kind {
            EntityKind::Stream => {
                stream.open();
                Ok(BodyEntity::Stream(stream))
            }
            EntityKind::Buffer => Ok(BodyEntity::Buffer(stream.into_bytes()?)),
        }
    }
}
