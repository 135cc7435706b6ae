//! Session boundary: hands built requests to a platform networking stack.
//!
//! No transport ships in this crate. A [`SessionAdapter`] implementation
//! (blocking HTTP client, test double, recording proxy) performs the actual
//! exchange; [`Session`] wires build, send, and parse together. Adapters
//! should surface transport failures as `Error::ConnectionError`.

use crate::error::Error;
use crate::request::{HttpRequest, Request};

/// Sends an assembled [`HttpRequest`] and returns raw body bytes plus the
/// HTTP status code. For a stream body entity the adapter pulls the stream
/// exactly once while writing the request body.
pub trait SessionAdapter {
    fn send(&self, request: HttpRequest) -> Result<(Vec<u8>, u16), Error>;
}

/// Drives typed requests through an adapter.
#[derive(Debug)]
pub struct Session<A> {
    adapter: A,
}

impl<A: SessionAdapter> Session<A> {
    pub fn new(adapter: A) -> Self {
        Session { adapter }
    }

    pub fn adapter(&self) -> &A {
        &self.adapter
    }

    /// Builds the request, exchanges it through the adapter, and parses the
    /// typed response. Build-stage failures surface before any bytes are
    /// sent; use `Error::is_build_error` to distinguish them.
    pub fn send<R: Request>(&self, request: &R) -> Result<R::Response, Error> {
        let http_request = request.build_http_request()?;
        log::debug!(
            "Sending {} {} ({} header(s))",
            http_request.method,
            http_request.url,
            http_request.headers.len()
        );

        let (data, status) = self.adapter.send(http_request)?;
        log::debug!("Received status {status}, {} byte(s)", data.len());

        request.parse_data(&data, status)
    }
}
