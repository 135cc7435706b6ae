//! Typed request descriptions and HTTP request assembly.
//!
//! A type implementing [`Request`] describes one Web API endpoint: method,
//! base URL, path, query, body, headers, and how to turn the parsed
//! response value into the typed `Response`. `build_http_request` maps the
//! description to a concrete [`HttpRequest`] for a session adapter.

use crate::body::{BodyEntity, BodyParameters};
use crate::error::Error;
use crate::parser::ResponseParser;
use crate::urlencoded;
use std::collections::HashMap;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
    Put,
    Head,
    Delete,
    Patch,
    Trace,
    Options,
    Connect,
}

impl Method {
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Put => "PUT",
            Method::Head => "HEAD",
            Method::Delete => "DELETE",
            Method::Patch => "PATCH",
            Method::Trace => "TRACE",
            Method::Options => "OPTIONS",
            Method::Connect => "CONNECT",
        }
    }

    /// Whether parameters for this method conventionally travel in the URL
    /// query rather than the body.
    pub fn prefers_query_parameters(&self) -> bool {
        matches!(self, Method::Get | Method::Head | Method::Delete)
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A fully assembled outgoing HTTP request, ready for a session adapter.
#[derive(Debug)]
pub struct HttpRequest {
    pub method: Method,
    pub url: String,
    pub headers: HashMap<String, String>,
    pub body: Option<BodyEntity>,
}

/// A typed description of one Web API request.
pub trait Request {
    /// The typed response produced from the parsed body.
    type Response;

    /// The response-body parser; contributes the `Accept` header.
    type Parser: ResponseParser;

    fn method(&self) -> Method;

    /// Absolute base URL, e.g. `https://api.example.com`.
    fn base_url(&self) -> String;

    /// Path component appended to the base URL.
    fn path(&self) -> String;

    fn parser(&self) -> Self::Parser;

    /// Builds `Response` from the parsed and intercepted body value.
    fn parse_response(
        &self,
        value: <Self::Parser as ResponseParser>::Output,
        status: u16,
    ) -> Result<Self::Response, Error>;

    /// Percent-encoded into the URL query when non-empty.
    fn query_parameters(&self) -> Vec<(String, String)> {
        Vec::new()
    }

    /// Body parameters; contribute the `Content-Type` header and entity.
    fn body_parameters(&self) -> Option<Box<dyn BodyParameters>> {
        None
    }

    /// Extra header fields. These win over headers contributed by the
    /// parser and body parameters.
    fn header_fields(&self) -> HashMap<String, String> {
        HashMap::new()
    }

    /// Last hook before the request is handed to the adapter.
    fn intercept_request(&self, request: HttpRequest) -> Result<HttpRequest, Error> {
        Ok(request)
    }

    /// Hook between parsing and `parse_response`. The default rejects any
    /// status outside `200..300`.
    fn intercept_parsed(
        &self,
        value: <Self::Parser as ResponseParser>::Output,
        status: u16,
    ) -> Result<<Self::Parser as ResponseParser>::Output, Error> {
        if !(200..300).contains(&status) {
            return Err(Error::UnacceptableStatusCode(status));
        }
        Ok(value)
    }

    /// Assembles the concrete [`HttpRequest`] from this description.
    fn build_http_request(&self) -> Result<HttpRequest, Error> {
        let base = self.base_url();
        if !(base.starts_with("http://") || base.starts_with("https://")) {
            return Err(Error::InvalidBaseUrl(base));
        }

        let mut url = base.trim_end_matches('/').to_string();
        let path = self.path();
        if !path.is_empty() {
            if !path.starts_with('/') {
                url.push('/');
            }
            url.push_str(&path);
        }

        let query = self.query_parameters();
        if !query.is_empty() {
            url.push('?');
            url.push_str(&urlencoded::serialize(&query));
        }

        let mut headers = HashMap::new();
        if let Some(accept) = self.parser().content_type() {
            headers.insert("Accept".to_string(), accept);
        }

        let mut body = None;
        if let Some(mut parameters) = self.body_parameters() {
            headers.insert("Content-Type".to_string(), parameters.content_type());
            let entity = parameters.build_entity()?;
            // Length is always known up front, even for stream entities;
            // the transport never needs chunked encoding.
            headers.insert("Content-Length".to_string(), entity.len().to_string());
            body = Some(entity);
        }

        for (key, value) in self.header_fields() {
            headers.insert(key, value);
        }

        log::debug!("Built request: {} {url}", self.method());

        self.intercept_request(HttpRequest {
            method: self.method(),
            url,
            headers,
            body,
        })
    }

    /// Builds the typed `Response` from raw response bytes and status:
    /// parser, then `intercept_parsed`, then `parse_response`.
    fn parse_data(&self, data: &[u8], status: u16) -> Result<Self::Response, Error> {
        let parsed = self.parser().parse(data)?;
        let passed = self.intercept_parsed(parsed, status)?;
        self.parse_response(passed, status)
    }
}
