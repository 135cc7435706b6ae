//! # reqforge
//!
//! A library that builds HTTP requests from typed descriptions and parses
//! typed responses. Describe an endpoint by implementing
//! [`request::Request`]; the library assembles the URL, query string,
//! headers, and body, and turns raw response bytes back into your type.
//!
//! The centerpiece is the streaming multipart/form-data encoder in
//! [`multipart`]: heterogeneous content sources (in-memory buffers, files)
//! are composed into a single wire-format byte stream whose total length is
//! known up front, consumable either as one materialized buffer or pulled
//! incrementally by the transport. Transports themselves live behind the
//! [`session::SessionAdapter`] trait and are not part of this crate.

pub mod body;
pub mod error;
pub mod multipart;
pub mod parser;
pub mod part;
pub mod request;
pub mod session;
pub mod source;
pub mod urlencoded;
