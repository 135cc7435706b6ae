//! Request body presentation and the body-parameters seam.
//!
//! `BodyParameters` is the contract a request uses to attach a body: it
//! states the `Content-Type` to send and builds a [`BodyEntity`], either a
//! fully materialized buffer or a pull-based stream handed to the transport.

use crate::error::Error;
use crate::multipart::MultipartStream;
use crate::urlencoded;
use serde::Serialize;

/// An encoded request body, ready for the transport.
#[derive(Debug)]
pub enum BodyEntity {
    /// Complete body bytes.
    Buffer(Vec<u8>),
    /// Pull-based source with a declared total length. Single-pass; the
    /// transport must not assume it can be read more than once.
    Stream(MultipartStream),
}

impl BodyEntity {
    /// Exact byte length of the body, known without reading it.
    pub fn len(&self) -> u64 {
        match self {
            BodyEntity::Buffer(data) => data.len() as u64,
            BodyEntity::Stream(stream) => stream.total_length(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Materializes the body, draining a stream entity if necessary.
    pub fn into_bytes(self) -> Result<Vec<u8>, Error> {
        match self {
            BodyEntity::Buffer(data) => Ok(data),
            BodyEntity::Stream(stream) => stream.into_bytes(),
        }
    }
}

/// States the `Content-Type` to send and builds the body entity.
///
/// `build_entity` is single-shot: a multipart body consumes its parts into
/// the stream it hands out.
pub trait BodyParameters {
    fn content_type(&self) -> String;

    fn build_entity(&mut self) -> Result<BodyEntity, Error>;
}

/// JSON request body.
#[derive(Debug)]
pub struct JsonBody(pub serde_json::Value);

impl JsonBody {
    /// Serializes any `Serialize` value into a JSON body.
    pub fn from_value<T: Serialize>(value: &T) -> Result<Self, Error> {
        Ok(JsonBody(serde_json::to_value(value)?))
    }
}

impl BodyParameters for JsonBody {
    fn content_type(&self) -> String {
        "application/json".to_string()
    }

    fn build_entity(&mut self) -> Result<BodyEntity, Error> {
        Ok(BodyEntity::Buffer(serde_json::to_vec(&self.0)?))
    }
}

/// application/x-www-form-urlencoded request body.
#[derive(Debug)]
pub struct FormUrlEncodedBody(pub Vec<(String, String)>);

impl BodyParameters for FormUrlEncodedBody {
    fn content_type(&self) -> String {
        "application/x-www-form-urlencoded".to_string()
    }

    fn build_entity(&mut self) -> Result<BodyEntity, Error> {
        Ok(BodyEntity::Buffer(
            urlencoded::serialize(&self.0).into_bytes(),
        ))
    }
}
