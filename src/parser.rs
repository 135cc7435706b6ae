//! Typed response-body parsers.
//!
//! A parser states the `Accept` value for the request and converts raw
//! response bytes into its output type.

use crate::error::Error;
use crate::urlencoded;

pub trait ResponseParser {
    type Output;

    /// Value for the request's `Accept` header field, if any.
    fn content_type(&self) -> Option<String>;

    fn parse(&self, data: &[u8]) -> Result<Self::Output, Error>;
}

/// Parses the response body as JSON.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonParser;

impl ResponseParser for JsonParser {
    type Output = serde_json::Value;

    fn content_type(&self) -> Option<String> {
        Some("application/json".to_string())
    }

    fn parse(&self, data: &[u8]) -> Result<Self::Output, Error> {
        // An empty body parses as JSON null, matching lenient servers that
        // send nothing on 204-style responses.
        if data.is_empty() {
            return Ok(serde_json::Value::Null);
        }
        Ok(serde_json::from_slice(data)?)
    }
}

/// Returns the response body as a UTF-8 string.
#[derive(Debug, Clone, Copy, Default)]
pub struct StringParser;

impl ResponseParser for StringParser {
    type Output = String;

    fn content_type(&self) -> Option<String> {
        None
    }

    fn parse(&self, data: &[u8]) -> Result<Self::Output, Error> {
        String::from_utf8(data.to_vec())
            .map_err(|err| Error::InvalidData(format!("response is not valid UTF-8: {err}")))
    }
}

/// Parses an application/x-www-form-urlencoded response body.
#[derive(Debug, Clone, Copy, Default)]
pub struct FormUrlEncodedParser;

impl ResponseParser for FormUrlEncodedParser {
    type Output = Vec<(String, String)>;

    fn content_type(&self) -> Option<String> {
        Some("application/x-www-form-urlencoded".to_string())
    }

    fn parse(&self, data: &[u8]) -> Result<Self::Output, Error> {
        let text = std::str::from_utf8(data)
            .map_err(|err| Error::InvalidData(format!("response is not valid UTF-8: {err}")))?;
        Ok(urlencoded::deserialize(text))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_json_parser() {
        let value = JsonParser.parse(br#"{"ok":true}"#).unwrap();
        assert_eq!(value, json!({"ok": true}));
        assert_eq!(JsonParser.content_type().as_deref(), Some("application/json"));
    }

    #[test]
    fn test_json_parser_empty_body() {
        assert_eq!(JsonParser.parse(b"").unwrap(), serde_json::Value::Null);
    }

    #[test]
    fn test_json_parser_invalid() {
        assert!(matches!(
            JsonParser.parse(b"{not json").unwrap_err(),
            Error::Json(_)
        ));
    }

    #[test]
    fn test_string_parser() {
        assert_eq!(StringParser.parse(b"plain text").unwrap(), "plain text");
        assert!(StringParser.content_type().is_none());
    }

    #[test]
    fn test_string_parser_invalid_utf8() {
        assert!(matches!(
            StringParser.parse(&[0xFF, 0xFE]).unwrap_err(),
            Error::InvalidData(_)
        ));
    }

    #[test]
    fn test_form_urlencoded_parser() {
        let parsed = FormUrlEncodedParser.parse(b"a=1&b=two%20words").unwrap();
        assert_eq!(
            parsed,
            vec![
                ("a".to_string(), "1".to_string()),
                ("b".to_string(), "two words".to_string()),
            ]
        );
    }
}
