//! application/x-www-form-urlencoded serialization.

/// Serializes key/value pairs into a percent-encoded query string.
pub fn serialize(pairs: &[(String, String)]) -> String {
    pairs
        .iter()
        .map(|(key, value)| format!("{}={}", percent_encode(key), percent_encode(value)))
        .collect::<Vec<_>>()
        .join("&")
}

/// Parses a query string into key/value pairs, decoding percent escapes
/// and `+` as space. Segments without `=` are skipped.
pub fn deserialize(query: &str) -> Vec<(String, String)> {
    query
        .split('&')
        .filter(|segment| !segment.is_empty())
        .filter_map(|segment| {
            segment
                .split_once('=')
                .map(|(key, value)| (percent_decode(key), percent_decode(value)))
        })
        .collect()
}

/// Percent-encodes everything but unreserved characters (RFC 3986).
fn percent_encode(input: &str) -> String {
    let mut out = String::with_capacity(input.len());

    for byte in input.bytes() {
        match byte {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' => {
                out.push(byte as char);
            }
            _ => {
                out.push('%');
                out.push_str(&format!("{byte:02X}"));
            }
        }
    }

    out
}

fn percent_decode(input: &str) -> String {
    let mut bytes = Vec::with_capacity(input.len());
    let mut chars = input.bytes();

    while let Some(byte) = chars.next() {
        match byte {
            b'%' => {
                let hi = chars.next();
                let lo = chars.next();
                match (hi, lo) {
                    (Some(hi), Some(lo)) => {
                        let pair = [hi, lo];
                        match u8::from_str_radix(&String::from_utf8_lossy(&pair), 16) {
                            Ok(decoded) => bytes.push(decoded),
                            // Malformed escape, keep it literal
                            Err(_) => {
                                bytes.push(b'%');
                                bytes.push(hi);
                                bytes.push(lo);
                            }
                        }
                    }
                    (Some(hi), None) => {
                        bytes.push(b'%');
                        bytes.push(hi);
                    }
                    (None, _) => bytes.push(b'%'),
                }
            }
            b'+' => bytes.push(b' '),
            other => bytes.push(other),
        }
    }

    String::from_utf8_lossy(&bytes).into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pairs(raw: &[(&str, &str)]) -> Vec<(String, String)> {
        raw.iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_serialize_plain_pairs() {
        assert_eq!(
            serialize(&pairs(&[("a", "1"), ("b", "2")])),
            "a=1&b=2"
        );
    }

    #[test]
    fn test_serialize_escapes_reserved_characters() {
        assert_eq!(
            serialize(&pairs(&[("key", "a b&c=d")])),
            "key=a%20b%26c%3Dd"
        );
        assert_eq!(serialize(&pairs(&[("emoji", "日")])), "emoji=%E6%97%A5");
    }

    #[test]
    fn test_serialize_keeps_unreserved() {
        assert_eq!(
            serialize(&pairs(&[("k", "A-z_0.9~")])),
            "k=A-z_0.9~"
        );
    }

    #[test]
    fn test_deserialize_round() {
        let decoded = deserialize("q=rust%20lang&plus=a+b&empty=");
        assert_eq!(
            decoded,
            pairs(&[("q", "rust lang"), ("plus", "a b"), ("empty", "")])
        );
    }

    #[test]
    fn test_deserialize_skips_malformed_segments() {
        let decoded = deserialize("valid=1&novalue&=x");
        assert_eq!(decoded, pairs(&[("valid", "1"), ("", "x")]));
    }

    #[test]
    fn test_deserialize_malformed_escape_kept_literal() {
        assert_eq!(deserialize("k=%zz"), pairs(&[("k", "%zz")]));
        assert_eq!(deserialize("k=%2"), pairs(&[("k", "%2")]));
    }
}
