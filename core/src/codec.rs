//! Key/value encoding for query strings and form bodies.
//!
//! Query strings are escaped with `application/x-www-form-urlencoded`
//! rules (space becomes `+`). Form bodies are joined raw, without any
//! escaping. The two paths are kept distinct on purpose: servers talking to
//! this client already rely on the unescaped form body.

use std::collections::BTreeMap;
use std::fmt::{self, Write};

use url::form_urlencoded;

use crate::error::HttpError;

/// Parameter mapping. A `None` value is dropped at encoding time.
pub type Params = BTreeMap<String, Option<String>>;

/// Join the non-`None` entries of `params` as `key=value` pairs separated
/// by `&`, in key order. Returns an empty string when nothing survives the
/// filter.
pub fn encode(params: &Params, url_escape: bool) -> String {
    let mut out = String::new();
    for (key, value) in params {
        let Some(value) = value else { continue };
        if !out.is_empty() {
            out.push('&');
        }
        if url_escape {
            out.extend(form_urlencoded::byte_serialize(key.as_bytes()));
            out.push('=');
            out.extend(form_urlencoded::byte_serialize(value.as_bytes()));
        } else {
            out.push_str(key);
            out.push('=');
            out.push_str(value);
        }
    }
    out
}

/// Convert a parameter value to its string form.
///
/// `ToString` panics when a `Display` impl reports an error; this surfaces
/// it as `HttpError::Encoding` instead.
pub fn stringify<V: fmt::Display>(key: &str, value: V) -> Result<String, HttpError> {
    let mut out = String::new();
    write!(out, "{value}").map_err(|_| HttpError::Encoding {
        key: key.to_string(),
    })?;
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(entries: &[(&str, Option<&str>)]) -> Params {
        entries
            .iter()
            .map(|(k, v)| (k.to_string(), v.map(str::to_string)))
            .collect()
    }

    struct Broken;

    impl fmt::Display for Broken {
        fn fmt(&self, _: &mut fmt::Formatter<'_>) -> fmt::Result {
            Err(fmt::Error)
        }
    }

    #[test]
    fn empty_map_encodes_to_empty_string() {
        assert_eq!(encode(&Params::new(), true), "");
        assert_eq!(encode(&Params::new(), false), "");
    }

    #[test]
    fn all_none_values_encode_to_empty_string() {
        let p = params(&[("a", None), ("b", None)]);
        assert_eq!(encode(&p, true), "");
        assert_eq!(encode(&p, false), "");
    }

    #[test]
    fn none_values_are_skipped_without_dangling_separator() {
        let p = params(&[("a", Some("1")), ("b", None), ("c", Some("3"))]);
        assert_eq!(encode(&p, false), "a=1&c=3");
        let p = params(&[("a", Some("1")), ("z", None)]);
        assert_eq!(encode(&p, false), "a=1");
    }

    #[test]
    fn escaped_encoding_uses_plus_for_space() {
        let p = params(&[("q", Some("a b")), ("k y", Some("x&y=z"))]);
        assert_eq!(encode(&p, true), "k+y=x%26y%3Dz&q=a+b");
    }

    #[test]
    fn escaped_encoding_handles_utf8() {
        let p = params(&[("name", Some("café"))]);
        assert_eq!(encode(&p, true), "name=caf%C3%A9");
    }

    #[test]
    fn raw_encoding_leaves_values_untouched() {
        let p = params(&[("q", Some("a b")), ("r", Some("x&y"))]);
        assert_eq!(encode(&p, false), "q=a b&r=x&y");
    }

    #[test]
    fn escaped_output_parses_back_without_none_entries() {
        let p = params(&[("a", Some("1")), ("b", Some("x y")), ("c", None)]);
        let encoded = encode(&p, true);
        let decoded: BTreeMap<String, String> = form_urlencoded::parse(encoded.as_bytes())
            .into_owned()
            .collect();
        let expected: BTreeMap<String, String> = [("a", "1"), ("b", "x y")]
            .into_iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        assert_eq!(decoded, expected);
    }

    #[test]
    fn stringify_formats_display_values() {
        assert_eq!(stringify("n", 7).unwrap(), "7");
        assert_eq!(stringify("f", 1.5).unwrap(), "1.5");
        assert_eq!(stringify("s", "text").unwrap(), "text");
    }

    #[test]
    fn stringify_reports_failing_display() {
        let err = stringify("bad", Broken).unwrap_err();
        assert!(matches!(err, HttpError::Encoding { ref key } if key == "bad"));
    }
}
