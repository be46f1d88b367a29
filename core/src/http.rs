//! HTTP exchange types described as plain data.
//!
//! # Design
//! `HttpRequest` is the fully resolved form of a `RequestBuilder`: query
//! string already appended to the URL, form data already folded into the
//! body. Interceptors and tests inspect it without touching the network.
//! `HttpResponse` is what the transport hands back, with the body read
//! into a `String`.
//!
//! All fields use owned types so values outlive the transport call that
//! produced them.

use std::collections::BTreeMap;
use std::fmt;
use std::time::Duration;

/// Header mapping. `RequestBuilder` replaces keys case-insensitively, so
/// the last write wins whatever its case.
pub type Headers = BTreeMap<String, String>;

/// HTTP method for a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HttpMethod {
    Get,
    Post,
}

impl HttpMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A request ready to be sent.
///
/// Produced by `RequestBuilder::build`. `url` already carries the encoded
/// query string; `body` is `None` for GET and at least `Some("")` for POST,
/// so a body-less POST goes out with `Content-Length: 0`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpRequest {
    pub method: HttpMethod,
    pub url: String,
    pub headers: Headers,
    pub body: Option<String>,
    pub timeout: Option<Duration>,
}

impl HttpRequest {
    /// Path component of the URL, or the whole URL if it does not parse.
    pub fn path(&self) -> &str {
        let Some((_, rest)) = self.url.split_once("://") else {
            return &self.url;
        };
        let rest = rest.split(['?', '#']).next().unwrap_or(rest);
        match rest.find('/') {
            Some(idx) => &rest[idx..],
            None => "/",
        }
    }
}

/// A response returned by the transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body: String,
}

impl HttpResponse {
    /// First value of the named header, compared case-insensitively.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    pub fn is_redirect(&self) -> bool {
        (300..400).contains(&self.status)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(url: &str) -> HttpRequest {
        HttpRequest {
            method: HttpMethod::Get,
            url: url.to_string(),
            headers: Headers::new(),
            body: None,
            timeout: None,
        }
    }

    #[test]
    fn method_displays_uppercase() {
        assert_eq!(HttpMethod::Get.to_string(), "GET");
        assert_eq!(HttpMethod::Post.to_string(), "POST");
    }

    #[test]
    fn path_strips_scheme_host_and_query() {
        assert_eq!(request("http://h:8080/api/x?q=1").path(), "/api/x");
        assert_eq!(request("https://h/api#frag").path(), "/api");
        assert_eq!(request("http://h").path(), "/");
        assert_eq!(request("not a url").path(), "not a url");
    }

    #[test]
    fn response_header_lookup_ignores_case() {
        let response = HttpResponse {
            status: 302,
            headers: vec![("Location".to_string(), "/next".to_string())],
            body: String::new(),
        };
        assert_eq!(response.header("location"), Some("/next"));
        assert_eq!(response.header("content-type"), None);
        assert!(response.is_redirect());
        assert!(!response.is_success());
    }
}
