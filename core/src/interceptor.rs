//! Observers invoked around every exchange.
//!
//! # Design
//! Interceptors watch; they never change the request or the response. A
//! hook that returns an error is logged at `warn` and skipped, so a broken
//! observer cannot stop a request from going out or hide its result.
//! `after_http` fires exactly once per `execute`, whatever the outcome.

use std::error::Error as StdError;

use crate::error::HttpError;
use crate::http::{Headers, HttpMethod, HttpRequest, HttpResponse};

/// Error type hooks may return.
pub type HookError = Box<dyn StdError + Send + Sync>;

pub type HookResult = Result<(), HookError>;

/// Body length kept in log lines by the default interceptor.
pub const DEFAULT_MAX_BODY_LEN: usize = 1000;

/// One finished exchange: the request and either its response or the
/// failure that ended it.
#[derive(Debug, Clone, Copy)]
pub struct Exchange<'a> {
    pub request: &'a HttpRequest,
    pub outcome: Result<&'a HttpResponse, &'a HttpError>,
}

impl<'a> Exchange<'a> {
    pub fn response(&self) -> Option<&'a HttpResponse> {
        self.outcome.ok()
    }

    pub fn failure(&self) -> Option<&'a HttpError> {
        self.outcome.err()
    }
}

/// Hooks run before and after each exchange, in registration order.
pub trait Interceptor: Send + Sync {
    fn before_http(
        &self,
        _url: &str,
        _method: HttpMethod,
        _body: Option<&str>,
        _headers: &Headers,
    ) -> HookResult {
        Ok(())
    }

    fn after_http(&self, _exchange: &Exchange<'_>) -> HookResult {
        Ok(())
    }
}

/// Logs each request and its outcome through `tracing`.
///
/// Bodies are cut to `max_body_len` characters. A 302 response logs its
/// `Location` header instead of the body.
#[derive(Debug, Clone)]
pub struct LoggingInterceptor {
    max_body_len: usize,
}

impl LoggingInterceptor {
    pub fn new() -> Self {
        Self {
            max_body_len: DEFAULT_MAX_BODY_LEN,
        }
    }

    pub fn with_max_body_len(max_body_len: usize) -> Self {
        Self { max_body_len }
    }
}

impl Default for LoggingInterceptor {
    fn default() -> Self {
        Self::new()
    }
}

impl Interceptor for LoggingInterceptor {
    fn before_http(
        &self,
        url: &str,
        method: HttpMethod,
        body: Option<&str>,
        headers: &Headers,
    ) -> HookResult {
        tracing::info!(
            %method,
            url,
            body = truncate(body.unwrap_or_default(), self.max_body_len),
            ?headers,
            "sending request"
        );
        Ok(())
    }

    fn after_http(&self, exchange: &Exchange<'_>) -> HookResult {
        let path = exchange.request.path();
        match exchange.outcome {
            Err(err) => {
                tracing::error!(path, error = %err, "request failed");
            }
            Ok(response) if response.status == 302 => {
                tracing::info!(
                    status = response.status,
                    path,
                    location = response.header("location").unwrap_or_default(),
                    "redirect received"
                );
            }
            Ok(response) => {
                tracing::info!(
                    status = response.status,
                    path,
                    body = truncate(&response.body, self.max_body_len),
                    "response received"
                );
            }
        }
        Ok(())
    }
}

/// First `max_chars` characters of `s`, never splitting a code point.
pub fn truncate(s: &str, max_chars: usize) -> &str {
    match s.char_indices().nth(max_chars) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tracing_test::traced_test;

    fn request() -> HttpRequest {
        HttpRequest {
            method: HttpMethod::Post,
            url: "http://h/api/login?x=1".to_string(),
            headers: Headers::new(),
            body: Some("payload".to_string()),
            timeout: None,
        }
    }

    fn response(status: u16, headers: &[(&str, &str)], body: &str) -> HttpResponse {
        HttpResponse {
            status,
            headers: headers
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
            body: body.to_string(),
        }
    }

    #[test]
    fn truncate_keeps_short_strings() {
        assert_eq!(truncate("abc", 10), "abc");
        assert_eq!(truncate("", 0), "");
    }

    #[test]
    fn truncate_cuts_on_char_boundary() {
        assert_eq!(truncate("abcdef", 3), "abc");
        assert_eq!(truncate("ééé", 2), "éé");
    }

    #[test]
    fn exchange_exposes_exactly_one_side() {
        let req = request();
        let resp = response(200, &[], "ok");
        let ok = Exchange {
            request: &req,
            outcome: Ok(&resp),
        };
        assert!(ok.response().is_some());
        assert!(ok.failure().is_none());

        let err = HttpError::InvalidUsage("x".to_string());
        let failed = Exchange {
            request: &req,
            outcome: Err(&err),
        };
        assert!(failed.response().is_none());
        assert!(failed.failure().is_some());
    }

    #[traced_test]
    #[test]
    fn logs_request_before_send() {
        let mut headers = Headers::new();
        headers.insert("X-Trace".to_string(), "abc".to_string());
        LoggingInterceptor::new()
            .before_http("http://h/api", HttpMethod::Post, Some("n=7"), &headers)
            .unwrap();
        assert!(logs_contain("sending request"));
        assert!(logs_contain("POST"));
        assert!(logs_contain("http://h/api"));
        assert!(logs_contain("n=7"));
        assert!(logs_contain("X-Trace"));
    }

    #[traced_test]
    #[test]
    fn logs_truncated_response_body() {
        let req = request();
        let body = format!("{}{}", "a".repeat(5), "TAIL");
        let resp = response(200, &[], &body);
        LoggingInterceptor::with_max_body_len(5)
            .after_http(&Exchange {
                request: &req,
                outcome: Ok(&resp),
            })
            .unwrap();
        assert!(logs_contain("response received"));
        assert!(logs_contain("/api/login"));
        assert!(logs_contain("aaaaa"));
        assert!(!logs_contain("TAIL"));
    }

    #[traced_test]
    #[test]
    fn logs_location_for_302() {
        let req = request();
        let resp = response(302, &[("Location", "http://h/next")], "SECRET BODY");
        LoggingInterceptor::new()
            .after_http(&Exchange {
                request: &req,
                outcome: Ok(&resp),
            })
            .unwrap();
        assert!(logs_contain("redirect received"));
        assert!(logs_contain("http://h/next"));
        assert!(!logs_contain("SECRET BODY"));
    }

    #[traced_test]
    #[test]
    fn logs_failure_at_error_level() {
        let req = request();
        let err = HttpError::InvalidUsage("boom".to_string());
        LoggingInterceptor::new()
            .after_http(&Exchange {
                request: &req,
                outcome: Err(&err),
            })
            .unwrap();
        assert!(logs_contain("ERROR"));
        assert!(logs_contain("request failed"));
        assert!(logs_contain("boom"));
    }
}
