//! Per-request configuration and the `execute` entry point.
//!
//! # Design
//! `RequestBuilder` is owned by value: every option consumes the builder
//! and hands it back, so a half-configured request never ends up shared
//! between threads. Nothing touches the network until `execute`.
//!
//! Body and form data only apply to POST. On a GET builder those calls are
//! ignored (logged at `debug`), never rejected. When both a body and form
//! data are present, the body wins; form data is only folded into the body
//! when the body is empty. A POST always carries a body, empty if nothing
//! was set.
//!
//! Form bodies are joined without escaping while query strings are
//! percent-encoded. Callers depend on both behaviors; see `codec`.

use std::collections::BTreeSet;
use std::fmt;
use std::time::Duration;

use crate::client::HttpClient;
use crate::codec::{self, Params};
use crate::error::HttpError;
use crate::http::{Headers, HttpMethod, HttpRequest, HttpResponse};
use crate::interceptor::Exchange;

pub const CONTENT_TYPE: &str = "Content-Type";
pub const APPLICATION_JSON: &str = "application/json";
pub const FORM_URLENCODED: &str = "application/x-www-form-urlencoded";

/// Builder for a single request, created by `HttpClient::post`/`get` or
/// the crate-level `post`/`get` helpers.
#[must_use = "a request is only sent by `execute`"]
pub struct RequestBuilder<'c> {
    client: &'c HttpClient,
    method: HttpMethod,
    url: String,
    headers: Headers,
    query: Params,
    form: Params,
    body: Option<String>,
    timeout: Option<Duration>,
    unencodable_query: BTreeSet<String>,
    unencodable_form: BTreeSet<String>,
}

impl<'c> RequestBuilder<'c> {
    pub(crate) fn new(client: &'c HttpClient, method: HttpMethod, url: String) -> Self {
        Self {
            client,
            method,
            url,
            headers: Headers::new(),
            query: Params::new(),
            form: Params::new(),
            body: None,
            timeout: None,
            unencodable_query: BTreeSet::new(),
            unencodable_form: BTreeSet::new(),
        }
    }

    /// Set a header, replacing any previous value under the same name
    /// regardless of case.
    pub fn header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.set_header(key.into(), value.into());
        self
    }

    pub fn headers<I, K, V>(mut self, headers: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        for (key, value) in headers {
            self.set_header(key.into(), value.into());
        }
        self
    }

    /// Raw JSON body. POST only. Always resets `Content-Type` to
    /// `application/json`, even if the caller set another value earlier.
    pub fn request_body(mut self, body: impl Into<String>) -> Self {
        if !self.accepts_payload("request_body") {
            return self;
        }
        self.body = Some(body.into());
        self.set_header(CONTENT_TYPE.to_string(), APPLICATION_JSON.to_string());
        self
    }

    /// Add one form field. POST only.
    pub fn form_data(mut self, key: impl Into<String>, value: impl fmt::Display) -> Self {
        if !self.accepts_payload("form_data") {
            return self;
        }
        let key = key.into();
        self.put_param(Target::Form, key, Some(value));
        self.set_header(CONTENT_TYPE.to_string(), FORM_URLENCODED.to_string());
        self
    }

    /// Merge form fields. POST only. `None` values are kept in the map but
    /// left out of the encoded body.
    pub fn form_data_map<I, K, V>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = (K, Option<V>)>,
        K: Into<String>,
        V: fmt::Display,
    {
        if !self.accepts_payload("form_data_map") {
            return self;
        }
        for (key, value) in fields {
            self.put_param(Target::Form, key.into(), value);
        }
        self.set_header(CONTENT_TYPE.to_string(), FORM_URLENCODED.to_string());
        self
    }

    pub fn request_parameter(mut self, key: impl Into<String>, value: impl fmt::Display) -> Self {
        self.put_param(Target::Query, key.into(), Some(value));
        self
    }

    pub fn request_parameters<I, K, V>(mut self, params: I) -> Self
    where
        I: IntoIterator<Item = (K, Option<V>)>,
        K: Into<String>,
        V: fmt::Display,
    {
        for (key, value) in params {
            self.put_param(Target::Query, key.into(), value);
        }
        self
    }

    /// Overall timeout in seconds. Defaults to the client's (10s).
    pub fn timeout(self, secs: u64) -> Self {
        self.timeout_duration(Duration::from_secs(secs))
    }

    pub fn timeout_duration(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Resolve the configuration into the request `execute` would send.
    pub fn build(&self) -> Result<HttpRequest, HttpError> {
        if let Some(key) = self.unencodable_query.first() {
            return Err(HttpError::Encoding { key: key.clone() });
        }

        let body = match self.method {
            HttpMethod::Post => {
                let body_is_empty = self.body.as_deref().map_or(true, str::is_empty);
                if body_is_empty && !self.form.is_empty() {
                    if let Some(key) = self.unencodable_form.first() {
                        return Err(HttpError::Encoding { key: key.clone() });
                    }
                    Some(codec::encode(&self.form, false))
                } else {
                    Some(self.body.clone().unwrap_or_default())
                }
            }
            HttpMethod::Get => None,
        };

        let mut url = self.url.clone();
        if !self.query.is_empty() {
            url.push('?');
            url.push_str(&codec::encode(&self.query, true));
        }

        Ok(HttpRequest {
            method: self.method,
            url,
            headers: self.headers.clone(),
            body,
            timeout: Some(self.timeout.unwrap_or(self.client.default_timeout())),
        })
    }

    /// Send the request through the client's interceptor chain.
    ///
    /// Before-hooks see the resolved request. After-hooks run exactly once
    /// with either the response or the failure; the failure is then
    /// returned as-is.
    pub fn execute(self) -> Result<HttpResponse, HttpError> {
        let client = self.client;
        let request = match self.build() {
            Ok(request) => request,
            Err(err) => {
                let unresolved = self.unresolved();
                client.after_all(&Exchange {
                    request: &unresolved,
                    outcome: Err(&err),
                });
                return Err(err);
            }
        };

        client.before_all(
            &request.url,
            request.method,
            request.body.as_deref(),
            &request.headers,
        );
        let outcome = client.send(&request);
        client.after_all(&Exchange {
            request: &request,
            outcome: outcome.as_ref(),
        });
        outcome
    }

    fn unresolved(&self) -> HttpRequest {
        HttpRequest {
            method: self.method,
            url: self.url.clone(),
            headers: self.headers.clone(),
            body: self.body.clone(),
            timeout: self.timeout,
        }
    }

    fn accepts_payload(&self, option: &'static str) -> bool {
        if self.method == HttpMethod::Post {
            return true;
        }
        tracing::debug!(option, method = %self.method, url = %self.url, "ignoring POST-only option");
        false
    }

    fn set_header(&mut self, key: String, value: String) {
        self.headers.retain(|existing, _| !existing.eq_ignore_ascii_case(&key));
        self.headers.insert(key, value);
    }

    /// Insert or overwrite one entry. A key only stays unencodable while
    /// its latest value is the one that failed.
    fn put_param<V: fmt::Display>(&mut self, target: Target, key: String, value: Option<V>) {
        let (params, unencodable) = match target {
            Target::Query => (&mut self.query, &mut self.unencodable_query),
            Target::Form => (&mut self.form, &mut self.unencodable_form),
        };
        let value = match value.map(|v| codec::stringify(&key, v)).transpose() {
            Ok(value) => {
                unencodable.remove(&key);
                value
            }
            Err(_) => {
                unencodable.insert(key.clone());
                None
            }
        };
        params.insert(key, value);
    }
}

impl fmt::Debug for RequestBuilder<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RequestBuilder")
            .field("method", &self.method)
            .field("url", &self.url)
            .field("headers", &self.headers)
            .field("query", &self.query)
            .field("form", &self.form)
            .field("body", &self.body)
            .field("timeout", &self.timeout)
            .finish()
    }
}

#[derive(Clone, Copy)]
enum Target {
    Query,
    Form,
}
