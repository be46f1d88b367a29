//! Shared transport and interceptor chain.
//!
//! # Design
//! `HttpClient` is built once, then only read. It owns a single
//! `ureq::Agent` (so connections are reused across requests) and a frozen
//! interceptor list. Cloning is cheap and shares both.
//!
//! The crate-level `post`/`get` helpers go through a lazily created global
//! client. Processes that need different interceptors call
//! `install_global` once at startup, before the first request.
//!
//! Redirects are never followed: a 3xx comes back to the caller as a
//! response, with its `Location` header intact.

use std::sync::Arc;
use std::time::Duration;

use once_cell::sync::OnceCell;

use crate::builder::RequestBuilder;
use crate::error::HttpError;
use crate::http::{Headers, HttpMethod, HttpRequest, HttpResponse};
use crate::interceptor::{Exchange, Interceptor, LoggingInterceptor};

/// Timeout applied when a request does not set its own.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

static GLOBAL: OnceCell<HttpClient> = OnceCell::new();

/// Process-wide HTTP executor.
#[derive(Clone)]
pub struct HttpClient {
    agent: ureq::Agent,
    interceptors: Arc<[Arc<dyn Interceptor>]>,
    default_timeout: Duration,
}

impl HttpClient {
    pub fn builder() -> HttpClientBuilder {
        HttpClientBuilder::new()
    }

    /// The global client, created with default settings on first use.
    pub fn global() -> &'static HttpClient {
        GLOBAL.get_or_init(HttpClient::default)
    }

    /// Replace the default global client. Fails, handing the client back,
    /// once the global has been installed or used.
    pub fn install_global(client: HttpClient) -> Result<(), HttpClient> {
        GLOBAL.set(client)
    }

    pub fn post(&self, url: impl Into<String>) -> RequestBuilder<'_> {
        RequestBuilder::new(self, HttpMethod::Post, url.into())
    }

    pub fn get(&self, url: impl Into<String>) -> RequestBuilder<'_> {
        RequestBuilder::new(self, HttpMethod::Get, url.into())
    }

    pub fn default_timeout(&self) -> Duration {
        self.default_timeout
    }

    pub fn interceptor_count(&self) -> usize {
        self.interceptors.len()
    }

    /// Send `request` without running any interceptor.
    pub fn send(&self, request: &HttpRequest) -> Result<HttpResponse, HttpError> {
        let mut builder = ureq::http::Request::builder()
            .method(request.method.as_str())
            .uri(request.url.as_str());
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        let timeout = request.timeout.unwrap_or(self.default_timeout);

        let mut response = match &request.body {
            Some(body) => {
                let req = builder.body(body.clone()).map_err(ureq::Error::Http)?;
                self.run(req, timeout)?
            }
            None => {
                let req = builder.body(()).map_err(ureq::Error::Http)?;
                self.run(req, timeout)?
            }
        };

        let status = response.status().as_u16();
        let headers = response
            .headers()
            .iter()
            .map(|(name, value)| {
                (
                    name.as_str().to_string(),
                    String::from_utf8_lossy(value.as_bytes()).into_owned(),
                )
            })
            .collect();
        let body = response.body_mut().read_to_string()?;

        Ok(HttpResponse {
            status,
            headers,
            body,
        })
    }

    fn run<S: ureq::AsSendBody>(
        &self,
        request: ureq::http::Request<S>,
        timeout: Duration,
    ) -> Result<ureq::http::Response<ureq::Body>, ureq::Error> {
        let request = self
            .agent
            .configure_request(request)
            .timeout_global(Some(timeout))
            .build();
        self.agent.run(request)
    }

    pub(crate) fn before_all(
        &self,
        url: &str,
        method: HttpMethod,
        body: Option<&str>,
        headers: &Headers,
    ) {
        for interceptor in self.interceptors.iter() {
            if let Err(err) = interceptor.before_http(url, method, body, headers) {
                tracing::warn!(url, error = %err, "before_http hook failed");
            }
        }
    }

    pub(crate) fn after_all(&self, exchange: &Exchange<'_>) {
        for interceptor in self.interceptors.iter() {
            if let Err(err) = interceptor.after_http(exchange) {
                tracing::warn!(url = %exchange.request.url, error = %err, "after_http hook failed");
            }
        }
    }
}

impl Default for HttpClient {
    fn default() -> Self {
        HttpClientBuilder::new().build()
    }
}

impl std::fmt::Debug for HttpClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpClient")
            .field("interceptors", &self.interceptors.len())
            .field("default_timeout", &self.default_timeout)
            .finish()
    }
}

/// Startup-time configuration for `HttpClient`.
///
/// Interceptors can only be appended; the list is frozen by `build`.
pub struct HttpClientBuilder {
    interceptors: Vec<Arc<dyn Interceptor>>,
    default_logging: bool,
    default_timeout: Duration,
}

impl HttpClientBuilder {
    pub fn new() -> Self {
        Self {
            interceptors: Vec::new(),
            default_logging: true,
            default_timeout: DEFAULT_TIMEOUT,
        }
    }

    pub fn interceptor(mut self, interceptor: impl Interceptor + 'static) -> Self {
        self.interceptors.push(Arc::new(interceptor));
        self
    }

    pub fn shared_interceptor(mut self, interceptor: Arc<dyn Interceptor>) -> Self {
        self.interceptors.push(interceptor);
        self
    }

    /// Drop the built-in `LoggingInterceptor`.
    pub fn without_default_logging(mut self) -> Self {
        self.default_logging = false;
        self
    }

    pub fn default_timeout(mut self, timeout: Duration) -> Self {
        self.default_timeout = timeout;
        self
    }

    pub fn build(self) -> HttpClient {
        let agent = ureq::Agent::config_builder()
            .http_status_as_error(false)
            .max_redirects(0)
            .max_redirects_will_error(false)
            .build()
            .new_agent();

        let mut interceptors: Vec<Arc<dyn Interceptor>> = Vec::new();
        if self.default_logging {
            interceptors.push(Arc::new(LoggingInterceptor::new()));
        }
        interceptors.extend(self.interceptors);

        HttpClient {
            agent,
            interceptors: interceptors.into(),
            default_timeout: self.default_timeout,
        }
    }
}

impl Default for HttpClientBuilder {
    fn default() -> Self {
        Self::new()
    }
}
