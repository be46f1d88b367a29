//! Fluent, blocking HTTP request builder with before/after interceptors.
//!
//! # Overview
//! ```no_run
//! let response = http_fluent::post("http://localhost:3000/api")
//!     .form_data("n", 7)
//!     .timeout(5)
//!     .execute()?;
//! println!("{} {}", response.status, response.body);
//! # Ok::<(), http_fluent::HttpError>(())
//! ```
//!
//! # Design
//! - `HttpClient` is the shared executor: one `ureq::Agent` plus a frozen
//!   interceptor list. `post`/`get` below use a lazily created global one;
//!   `HttpClient::post`/`get` take an explicit client instead.
//! - `RequestBuilder` is owned by value and resolves to a plain-data
//!   `HttpRequest` before anything is sent, so request construction is
//!   testable without a server.
//! - Interceptors observe only. After-hooks run exactly once per `execute`,
//!   on success and on failure, and hook errors never reach the caller.
//! - Transport failures come back as `HttpError::Transport` with the
//!   original `ureq::Error` inside; nothing is retried.

pub mod builder;
pub mod client;
pub mod codec;
pub mod error;
pub mod http;
pub mod interceptor;

pub use builder::RequestBuilder;
pub use client::{HttpClient, HttpClientBuilder, DEFAULT_TIMEOUT};
pub use error::HttpError;
pub use http::{Headers, HttpMethod, HttpRequest, HttpResponse};
pub use interceptor::{Exchange, HookError, HookResult, Interceptor, LoggingInterceptor};

/// Start a POST request on the global client.
pub fn post(url: impl Into<String>) -> RequestBuilder<'static> {
    HttpClient::global().post(url)
}

/// Start a GET request on the global client.
pub fn get(url: impl Into<String>) -> RequestBuilder<'static> {
    HttpClient::global().get(url)
}
