//! CORS Stub Headers - Response Header Rewriting for HTTP Stub Servers
//!
//! This crate provides a response transformer that HTTP stub/mock servers
//! run after matching a request to a stub. It makes canned responses usable
//! from browsers by advertising permissive CORS headers.
//!
//! # Features
//!
//! - **Allow-Headers echo**: every request header the client sent is listed in
//!   `Access-Control-Allow-Headers`
//! - **Content-Type resolution**: stub value, then request Content-Type, then
//!   Accept, then `application/json`
//! - **Static headers**: wildcard origin/methods plus basic security headers
//! - **Best effort**: a failed rewrite passes the draft response through
//!
//! # Architecture
//!
//! ```text
//! Host stub server ──▶ TransformerRegistry ──▶ CorsResponseHeaderTransformer
//!        │                    (by name)                  │
//!        ▼                                               ▼
//!   axum middleware                           Rewrite::Rewritten | PassThrough
//! ```
//!
//! # Quick Start
//!
//! ```rust
//! use cors_stub_headers::{CorsResponseHeaderTransformer, InboundRequest, StubResponse};
//! use http::Method;
//!
//! let request = InboundRequest::new(Method::GET, "/api/v2/contentTypeTest")
//!     .with_header("Accept", "text/html");
//! let draft = StubResponse::ok();
//!
//! let response = CorsResponseHeaderTransformer::new()
//!     .rewrite(&request, &draft)
//!     .or(draft);
//!
//! assert_eq!(response.headers.get("Content-Type"), Some("text/html"));
//! assert_eq!(response.headers.get("Access-Control-Allow-Origin"), Some("*"));
//! ```

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

pub mod config;
pub mod cors;
pub mod error;
pub mod headers;
pub mod middleware;
pub mod stub;
pub mod transformer;

// Re-exports for convenience
pub use config::RewriterConfig;
pub use cors::CorsResponseHeaderTransformer;
pub use error::{ConfigError, Error, Result, RewriteError};
pub use headers::Headers;
pub use stub::{InboundRequest, Rewrite, StubResponse};
pub use transformer::{FileSource, Parameters, ResponseTransformer, TransformerRegistry};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");
