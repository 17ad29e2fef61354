//! Request and response values exchanged with the stub server
//!
//! All of these are scoped to a single exchange: the host builds them per
//! request, hands them to a transformer and drops them afterwards.

use http::{Method, StatusCode};
use serde::{Deserialize, Serialize};

use crate::headers::{mime_type_part, Headers};

/// Name of the Content-Type header as written on rewritten responses.
pub const CONTENT_TYPE: &str = "Content-Type";

/// Name of the Accept request header.
pub const ACCEPT: &str = "Accept";

/// The request the stub server matched.
#[derive(Debug, Clone)]
pub struct InboundRequest {
    /// HTTP method
    pub method: Method,
    /// Request target as received (path and query)
    pub url: String,
    /// Request headers, in the order the client sent them
    pub headers: Headers,
}

impl InboundRequest {
    /// Create a request without headers.
    pub fn new(method: Method, url: impl Into<String>) -> Self {
        Self {
            method,
            url: url.into(),
            headers: Headers::new(),
        }
    }

    /// Add a request header.
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.append(name, value);
        self
    }

    /// First value of a request header.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name)
    }

    /// Snapshot the method, target and headers of an `http` request.
    pub fn from_http<B>(request: &http::Request<B>) -> Self {
        let url = request
            .uri()
            .path_and_query()
            .map(|pq| pq.as_str().to_string())
            .unwrap_or_else(|| request.uri().to_string());

        Self {
            method: request.method().clone(),
            url,
            headers: Headers::from(request.headers()),
        }
    }
}

/// A canned response produced by a stub.
///
/// Serves both as the draft handed to transformers and as the final response
/// they return; only `headers` is ever changed by a transformer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StubResponse {
    /// Status code
    #[serde(with = "status_code")]
    pub status: StatusCode,
    /// Response headers configured on the stub
    pub headers: Headers,
    /// Opaque body bytes
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub body: Vec<u8>,
}

impl StubResponse {
    /// Create a response with the given status, no headers and no body.
    pub fn new(status: StatusCode) -> Self {
        Self {
            status,
            headers: Headers::new(),
            body: Vec::new(),
        }
    }

    /// `200 OK` with no headers and no body.
    pub fn ok() -> Self {
        Self::new(StatusCode::OK)
    }

    /// Add a response header.
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.append(name, value);
        self
    }

    /// Set the body.
    pub fn with_body(mut self, body: impl Into<Vec<u8>>) -> Self {
        self.body = body.into();
        self
    }

    /// MIME type of the configured Content-Type header, if it has one.
    pub fn content_type_mime(&self) -> Option<&str> {
        self.headers
            .get(CONTENT_TYPE)
            .map(mime_type_part)
            .filter(|mime| !mime.is_empty())
    }
}

impl Default for StubResponse {
    fn default() -> Self {
        Self::ok()
    }
}

/// Outcome of running a transformer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Rewrite {
    /// The transformer produced a new response
    Rewritten(StubResponse),
    /// The transformer failed; the draft response must be used unmodified
    PassThrough,
}

impl Rewrite {
    /// Resolve the outcome against the draft that was transformed.
    pub fn or(self, draft: StubResponse) -> StubResponse {
        match self {
            Rewrite::Rewritten(response) => response,
            Rewrite::PassThrough => draft,
        }
    }

    /// Whether the transformer asked for the draft to be passed through.
    pub fn is_pass_through(&self) -> bool {
        matches!(self, Rewrite::PassThrough)
    }

    /// The rewritten response, if any.
    pub fn into_response(self) -> Option<StubResponse> {
        match self {
            Rewrite::Rewritten(response) => Some(response),
            Rewrite::PassThrough => None,
        }
    }
}

mod status_code {
    use http::StatusCode;
    use serde::de::Error as _;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(status: &StatusCode, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u16(status.as_u16())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<StatusCode, D::Error> {
        let code = u16::deserialize(deserializer)?;
        StatusCode::from_u16(code).map_err(D::Error::custom)
    }
}
