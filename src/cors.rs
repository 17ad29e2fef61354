//! CORS response header transformer
//!
//! Rewrites a stub's draft response so browsers accept it cross-origin.
//! The policy is fixed and permissive: every request header the client sent
//! is advertised back as allowed, any origin and method is accepted, and a
//! Content-Type is always present.
//!
//! # Rewrite Steps
//!
//! ```text
//! request headers ──▶ Access-Control-Allow-Headers (appended)
//! stub / request  ──▶ Content-Type                 (overwritten)
//! constants       ──▶ static CORS/security headers (overwritten)
//! ```
//!
//! The three steps run in that order and are all-or-nothing: if any header
//! cannot be written the draft response is passed through unmodified.
//!
//! # Example
//!
//! ```rust
//! use cors_stub_headers::cors::CorsResponseHeaderTransformer;
//! use cors_stub_headers::stub::{InboundRequest, StubResponse};
//! use http::Method;
//!
//! let request = InboundRequest::new(Method::OPTIONS, "/api/v1/corsTest")
//!     .with_header("CORSHeader1", "CORVal1");
//! let draft = StubResponse::ok();
//!
//! let response = CorsResponseHeaderTransformer::new()
//!     .rewrite(&request, &draft)
//!     .or(draft);
//!
//! assert_eq!(
//!     response.headers.get("Access-Control-Allow-Headers"),
//!     Some("CORSHeader1,Content-Encoding, Server, Transfer-Encoding, Content-Type")
//! );
//! assert_eq!(response.headers.get("Content-Type"), Some("application/json"));
//! ```

use std::sync::Arc;

use tracing::{debug, error, instrument};

use crate::config::RewriterConfig;
use crate::error::RewriteError;
use crate::headers::{header_value, Headers};
use crate::stub::{InboundRequest, Rewrite, StubResponse, ACCEPT, CONTENT_TYPE};
use crate::transformer::{FileSource, Parameters, ResponseTransformer};

/// Header carrying the computed list of allowed request headers.
pub const ACCESS_CONTROL_ALLOW_HEADERS: &str = "Access-Control-Allow-Headers";

/// Preflight header listing the headers the browser intends to send.
pub const ACCESS_CONTROL_REQUEST_HEADERS: &str = "Access-Control-Request-Headers";

/// Preflight header naming the method the browser intends to use.
pub const ACCESS_CONTROL_REQUEST_METHOD: &str = "Access-Control-Request-Method";

/// Accept value that carries no content type preference.
const ACCEPT_ANY: &str = "*/*";

/// Rewrites draft responses with permissive CORS headers.
#[derive(Debug, Clone, Default)]
pub struct CorsResponseHeaderTransformer {
    config: Arc<RewriterConfig>,
}

impl CorsResponseHeaderTransformer {
    /// Registration name stubs use to opt in.
    pub const NAME: &'static str = "CORSResponseHeaderTransformer";

    /// Create a transformer with the default policy.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a transformer with a custom configuration.
    pub fn with_config(config: RewriterConfig) -> Self {
        Self {
            config: Arc::new(config),
        }
    }

    /// Create a transformer configured from `CORS_REWRITER_*` variables.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::Config`] if an override is invalid.
    pub fn from_env() -> crate::Result<Self> {
        Ok(Self::with_config(RewriterConfig::from_env()?))
    }

    /// Active configuration.
    pub fn config(&self) -> &RewriterConfig {
        &self.config
    }

    /// Rewrite `draft` for `request`, passing through on any failure.
    pub fn rewrite(&self, request: &InboundRequest, draft: &StubResponse) -> Rewrite {
        debug!("{} -- START", Self::NAME);
        log_request(request);

        let outcome = match self.try_rewrite(request, draft) {
            Ok(response) => {
                debug!(headers = %response.headers, "All response headers");
                Rewrite::Rewritten(response)
            }
            Err(e) => {
                error!(error = %e, "Header rewrite failed, passing draft response through");
                Rewrite::PassThrough
            }
        };

        debug!("{} -- END", Self::NAME);
        outcome
    }

    /// Rewrite `draft` for `request`, reporting failures to the caller.
    ///
    /// # Errors
    ///
    /// Returns [`RewriteError`] if a computed header value is not legal HTTP.
    pub fn try_rewrite(
        &self,
        request: &InboundRequest,
        draft: &StubResponse,
    ) -> Result<StubResponse, RewriteError> {
        let mut headers = draft.headers.clone();

        if let Some(allow_headers) = self.allow_headers(request) {
            debug!(allow_headers = %allow_headers, "Computed Access-Control-Allow-Headers");
            header_value(ACCESS_CONTROL_ALLOW_HEADERS, &allow_headers)?;
            headers.append(ACCESS_CONTROL_ALLOW_HEADERS, allow_headers);
        }

        set_checked(
            &mut headers,
            CONTENT_TYPE,
            self.resolve_content_type(request, draft),
        )?;

        for (name, value) in self.config.static_headers() {
            set_checked(&mut headers, name, value)?;
        }

        Ok(StubResponse {
            status: draft.status,
            headers,
            body: draft.body.clone(),
        })
    }

    /// Value for `Access-Control-Allow-Headers`, or `None` if the request
    /// carries no headers at all.
    ///
    /// Every non-excluded request header name is listed, each followed by a
    /// comma, then the raw `Access-Control-Request-Headers` value (also
    /// comma terminated) and finally the fixed suffix.
    pub fn allow_headers(&self, request: &InboundRequest) -> Option<String> {
        if request.headers.is_empty() {
            return None;
        }

        let mut allowed = String::new();
        for name in request.headers.keys() {
            if !self.config.is_excluded(name) {
                allowed.push_str(name);
                allowed.push(',');
            }
        }

        if let Some(requested) = request.header(ACCESS_CONTROL_REQUEST_HEADERS) {
            allowed.push_str(requested);
            allowed.push(',');
        }

        allowed.push_str(self.config.allow_headers_suffix());
        Some(allowed)
    }

    /// Content-Type for the rewritten response.
    ///
    /// First match wins: the stub's own Content-Type (MIME part only), the
    /// request's Content-Type, the request's Accept unless it is `*/*`, and
    /// finally the configured default.
    pub fn resolve_content_type<'a>(
        &'a self,
        request: &'a InboundRequest,
        draft: &'a StubResponse,
    ) -> &'a str {
        if let Some(mime) = draft.content_type_mime() {
            return mime;
        }
        if let Some(content_type) = request.header(CONTENT_TYPE) {
            return content_type;
        }
        match request.header(ACCEPT) {
            Some(accept) if accept != ACCEPT_ANY => accept,
            _ => self.config.default_content_type(),
        }
    }
}

impl ResponseTransformer for CorsResponseHeaderTransformer {
    fn name(&self) -> &str {
        Self::NAME
    }

    #[instrument(skip_all, fields(method = %request.method, url = %request.url))]
    fn transform(
        &self,
        request: &InboundRequest,
        response: &StubResponse,
        _files: &FileSource,
        _parameters: &Parameters,
    ) -> Rewrite {
        self.rewrite(request, response)
    }
}

fn set_checked(headers: &mut Headers, name: &str, value: &str) -> Result<(), RewriteError> {
    header_value(name, value)?;
    headers.set(name, value);
    Ok(())
}

fn log_request(request: &InboundRequest) {
    debug!(method = %request.method, "Request method");
    debug!(origin = ?request.header("Origin"), "Origin header");
    debug!(
        access_control_request_method = ?request.header(ACCESS_CONTROL_REQUEST_METHOD),
        "Access-Control-Request-Method header"
    );
    debug!(
        access_control_request_headers = ?request.header(ACCESS_CONTROL_REQUEST_HEADERS),
        "Access-Control-Request-Headers header"
    );
    debug!(headers = ?request.headers.keys(), "All request headers");
}
