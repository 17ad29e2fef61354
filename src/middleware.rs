//! Axum middleware running a response transformer over live responses.
//!
//! Lets an axum-based stub server opt routes into a transformer the same
//! way a stub definition would. Only response headers change; status and
//! body stream through untouched.
//!
//! # Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//!
//! use axum::{routing::options, Router};
//! use cors_stub_headers::middleware::cors_rewrite_layer;
//! use cors_stub_headers::CorsResponseHeaderTransformer;
//!
//! let app: Router = Router::new()
//!     .route("/api/v1/corsTest", options(|| async { "" }))
//!     .layer(cors_rewrite_layer(Arc::new(CorsResponseHeaderTransformer::new())));
//! ```
//!
//! Use [`RewriteState`] with `from_fn_with_state` and [`cors_rewrite`]
//! directly to pass a file source or parameters.
//!
//! `http` lowercases header names, so names echoed into
//! `Access-Control-Allow-Headers` arrive lowercase on this path.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use axum::{
    extract::{Request, State},
    middleware::{from_fn_with_state, FromFnLayer, Next},
    response::Response,
};
use tracing::{debug, error};

use crate::cors::CorsResponseHeaderTransformer;
use crate::headers::Headers;
use crate::stub::{InboundRequest, Rewrite, StubResponse};
use crate::transformer::{FileSource, Parameters, ResponseTransformer};

/// Shared state for [`cors_rewrite`].
#[derive(Clone)]
pub struct RewriteState {
    transformer: Arc<dyn ResponseTransformer>,
    files: Arc<FileSource>,
    parameters: Arc<Parameters>,
}

impl RewriteState {
    /// Run `transformer` with default files and no parameters.
    pub fn new(transformer: Arc<dyn ResponseTransformer>) -> Self {
        Self {
            transformer,
            files: Arc::new(FileSource::default()),
            parameters: Arc::new(Parameters::new()),
        }
    }

    /// Run the CORS header transformer with the default policy.
    pub fn cors() -> Self {
        Self::new(Arc::new(CorsResponseHeaderTransformer::new()))
    }

    /// Use a different file source.
    pub fn with_files(mut self, files: FileSource) -> Self {
        self.files = Arc::new(files);
        self
    }

    /// Pass parameters to the transformer.
    pub fn with_parameters(mut self, parameters: Parameters) -> Self {
        self.parameters = Arc::new(parameters);
        self
    }

    /// Name of the wrapped transformer.
    pub fn transformer_name(&self) -> &str {
        self.transformer.name()
    }
}

type RewriteFuture = Pin<Box<dyn Future<Output = Response> + Send>>;

type RewriteFn = fn(State<RewriteState>, Request, Next) -> RewriteFuture;

/// Layer running [`cors_rewrite`] with `transformer` over every response.
pub fn cors_rewrite_layer(
    transformer: Arc<dyn ResponseTransformer>,
) -> FromFnLayer<RewriteFn, RewriteState, (State<RewriteState>, Request)> {
    from_fn_with_state(RewriteState::new(transformer), boxed_cors_rewrite as RewriteFn)
}

fn boxed_cors_rewrite(state: State<RewriteState>, request: Request, next: Next) -> RewriteFuture {
    Box::pin(cors_rewrite(state, request, next))
}

/// Middleware function for `axum::middleware::from_fn_with_state`.
pub async fn cors_rewrite(
    State(state): State<RewriteState>,
    request: Request,
    next: Next,
) -> Response {
    let inbound = InboundRequest::from_http(&request);
    let mut response = next.run(request).await;

    let draft = StubResponse {
        status: response.status(),
        headers: Headers::from(response.headers()),
        body: Vec::new(),
    };

    match state
        .transformer
        .transform(&inbound, &draft, &state.files, &state.parameters)
    {
        Rewrite::Rewritten(rewritten) => match rewritten.headers.to_header_map() {
            Ok(headers) => *response.headers_mut() = headers,
            Err(e) => {
                error!(
                    transformer = state.transformer_name(),
                    error = %e,
                    "Rewritten headers rejected, sending original response"
                );
            }
        },
        Rewrite::PassThrough => {
            debug!(
                transformer = state.transformer_name(),
                "Transformer passed response through"
            );
        }
    }

    response
}
