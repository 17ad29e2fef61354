//! CORS Stub Headers CLI
//!
//! Applies the CORS response header transformer to a request described on
//! the command line and prints the final response as JSON.

use anyhow::Context;
use clap::Parser;
use cors_stub_headers::{
    CorsResponseHeaderTransformer, FileSource, Headers, InboundRequest, Parameters, StubResponse,
    TransformerRegistry,
};
use http::{Method, StatusCode};
use serde_json::json;
use std::sync::Arc;

/// Preview the headers a stub response gets after CORS rewriting
#[derive(Parser, Debug)]
#[command(name = "cors-rewrite")]
#[command(version)]
#[command(about = "Preview CORS response header rewriting for a stub response")]
struct Args {
    /// Request method
    #[arg(short = 'X', long, default_value = "OPTIONS", value_parser = parse_method)]
    method: Method,

    /// Request target
    #[arg(long, default_value = "/")]
    url: String,

    /// Request header as 'Name: value' (repeatable)
    #[arg(short = 'H', long = "header", value_parser = parse_header)]
    headers: Vec<(String, String)>,

    /// Header configured on the stub response as 'Name: value' (repeatable)
    #[arg(long = "stub-header", value_parser = parse_header)]
    stub_headers: Vec<(String, String)>,

    /// Stub response status code
    #[arg(long, default_value_t = 200)]
    status: u16,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

fn parse_header(raw: &str) -> Result<(String, String), String> {
    let (name, value) = raw
        .split_once(':')
        .ok_or_else(|| format!("expected 'Name: value', got '{}'", raw))?;
    let name = name.trim();
    if name.is_empty() {
        return Err(format!("missing header name in '{}'", raw));
    }
    Ok((name.to_string(), value.trim().to_string()))
}

fn parse_method(raw: &str) -> Result<Method, String> {
    Method::from_bytes(raw.to_ascii_uppercase().as_bytes())
        .map_err(|e| format!("invalid method '{}': {}", raw, e))
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // Initialize tracing
    let filter = if args.verbose {
        "debug"
    } else {
        "info"
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let transformer =
        CorsResponseHeaderTransformer::from_env().context("Invalid rewriter configuration")?;
    let mut registry = TransformerRegistry::empty();
    registry.register(Arc::new(transformer));

    let status = StatusCode::from_u16(args.status)
        .with_context(|| format!("Invalid status code {}", args.status))?;

    let request = InboundRequest {
        method: args.method,
        url: args.url,
        headers: args.headers.into_iter().collect::<Headers>(),
    };
    let draft = StubResponse {
        status,
        headers: args.stub_headers.into_iter().collect::<Headers>(),
        body: Vec::new(),
    };

    tracing::info!(
        method = %request.method,
        url = %request.url,
        request_headers = request.headers.len(),
        "Rewriting stub response"
    );

    let response = registry.apply(
        &[CorsResponseHeaderTransformer::NAME],
        &request,
        draft,
        &FileSource::default(),
        &Parameters::new(),
    );

    let output = json!({
        "status": response.status.as_u16(),
        "headers": response.headers,
    });
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}
