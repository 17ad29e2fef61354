//! CORS rewriter integration tests
//!
//! These tests drive the transformer through the registry the way a stub
//! server does, replaying the CORS acceptance scenarios.

use cors_stub_headers::{
    CorsResponseHeaderTransformer, FileSource, InboundRequest, Parameters, StubResponse,
    TransformerRegistry,
};
use http::{Method, StatusCode};
use pretty_assertions::assert_eq;

const TRANSFORMER: &str = CorsResponseHeaderTransformer::NAME;

fn serve(request: &InboundRequest) -> StubResponse {
    serve_draft(request, StubResponse::ok())
}

fn serve_draft(request: &InboundRequest, draft: StubResponse) -> StubResponse {
    TransformerRegistry::new().apply(
        &[TRANSFORMER],
        request,
        draft,
        &FileSource::default(),
        &Parameters::new(),
    )
}

fn cors_test_request() -> InboundRequest {
    InboundRequest::new(Method::OPTIONS, "/api/v1/corsTest")
        .with_header("CORSHeader1", "CORVal1")
        .with_header("CORSHeader2", "CORVal2")
        .with_header("CORSHeader3", "CORVal3")
}

#[test]
fn test_cors_fix_static_headers() {
    let response = serve(&cors_test_request());

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.headers.get("Access-Control-Allow-Origin"), Some("*"));
    assert_eq!(response.headers.get("Access-Control-Allow-Methods"), Some("*"));
    assert_eq!(response.headers.get("X-Content-Type-Options"), Some("nosniff"));
    assert_eq!(response.headers.get("x-frame-options"), Some("DENY"));
    assert_eq!(response.headers.get("x-xss-protection"), Some("1; mode=block"));
}

#[test]
fn test_cors_fix_request_headers() {
    let response = serve(&cors_test_request());
    let allowed = response.headers.get("Access-Control-Allow-Headers").unwrap();

    assert!(allowed.contains("CORSHeader1"));
    assert!(allowed.contains("CORSHeader2"));
    assert!(allowed.contains("CORSHeader3"));
    assert_eq!(response.headers.get("Content-Type"), Some("application/json"));
}

#[test]
fn test_accept_header_is_allowed() {
    // HTTP clients send Accept: */* by default
    let request =
        InboundRequest::new(Method::OPTIONS, "/api/v1/acceptTest").with_header("Accept", "*/*");
    let response = serve(&request);

    let allowed = response.headers.get("Access-Control-Allow-Headers").unwrap();
    assert!(allowed.starts_with("Accept,"));
    assert_eq!(response.headers.get("Content-Type"), Some("application/json"));
}

#[test]
fn test_content_type_header() {
    let request = InboundRequest::new(Method::OPTIONS, "/api/v1/contentTypeTest")
        .with_header("Content-Type", "application/json");
    let response = serve(&request);

    assert_eq!(response.headers.get("Content-Type"), Some("application/json"));
    assert!(response
        .headers
        .get("Access-Control-Allow-Headers")
        .unwrap()
        .contains("Content-Type"));
}

#[test]
fn test_default_content_type_header() {
    let request = InboundRequest::new(Method::OPTIONS, "/api/v2/contentTypeTest")
        .with_header("Accept", "*/*")
        .with_header("User-Agent", "Apache-HttpClient/4.5.13")
        .with_header("Accept-Encoding", "gzip,deflate");
    let response = serve(&request);

    assert_eq!(response.headers.get("Content-Type"), Some("application/json"));
    assert_eq!(
        response.headers.get("Access-Control-Allow-Headers"),
        Some("Accept,Content-Encoding, Server, Transfer-Encoding, Content-Type")
    );
}

#[test]
fn test_preflight_for_pension_scheme_members() {
    let request = InboundRequest::new(Method::OPTIONS, "/api/v2/pensionSchemeMembers")
        .with_header("Accept", "application/json")
        .with_header("Authorization", "authorizedUser")
        .with_header("Requesting-System", "SMEportal")
        .with_header("correlation-ID", "a1e4b301-351f-43aa-9bea-f5b62063829d")
        .with_header("Origin", "http://localhost:4200")
        .with_header("Access-Control-Request-Method", "GET")
        .with_header("Access-Control-Request-Headers", "authorization,requesting-system");
    let response = serve(&request);

    assert_eq!(
        response.headers.get("Access-Control-Allow-Headers"),
        Some(
            "Accept,Authorization,Requesting-System,correlation-ID,Origin,\
             Access-Control-Request-Method,Access-Control-Request-Headers,\
             authorization,requesting-system,\
             Content-Encoding, Server, Transfer-Encoding, Content-Type"
        )
    );
    assert_eq!(response.headers.get("Content-Type"), Some("application/json"));
}

#[test]
fn test_stub_content_type_takes_precedence() {
    let request = InboundRequest::new(Method::GET, "/api/v1/report")
        .with_header("Content-Type", "application/json")
        .with_header("Accept", "text/html");
    let draft = StubResponse::ok()
        .with_header("Content-Type", "application/xml")
        .with_body("<report/>");

    let response = serve_draft(&request, draft);

    assert_eq!(response.headers.get("Content-Type"), Some("application/xml"));
    assert_eq!(response.body, b"<report/>".to_vec());
}

#[test]
fn test_stub_without_transformer_is_untouched() {
    let draft = StubResponse::new(StatusCode::NO_CONTENT).with_header("X-Stub", "1");
    let names: [&str; 0] = [];
    let response = TransformerRegistry::new().apply(
        &names,
        &cors_test_request(),
        draft.clone(),
        &FileSource::default(),
        &Parameters::new(),
    );

    assert_eq!(response, draft);
}

#[test]
fn test_failed_rewrite_passes_draft_through() {
    let request = InboundRequest::new(Method::GET, "/api/v1/corsTest")
        .with_header("Accept", "text/html\u{0}");
    let draft = StubResponse::new(StatusCode::ACCEPTED).with_header("X-Stub", "1");

    let response = serve_draft(&request, draft.clone());
    assert_eq!(response, draft);
}
