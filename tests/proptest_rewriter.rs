//! Property-based testing for the CORS header rewriter.
//!
//! Uses proptest to generate arbitrary request header sets and verify the
//! invariants every rewritten response must satisfy.

use cors_stub_headers::config::{ALLOW_HEADERS_SUFFIX, EXCLUDED_HEADERS, STATIC_HEADERS};
use cors_stub_headers::{CorsResponseHeaderTransformer, InboundRequest, StubResponse};
use http::Method;
use proptest::prelude::*;

// ============================================================================
// STRATEGIES
// ============================================================================

/// Strategy for generating custom (never excluded) header names
pub fn arb_custom_header_name() -> impl Strategy<Value = String> {
    "X-[A-Za-z][A-Za-z0-9-]{0,15}".prop_map(|s| s)
}

/// Strategy for generating excluded header names in random casing
pub fn arb_excluded_header_name() -> impl Strategy<Value = String> {
    (prop::sample::select(EXCLUDED_HEADERS.to_vec()), any::<bool>()).prop_map(|(name, upper)| {
        if upper {
            name.to_ascii_uppercase()
        } else {
            name.to_ascii_lowercase()
        }
    })
}

/// Strategy for generating header values that are legal HTTP
pub fn arb_header_value() -> impl Strategy<Value = String> {
    "[a-zA-Z0-9 ;=/,.*-]{0,30}"
}

/// Strategy for generating a mixed request header list
pub fn arb_request_headers() -> impl Strategy<Value = Vec<(String, String)>> {
    prop::collection::vec(
        (
            prop_oneof![arb_custom_header_name(), arb_excluded_header_name()],
            arb_header_value(),
        ),
        0..12,
    )
}

/// Strategy for generating media types
pub fn arb_media_type() -> impl Strategy<Value = String> {
    "(application|text|image)/[a-z][a-z0-9.+-]{0,15}"
}

fn request_with(headers: &[(String, String)]) -> InboundRequest {
    headers
        .iter()
        .fold(InboundRequest::new(Method::OPTIONS, "/"), |req, (name, value)| {
            req.with_header(name.clone(), value.clone())
        })
}

fn rewrite(request: &InboundRequest) -> StubResponse {
    CorsResponseHeaderTransformer::new()
        .try_rewrite(request, &StubResponse::ok())
        .expect("generated headers are legal HTTP")
}

fn prefix_tokens(allowed: &str) -> Vec<&str> {
    allowed
        .strip_suffix(ALLOW_HEADERS_SUFFIX)
        .unwrap_or_default()
        .split(',')
        .filter(|token| !token.is_empty())
        .collect()
}

// ============================================================================
// PROPERTIES
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(256))]

    /// Every non-excluded request header name is advertised
    #[test]
    fn prop_custom_headers_are_allowed(headers in arb_request_headers()) {
        let response = rewrite(&request_with(&headers));

        // Repeated names are listed once, in the casing first seen
        for (name, _) in headers.iter().filter(|(name, _)| name.starts_with("X-")) {
            let allowed = response
                .headers
                .get("Access-Control-Allow-Headers")
                .unwrap()
                .to_ascii_lowercase();
            prop_assert!(
                allowed.contains(&name.to_ascii_lowercase()),
                "{} missing from {}", name, allowed
            );
        }
    }

    /// Excluded names never appear as tokens contributed by the request
    #[test]
    fn prop_excluded_headers_are_not_allowed(headers in arb_request_headers()) {
        let response = rewrite(&request_with(&headers));

        if let Some(allowed) = response.headers.get("Access-Control-Allow-Headers") {
            for token in prefix_tokens(allowed) {
                prop_assert!(
                    !EXCLUDED_HEADERS.iter().any(|ex| ex.eq_ignore_ascii_case(token)),
                    "excluded header {} leaked into {}", token, allowed
                );
            }
        }
    }

    /// The Allow-Headers value always ends with the fixed suffix
    #[test]
    fn prop_allow_headers_ends_with_suffix(headers in arb_request_headers()) {
        let response = rewrite(&request_with(&headers));

        match response.headers.get("Access-Control-Allow-Headers") {
            Some(allowed) => prop_assert!(allowed.ends_with(ALLOW_HEADERS_SUFFIX)),
            None => prop_assert!(headers.is_empty()),
        }
    }

    /// Requested preflight headers are echoed verbatim
    #[test]
    fn prop_requested_headers_are_echoed(
        headers in arb_request_headers(),
        requested in "[a-z][a-z0-9-]{0,10}(,[a-z][a-z0-9-]{0,10}){0,3}",
    ) {
        let mut all = headers.clone();
        all.push(("Access-Control-Request-Headers".to_string(), requested.clone()));
        let response = rewrite(&request_with(&all));

        let allowed = response.headers.get("Access-Control-Allow-Headers").unwrap();
        let expected = format!("{},", requested);
        prop_assert!(allowed.contains(&expected));
    }

    /// Static headers are present with their exact values
    #[test]
    fn prop_static_headers_always_present(headers in arb_request_headers()) {
        let response = rewrite(&request_with(&headers));

        for (name, value) in STATIC_HEADERS {
            let values: Vec<&str> = response.headers.get_all(name).collect();
            prop_assert_eq!(values, vec![value]);
        }
    }

    /// Exactly one Content-Type, following the fallback chain
    #[test]
    fn prop_content_type_resolution(
        stub in prop::option::of(arb_media_type()),
        request_ct in prop::option::of(arb_media_type()),
        accept in prop::option::of(prop_oneof![Just("*/*".to_string()), arb_media_type()]),
    ) {
        let mut request = InboundRequest::new(Method::GET, "/");
        if let Some(ct) = &request_ct {
            request = request.with_header("Content-Type", ct.clone());
        }
        if let Some(accept) = &accept {
            request = request.with_header("Accept", accept.clone());
        }
        let mut draft = StubResponse::ok();
        if let Some(ct) = &stub {
            draft = draft.with_header("Content-Type", ct.clone());
        }

        let response = CorsResponseHeaderTransformer::new()
            .try_rewrite(&request, &draft)
            .unwrap();

        let expected = stub
            .or(request_ct)
            .or(accept.filter(|a| a != "*/*"))
            .unwrap_or_else(|| "application/json".to_string());
        let values: Vec<&str> = response.headers.get_all("Content-Type").collect();
        prop_assert_eq!(values, vec![expected.as_str()]);
    }
}
