//! Bearer Token Extraction
//!
//! Common header parsing for `Authorization: Bearer <token>`.

use axum::http::{HeaderMap, header};

/// Placeholder strings that browser clients send when no token is stored
const ABSENT_TOKEN_LITERALS: &[&str] = &["null", "undefined"];

/// Extract the bearer token from request headers
///
/// Returns `None` when the header is missing, not a bearer credential, empty,
/// or one of the literal placeholders `null` / `undefined`.
pub fn extract_bearer(headers: &HeaderMap) -> Option<String> {
    let value = headers.get(header::AUTHORIZATION)?.to_str().ok()?;
    parse_bearer(value).map(str::to_string)
}

/// Parse an `Authorization` header value
pub fn parse_bearer(value: &str) -> Option<&str> {
    let (scheme, token) = value.trim().split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("bearer") {
        return None;
    }

    let token = token.trim();
    if token.is_empty()
        || ABSENT_TOKEN_LITERALS
            .iter()
            .any(|literal| token.eq_ignore_ascii_case(literal))
    {
        return None;
    }

    Some(token)
}
