pub mod auth;
pub mod chat;
pub mod fallback;
pub mod health;

use axum::http::HeaderMap;

/// Non-empty value of a token header
pub(crate) fn header_token<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers
        .get(name)
        .and_then(|value| value.to_str().ok())
        .map(str::trim)
        .filter(|token| !token.is_empty())
}
