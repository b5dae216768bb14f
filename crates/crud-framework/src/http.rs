//! Small helpers shared by the HTTP handlers.

use axum::http::header::ACCEPT_LANGUAGE;
use axum::http::HeaderMap;

pub const DEFAULT_LOCALE: &str = "en";

/// First language tag of `Accept-Language`, or [`DEFAULT_LOCALE`].
pub fn locale(headers: &HeaderMap) -> String {
    headers
        .get(ACCEPT_LANGUAGE)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(|tag| tag.split(';').next().unwrap_or_default().trim())
        .filter(|tag| !tag.is_empty() && *tag != "*")
        .unwrap_or(DEFAULT_LOCALE)
        .to_owned()
}
