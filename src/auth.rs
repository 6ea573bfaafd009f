//! Identity extraction / 身份提取
//!
//! The transport layer calls this once per request and hands the token to the
//! query pipeline as a plain value.

use axum::http::{header, HeaderMap};
use once_cell::sync::Lazy;
use regex::Regex;

use crate::models::Token;

static BEARER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^Bearer\s+(\S+)$").expect("bearer pattern is valid")
});

/// Extract bearer token from a raw Authorization header value / 从 Authorization 头提取令牌
pub fn extract_token(raw_header: Option<&str>) -> Option<Token> {
    let raw = raw_header?;
    BEARER
        .captures(raw)
        .and_then(|caps| caps.get(1))
        .map(|m| Token::new(m.as_str()))
}

/// Extract bearer token from request headers / 从请求头提取令牌
pub fn token_from_headers(headers: &HeaderMap) -> Option<Token> {
    let raw = headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok());
    extract_token(raw)
}
