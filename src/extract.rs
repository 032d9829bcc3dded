use axum::extract::FromRequest;

use crate::error::ApiError;

/// `Json` extractor whose rejections render as a 400 `{"message": ...}` body.
#[derive(FromRequest)]
#[from_request(via(axum::Json), rejection(ApiError))]
pub struct AppJson<T>(pub T);

/// Treats a missing or whitespace-only string as absent.
pub fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
