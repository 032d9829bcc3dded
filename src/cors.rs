use axum::{
    extract::{Request, State},
    http::{
        header::{AUTHORIZATION, CONTENT_TYPE, ORIGIN},
        HeaderValue, Method,
    },
    middleware::Next,
    response::{IntoResponse, Response},
};
use serde::Deserialize;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tracing::warn;

use crate::{error::ApiError, state::AppState};

/// Static allow-list of browser origins.
#[derive(Debug, Clone, Deserialize)]
pub struct CorsPolicy {
    allowed_origins: Vec<String>,
}

impl CorsPolicy {
    pub fn new(allowed_origins: Vec<String>) -> Self {
        Self { allowed_origins }
    }

    pub fn allowed_origins(&self) -> &[String] {
        &self.allowed_origins
    }

    /// A missing origin means a same-origin or non-browser caller and is always allowed.
    pub fn is_allowed(&self, origin: Option<&str>) -> bool {
        match origin {
            None => true,
            Some(origin) => self.allowed_origins.iter().any(|o| o == origin),
        }
    }

    /// Header layer for allowed origins. Preflight requests are answered with 200.
    pub fn layer(&self) -> CorsLayer {
        let origins: Vec<HeaderValue> = self
            .allowed_origins
            .iter()
            .filter_map(|o| match HeaderValue::from_str(o) {
                Ok(v) => Some(v),
                Err(e) => {
                    warn!(origin = %o, error = %e, "skipping unparsable origin");
                    None
                }
            })
            .collect();

        CorsLayer::new()
            .allow_origin(AllowOrigin::list(origins))
            .allow_credentials(true)
            .allow_methods([
                Method::GET,
                Method::POST,
                Method::PATCH,
                Method::DELETE,
                Method::OPTIONS,
            ])
            .allow_headers([CONTENT_TYPE, AUTHORIZATION])
    }
}

/// Fails requests whose `Origin` header is present but not on the allow-list.
pub async fn enforce_origin(State(state): State<AppState>, req: Request, next: Next) -> Response {
    let origin = req
        .headers()
        .get(ORIGIN)
        .map(|v| v.to_str().unwrap_or_default());

    if !state.config.cors.is_allowed(origin) {
        warn!(origin = ?origin, "origin rejected");
        return ApiError::Forbidden("Not allowed by CORS".into()).into_response();
    }

    next.run(req).await
}
