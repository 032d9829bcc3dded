use axum::{
    extract::{FromRef, State},
    routing::post,
    Json, Router,
};
use tracing::{info, instrument, warn};

use super::{
    dto::{AuthResponse, LoginRequest, PublicUser, RefreshRequest},
    jwt::JwtKeys,
    password::verify_password,
};
use crate::{
    error::ApiError,
    extract::{non_blank, AppJson},
    state::AppState,
    users::User,
};

pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/auth", post(login))
        .route("/auth/refresh", post(refresh))
}

fn unauthorized() -> ApiError {
    ApiError::Unauthorized("Unauthorized".into())
}

fn issue_tokens(state: &AppState, user: User) -> Result<AuthResponse, ApiError> {
    let keys = JwtKeys::from_ref(state);
    let access_token = keys.sign_access(&user)?;
    let refresh_token = keys.sign_refresh(&user)?;
    Ok(AuthResponse {
        access_token,
        refresh_token,
        user: PublicUser {
            id: user.id,
            username: user.username,
            roles: user.roles,
        },
    })
}

#[instrument(skip(state, payload))]
pub async fn login(
    State(state): State<AppState>,
    AppJson(payload): AppJson<LoginRequest>,
) -> Result<Json<AuthResponse>, ApiError> {
    let (Some(username), Some(password)) = (
        non_blank(payload.username),
        payload.password.filter(|p| !p.is_empty()),
    ) else {
        return Err(ApiError::BadRequest("All fields are required".into()));
    };

    let user = match state.users.find_by_username(&username).await? {
        Some(u) if u.active => u,
        Some(u) => {
            warn!(user_id = %u.id, "login for inactive user");
            return Err(unauthorized());
        }
        None => {
            warn!(%username, "login unknown username");
            return Err(unauthorized());
        }
    };

    if !verify_password(&password, &user.password_hash)? {
        warn!(user_id = %user.id, "login invalid password");
        return Err(unauthorized());
    }

    info!(user_id = %user.id, username = %user.username, "user logged in");
    Ok(Json(issue_tokens(&state, user)?))
}

#[instrument(skip(state, payload))]
pub async fn refresh(
    State(state): State<AppState>,
    AppJson(payload): AppJson<RefreshRequest>,
) -> Result<Json<AuthResponse>, ApiError> {
    let keys = JwtKeys::from_ref(&state);
    let claims = keys.verify_refresh(&payload.refresh_token).map_err(|e| {
        warn!(error = %e, "refresh rejected");
        unauthorized()
    })?;

    let user = match state.users.find_by_id(claims.sub).await? {
        Some(u) if u.active => u,
        _ => {
            warn!(user_id = %claims.sub, "refresh for missing or inactive user");
            return Err(unauthorized());
        }
    };

    Ok(Json(issue_tokens(&state, user)?))
}

#[cfg(test)]
mod tests {
    use crate::{
        app::build_app,
        auth::{jwt::JwtKeys, password::hash_password},
        state::AppState,
        testing::{send, seed_user_with_hash},
    };
    use axum::{extract::FromRef, http::StatusCode};
    use serde_json::json;

    #[tokio::test]
    async fn login_returns_token_pair() {
        let state = AppState::fake();
        let hash = hash_password("hunter22").unwrap();
        let user = seed_user_with_hash(&state, "dave", &["Manager"], &hash).await;
        let app = build_app(state.clone());

        let (status, body) = send(
            &app,
            "POST",
            "/auth",
            None,
            Some(json!({"username": "dave", "password": "hunter22"})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["user"]["username"], "dave");
        assert!(body["user"].get("password_hash").is_none());

        let keys = JwtKeys::from_ref(&state);
        let claims = keys
            .verify_access(body["access_token"].as_str().unwrap())
            .unwrap();
        assert_eq!(claims.sub, user.id);
        assert!(keys
            .verify_refresh(body["refresh_token"].as_str().unwrap())
            .is_ok());
    }

    #[tokio::test]
    async fn login_rejects_wrong_password_and_inactive_users() {
        let state = AppState::fake();
        let hash = hash_password("hunter22").unwrap();
        let mut user = seed_user_with_hash(&state, "dave", &["Employee"], &hash).await;
        let app = build_app(state.clone());

        let (status, _) = send(
            &app,
            "POST",
            "/auth",
            None,
            Some(json!({"username": "dave", "password": "nope"})),
        )
        .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);

        user.active = false;
        state.users.update(&user).await.unwrap();
        let (status, _) = send(
            &app,
            "POST",
            "/auth",
            None,
            Some(json!({"username": "dave", "password": "hunter22"})),
        )
        .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn login_requires_both_fields() {
        let app = build_app(AppState::fake());
        let (status, body) =
            send(&app, "POST", "/auth", None, Some(json!({"username": "dave"}))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["message"], "All fields are required");
    }

    #[tokio::test]
    async fn refresh_issues_new_pair_only_for_refresh_tokens() {
        let state = AppState::fake();
        let user = seed_user_with_hash(&state, "dave", &["Employee"], "unused").await;
        let keys = JwtKeys::from_ref(&state);
        let app = build_app(state);

        let refresh = keys.sign_refresh(&user).unwrap();
        let (status, body) = send(
            &app,
            "POST",
            "/auth/refresh",
            None,
            Some(json!({"refresh_token": refresh})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert!(body["access_token"].is_string());

        let access = keys.sign_access(&user).unwrap();
        let (status, _) = send(
            &app,
            "POST",
            "/auth/refresh",
            None,
            Some(json!({"refresh_token": access})),
        )
        .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn protected_routes_need_a_valid_token() {
        let app = build_app(AppState::fake());
        let (status, _) = send(&app, "GET", "/users", None, None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);

        let (status, _) = send(&app, "GET", "/notes", Some("garbage"), None).await;
        assert_eq!(status, StatusCode::FORBIDDEN);
    }
}
