use axum::{extract::State, http::StatusCode, routing::get, Json, Router};
use tracing::{info, instrument, warn};

use super::{
    dto::{CreateUserRequest, DeleteUserRequest, UpdateUserRequest},
    repo::{NewUser, User},
};
use crate::{
    auth::{password::hash_password, AuthUser},
    error::{conflict_as, ApiError, Message},
    extract::AppJson,
    state::AppState,
};

pub fn user_routes() -> Router<AppState> {
    Router::new().route(
        "/users",
        get(list_users)
            .post(create_user)
            .patch(update_user)
            .delete(delete_user),
    )
}

fn duplicate_username() -> ApiError {
    ApiError::Conflict("Duplicate username".into())
}

fn user_not_found() -> ApiError {
    ApiError::BadRequest("User not found".into())
}

/// GET /users
#[instrument(skip_all, fields(caller = %caller.username, caller_id = %caller.id))]
pub async fn list_users(
    State(state): State<AppState>,
    caller: AuthUser,
) -> Result<Json<Vec<User>>, ApiError> {
    let users = state.users.list().await?;
    info!(count = users.len(), "users listed");
    Ok(Json(users))
}

/// POST /users { username, password, roles }
#[instrument(skip_all, fields(caller = %caller.username, caller_id = %caller.id))]
pub async fn create_user(
    State(state): State<AppState>,
    caller: AuthUser,
    AppJson(payload): AppJson<CreateUserRequest>,
) -> Result<(StatusCode, Json<Message>), ApiError> {
    let Some(input) = payload.validate() else {
        warn!("create user with missing fields");
        return Err(ApiError::BadRequest("All fields are required".into()));
    };

    if state.users.find_by_username(&input.username).await?.is_some() {
        warn!(username = %input.username, "username already taken");
        return Err(duplicate_username());
    }

    let password_hash = hash_password(&input.password)?;

    let created = state
        .users
        .create(NewUser {
            username: input.username,
            password_hash,
            roles: input.roles,
        })
        .await
        .map_err(conflict_as("Duplicate username"))?;

    match created {
        Some(user) => {
            info!(user_id = %user.id, username = %user.username, "user created");
            Ok((
                StatusCode::CREATED,
                Json(Message::new(format!("New user {} created", user.username))),
            ))
        }
        None => Err(ApiError::BadRequest("Invalid user data received".into())),
    }
}

/// PATCH /users { id, username, roles, active, password? }
#[instrument(skip_all, fields(caller = %caller.username, caller_id = %caller.id))]
pub async fn update_user(
    State(state): State<AppState>,
    caller: AuthUser,
    AppJson(payload): AppJson<UpdateUserRequest>,
) -> Result<Json<Message>, ApiError> {
    let Some(input) = payload.validate() else {
        warn!("update user with missing fields");
        return Err(ApiError::BadRequest("All fields are required".into()));
    };

    let Some(mut user) = state.users.find_by_id(input.id).await? else {
        warn!(user_id = %input.id, "update for unknown user");
        return Err(user_not_found());
    };

    // Renaming onto another account's username is a conflict; keeping one's own is not.
    if let Some(existing) = state.users.find_by_username(&input.username).await? {
        if existing.id != user.id {
            warn!(username = %input.username, "username already taken");
            return Err(duplicate_username());
        }
    }

    user.username = input.username;
    user.roles = input.roles;
    user.active = input.active;
    if let Some(password) = input.password {
        user.password_hash = hash_password(&password)?;
    }

    let updated = state
        .users
        .update(&user)
        .await
        .map_err(conflict_as("Duplicate username"))?
        .ok_or_else(|| {
            warn!(user_id = %user.id, "user vanished before update");
            user_not_found()
        })?;

    info!(user_id = %updated.id, "user updated");
    Ok(Json(Message::new(format!("{} updated", updated.username))))
}

/// DELETE /users { id }
#[instrument(skip_all, fields(caller = %caller.username, caller_id = %caller.id))]
pub async fn delete_user(
    State(state): State<AppState>,
    caller: AuthUser,
    AppJson(payload): AppJson<DeleteUserRequest>,
) -> Result<Json<Message>, ApiError> {
    let Some(id) = payload.id else {
        return Err(ApiError::BadRequest("User ID required".into()));
    };

    if state.notes.exists_for_user(id).await? {
        warn!(user_id = %id, "delete refused, user has notes");
        return Err(ApiError::BadRequest("User has assigned notes".into()));
    }

    if state.users.find_by_id(id).await?.is_none() {
        return Err(user_not_found());
    }

    let Some(deleted) = state.users.delete(id).await? else {
        return Err(user_not_found());
    };

    info!(user_id = %deleted.id, username = %deleted.username, "user deleted");
    Ok(Json(Message::new(format!(
        "Username {} with ID {} deleted",
        deleted.username, deleted.id
    ))))
}
