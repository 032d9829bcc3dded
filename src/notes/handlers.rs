use std::collections::HashMap;

use axum::{extract::State, http::StatusCode, routing::get, Json, Router};
use tracing::{info, instrument, warn};

use super::{
    dto::{CreateNoteRequest, DeleteNoteRequest, NoteView, UpdateNoteRequest},
    repo::NewNote,
};
use crate::{
    auth::AuthUser,
    error::{conflict_as, ApiError, Message},
    extract::AppJson,
    state::AppState,
};

pub fn note_routes() -> Router<AppState> {
    Router::new().route(
        "/notes",
        get(list_notes)
            .post(create_note)
            .patch(update_note)
            .delete(delete_note),
    )
}

fn duplicate_title() -> ApiError {
    ApiError::Conflict("Duplicate note title".into())
}

fn note_not_found() -> ApiError {
    ApiError::BadRequest("Note not found".into())
}

/// GET /notes
#[instrument(skip_all, fields(caller = %caller.username, caller_id = %caller.id))]
pub async fn list_notes(
    State(state): State<AppState>,
    caller: AuthUser,
) -> Result<Json<Vec<NoteView>>, ApiError> {
    let notes = state.notes.list().await?;
    if notes.is_empty() {
        return Ok(Json(Vec::new()));
    }

    let owners: HashMap<_, _> = state
        .users
        .list()
        .await?
        .into_iter()
        .map(|u| (u.id, u.username))
        .collect();

    let views = notes
        .into_iter()
        .map(|note| NoteView {
            username: owners.get(&note.user_id).cloned(),
            note,
        })
        .collect();
    Ok(Json(views))
}

/// POST /notes { user, title, text }
#[instrument(skip_all, fields(caller = %caller.username, caller_id = %caller.id))]
pub async fn create_note(
    State(state): State<AppState>,
    caller: AuthUser,
    AppJson(payload): AppJson<CreateNoteRequest>,
) -> Result<(StatusCode, Json<Message>), ApiError> {
    let Some(input) = payload.validate() else {
        return Err(ApiError::BadRequest("All fields are required".into()));
    };

    if state.users.find_by_id(input.user_id).await?.is_none() {
        warn!(user_id = %input.user_id, "note for unknown user");
        return Err(ApiError::BadRequest("User not found".into()));
    }

    if state.notes.find_by_title(&input.title).await?.is_some() {
        return Err(duplicate_title());
    }

    let created = state
        .notes
        .create(NewNote {
            user_id: input.user_id,
            title: input.title,
            text: input.text,
        })
        .await
        .map_err(conflict_as("Duplicate note title"))?;

    match created {
        Some(note) => {
            info!(note_id = %note.id, ticket = note.ticket, "note created");
            Ok((StatusCode::CREATED, Json(Message::new("New note created"))))
        }
        None => Err(ApiError::BadRequest("Invalid note data received".into())),
    }
}

/// PATCH /notes { id, user, title, text, completed }
#[instrument(skip_all, fields(caller = %caller.username, caller_id = %caller.id))]
pub async fn update_note(
    State(state): State<AppState>,
    caller: AuthUser,
    AppJson(payload): AppJson<UpdateNoteRequest>,
) -> Result<Json<Message>, ApiError> {
    let Some(input) = payload.validate() else {
        return Err(ApiError::BadRequest("All fields are required".into()));
    };

    let Some(mut note) = state.notes.find_by_id(input.id).await? else {
        return Err(note_not_found());
    };

    if let Some(existing) = state.notes.find_by_title(&input.title).await? {
        if existing.id != note.id {
            return Err(duplicate_title());
        }
    }

    if state.users.find_by_id(input.user_id).await?.is_none() {
        warn!(user_id = %input.user_id, "note reassigned to unknown user");
        return Err(ApiError::BadRequest("User not found".into()));
    }

    note.user_id = input.user_id;
    note.title = input.title;
    note.text = input.text;
    note.completed = input.completed;

    let updated = state
        .notes
        .update(&note)
        .await
        .map_err(conflict_as("Duplicate note title"))?
        .ok_or_else(|| {
            warn!(note_id = %note.id, "note vanished before update");
            note_not_found()
        })?;

    info!(note_id = %updated.id, "note updated");
    Ok(Json(Message::new(format!("'{}' updated", updated.title))))
}

/// DELETE /notes { id }
#[instrument(skip_all, fields(caller = %caller.username, caller_id = %caller.id))]
pub async fn delete_note(
    State(state): State<AppState>,
    caller: AuthUser,
    AppJson(payload): AppJson<DeleteNoteRequest>,
) -> Result<Json<Message>, ApiError> {
    let Some(id) = payload.id else {
        return Err(ApiError::BadRequest("Note ID required".into()));
    };

    let Some(deleted) = state.notes.delete(id).await? else {
        return Err(note_not_found());
    };

    info!(note_id = %deleted.id, "note deleted");
    Ok(Json(Message::new(format!(
        "Note '{}' with ID {} deleted",
        deleted.title, deleted.id
    ))))
}
