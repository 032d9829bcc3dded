pub mod dto;
pub mod handlers;
pub mod repo;

use crate::state::AppState;
use axum::Router;

pub use repo::{NoteRepo, PgNoteRepo};

pub fn router() -> Router<AppState> {
    handlers::note_routes()
}
