pub mod dto;
pub mod handlers;
pub mod repo;

use crate::state::AppState;
use axum::Router;

pub use repo::{PgUserRepo, User, UserRepo};

pub fn router() -> Router<AppState> {
    handlers::user_routes()
}
