use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::repo::Note;
use crate::extract::non_blank;

/// A note as listed, with its owner's username resolved.
#[derive(Debug, Serialize)]
pub struct NoteView {
    #[serde(flatten)]
    pub note: Note,
    pub username: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CreateNoteRequest {
    pub user: Option<Uuid>,
    pub title: Option<String>,
    pub text: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateNoteRequest {
    pub id: Option<Uuid>,
    pub user: Option<Uuid>,
    pub title: Option<String>,
    pub text: Option<String>,
    pub completed: Option<bool>,
}

#[derive(Debug, Deserialize)]
pub struct DeleteNoteRequest {
    pub id: Option<Uuid>,
}

pub struct NoteInput {
    pub user_id: Uuid,
    pub title: String,
    pub text: String,
}

pub struct NoteUpdateInput {
    pub id: Uuid,
    pub user_id: Uuid,
    pub title: String,
    pub text: String,
    pub completed: bool,
}

impl CreateNoteRequest {
    pub fn validate(self) -> Option<NoteInput> {
        Some(NoteInput {
            user_id: self.user?,
            title: non_blank(self.title)?,
            text: non_blank(self.text)?,
        })
    }
}

impl UpdateNoteRequest {
    pub fn validate(self) -> Option<NoteUpdateInput> {
        Some(NoteUpdateInput {
            id: self.id?,
            user_id: self.user?,
            title: non_blank(self.title)?,
            text: non_blank(self.text)?,
            completed: self.completed?,
        })
    }
}
