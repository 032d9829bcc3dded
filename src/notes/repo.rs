use async_trait::async_trait;
use serde::Serialize;
use sqlx::{FromRow, PgPool};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::error::StoreError;

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Note {
    pub id: Uuid,
    #[serde(rename = "user")]
    pub user_id: Uuid, // soft reference to users.id
    pub title: String,
    pub text: String,
    pub completed: bool,
    pub ticket: i64,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

#[derive(Debug, Clone)]
pub struct NewNote {
    pub user_id: Uuid,
    pub title: String,
    pub text: String,
}

#[async_trait]
pub trait NoteRepo: Send + Sync {
    async fn list(&self) -> Result<Vec<Note>, StoreError>;
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Note>, StoreError>;
    async fn find_by_title(&self, title: &str) -> Result<Option<Note>, StoreError>;
    /// True when at least one note references `user_id`.
    async fn exists_for_user(&self, user_id: Uuid) -> Result<bool, StoreError>;
    async fn create(&self, note: NewNote) -> Result<Option<Note>, StoreError>;
    /// `None` when the row no longer exists.
    async fn update(&self, note: &Note) -> Result<Option<Note>, StoreError>;
    async fn delete(&self, id: Uuid) -> Result<Option<Note>, StoreError>;
}

#[derive(Clone)]
pub struct PgNoteRepo {
    db: PgPool,
}

impl PgNoteRepo {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl NoteRepo for PgNoteRepo {
    async fn list(&self) -> Result<Vec<Note>, StoreError> {
        let notes = sqlx::query_as::<_, Note>(
            r#"
            SELECT id, user_id, title, text, completed, ticket, created_at, updated_at
              FROM notes
             ORDER BY ticket ASC
            "#,
        )
        .fetch_all(&self.db)
        .await?;
        Ok(notes)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Note>, StoreError> {
        let note = sqlx::query_as::<_, Note>(
            r#"
            SELECT id, user_id, title, text, completed, ticket, created_at, updated_at
              FROM notes
             WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.db)
        .await?;
        Ok(note)
    }

    async fn find_by_title(&self, title: &str) -> Result<Option<Note>, StoreError> {
        let note = sqlx::query_as::<_, Note>(
            r#"
            SELECT id, user_id, title, text, completed, ticket, created_at, updated_at
              FROM notes
             WHERE title = $1
            "#,
        )
        .bind(title)
        .fetch_optional(&self.db)
        .await?;
        Ok(note)
    }

    async fn exists_for_user(&self, user_id: Uuid) -> Result<bool, StoreError> {
        let exists: bool =
            sqlx::query_scalar(r#"SELECT EXISTS (SELECT 1 FROM notes WHERE user_id = $1)"#)
                .bind(user_id)
                .fetch_one(&self.db)
                .await?;
        Ok(exists)
    }

    async fn create(&self, note: NewNote) -> Result<Option<Note>, StoreError> {
        let note = sqlx::query_as::<_, Note>(
            r#"
            INSERT INTO notes (user_id, title, text)
            VALUES ($1, $2, $3)
            RETURNING id, user_id, title, text, completed, ticket, created_at, updated_at
            "#,
        )
        .bind(note.user_id)
        .bind(&note.title)
        .bind(&note.text)
        .fetch_optional(&self.db)
        .await?;
        Ok(note)
    }

    async fn update(&self, note: &Note) -> Result<Option<Note>, StoreError> {
        let note = sqlx::query_as::<_, Note>(
            r#"
            UPDATE notes
               SET user_id = $2, title = $3, text = $4, completed = $5, updated_at = now()
             WHERE id = $1
            RETURNING id, user_id, title, text, completed, ticket, created_at, updated_at
            "#,
        )
        .bind(note.id)
        .bind(note.user_id)
        .bind(&note.title)
        .bind(&note.text)
        .bind(note.completed)
        .fetch_optional(&self.db)
        .await?;
        Ok(note)
    }

    async fn delete(&self, id: Uuid) -> Result<Option<Note>, StoreError> {
        let note = sqlx::query_as::<_, Note>(
            r#"
            DELETE FROM notes
             WHERE id = $1
            RETURNING id, user_id, title, text, completed, ticket, created_at, updated_at
            "#,
        )
        .bind(id)
        .fetch_optional(&self.db)
        .await?;
        Ok(note)
    }
}
