//! In-memory repositories and request helpers for the test suite.

use std::sync::Mutex;

use async_trait::async_trait;
use axum::{
    body::Body,
    extract::FromRef,
    http::{header, Request, StatusCode},
    Router,
};
use serde_json::Value;
use time::OffsetDateTime;
use tower::ServiceExt;
use uuid::Uuid;

use crate::{
    auth::JwtKeys,
    error::StoreError,
    notes::repo::{NewNote, Note, NoteRepo},
    state::AppState,
    users::repo::{NewUser, User, UserRepo},
};

const FAKE_HASH: &str = "$argon2id$v=19$m=19456,t=2,p=1$ZmFrZXNhbHQ$ZmFrZWhhc2g";
const FIRST_TICKET: i64 = 500;

#[derive(Default)]
pub struct MemoryUserRepo {
    users: Mutex<Vec<User>>,
}

#[async_trait]
impl UserRepo for MemoryUserRepo {
    async fn list(&self) -> Result<Vec<User>, StoreError> {
        Ok(self.users.lock().unwrap().clone())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, StoreError> {
        Ok(self.users.lock().unwrap().iter().find(|u| u.id == id).cloned())
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<User>, StoreError> {
        Ok(self
            .users
            .lock()
            .unwrap()
            .iter()
            .find(|u| u.username == username)
            .cloned())
    }

    async fn create(&self, user: NewUser) -> Result<Option<User>, StoreError> {
        let mut users = self.users.lock().unwrap();
        if users.iter().any(|u| u.username == user.username) {
            return Err(StoreError::Duplicate);
        }
        let now = OffsetDateTime::now_utc();
        let user = User {
            id: Uuid::new_v4(),
            username: user.username,
            password_hash: user.password_hash,
            roles: user.roles,
            active: true,
            created_at: now,
            updated_at: now,
        };
        users.push(user.clone());
        Ok(Some(user))
    }

    async fn update(&self, user: &User) -> Result<Option<User>, StoreError> {
        let mut users = self.users.lock().unwrap();
        if users
            .iter()
            .any(|u| u.username == user.username && u.id != user.id)
        {
            return Err(StoreError::Duplicate);
        }
        let Some(slot) = users.iter_mut().find(|u| u.id == user.id) else {
            return Ok(None);
        };
        *slot = User {
            updated_at: OffsetDateTime::now_utc(),
            ..user.clone()
        };
        Ok(Some(slot.clone()))
    }

    async fn delete(&self, id: Uuid) -> Result<Option<User>, StoreError> {
        let mut users = self.users.lock().unwrap();
        let idx = users.iter().position(|u| u.id == id);
        Ok(idx.map(|i| users.remove(i)))
    }
}

#[derive(Default)]
struct NoteTable {
    notes: Vec<Note>,
    issued: i64,
}

#[derive(Default)]
pub struct MemoryNoteRepo {
    table: Mutex<NoteTable>,
}

#[async_trait]
impl NoteRepo for MemoryNoteRepo {
    async fn list(&self) -> Result<Vec<Note>, StoreError> {
        Ok(self.table.lock().unwrap().notes.clone())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Note>, StoreError> {
        let table = self.table.lock().unwrap();
        Ok(table.notes.iter().find(|n| n.id == id).cloned())
    }

    async fn find_by_title(&self, title: &str) -> Result<Option<Note>, StoreError> {
        let table = self.table.lock().unwrap();
        Ok(table.notes.iter().find(|n| n.title == title).cloned())
    }

    async fn exists_for_user(&self, user_id: Uuid) -> Result<bool, StoreError> {
        let table = self.table.lock().unwrap();
        Ok(table.notes.iter().any(|n| n.user_id == user_id))
    }

    async fn create(&self, note: NewNote) -> Result<Option<Note>, StoreError> {
        let mut table = self.table.lock().unwrap();
        if table.notes.iter().any(|n| n.title == note.title) {
            return Err(StoreError::Duplicate);
        }
        let now = OffsetDateTime::now_utc();
        let note = Note {
            id: Uuid::new_v4(),
            user_id: note.user_id,
            title: note.title,
            text: note.text,
            completed: false,
            ticket: FIRST_TICKET + table.issued,
            created_at: now,
            updated_at: now,
        };
        table.issued += 1;
        table.notes.push(note.clone());
        Ok(Some(note))
    }

    async fn update(&self, note: &Note) -> Result<Option<Note>, StoreError> {
        let mut table = self.table.lock().unwrap();
        if table
            .notes
            .iter()
            .any(|n| n.title == note.title && n.id != note.id)
        {
            return Err(StoreError::Duplicate);
        }
        let Some(slot) = table.notes.iter_mut().find(|n| n.id == note.id) else {
            return Ok(None);
        };
        *slot = Note {
            updated_at: OffsetDateTime::now_utc(),
            ..note.clone()
        };
        Ok(Some(slot.clone()))
    }

    async fn delete(&self, id: Uuid) -> Result<Option<Note>, StoreError> {
        let mut table = self.table.lock().unwrap();
        let idx = table.notes.iter().position(|n| n.id == id);
        Ok(idx.map(|i| table.notes.remove(i)))
    }
}

/// Builds a user without storing it.
pub fn sample_user(username: &str, roles: &[&str]) -> User {
    let now = OffsetDateTime::now_utc();
    User {
        id: Uuid::new_v4(),
        username: username.into(),
        password_hash: FAKE_HASH.into(),
        roles: roles.iter().map(|r| r.to_string()).collect(),
        active: true,
        created_at: now,
        updated_at: now,
    }
}

pub async fn seed_user_with_hash(
    state: &AppState,
    username: &str,
    roles: &[&str],
    password_hash: &str,
) -> User {
    state
        .users
        .create(NewUser {
            username: username.into(),
            password_hash: password_hash.into(),
            roles: roles.iter().map(|r| r.to_string()).collect(),
        })
        .await
        .unwrap()
        .unwrap()
}

pub async fn seed_user(state: &AppState, username: &str, roles: &[&str]) -> User {
    seed_user_with_hash(state, username, roles, FAKE_HASH).await
}

/// Seeds an `admin` account and returns an access token for it.
pub async fn admin_token(state: &AppState) -> String {
    let admin = seed_user(state, "admin", &["Admin"]).await;
    JwtKeys::from_ref(state).sign_access(&admin).unwrap()
}

/// Sends one request through the router and decodes the body as JSON
/// (plain-text bodies come back as a JSON string).
pub async fn send(
    app: &Router,
    method: &str,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut req = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        req = req.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    let req = match body {
        Some(json) => req
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => req.body(Body::empty()).unwrap(),
    };

    let res = app.clone().oneshot(req).await.unwrap();
    let status = res.status();
    let bytes = axum::body::to_bytes(res.into_body(), usize::MAX)
        .await
        .unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes)
            .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()))
    };
    (status, value)
}
