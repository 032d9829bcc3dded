use serde::Deserialize;
use uuid::Uuid;

use crate::extract::non_blank;

/// Request body for `POST /users`.
#[derive(Debug, Deserialize)]
pub struct CreateUserRequest {
    pub username: Option<String>,
    pub password: Option<String>,
    pub roles: Option<Vec<String>>,
}

/// Request body for `PATCH /users`.
#[derive(Debug, Deserialize)]
pub struct UpdateUserRequest {
    pub id: Option<Uuid>,
    pub username: Option<String>,
    pub roles: Option<Vec<String>>,
    pub active: Option<bool>,
    pub password: Option<String>,
}

/// Request body for `DELETE /users`.
#[derive(Debug, Deserialize)]
pub struct DeleteUserRequest {
    pub id: Option<Uuid>,
}

#[derive(Debug, PartialEq)]
pub struct NewUserInput {
    pub username: String,
    pub password: String,
    pub roles: Vec<String>,
}

#[derive(Debug, PartialEq)]
pub struct UserUpdateInput {
    pub id: Uuid,
    pub username: String,
    pub roles: Vec<String>,
    pub active: bool,
    pub password: Option<String>,
}

fn non_empty_password(value: Option<String>) -> Option<String> {
    value.filter(|p| !p.is_empty())
}

fn non_empty_roles(value: Option<Vec<String>>) -> Option<Vec<String>> {
    value.filter(|r| !r.is_empty())
}

impl CreateUserRequest {
    /// `None` when username, password or roles are missing.
    pub fn validate(self) -> Option<NewUserInput> {
        Some(NewUserInput {
            username: non_blank(self.username)?,
            password: non_empty_password(self.password)?,
            roles: non_empty_roles(self.roles)?,
        })
    }
}

impl UpdateUserRequest {
    /// `None` when id, username, roles or the active flag are missing.
    /// The password stays optional.
    pub fn validate(self) -> Option<UserUpdateInput> {
        Some(UserUpdateInput {
            id: self.id?,
            username: non_blank(self.username)?,
            roles: non_empty_roles(self.roles)?,
            active: self.active?,
            password: non_empty_password(self.password),
        })
    }
}
