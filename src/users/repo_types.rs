use serde::Serialize;
use sqlx::FromRow;
use time::OffsetDateTime;

use crate::crud::{Entity, EntityKind, Fields, Value};

/// User record in the database.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct User {
    pub id: i32,
    pub username: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub hashed_password: String, // Argon2 hash, not exposed in JSON
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339::option")]
    pub updated_at: Option<OffsetDateTime>,
    pub is_admin: bool,
}

/// Columns for a new account. `password` is plaintext until it is bound.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: String,
    pub email: String,
    pub password: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
}

/// Self-service profile changes; `None` leaves the column untouched.
#[derive(Debug, Clone, Default)]
pub struct UserPatch {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub password: Option<String>,
}

impl Entity for User {
    const KIND: EntityKind = EntityKind::User;
    type New = NewUser;
    type Patch = UserPatch;
}

impl Fields for NewUser {
    fn into_values(self) -> Vec<(&'static str, Value)> {
        let mut values = vec![
            ("username", Value::Text(self.username)),
            ("email", Value::Text(self.email)),
            ("hashed_password", Value::Secret(self.password)),
        ];
        if let Some(first_name) = self.first_name {
            values.push(("first_name", Value::Text(first_name)));
        }
        if let Some(last_name) = self.last_name {
            values.push(("last_name", Value::Text(last_name)));
        }
        values
    }
}

impl Fields for UserPatch {
    fn into_values(self) -> Vec<(&'static str, Value)> {
        let mut values = Vec::new();
        if let Some(first_name) = self.first_name {
            values.push(("first_name", Value::Text(first_name)));
        }
        if let Some(last_name) = self.last_name {
            values.push(("last_name", Value::Text(last_name)));
        }
        if let Some(password) = self.password {
            values.push(("hashed_password", Value::Secret(password)));
        }
        values
    }
}
