use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::error::AppError;
use crate::expenses::dto::ExpenseResponse;
use crate::users::repo_types::{User, UserPatch};
use crate::validation;

/// Request body for `PATCH /users/me`.
#[derive(Debug, Default, Deserialize)]
pub struct UpdateMeRequest {
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
}

impl UpdateMeRequest {
    pub fn into_patch(self) -> Result<UserPatch, AppError> {
        if let Some(first_name) = &self.first_name {
            validation::person_name("first_name", first_name)?;
        }
        if let Some(last_name) = &self.last_name {
            validation::person_name("last_name", last_name)?;
        }
        if let Some(password) = &self.password {
            validation::password(password)?;
        }
        Ok(UserPatch {
            first_name: self.first_name,
            last_name: self.last_name,
            password: self.password,
        })
    }
}

/// Public profile, including the user's expenses.
#[derive(Debug, Serialize)]
pub struct UserResponse {
    pub id: i32,
    pub username: String,
    pub email: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub is_admin: bool,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339::option")]
    pub updated_at: Option<OffsetDateTime>,
    pub expenses: Vec<ExpenseResponse>,
}

impl UserResponse {
    pub fn new(user: User, expenses: Vec<ExpenseResponse>) -> Self {
        Self {
            id: user.id,
            username: user.username,
            email: user.email,
            first_name: user.first_name,
            last_name: user.last_name,
            is_admin: user.is_admin,
            created_at: user.created_at,
            updated_at: user.updated_at,
            expenses,
        }
    }
}
