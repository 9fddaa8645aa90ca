use serde::{Deserialize, Serialize};

use crate::error::AppError;
use crate::users::repo_types::NewUser;
use crate::validation;

/// Request body for user registration.
#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub username: String,
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
}

impl RegisterRequest {
    /// Normalizes and validates the payload.
    pub fn into_new_user(self) -> Result<NewUser, AppError> {
        let username = self.username.trim().to_string();
        let email = self.email.trim().to_lowercase();

        validation::username(&username)?;
        validation::email(&email)?;
        validation::password(&self.password)?;
        if let Some(first_name) = &self.first_name {
            validation::person_name("first_name", first_name)?;
        }
        if let Some(last_name) = &self.last_name {
            validation::person_name("last_name", last_name)?;
        }

        Ok(NewUser {
            username,
            email,
            password: self.password,
            first_name: self.first_name,
            last_name: self.last_name,
        })
    }
}

/// Request body for login.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

/// Response returned after a successful login.
#[derive(Debug, Serialize, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub token_type: String,
    pub expires_in: i64, // seconds
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(username: &str, email: &str, password: &str) -> RegisterRequest {
        RegisterRequest {
            username: username.into(),
            email: email.into(),
            password: password.into(),
            first_name: None,
            last_name: None,
        }
    }

    #[test]
    fn email_is_normalized() {
        let new = request(" alice ", " Alice@X.com ", "password123")
            .into_new_user()
            .unwrap();
        assert_eq!(new.username, "alice");
        assert_eq!(new.email, "alice@x.com");
    }

    #[test]
    fn invalid_fields_are_reported_by_name() {
        let cases = [
            (request("al!ce", "alice@x.com", "password123"), "username"),
            (request("alice", "alice", "password123"), "email"),
            (request("alice", "alice@x.com", "short"), "password"),
        ];
        for (req, expected) in cases {
            match req.into_new_user() {
                Err(AppError::Validation { field, .. }) => assert_eq!(field, expected),
                other => panic!("expected validation error on {expected}, got {other:?}"),
            }
        }
    }
}
