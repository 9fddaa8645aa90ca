use async_trait::async_trait;
use axum::{
    extract::{FromRef, FromRequestParts},
    http::request::Parts,
};
use tracing::warn;

use crate::{
    auth::jwt::JwtKeys,
    error::AppError,
    state::AppState,
    users::{repo::get_user_by_id, repo_types::User},
};

/// Caller identity taken from a verified bearer token.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub id: i32,
    pub username: String,
}

#[async_trait]
impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
    JwtKeys: FromRef<S>,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let auth = parts
            .headers
            .get(axum::http::header::AUTHORIZATION)
            .and_then(|h| h.to_str().ok())
            .ok_or_else(|| AppError::Authentication("Missing Authorization header".into()))?;

        // Expect "Bearer <token>"
        let token = auth
            .strip_prefix("Bearer ")
            .or_else(|| auth.strip_prefix("bearer "))
            .ok_or_else(|| AppError::Authentication("Invalid auth scheme".into()))?;

        let claims = JwtKeys::from_ref(state).verify(token.trim())?;
        Ok(AuthUser {
            id: claims.id,
            username: claims.sub,
        })
    }
}

/// Authenticated caller whose account has the admin flag set.
#[derive(Debug, Clone)]
pub struct AdminUser(pub User);

#[async_trait]
impl FromRequestParts<AppState> for AdminUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let caller = AuthUser::from_request_parts(parts, state).await?;
        let user = get_user_by_id(&state.db, caller.id)
            .await?
            .ok_or_else(|| AppError::Authentication("Account no longer exists".into()))?;

        if !user.is_admin {
            warn!(user_id = user.id, "non-admin attempted admin action");
            return Err(AppError::Authorization(
                "Admin privileges required".into(),
            ));
        }
        Ok(AdminUser(user))
    }
}
