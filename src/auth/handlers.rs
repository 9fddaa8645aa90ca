use axum::{
    extract::{FromRef, State},
    http::StatusCode,
    routing::post,
    Json, Router,
};
use tracing::{info, instrument, warn};

use crate::{
    auth::{
        dto::{LoginRequest, RegisterRequest, TokenResponse},
        jwt::JwtKeys,
        password::{burn_verification, verify_password},
    },
    crud::DbError,
    error::AppError,
    extract::ApiJson,
    state::AppState,
    users::{dto::UserResponse, repo::create_user, repo_types::User},
};

pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/auth/register", post(register))
        .route("/auth/token", post(login))
}

#[instrument(skip(state, payload))]
pub async fn register(
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<RegisterRequest>,
) -> Result<(StatusCode, Json<UserResponse>), AppError> {
    let new_user = payload.into_new_user()?;

    if User::find_by_username(&state.db, &new_user.username)
        .await?
        .is_some()
    {
        warn!(username = %new_user.username, "username already registered");
        return Err(AppError::Conflict("Username already registered".into()));
    }

    if User::find_by_email(&state.db, &new_user.email)
        .await?
        .is_some()
    {
        warn!(email = %new_user.email, "email already registered");
        return Err(AppError::Conflict("Email already registered".into()));
    }

    let user = create_user(&state.db, new_user)
        .await
        .map_err(registration_conflict)?;

    info!(user_id = user.id, username = %user.username, "user registered");
    Ok((StatusCode::CREATED, Json(UserResponse::new(user, Vec::new()))))
}

/// A concurrent registration can pass the lookups above and still lose on the
/// unique index; report it with the same message the lookups would have.
fn registration_conflict(err: DbError) -> AppError {
    let message = match &err {
        DbError::ConstraintViolation {
            constraint: Some(name),
            ..
        } => match name.as_str() {
            "users_username_key" => Some("Username already registered"),
            "users_email_key" => Some("Email already registered"),
            _ => None,
        },
        _ => None,
    };
    match message {
        Some(message) => AppError::Conflict(message.into()),
        None => err.into(),
    }
}

#[instrument(skip(state, payload))]
pub async fn login(
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<LoginRequest>,
) -> Result<Json<TokenResponse>, AppError> {
    let invalid = || AppError::Authentication("Invalid credentials".into());

    let Some(user) = User::find_by_username(&state.db, payload.username.trim()).await? else {
        burn_verification(&payload.password);
        warn!(username = %payload.username, "login unknown username");
        return Err(invalid());
    };

    if !verify_password(&payload.password, &user.hashed_password)? {
        warn!(user_id = user.id, "login invalid password");
        return Err(invalid());
    }

    let keys = JwtKeys::from_ref(&state);
    let access_token = keys.issue_default(user.id, &user.username)?;

    info!(user_id = user.id, "user logged in");
    Ok(Json(TokenResponse {
        access_token,
        token_type: "bearer".into(),
        expires_in: keys.ttl.whole_seconds(),
    }))
}
