use axum::{extract::State, http::StatusCode, routing::get, Json, Router};
use tracing::{info, instrument, warn};

use crate::{
    auth::extractors::AuthUser,
    error::AppError,
    extract::ApiJson,
    expenses::{dto::ExpenseResponse, repo_types::Expense},
    state::AppState,
    users::{
        dto::{UpdateMeRequest, UserResponse},
        repo::{delete_user, get_user_by_id, update_user},
    },
};

pub fn me_routes() -> Router<AppState> {
    Router::new().route("/users/me", get(get_me).patch(update_me).delete(delete_me))
}

async fn load_profile(state: &AppState, user_id: i32) -> Result<UserResponse, AppError> {
    let user = get_user_by_id(&state.db, user_id)
        .await?
        .ok_or(AppError::NotFound("User"))?;
    let expenses = Expense::list_for_user(&state.db, user_id)
        .await?
        .into_iter()
        .map(ExpenseResponse::from)
        .collect();
    Ok(UserResponse::new(user, expenses))
}

#[instrument(skip(state, caller), fields(user_id = caller.id))]
pub async fn get_me(
    State(state): State<AppState>,
    caller: AuthUser,
) -> Result<Json<UserResponse>, AppError> {
    Ok(Json(load_profile(&state, caller.id).await?))
}

#[instrument(skip(state, caller, payload), fields(user_id = caller.id))]
pub async fn update_me(
    State(state): State<AppState>,
    caller: AuthUser,
    ApiJson(payload): ApiJson<UpdateMeRequest>,
) -> Result<Json<UserResponse>, AppError> {
    let patch = payload.into_patch()?;
    update_user(&state.db, caller.id, patch).await?;
    info!("profile updated");
    Ok(Json(load_profile(&state, caller.id).await?))
}

#[instrument(skip(state, caller), fields(user_id = caller.id))]
pub async fn delete_me(
    State(state): State<AppState>,
    caller: AuthUser,
) -> Result<StatusCode, AppError> {
    if delete_user(&state.db, caller.id).await? {
        info!("account deleted");
        Ok(StatusCode::NO_CONTENT)
    } else {
        warn!("account already gone");
        Err(AppError::NotFound("User"))
    }
}
