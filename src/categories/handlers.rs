use axum::{
    extract::State,
    http::StatusCode,
    routing::get,
    Json, Router,
};
use tracing::{info, instrument};

use crate::{
    auth::extractors::AdminUser,
    categories::{
        dto::{CreateCategoryRequest, UpdateCategoryRequest},
        repo::{
            create_category, delete_category, get_category_by_id, list_categories,
            update_category,
        },
        repo_types::Category,
    },
    error::AppError,
    extract::{ApiJson, ApiPath},
    state::AppState,
};

pub fn category_routes() -> Router<AppState> {
    Router::new()
        .route("/categories", get(list).post(create))
        .route(
            "/categories/:id",
            get(get_one).patch(update).delete(remove),
        )
}

#[instrument(skip(state))]
pub async fn list(State(state): State<AppState>) -> Result<Json<Vec<Category>>, AppError> {
    Ok(Json(list_categories(&state.db).await?))
}

#[instrument(skip(state))]
pub async fn get_one(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i32>,
) -> Result<Json<Category>, AppError> {
    get_category_by_id(&state.db, id)
        .await?
        .map(Json)
        .ok_or(AppError::NotFound("Category"))
}

#[instrument(skip(state, admin, payload), fields(admin_id = admin.0.id))]
pub async fn create(
    State(state): State<AppState>,
    admin: AdminUser,
    ApiJson(payload): ApiJson<CreateCategoryRequest>,
) -> Result<(StatusCode, Json<Category>), AppError> {
    let category = create_category(&state.db, payload.into_new()?).await?;
    info!(category_id = category.id, name = %category.category_name, "category created");
    Ok((StatusCode::CREATED, Json(category)))
}

#[instrument(skip(state, admin, payload), fields(admin_id = admin.0.id))]
pub async fn update(
    State(state): State<AppState>,
    admin: AdminUser,
    ApiPath(id): ApiPath<i32>,
    ApiJson(payload): ApiJson<UpdateCategoryRequest>,
) -> Result<Json<Category>, AppError> {
    let category = update_category(&state.db, id, payload.into_patch()?).await?;
    info!(category_id = category.id, "category updated");
    Ok(Json(category))
}

#[instrument(skip(state, admin), fields(admin_id = admin.0.id))]
pub async fn remove(
    State(state): State<AppState>,
    admin: AdminUser,
    ApiPath(id): ApiPath<i32>,
) -> Result<StatusCode, AppError> {
    if delete_category(&state.db, id).await? {
        info!(category_id = id, "category deleted");
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::NotFound("Category"))
    }
}
