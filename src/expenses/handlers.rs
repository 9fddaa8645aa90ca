use axum::{
    extract::State,
    http::StatusCode,
    routing::get,
    Json, Router,
};
use sqlx::PgPool;
use tracing::{info, instrument, warn};

use crate::{
    auth::extractors::AuthUser,
    categories::{repo::get_category_by_id, repo_types::Category},
    error::AppError,
    extract::{ApiJson, ApiPath},
    expenses::{
        dto::{CreateExpenseRequest, ExpenseResponse, UpdateExpenseRequest},
        repo::{create_expense, delete_expense, get_expense_by_id, update_expense},
        repo_types::{Expense, ExpensePatch, NewExpense},
    },
    state::AppState,
};

pub fn expense_routes() -> Router<AppState> {
    Router::new()
        .route("/expenses", get(list).post(create))
        .route(
            "/expenses/:id",
            get(get_one).patch(update).delete(remove),
        )
}

async fn existing_category(db: &PgPool, category_id: i32) -> Result<Category, AppError> {
    get_category_by_id(db, category_id)
        .await?
        .ok_or_else(|| AppError::validation("category_id", "unknown category"))
}

/// Loads an expense the caller owns.
async fn owned_expense(db: &PgPool, caller: &AuthUser, id: i32) -> Result<Expense, AppError> {
    let expense = get_expense_by_id(db, id)
        .await?
        .ok_or(AppError::NotFound("Expense"))?;
    if expense.user_id != caller.id {
        warn!(expense_id = id, owner_id = expense.user_id, "expense owned by another user");
        return Err(AppError::Authorization(
            "Expense belongs to another user".into(),
        ));
    }
    Ok(expense)
}

#[instrument(skip(state, caller), fields(user_id = caller.id))]
pub async fn list(
    State(state): State<AppState>,
    caller: AuthUser,
) -> Result<Json<Vec<ExpenseResponse>>, AppError> {
    let expenses = Expense::list_for_user(&state.db, caller.id)
        .await?
        .into_iter()
        .map(ExpenseResponse::from)
        .collect();
    Ok(Json(expenses))
}

#[instrument(skip(state, caller), fields(user_id = caller.id))]
pub async fn get_one(
    State(state): State<AppState>,
    caller: AuthUser,
    ApiPath(id): ApiPath<i32>,
) -> Result<Json<ExpenseResponse>, AppError> {
    let expense = owned_expense(&state.db, &caller, id).await?;
    let category = existing_category(&state.db, expense.category_id).await?;
    Ok(Json(ExpenseResponse::new(expense, category)))
}

#[instrument(skip(state, caller, payload), fields(user_id = caller.id))]
pub async fn create(
    State(state): State<AppState>,
    caller: AuthUser,
    ApiJson(payload): ApiJson<CreateExpenseRequest>,
) -> Result<(StatusCode, Json<ExpenseResponse>), AppError> {
    payload.validate()?;
    let category = existing_category(&state.db, payload.category_id).await?;

    if let Some(description) = payload.description.as_deref() {
        if Expense::find_by_description(&state.db, description)
            .await?
            .is_some()
        {
            warn!(%description, "duplicate expense description");
            return Err(AppError::Conflict(
                "Expense with this description already exists".into(),
            ));
        }
    }

    let expense = create_expense(
        &state.db,
        NewExpense {
            amount: payload.amount,
            description: payload.description,
            date: payload.date,
            user_id: caller.id,
            category_id: category.id,
        },
    )
    .await?;

    info!(expense_id = expense.id, "expense created");
    Ok((StatusCode::CREATED, Json(ExpenseResponse::new(expense, category))))
}

#[instrument(skip(state, caller, payload), fields(user_id = caller.id))]
pub async fn update(
    State(state): State<AppState>,
    caller: AuthUser,
    ApiPath(id): ApiPath<i32>,
    ApiJson(payload): ApiJson<UpdateExpenseRequest>,
) -> Result<Json<ExpenseResponse>, AppError> {
    payload.validate()?;
    owned_expense(&state.db, &caller, id).await?;
    if let Some(category_id) = payload.category_id {
        existing_category(&state.db, category_id).await?;
    }

    let expense = update_expense(&state.db, id, ExpensePatch::from(payload)).await?;
    let category = existing_category(&state.db, expense.category_id).await?;

    info!(expense_id = id, "expense updated");
    Ok(Json(ExpenseResponse::new(expense, category)))
}

#[instrument(skip(state, caller), fields(user_id = caller.id))]
pub async fn remove(
    State(state): State<AppState>,
    caller: AuthUser,
    ApiPath(id): ApiPath<i32>,
) -> Result<StatusCode, AppError> {
    owned_expense(&state.db, &caller, id).await?;
    if delete_expense(&state.db, id).await? {
        info!(expense_id = id, "expense deleted");
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::NotFound("Expense"))
    }
}
