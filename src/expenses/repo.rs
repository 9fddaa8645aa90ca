use sqlx::PgPool;

use crate::crud::{self, DbError, EntityKind};
use crate::expenses::repo_types::{Expense, ExpensePatch, ExpenseWithCategory, NewExpense};

pub async fn create_expense(db: &PgPool, new: NewExpense) -> Result<Expense, DbError> {
    crud::create::<Expense>(db, new).await
}

pub async fn get_expense_by_id(db: &PgPool, id: i32) -> Result<Option<Expense>, DbError> {
    crud::get_by_id::<Expense>(db, id).await
}

pub async fn list_expenses(db: &PgPool) -> Result<Vec<Expense>, DbError> {
    crud::list_all::<Expense>(db).await
}

pub async fn update_expense(
    db: &PgPool,
    id: i32,
    patch: ExpensePatch,
) -> Result<Expense, DbError> {
    crud::update::<Expense>(db, id, patch).await
}

pub async fn delete_expense(db: &PgPool, id: i32) -> Result<bool, DbError> {
    crud::delete::<Expense>(db, id).await
}

impl Expense {
    /// First expense carrying exactly this description, from any user.
    pub async fn find_by_description(
        db: &PgPool,
        description: &str,
    ) -> Result<Option<Expense>, DbError> {
        let sql = format!(
            "SELECT {} FROM expenses WHERE description = $1 ORDER BY id LIMIT 1",
            EntityKind::Expense.columns()
        );
        sqlx::query_as::<_, Expense>(&sql)
            .bind(description)
            .fetch_optional(db)
            .await
            .map_err(|e| DbError::classify(EntityKind::Expense, "reading", e))
    }

    /// All expenses owned by `user_id`, newest first, with their category names.
    pub async fn list_for_user(
        db: &PgPool,
        user_id: i32,
    ) -> Result<Vec<ExpenseWithCategory>, DbError> {
        sqlx::query_as::<_, ExpenseWithCategory>(
            r#"
            SELECT e.id, e.amount, e.description, e.date, e.created_at, e.updated_at,
                   e.user_id, e.category_id, c.category_name
            FROM expenses e
            JOIN categories c ON c.id = e.category_id
            WHERE e.user_id = $1
            ORDER BY e.date DESC, e.id DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(db)
        .await
        .map_err(|e| DbError::classify(EntityKind::Expense, "listing", e))
    }
}
