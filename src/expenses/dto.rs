use serde::{Deserialize, Serialize};
use time::{Date, OffsetDateTime};

use crate::categories::repo_types::Category;
use crate::error::AppError;
use crate::expenses::repo_types::{Expense, ExpensePatch, ExpenseWithCategory};
use crate::validation;

#[derive(Debug, Deserialize)]
pub struct CreateExpenseRequest {
    pub amount: f64,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(with = "super::iso_date")]
    pub date: Date,
    pub category_id: i32,
}

impl CreateExpenseRequest {
    pub fn validate(&self) -> Result<(), AppError> {
        validation::amount(self.amount)?;
        if let Some(description) = &self.description {
            validation::description(description)?;
        }
        Ok(())
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct UpdateExpenseRequest {
    #[serde(default)]
    pub amount: Option<f64>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default, with = "super::iso_date::option")]
    pub date: Option<Date>,
    #[serde(default)]
    pub category_id: Option<i32>,
}

impl UpdateExpenseRequest {
    pub fn validate(&self) -> Result<(), AppError> {
        if let Some(amount) = self.amount {
            validation::amount(amount)?;
        }
        if let Some(description) = &self.description {
            validation::description(description)?;
        }
        Ok(())
    }
}

impl From<UpdateExpenseRequest> for ExpensePatch {
    fn from(req: UpdateExpenseRequest) -> Self {
        Self {
            amount: req.amount,
            description: req.description,
            date: req.date,
            category_id: req.category_id,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ExpenseResponse {
    pub id: i32,
    pub amount: f64,
    pub description: Option<String>,
    #[serde(with = "super::iso_date")]
    pub date: Date,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339::option")]
    pub updated_at: Option<OffsetDateTime>,
    pub user_id: i32,
    pub category: Category,
}

impl ExpenseResponse {
    pub fn new(expense: Expense, category: Category) -> Self {
        Self {
            id: expense.id,
            amount: expense.amount,
            description: expense.description,
            date: expense.date,
            created_at: expense.created_at,
            updated_at: expense.updated_at,
            user_id: expense.user_id,
            category,
        }
    }
}

impl From<ExpenseWithCategory> for ExpenseResponse {
    fn from(row: ExpenseWithCategory) -> Self {
        Self {
            id: row.id,
            amount: row.amount,
            description: row.description,
            date: row.date,
            created_at: row.created_at,
            updated_at: row.updated_at,
            user_id: row.user_id,
            category: Category {
                id: row.category_id,
                category_name: row.category_name,
            },
        }
    }
}
