use serde::Serialize;
use sqlx::FromRow;
use time::{Date, OffsetDateTime};

use crate::crud::{Entity, EntityKind, Fields, Value};

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Expense {
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
    pub category_id: i32,
}

/// An expense joined with the name of its category.
#[derive(Debug, Clone, FromRow)]
pub struct ExpenseWithCategory {
    pub id: i32,
    pub amount: f64,
    pub description: Option<String>,
    pub date: Date,
    pub created_at: OffsetDateTime,
    pub updated_at: Option<OffsetDateTime>,
    pub user_id: i32,
    pub category_id: i32,
    pub category_name: String,
}

#[derive(Debug, Clone)]
pub struct NewExpense {
    pub amount: f64,
    pub description: Option<String>,
    pub date: Date,
    pub user_id: i32,
    pub category_id: i32,
}

#[derive(Debug, Clone, Default)]
pub struct ExpensePatch {
    pub amount: Option<f64>,
    pub description: Option<String>,
    pub date: Option<Date>,
    pub category_id: Option<i32>,
}

impl Entity for Expense {
    const KIND: EntityKind = EntityKind::Expense;
    type New = NewExpense;
    type Patch = ExpensePatch;
}

impl Fields for NewExpense {
    fn into_values(self) -> Vec<(&'static str, Value)> {
        let mut values = vec![("amount", Value::Amount(self.amount))];
        if let Some(description) = self.description {
            values.push(("description", Value::Text(description)));
        }
        values.push(("date", Value::Date(self.date)));
        values.push(("user_id", Value::Ref(self.user_id)));
        values.push(("category_id", Value::Ref(self.category_id)));
        values
    }
}

impl Fields for ExpensePatch {
    fn into_values(self) -> Vec<(&'static str, Value)> {
        let mut values = Vec::new();
        if let Some(amount) = self.amount {
            values.push(("amount", Value::Amount(amount)));
        }
        if let Some(description) = self.description {
            values.push(("description", Value::Text(description)));
        }
        if let Some(date) = self.date {
            values.push(("date", Value::Date(date)));
        }
        if let Some(category_id) = self.category_id {
            values.push(("category_id", Value::Ref(category_id)));
        }
        values
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::date;

    #[test]
    fn new_expense_skips_missing_description() {
        let values = NewExpense {
            amount: 12.5,
            description: None,
            date: date!(2025 - 03 - 11),
            user_id: 7,
            category_id: 2,
        }
        .into_values();
        let columns: Vec<_> = values.iter().map(|(c, _)| *c).collect();
        assert_eq!(columns, ["amount", "date", "user_id", "category_id"]);
    }

    #[test]
    fn patch_never_touches_the_owner() {
        let values = ExpensePatch {
            amount: Some(3.0),
            description: Some("coffee".into()),
            date: Some(date!(2025 - 01 - 02)),
            category_id: Some(4),
        }
        .into_values();
        assert!(values.iter().all(|(c, _)| *c != "user_id"));
        assert_eq!(values.len(), 4);
    }
}
