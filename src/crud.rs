//! Generic data access over the closed set of persisted entity kinds.
//!
//! Every operation runs in its own transaction on a connection checked out of the
//! pool. Failures roll the transaction back before the error is returned, and the
//! error always names the entity kind it happened on.

use std::fmt;

use sqlx::{postgres::PgRow, FromRow, PgPool, Postgres, QueryBuilder, Transaction};
use time::Date;
use tracing::{debug, warn};

use crate::auth::password::hash_password;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityKind {
    User,
    Category,
    Expense,
}

impl EntityKind {
    pub fn table(self) -> &'static str {
        match self {
            EntityKind::User => "users",
            EntityKind::Category => "categories",
            EntityKind::Expense => "expenses",
        }
    }

    pub(crate) fn columns(self) -> &'static str {
        match self {
            EntityKind::User => {
                "id, username, email, hashed_password, first_name, last_name, \
                 created_at, updated_at, is_admin"
            }
            EntityKind::Category => "id, category_name",
            EntityKind::Expense => {
                "id, amount, description, date, created_at, updated_at, user_id, category_id"
            }
        }
    }

    /// Whether rows of this kind carry an `updated_at` column.
    fn tracks_updates(self) -> bool {
        !matches!(self, EntityKind::Category)
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            EntityKind::User => "User",
            EntityKind::Category => "Category",
            EntityKind::Expense => "Expense",
        };
        f.write_str(name)
    }
}

/// A column value headed for the database.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Text(String),
    /// Plaintext password; hashed when bound, never persisted as-is.
    Secret(String),
    Amount(f64),
    Date(Date),
    Ref(i32),
}

impl Value {
    fn bind(self, qb: &mut QueryBuilder<'_, Postgres>) -> Result<(), DbError> {
        match self {
            Value::Text(v) => {
                qb.push_bind(v);
            }
            Value::Secret(plain) => {
                let hash =
                    hash_password(&plain).map_err(|e| DbError::Hashing(e.to_string()))?;
                qb.push_bind(hash);
            }
            Value::Amount(v) => {
                qb.push_bind(v);
            }
            Value::Date(v) => {
                qb.push_bind(v);
            }
            Value::Ref(v) => {
                qb.push_bind(v);
            }
        }
        Ok(())
    }
}

/// Input for create/update: only the columns that are present.
pub trait Fields: Send {
    fn into_values(self) -> Vec<(&'static str, Value)>;
}

/// A persisted record type. Implemented by `User`, `Category` and `Expense` only.
pub trait Entity: for<'r> FromRow<'r, PgRow> + Send + Unpin {
    const KIND: EntityKind;
    type New: Fields;
    type Patch: Fields;
}

#[derive(Debug, thiserror::Error)]
pub enum DbError {
    #[error("{kind} {id} not found")]
    NotFound { kind: EntityKind, id: i32 },

    #[error("error when {action} {kind}: {message}")]
    ConstraintViolation {
        kind: EntityKind,
        action: &'static str,
        constraint: Option<String>,
        message: String,
    },

    #[error("error when {action} {kind}: {source}")]
    Database {
        kind: EntityKind,
        action: &'static str,
        #[source]
        source: sqlx::Error,
    },

    #[error("password hashing failed: {0}")]
    Hashing(String),
}

impl DbError {
    pub(crate) fn classify(kind: EntityKind, action: &'static str, err: sqlx::Error) -> Self {
        if let sqlx::Error::Database(db_err) = &err {
            if db_err.is_unique_violation()
                || db_err.is_foreign_key_violation()
                || db_err.is_check_violation()
            {
                return DbError::ConstraintViolation {
                    kind,
                    action,
                    constraint: db_err.constraint().map(str::to_owned),
                    message: db_err.message().to_owned(),
                };
            }
        }
        DbError::Database {
            kind,
            action,
            source: err,
        }
    }
}

async fn rollback(tx: Transaction<'_, Postgres>, kind: EntityKind, action: &'static str) {
    if let Err(e) = tx.rollback().await {
        warn!(error = %e, %kind, action, "rollback failed");
    }
}

fn insert_query(
    kind: EntityKind,
    values: Vec<(&'static str, Value)>,
) -> Result<QueryBuilder<'static, Postgres>, DbError> {
    let mut qb = QueryBuilder::new(format!("INSERT INTO {} (", kind.table()));
    for (i, (column, _)) in values.iter().enumerate() {
        if i > 0 {
            qb.push(", ");
        }
        qb.push(*column);
    }
    qb.push(") VALUES (");
    for (i, (_, value)) in values.into_iter().enumerate() {
        if i > 0 {
            qb.push(", ");
        }
        value.bind(&mut qb)?;
    }
    qb.push(") RETURNING ").push(kind.columns());
    Ok(qb)
}

fn update_query(
    kind: EntityKind,
    id: i32,
    values: Vec<(&'static str, Value)>,
) -> Result<QueryBuilder<'static, Postgres>, DbError> {
    let mut qb = QueryBuilder::new(format!("UPDATE {} SET ", kind.table()));
    for (i, (column, value)) in values.into_iter().enumerate() {
        if i > 0 {
            qb.push(", ");
        }
        qb.push(column).push(" = ");
        value.bind(&mut qb)?;
    }
    if kind.tracks_updates() {
        qb.push(", updated_at = now()");
    }
    qb.push(" WHERE id = ")
        .push_bind(id)
        .push(" RETURNING ")
        .push(kind.columns());
    Ok(qb)
}

pub async fn create<E: Entity>(db: &PgPool, fields: E::New) -> Result<E, DbError> {
    let kind = E::KIND;
    let action = "creating";
    let mut qb = insert_query(kind, fields.into_values())?;

    let mut tx = db
        .begin()
        .await
        .map_err(|e| DbError::classify(kind, action, e))?;
    let result = qb.build_query_as::<E>().fetch_one(&mut *tx).await;
    match result {
        Ok(row) => {
            tx.commit()
                .await
                .map_err(|e| DbError::classify(kind, action, e))?;
            debug!(%kind, "row created");
            Ok(row)
        }
        Err(e) => {
            rollback(tx, kind, action).await;
            Err(DbError::classify(kind, action, e))
        }
    }
}

pub async fn get_by_id<E: Entity>(db: &PgPool, id: i32) -> Result<Option<E>, DbError> {
    let kind = E::KIND;
    let sql = format!(
        "SELECT {} FROM {} WHERE id = $1",
        kind.columns(),
        kind.table()
    );
    sqlx::query_as::<_, E>(&sql)
        .bind(id)
        .fetch_optional(db)
        .await
        .map_err(|e| DbError::classify(kind, "reading", e))
}

pub async fn list_all<E: Entity>(db: &PgPool) -> Result<Vec<E>, DbError> {
    let kind = E::KIND;
    let sql = format!("SELECT {} FROM {} ORDER BY id", kind.columns(), kind.table());
    sqlx::query_as::<_, E>(&sql)
        .fetch_all(db)
        .await
        .map_err(|e| DbError::classify(kind, "listing", e))
}

/// Partial update: columns absent from `fields` keep their current value.
pub async fn update<E: Entity>(db: &PgPool, id: i32, fields: E::Patch) -> Result<E, DbError> {
    let kind = E::KIND;
    let action = "updating";
    let values = fields.into_values();
    let mut qb = if values.is_empty() {
        None
    } else {
        Some(update_query(kind, id, values)?)
    };

    let mut tx = db
        .begin()
        .await
        .map_err(|e| DbError::classify(kind, action, e))?;

    let select = format!(
        "SELECT {} FROM {} WHERE id = $1 FOR UPDATE",
        kind.columns(),
        kind.table()
    );
    let found = sqlx::query_as::<_, E>(&select)
        .bind(id)
        .fetch_optional(&mut *tx)
        .await;
    let current = match found {
        Ok(Some(row)) => row,
        Ok(None) => {
            rollback(tx, kind, action).await;
            return Err(DbError::NotFound { kind, id });
        }
        Err(e) => {
            rollback(tx, kind, action).await;
            return Err(DbError::classify(kind, action, e));
        }
    };

    let updated = match qb.as_mut() {
        None => current,
        Some(qb) => {
            let result = qb.build_query_as::<E>().fetch_one(&mut *tx).await;
            match result {
                Ok(row) => row,
                Err(e) => {
                    rollback(tx, kind, action).await;
                    return Err(DbError::classify(kind, action, e));
                }
            }
        }
    };

    tx.commit()
        .await
        .map_err(|e| DbError::classify(kind, action, e))?;
    debug!(%kind, id, "row updated");
    Ok(updated)
}

/// Returns whether a row was actually removed.
pub async fn delete<E: Entity>(db: &PgPool, id: i32) -> Result<bool, DbError> {
    let kind = E::KIND;
    let action = "deleting";
    let sql = format!("DELETE FROM {} WHERE id = $1", kind.table());

    let mut tx = db
        .begin()
        .await
        .map_err(|e| DbError::classify(kind, action, e))?;
    let result = sqlx::query(&sql).bind(id).execute(&mut *tx).await;
    match result {
        Ok(done) => {
            tx.commit()
                .await
                .map_err(|e| DbError::classify(kind, action, e))?;
            let deleted = done.rows_affected() > 0;
            debug!(%kind, id, deleted, "delete finished");
            Ok(deleted)
        }
        Err(e) => {
            rollback(tx, kind, action).await;
            Err(DbError::classify(kind, action, e))
        }
    }
}
