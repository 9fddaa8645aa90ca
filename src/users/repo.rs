use sqlx::PgPool;

use crate::crud::{self, DbError, EntityKind};
use crate::users::repo_types::{NewUser, User, UserPatch};

pub async fn create_user(db: &PgPool, new: NewUser) -> Result<User, DbError> {
    crud::create::<User>(db, new).await
}

pub async fn get_user_by_id(db: &PgPool, id: i32) -> Result<Option<User>, DbError> {
    crud::get_by_id::<User>(db, id).await
}

pub async fn list_users(db: &PgPool) -> Result<Vec<User>, DbError> {
    crud::list_all::<User>(db).await
}

pub async fn update_user(db: &PgPool, id: i32, patch: UserPatch) -> Result<User, DbError> {
    crud::update::<User>(db, id, patch).await
}

pub async fn delete_user(db: &PgPool, id: i32) -> Result<bool, DbError> {
    crud::delete::<User>(db, id).await
}

impl User {
    /// Find a user by username.
    pub async fn find_by_username(db: &PgPool, username: &str) -> Result<Option<User>, DbError> {
        let sql = format!(
            "SELECT {} FROM users WHERE username = $1",
            EntityKind::User.columns()
        );
        sqlx::query_as::<_, User>(&sql)
            .bind(username)
            .fetch_optional(db)
            .await
            .map_err(|e| DbError::classify(EntityKind::User, "reading", e))
    }

    /// Find a user by email.
    pub async fn find_by_email(db: &PgPool, email: &str) -> Result<Option<User>, DbError> {
        let sql = format!(
            "SELECT {} FROM users WHERE email = $1",
            EntityKind::User.columns()
        );
        sqlx::query_as::<_, User>(&sql)
            .bind(email)
            .fetch_optional(db)
            .await
            .map_err(|e| DbError::classify(EntityKind::User, "reading", e))
    }
}
