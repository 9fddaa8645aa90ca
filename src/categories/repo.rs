use sqlx::PgPool;

use crate::categories::repo_types::{Category, CategoryPatch, NewCategory};
use crate::crud::{self, DbError};

pub async fn create_category(db: &PgPool, new: NewCategory) -> Result<Category, DbError> {
    crud::create::<Category>(db, new).await
}

pub async fn get_category_by_id(db: &PgPool, id: i32) -> Result<Option<Category>, DbError> {
    crud::get_by_id::<Category>(db, id).await
}

pub async fn list_categories(db: &PgPool) -> Result<Vec<Category>, DbError> {
    crud::list_all::<Category>(db).await
}

pub async fn update_category(
    db: &PgPool,
    id: i32,
    patch: CategoryPatch,
) -> Result<Category, DbError> {
    crud::update::<Category>(db, id, patch).await
}

pub async fn delete_category(db: &PgPool, id: i32) -> Result<bool, DbError> {
    crud::delete::<Category>(db, id).await
}
