use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::crud::{Entity, EntityKind, Fields, Value};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Category {
    pub id: i32,
    pub category_name: String,
}

#[derive(Debug, Clone)]
pub struct NewCategory {
    pub category_name: String,
}

#[derive(Debug, Clone, Default)]
pub struct CategoryPatch {
    pub category_name: Option<String>,
}

impl Entity for Category {
    const KIND: EntityKind = EntityKind::Category;
    type New = NewCategory;
    type Patch = CategoryPatch;
}

impl Fields for NewCategory {
    fn into_values(self) -> Vec<(&'static str, Value)> {
        vec![("category_name", Value::Text(self.category_name))]
    }
}

impl Fields for CategoryPatch {
    fn into_values(self) -> Vec<(&'static str, Value)> {
        self.category_name
            .map(|name| ("category_name", Value::Text(name)))
            .into_iter()
            .collect()
    }
}
