use serde::Deserialize;

use crate::categories::repo_types::{CategoryPatch, NewCategory};
use crate::error::AppError;
use crate::validation;

#[derive(Debug, Deserialize)]
pub struct CreateCategoryRequest {
    pub category_name: String,
}

impl CreateCategoryRequest {
    pub fn into_new(self) -> Result<NewCategory, AppError> {
        let category_name = self.category_name.trim().to_string();
        validation::category_name(&category_name)?;
        Ok(NewCategory { category_name })
    }
}

#[derive(Debug, Deserialize)]
pub struct UpdateCategoryRequest {
    #[serde(default)]
    pub category_name: Option<String>,
}

impl UpdateCategoryRequest {
    pub fn into_patch(self) -> Result<CategoryPatch, AppError> {
        let category_name = match self.category_name {
            Some(name) => {
                let name = name.trim().to_string();
                validation::category_name(&name)?;
                Some(name)
            }
            None => None,
        };
        Ok(CategoryPatch { category_name })
    }
}
