use lazy_static::lazy_static;
use regex::Regex;

use crate::error::AppError;

pub const MIN_PASSWORD_LEN: usize = 8;
const MAX_NAME_LEN: usize = 100;
const MAX_DESCRIPTION_LEN: usize = 255;

lazy_static! {
    static ref EMAIL_RE: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
    static ref USERNAME_RE: Regex = Regex::new(r"^[A-Za-z0-9]{3,32}$").unwrap();
}

pub fn username(value: &str) -> Result<(), AppError> {
    if !USERNAME_RE.is_match(value) {
        return Err(AppError::validation(
            "username",
            "must be 3-32 alphanumeric characters",
        ));
    }
    Ok(())
}

pub fn email(value: &str) -> Result<(), AppError> {
    if !EMAIL_RE.is_match(value) {
        return Err(AppError::validation("email", "not a valid email address"));
    }
    Ok(())
}

pub fn password(value: &str) -> Result<(), AppError> {
    if value.chars().count() < MIN_PASSWORD_LEN {
        return Err(AppError::validation(
            "password",
            format!("must be at least {MIN_PASSWORD_LEN} characters"),
        ));
    }
    Ok(())
}

pub fn person_name(field: &'static str, value: &str) -> Result<(), AppError> {
    if value.chars().count() > MAX_NAME_LEN {
        return Err(AppError::validation(
            field,
            format!("must be at most {MAX_NAME_LEN} characters"),
        ));
    }
    Ok(())
}

pub fn category_name(value: &str) -> Result<(), AppError> {
    if value.trim().is_empty() {
        return Err(AppError::validation("category_name", "must not be blank"));
    }
    if value.chars().count() > MAX_NAME_LEN {
        return Err(AppError::validation(
            "category_name",
            format!("must be at most {MAX_NAME_LEN} characters"),
        ));
    }
    Ok(())
}

pub fn amount(value: f64) -> Result<(), AppError> {
    if !value.is_finite() || value < 0.0 {
        return Err(AppError::validation(
            "amount",
            "must be a non-negative number",
        ));
    }
    Ok(())
}

pub fn description(value: &str) -> Result<(), AppError> {
    if value.chars().count() > MAX_DESCRIPTION_LEN {
        return Err(AppError::validation(
            "description",
            format!("must be at most {MAX_DESCRIPTION_LEN} characters"),
        ));
    }
    Ok(())
}
