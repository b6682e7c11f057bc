pub mod auth;
pub mod health;
pub mod services;

use crate::error::AppError;

pub(crate) const MAX_USERNAME_LEN: usize = 20;
pub(crate) const MAX_PASSWORD_LEN: usize = 20;
pub(crate) const MAX_NAME_LEN: usize = 50;

/// Rejects empty values and values longer than `max` characters.
pub(crate) fn require(field: &str, value: &str, max: usize) -> Result<(), AppError> {
    if value.is_empty() {
        return Err(AppError::Validation(format!("{} is required", field)));
    }
    max_len(field, value, max)
}

pub(crate) fn max_len(field: &str, value: &str, max: usize) -> Result<(), AppError> {
    if value.chars().count() > max {
        return Err(AppError::Validation(format!(
            "{} must be at most {} characters",
            field, max
        )));
    }
    Ok(())
}
