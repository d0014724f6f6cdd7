//! Input validation for account and interaction requests

use std::ops::RangeInclusive;

use crate::db::UserRole;
use crate::error::ApiError;

pub const MAX_NAME_LEN: usize = 30;
pub const MAX_EMAIL_LEN: usize = 80;
pub const PASSWORD_LEN: RangeInclusive<usize> = 10..=30;
pub const MAX_ROLE_LEN: usize = 10;
pub const SCORE_RANGE: RangeInclusive<f64> = 0.0..=10.0;

fn char_len(value: &str) -> usize {
    value.chars().count()
}

fn check_name(field: &str, value: &str) -> Result<(), ApiError> {
    if value.is_empty() || char_len(value) > MAX_NAME_LEN {
        return Err(ApiError::validation(format!(
            "{field} is required and must be at most {MAX_NAME_LEN} characters"
        )));
    }
    Ok(())
}

/// Validate every registration field in order, returning the parsed role
pub fn validate_registration(
    first_name: &str,
    last_name: &str,
    email: &str,
    password: &str,
    type_of_user: &str,
    email_domain: &str,
) -> Result<UserRole, ApiError> {
    check_name("FirstName", first_name)?;
    check_name("LastName", last_name)?;

    if email.is_empty() || !email.ends_with(email_domain) || char_len(email) > MAX_EMAIL_LEN {
        return Err(ApiError::validation(format!(
            "Email is required, must end with {email_domain} and must be at most {MAX_EMAIL_LEN} characters"
        )));
    }

    if !PASSWORD_LEN.contains(&char_len(password)) {
        return Err(ApiError::validation(format!(
            "Password is required and its length must be between {} and {} characters",
            PASSWORD_LEN.start(),
            PASSWORD_LEN.end()
        )));
    }

    if type_of_user.is_empty() || char_len(type_of_user) > MAX_ROLE_LEN {
        return Err(role_error());
    }
    type_of_user.parse::<UserRole>().map_err(|_| role_error())
}

fn role_error() -> ApiError {
    ApiError::validation("TypeOfUser is required and must be user or admin")
}

pub fn validate_login(email: &str, password: &str, email_domain: &str) -> Result<(), ApiError> {
    if email.is_empty() || !email.ends_with(email_domain) {
        return Err(ApiError::validation(format!(
            "Email is required and must end with {email_domain}"
        )));
    }
    if password.is_empty() {
        return Err(ApiError::validation("Password is required"));
    }
    Ok(())
}

/// NaN falls outside the range and is rejected
pub fn validate_score(score: f64) -> Result<(), ApiError> {
    if !SCORE_RANGE.contains(&score) {
        return Err(ApiError::validation("Score must be between 0 and 10."));
    }
    Ok(())
}
