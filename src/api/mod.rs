//! API route definitions
//!
//! User-facing routes are mounted at the root and under `/User`; catalogue
//! administration lives under `/Movie`, `/TVShow` and `/Actor`.

pub mod actors;
pub mod auth;
pub mod forms;
pub mod health;
pub mod movies;
pub mod tv_shows;
pub mod users;

use crate::error::{ApiError, ApiResult};

/// Parse a 1-based page number from a path segment
pub(crate) fn parse_page(raw: &str) -> ApiResult<usize> {
    match raw.trim().parse::<usize>() {
        Ok(page) if page > 0 => Ok(page),
        _ => Err(ApiError::validation("Page must be a whole number of at least 1")),
    }
}
