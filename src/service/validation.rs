//! Request validation for customer payloads, listing and populate parameters.

use crate::error::AppError;
use crate::model::{CustomerPatch, NewCustomer, MAX_TEXT_LEN};
use regex::Regex;
use std::sync::OnceLock;

const EMAIL_PATTERN: &str = r"^[^@\s]+@[^@\s]+\.[^@\s]+$";

static EMAIL_RE: OnceLock<Regex> = OnceLock::new();

/// Largest page a list call may request.
pub const MAX_PAGE_LIMIT: u64 = 100;
/// Largest batch the bulk generator accepts in one call.
pub const MAX_POPULATE_COUNT: u64 = 50_000;

pub struct RequestValidator;

impl RequestValidator {
    /// Validate a create payload. All fields are required.
    pub fn validate_new(body: &NewCustomer) -> Result<(), AppError> {
        validate_name(&body.name)?;
        validate_age(body.age)?;
        validate_email(&body.email)
    }

    /// Validate only the fields present in the patch.
    pub fn validate_patch(patch: &CustomerPatch) -> Result<(), AppError> {
        if let Some(name) = &patch.name {
            validate_name(name)?;
        }
        if let Some(age) = patch.age {
            validate_age(age)?;
        }
        if let Some(email) = &patch.email {
            validate_email(email)?;
        }
        Ok(())
    }

    /// `limit` must be in `1..=100`; `skip` is unsigned so already non-negative.
    pub fn validate_page(limit: u64) -> Result<(), AppError> {
        if limit == 0 || limit > MAX_PAGE_LIMIT {
            return Err(AppError::Validation(format!(
                "limit must be between 1 and {}",
                MAX_PAGE_LIMIT
            )));
        }
        Ok(())
    }

    pub fn validate_populate_count(count: u64) -> Result<(), AppError> {
        if count == 0 || count > MAX_POPULATE_COUNT {
            return Err(AppError::Validation(format!(
                "count must be between 1 and {}",
                MAX_POPULATE_COUNT
            )));
        }
        Ok(())
    }
}

fn validate_name(name: &str) -> Result<(), AppError> {
    if name.trim().is_empty() {
        return Err(AppError::Validation("name must not be empty".into()));
    }
    validate_length("name", name)
}

fn validate_age(age: i32) -> Result<(), AppError> {
    if age < 1 {
        return Err(AppError::Validation("age must be a positive integer".into()));
    }
    Ok(())
}

fn validate_email(email: &str) -> Result<(), AppError> {
    validate_length("email", email)?;
    let re = EMAIL_RE.get_or_init(|| Regex::new(EMAIL_PATTERN).expect("email pattern is valid"));
    if !re.is_match(email) {
        return Err(AppError::Validation("email must be a valid email".into()));
    }
    Ok(())
}

fn validate_length(col: &str, value: &str) -> Result<(), AppError> {
    if value.chars().count() > MAX_TEXT_LEN {
        return Err(AppError::Validation(format!(
            "{} must be at most {} characters",
            col, MAX_TEXT_LEN
        )));
    }
    Ok(())
}
