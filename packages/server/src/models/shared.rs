use serde::{Deserialize, Deserializer};

use crate::error::AppError;

/// Serde helper for PATCH semantics on nullable fields.
///
/// * JSON field absent  => `None`          (don't update)
/// * JSON field = null  => `Some(None)`    (set to NULL)
/// * JSON field = value => `Some(Some(v))` (set to value)
pub fn double_option<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(Some(Option::deserialize(deserializer)?))
}

/// Validate a trimmed display name (1-128 Unicode characters).
pub fn validate_name(name: &str, what: &str) -> Result<(), AppError> {
    let name = name.trim();
    if name.is_empty() || name.chars().count() > 128 {
        return Err(AppError::Validation(format!(
            "{what} must be 1-128 characters"
        )));
    }
    Ok(())
}

/// Validate a free-text field (non-empty after trimming, bounded length).
pub fn validate_text(text: &str, what: &str, max_bytes: usize) -> Result<(), AppError> {
    if text.trim().is_empty() || text.len() > max_bytes {
        return Err(AppError::Validation(format!(
            "{what} must be non-empty and at most {max_bytes} bytes"
        )));
    }
    Ok(())
}

/// Validate a list of member names (at most 16, each a valid name).
pub fn validate_members(members: &[String]) -> Result<(), AppError> {
    if members.len() > 16 {
        return Err(AppError::Validation("A team has at most 16 members".into()));
    }
    for member in members {
        validate_name(member, "Member name")?;
    }
    Ok(())
}
