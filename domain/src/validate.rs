//! Lightweight input validation helpers. Keep logic minimal and deterministic.

use crate::CoreError;
use crate::Slug;

/// Validate a destination URL and return it trimmed. We keep this
/// intentionally light to avoid heavy parsing crates: ensure http/https
/// scheme and a reasonable length.
pub fn validate_original_url(s: &str) -> Result<&str, CoreError> {
    let trimmed = s.trim();
    if trimmed.is_empty() {
        return Err(CoreError::Validation("long_url is required".into()));
    }
    if !(trimmed.starts_with("http://") || trimmed.starts_with("https://")) {
        return Err(CoreError::Validation(
            "long_url must start with http:// or https://".into(),
        ));
    }
    if trimmed.len() > 2048 {
        return Err(CoreError::Validation("long_url too long".into()));
    }
    Ok(trimmed)
}

/// Validate a user-supplied key using the same rules as `Slug::new`.
pub fn validate_custom_slug(s: &str) -> Result<Slug, CoreError> {
    Slug::new(s.trim().to_string())
}
