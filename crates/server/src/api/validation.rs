// Input validation for account and content APIs
//
// Hard limits, not configurable. Values allow legitimate use while keeping
// request bodies and stored rows bounded.

use super::common::ApiError;

// =============================================================================
// Input Size Limits
// =============================================================================

/// Maximum username length in characters.
pub const MAX_USERNAME_CHARS: usize = 64;

/// Minimum password length in characters.
pub const MIN_PASSWORD_CHARS: usize = 8;

/// Maximum password length in characters. Bounds hashing cost.
pub const MAX_PASSWORD_CHARS: usize = 256;

/// Maximum article title length in characters.
pub const MAX_TITLE_CHARS: usize = 256;

/// Maximum article body size.
pub const MAX_CONTENT_BYTES: usize = 64 * 1024; // 64 KB

/// Maximum tag name length in characters.
pub const MAX_TAG_NAME_CHARS: usize = 64;

/// Maximum tag color length in characters.
pub const MAX_TAG_COLOR_CHARS: usize = 32;

/// Maximum comment size.
pub const MAX_COMMENT_BYTES: usize = 4 * 1024; // 4 KB

// =============================================================================
// Validation Functions
// =============================================================================

/// Validation error carrying the message shown to the client
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError(pub &'static str);

impl From<ValidationError> for ApiError {
    fn from(e: ValidationError) -> Self {
        ApiError::Validation(e.0.to_string())
    }
}

fn require_text(
    value: &str,
    max_chars: usize,
    message: &'static str,
) -> Result<(), ValidationError> {
    let value = value.trim();
    if value.is_empty() || value.chars().count() > max_chars {
        tracing::warn!(
            "Validation failed: {} ({} chars, max: {})",
            message,
            value.chars().count(),
            max_chars
        );
        return Err(ValidationError(message));
    }
    Ok(())
}

pub fn validate_username(username: &str) -> Result<(), ValidationError> {
    require_text(
        username,
        MAX_USERNAME_CHARS,
        "Username must be between 1 and 64 characters",
    )?;
    if username.trim() != username || username.chars().any(char::is_whitespace) {
        return Err(ValidationError("Username must not contain whitespace"));
    }
    Ok(())
}

pub fn validate_password(password: &str) -> Result<(), ValidationError> {
    let len = password.chars().count();
    if !(MIN_PASSWORD_CHARS..=MAX_PASSWORD_CHARS).contains(&len) {
        return Err(ValidationError(
            "Password must be between 8 and 256 characters",
        ));
    }
    Ok(())
}

pub fn validate_title(title: &str) -> Result<(), ValidationError> {
    require_text(
        title,
        MAX_TITLE_CHARS,
        "Title must be between 1 and 256 characters",
    )
}

pub fn validate_content(content: &str) -> Result<(), ValidationError> {
    if content.trim().is_empty() || content.len() > MAX_CONTENT_BYTES {
        return Err(ValidationError("Content must be non-empty and at most 64 KB"));
    }
    Ok(())
}

pub fn validate_tag(name: &str, color: &str) -> Result<(), ValidationError> {
    require_text(
        name,
        MAX_TAG_NAME_CHARS,
        "Tag name must be between 1 and 64 characters",
    )?;
    require_text(
        color,
        MAX_TAG_COLOR_CHARS,
        "Tag color must be between 1 and 32 characters",
    )
}

pub fn validate_comment(content: &str) -> Result<(), ValidationError> {
    if content.trim().is_empty() || content.len() > MAX_COMMENT_BYTES {
        return Err(ValidationError("Comment must be non-empty and at most 4 KB"));
    }
    Ok(())
}
