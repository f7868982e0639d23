use std::borrow::Cow;
use validator::{ValidateEmail, ValidationError};

pub const REQUIRED: &str = "This field is required";

/// Path segments under `/profile/` that belong to routes, not users.
pub const RESERVED_USERNAMES: &[&str] = &["edit"];

fn invalid(code: &'static str, message: &'static str) -> ValidationError {
    ValidationError::new(code).with_message(Cow::Borrowed(message))
}

/// Required text: whitespace alone does not count as a value.
pub fn not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(invalid("required", REQUIRED));
    }
    Ok(())
}

/// Letters, digits, hyphens and underscores.
pub fn slug(value: &str) -> Result<(), ValidationError> {
    not_blank(value)?;
    if !value
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
    {
        return Err(invalid(
            "slug",
            "Enter a valid slug consisting of Latin letters, numbers, underscores or hyphens",
        ));
    }
    Ok(())
}

/// ASCII letters, digits and `@ . + - _`; usernames end up in URL paths
/// and `Location` headers.
pub fn username(value: &str) -> Result<(), ValidationError> {
    not_blank(value)?;
    if !value
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '@' | '.' | '+' | '-' | '_'))
    {
        return Err(invalid(
            "username",
            "Enter a valid username. This value may contain only letters, numbers, and @/./+/-/_ characters",
        ));
    }
    if RESERVED_USERNAMES.contains(&value) {
        return Err(invalid("username_reserved", "This username is not available"));
    }
    Ok(())
}

pub fn email_or_empty(value: &str) -> Result<(), ValidationError> {
    if value.is_empty() || value.validate_email() {
        Ok(())
    } else {
        Err(invalid("email", "Enter a valid email address"))
    }
}
