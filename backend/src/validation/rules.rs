//! Input-format rules shared across request payloads.

use std::borrow::Cow;

use validator::ValidationError;

pub const MIN_USERNAME_LEN: usize = 3;
pub const MIN_PASSWORD_LEN: usize = 10;

/// Static segments under `/v1/user/`; a user with one of these names could
/// never be looked up by name.
pub const RESERVED_USERNAMES: [&str; 3] = ["login", "logout", "whoami"];

fn rule(code: &'static str, message: &'static str) -> ValidationError {
    ValidationError::new(code).with_message(Cow::Borrowed(message))
}

/// A letter followed by at least two letters, digits or underscores.
pub fn validate_username(username: &str) -> Result<(), ValidationError> {
    let mut chars = username.chars();
    let starts_with_letter = chars.next().is_some_and(|c| c.is_ascii_alphabetic());
    if !starts_with_letter {
        return Err(rule(
            "username_invalid_start",
            "user name must start with a letter",
        ));
    }
    if !chars.all(|c| c.is_ascii_alphanumeric() || c == '_') {
        return Err(rule(
            "username_invalid_characters",
            "user name may only contain letters, digits and underscores",
        ));
    }
    if username.len() < MIN_USERNAME_LEN {
        return Err(rule(
            "username_too_short",
            "user name must be at least 3 characters",
        ));
    }
    if RESERVED_USERNAMES
        .iter()
        .any(|reserved| reserved.eq_ignore_ascii_case(username))
    {
        return Err(rule("username_reserved", "user name is reserved"));
    }
    Ok(())
}

/// Splits on the last `@`; the local part needs a visible character and the
/// domain must look like `name.tld`.
pub fn validate_email(email: &str) -> Result<(), ValidationError> {
    let invalid = || rule("email_invalid", "email address is invalid");
    let (local, domain) = email.rsplit_once('@').ok_or_else(invalid)?;

    if !local.chars().any(|c| !c.is_whitespace()) {
        return Err(invalid());
    }
    if domain.is_empty() || domain.chars().any(char::is_whitespace) {
        return Err(invalid());
    }
    let chars: Vec<char> = domain.chars().collect();
    let has_inner_dot = chars
        .iter()
        .enumerate()
        .any(|(i, c)| *c == '.' && i > 0 && i + 1 < chars.len());
    if !has_inner_dot {
        return Err(invalid());
    }
    Ok(())
}

pub fn validate_password(password: &str) -> Result<(), ValidationError> {
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(rule(
            "password_too_short",
            "password must be at least 10 characters",
        ));
    }
    Ok(())
}
