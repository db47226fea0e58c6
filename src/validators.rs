/// Registration input validation.
///
/// Checks are collected, not short-circuited, so one response names every
/// problem with the submission. The email-uniqueness check lives in the
/// registration handler (it needs the store) and appends to the same list.
use lazy_static::lazy_static;
use regex::Regex;

pub const MIN_PASSWORD_LENGTH: usize = 8;

lazy_static! {
    // RFC 5322 simplified email regex (practical validation)
    static ref EMAIL_REGEX: Regex = Regex::new(
        r"^[a-zA-Z0-9.!#$%&'*+/=?^_`{|}~-]+@[a-zA-Z0-9](?:[a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?(?:\.[a-zA-Z0-9](?:[a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?)*$"
    ).unwrap();
}

pub fn is_valid_email(email: &str) -> bool {
    EMAIL_REGEX.is_match(email.trim())
}

/// Validate a registration submission. Returns the full list of failures, in
/// a stable order; empty means the shape is acceptable.
pub fn validate_registration(
    name: &str,
    surname: &str,
    email: &str,
    password: &str,
) -> Vec<String> {
    let mut errors = Vec::new();

    if !is_valid_email(email) {
        errors.push("Invalid email format.".to_string());
    }

    if name.trim().is_empty() {
        errors.push("User name is necessary.".to_string());
    }

    if surname.trim().is_empty() {
        errors.push("User surname is necessary.".to_string());
    }

    if password.trim().is_empty() || password.len() < MIN_PASSWORD_LENGTH {
        errors.push("Password should be a minimum of 8 characters.".to_string());
    }

    errors
}
