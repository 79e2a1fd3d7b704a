//! Field-level validation policy.
//!
//! One place defines what a valid display name, address, store name, and
//! password look like. Registration, admin account creation, password change,
//! and the CLI bootstrap all call these functions, so the rules cannot drift
//! between entry points.
//!
//! Lengths are counted in characters, not bytes.

use serde::Serialize;

use crate::types::Email;

/// Display name length bounds for accounts.
pub const DISPLAY_NAME_LENGTH: (usize, usize) = (20, 60);
/// Store name length bounds.
pub const STORE_NAME_LENGTH: (usize, usize) = (1, 60);
/// Maximum address length for accounts and stores.
pub const MAX_ADDRESS_LENGTH: usize = 400;
/// Password length bounds.
pub const PASSWORD_LENGTH: (usize, usize) = (8, 16);
/// A password must contain at least one of these characters.
pub const PASSWORD_SPECIAL_CHARACTERS: &str = "!@#$%^&*";

/// A single rejected field with a human-readable reason.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, thiserror::Error)]
#[error("{field}: {message}")]
pub struct FieldError {
    /// Name of the offending input field.
    pub field: &'static str,
    /// Why the value was rejected.
    pub message: String,
}

impl FieldError {
    /// Create a field error.
    #[must_use]
    pub fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

/// Every field error found in one input, reported together.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, thiserror::Error)]
#[error("validation failed: {}", summarize(.errors))]
#[serde(transparent)]
pub struct ValidationErrors {
    errors: Vec<FieldError>,
}

fn summarize(errors: &[FieldError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

impl ValidationErrors {
    /// An empty collection.
    #[must_use]
    pub const fn new() -> Self {
        Self { errors: Vec::new() }
    }

    /// A collection holding a single error.
    #[must_use]
    pub fn single(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            errors: vec![FieldError::new(field, message)],
        }
    }

    /// Record one error.
    pub fn push(&mut self, error: FieldError) {
        self.errors.push(error);
    }

    /// Record the outcome of one field check.
    pub fn check(&mut self, result: Result<(), FieldError>) {
        if let Err(error) = result {
            self.errors.push(error);
        }
    }

    /// Record the outcome of a check that also produces a parsed value.
    pub fn take<T>(&mut self, result: Result<T, FieldError>) -> Option<T> {
        match result {
            Ok(value) => Some(value),
            Err(error) => {
                self.errors.push(error);
                None
            }
        }
    }

    /// Whether no errors were recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    /// The recorded errors.
    #[must_use]
    pub fn errors(&self) -> &[FieldError] {
        &self.errors
    }

    /// `Ok(())` when nothing was recorded, otherwise `Err(self)`.
    ///
    /// # Errors
    ///
    /// Returns `self` if at least one field failed.
    pub fn into_result(self) -> Result<(), Self> {
        if self.is_empty() { Ok(()) } else { Err(self) }
    }
}

impl From<FieldError> for ValidationErrors {
    fn from(error: FieldError) -> Self {
        Self {
            errors: vec![error],
        }
    }
}

fn check_length(
    field: &'static str,
    value: &str,
    (min, max): (usize, usize),
) -> Result<(), FieldError> {
    let len = value.chars().count();
    if len < min || len > max {
        return Err(FieldError::new(
            field,
            format!("must be between {min} and {max} characters"),
        ));
    }
    Ok(())
}

/// Validate an account display name (20–60 characters).
///
/// # Errors
///
/// Returns a `name` field error when out of bounds.
pub fn validate_display_name(name: &str) -> Result<(), FieldError> {
    check_length("name", name, DISPLAY_NAME_LENGTH)
}

/// Validate a store name (1–60 characters).
///
/// # Errors
///
/// Returns a `name` field error when out of bounds.
pub fn validate_store_name(name: &str) -> Result<(), FieldError> {
    check_length("name", name.trim(), STORE_NAME_LENGTH)
}

/// Validate a postal address (at most 400 characters).
///
/// # Errors
///
/// Returns an `address` field error when too long.
pub fn validate_address(address: &str) -> Result<(), FieldError> {
    if address.chars().count() > MAX_ADDRESS_LENGTH {
        return Err(FieldError::new(
            "address",
            format!("must not exceed {MAX_ADDRESS_LENGTH} characters"),
        ));
    }
    Ok(())
}

/// Parse an email for the given input field.
///
/// # Errors
///
/// Returns a field error carrying the parse failure.
pub fn parse_email(field: &'static str, value: &str) -> Result<Email, FieldError> {
    Email::parse(value).map_err(|e| FieldError::new(field, e.to_string()))
}

/// Validate a new password against the platform policy.
///
/// 8–16 characters, with at least one uppercase letter and at least one of
/// `!@#$%^&*`. `field` names the input being checked (`password` or
/// `new_password`).
///
/// # Errors
///
/// Returns a field error describing the first rule the password breaks.
pub fn validate_password(field: &'static str, password: &str) -> Result<(), FieldError> {
    check_length(field, password, PASSWORD_LENGTH)?;

    if !password.chars().any(char::is_uppercase) {
        return Err(FieldError::new(
            field,
            "must contain at least one uppercase letter",
        ));
    }

    if !password
        .chars()
        .any(|c| PASSWORD_SPECIAL_CHARACTERS.contains(c))
    {
        return Err(FieldError::new(
            field,
            format!("must contain at least one of {PASSWORD_SPECIAL_CHARACTERS}"),
        ));
    }

    Ok(())
}
