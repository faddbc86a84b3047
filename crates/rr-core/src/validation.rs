//! Field-level input checks shared by the API and form views.

use crate::error::{AppError, Result};

/// A required text field: present, not blank, at most `max` characters.
pub fn required(field: &str, value: Option<&str>, max: Option<usize>) -> Result<String> {
    let value = value.map(str::trim).unwrap_or_default();
    if value.is_empty() {
        return Err(AppError::ValidationError(format!("{field}: This field is required.")));
    }
    if let Some(max) = max {
        check_length(field, value, max)?;
    }
    Ok(value.to_string())
}

/// An optional text field; blank collapses to `None`.
pub fn optional(field: &str, value: Option<&str>, max: usize) -> Result<Option<String>> {
    match value.map(str::trim).filter(|v| !v.is_empty()) {
        Some(v) => {
            check_length(field, v, max)?;
            Ok(Some(v.to_string()))
        }
        None => Ok(None),
    }
}

fn check_length(field: &str, value: &str, max: usize) -> Result<()> {
    if value.chars().count() > max {
        return Err(AppError::ValidationError(format!(
            "{field}: Ensure this field has no more than {max} characters."
        )));
    }
    Ok(())
}

pub fn email(value: Option<&str>) -> Result<String> {
    let email = required("email", value, Some(254))?;
    match email.split_once('@') {
        Some((local, domain)) if !local.is_empty() && domain.contains('.') => Ok(email),
        _ => Err(AppError::ValidationError("email: Enter a valid email address.".into())),
    }
}

pub fn password(value: Option<&str>) -> Result<String> {
    // Not trimmed: whitespace is significant in passwords.
    let password = value.unwrap_or_default();
    if password.is_empty() {
        return Err(AppError::ValidationError("password: This field is required.".into()));
    }
    if password.chars().count() < 8 {
        return Err(AppError::ValidationError(
            "password: Ensure this field has at least 8 characters.".into(),
        ));
    }
    Ok(password.to_string())
}
