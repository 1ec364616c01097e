use crate::error::{AppError, Result};

/// Validates an email address well enough to reject obvious garbage.
///
/// # Arguments
///
/// * `email` - The email to validate.
pub fn validate_email(email: &str) -> Result<()> {
    let email = email.trim();

    if email.is_empty() {
        return Err(AppError::Validation("Email is required".to_string()));
    }

    if email.len() > 255 {
        return Err(AppError::Validation(
            "Email must be at most 255 characters".to_string(),
        ));
    }

    match email.split_once('@') {
        Some((local, domain)) if !local.is_empty() && domain.contains('.') && !domain.contains('@') => Ok(()),
        _ => Err(AppError::Validation("Email is not valid".to_string())),
    }
}

/// Validates a password submitted for sign-in.
///
/// # Arguments
///
/// * `password` - The password to validate.
pub fn validate_password(password: &str) -> Result<()> {
    if password.is_empty() {
        return Err(AppError::Validation("Password is required".to_string()));
    }

    if password.len() > 128 {
        return Err(AppError::Validation(
            "Password must be at most 128 characters".to_string(),
        ));
    }

    Ok(())
}
