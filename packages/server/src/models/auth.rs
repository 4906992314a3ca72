use common::Role;
use serde::{Deserialize, Serialize};

use crate::error::AppError;

/// Request body for user registration.
#[derive(Deserialize, utoipa::ToSchema)]
pub struct RegisterRequest {
    /// Unique username (1-32 chars, alphanumeric and underscores).
    #[schema(example = "alice_wonder")]
    pub username: String,
    /// Contact address.
    #[schema(example = "alice@example.com")]
    pub email: String,
    /// Password (8-128 characters, not entirely numeric).
    #[schema(example = "s3cure_P@ss!")]
    pub password: String,
    /// Must repeat `password` exactly.
    #[schema(example = "s3cure_P@ss!")]
    pub password_confirm: String,
    /// Requested role. Defaults to `READER`.
    pub role: Option<Role>,
    /// Free-form profile text.
    pub bio: Option<String>,
}

pub fn validate_username(username: &str) -> Result<(), AppError> {
    let username = username.trim();
    if username.is_empty() || username.chars().count() > 32 {
        return Err(AppError::Validation(
            "Username must be 1-32 characters".into(),
        ));
    }
    if !username
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '_')
    {
        return Err(AppError::Validation(
            "Username must contain only letters, digits, and underscores".into(),
        ));
    }
    Ok(())
}

pub fn validate_email(email: &str) -> Result<(), AppError> {
    let email = email.trim();
    let valid = match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && !domain.contains('@')
                && domain.contains('.')
                && !domain.starts_with('.')
                && !domain.ends_with('.')
                && !email.chars().any(char::is_whitespace)
        }
        None => false,
    };
    if !valid || email.chars().count() > 254 {
        return Err(AppError::Validation("Enter a valid email address".into()));
    }
    Ok(())
}

pub fn validate_password(password: &str, username: &str) -> Result<(), AppError> {
    if password.len() < 8 || password.len() > 128 {
        return Err(AppError::Validation(
            "Password must be 8-128 characters".into(),
        ));
    }
    if password.chars().all(|c| c.is_ascii_digit()) {
        return Err(AppError::Validation(
            "Password must not be entirely numeric".into(),
        ));
    }
    if password.eq_ignore_ascii_case(username.trim()) {
        return Err(AppError::Validation(
            "Password must differ from the username".into(),
        ));
    }
    Ok(())
}

pub fn validate_register_request(
    payload: &RegisterRequest,
    allow_admin: bool,
) -> Result<(), AppError> {
    validate_username(&payload.username)?;
    validate_email(&payload.email)?;
    validate_password(&payload.password, &payload.username)?;
    if payload.password != payload.password_confirm {
        return Err(AppError::Validation("Password fields didn't match".into()));
    }
    if payload.role == Some(Role::Admin) && !allow_admin {
        return Err(AppError::Validation(
            "The ADMIN role cannot be requested at registration".into(),
        ));
    }
    Ok(())
}

/// Request body for user login.
#[derive(Deserialize, utoipa::ToSchema)]
pub struct LoginRequest {
    /// Username of the account to log into.
    #[schema(example = "alice_wonder")]
    pub username: String,
    /// Account password.
    #[schema(example = "s3cure_P@ss!")]
    pub password: String,
}

pub fn validate_login_request(payload: &LoginRequest) -> Result<(), AppError> {
    if payload.username.trim().is_empty() {
        return Err(AppError::Validation("Username must not be empty".into()));
    }
    if payload.password.is_empty() {
        return Err(AppError::Validation("Password must not be empty".into()));
    }
    Ok(())
}

/// Successful login response.
#[derive(Serialize, utoipa::ToSchema)]
pub struct LoginResponse {
    /// JWT bearer token.
    #[schema(example = "eyJhbGciOiJIUzI1NiIsInR5cCI6IkpXVCJ9...")]
    pub token: String,
    /// Authenticated user's ID.
    #[schema(example = 42)]
    pub user_id: i32,
    /// Authenticated user's username.
    #[schema(example = "alice_wonder")]
    pub username: String,
    /// User's role.
    pub role: Role,
}
