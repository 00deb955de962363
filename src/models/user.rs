// src/models/user.rs
// DOCUMENTATION: User account structures
// PURPOSE: Database row mapping plus auth and account form DTOs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use validator::Validate;

/// A registered user. Credential fields never leave the server:
/// the hash and reset token are excluded from serialization.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct User {
    pub id: Uuid,

    pub name: String,

    /// Stored lowercase; lookups normalize the same way
    pub email: String,

    #[serde(skip_serializing)]
    pub password_hash: String,

    #[serde(skip_serializing)]
    pub reset_token: Option<String>,

    #[serde(skip_serializing)]
    pub reset_token_expires_at: Option<DateTime<Utc>>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Registration form
#[derive(Debug, Deserialize, Validate)]
pub struct RegisterForm {
    #[validate(length(min = 1, max = 255, message = "You must supply a name!"))]
    pub name: String,

    #[validate(email(message = "That Email is not valid!"))]
    pub email: String,

    #[validate(length(min = 8, message = "Password must be at least 8 characters!"))]
    pub password: String,

    #[serde(rename = "password-confirm")]
    pub password_confirm: String,
}

/// Login form
#[derive(Debug, Deserialize)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
}

/// Account settings form
#[derive(Debug, Deserialize, Validate)]
pub struct AccountForm {
    #[validate(length(min = 1, max = 255, message = "You must supply a name!"))]
    pub name: String,

    #[validate(email(message = "That Email is not valid!"))]
    pub email: String,
}

/// Forgot-password form
#[derive(Debug, Deserialize)]
pub struct ForgotForm {
    pub email: String,
}

/// Password-reset form
#[derive(Debug, Deserialize, Validate)]
pub struct ResetForm {
    #[validate(length(min = 8, message = "Password must be at least 8 characters!"))]
    pub password: String,

    #[serde(rename = "password-confirm")]
    pub password_confirm: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_register_form_rejects_bad_email() {
        let form = RegisterForm {
            name: "Wes".to_string(),
            email: "not-an-email".to_string(),
            password: "correct horse".to_string(),
            password_confirm: "correct horse".to_string(),
        };
        assert!(form.validate().is_err());
    }

    #[test]
    fn test_register_form_rejects_short_password() {
        let form = RegisterForm {
            name: "Wes".to_string(),
            email: "wes@example.com".to_string(),
            password: "short".to_string(),
            password_confirm: "short".to_string(),
        };
        assert!(form.validate().is_err());
    }

    #[test]
    fn test_register_form_accepts_valid_input() {
        let form = RegisterForm {
            name: "Wes".to_string(),
            email: "wes@example.com".to_string(),
            password: "correct horse".to_string(),
            password_confirm: "correct horse".to_string(),
        };
        assert!(form.validate().is_ok());
    }
}
