// src/services/user_service.rs
// DOCUMENTATION: Account business logic
// PURPOSE: Registration, authentication, account updates, password reset

use crate::db::UserRepository;
use crate::errors::StoreError;
use crate::models::{AccountForm, RegisterForm, ResetForm, User};
use chrono::{Duration, Utc};
use rand::RngCore;
use sqlx::PgPool;
use uuid::Uuid;

/// Reset tokens live for one hour
const RESET_TOKEN_TTL_HOURS: i64 = 1;

/// Lowercase and trim an email for storage and lookup
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

fn hash_password(password: &str) -> Result<String, StoreError> {
    bcrypt::hash(password, bcrypt::DEFAULT_COST).map_err(|e| {
        log::error!("Password hashing failed: {}", e);
        StoreError::DatabaseError("Could not hash password".to_string())
    })
}

/// 40 hex characters from 20 random bytes
fn generate_reset_token() -> String {
    let mut bytes = [0u8; 20];
    rand::thread_rng().fill_bytes(&mut bytes);
    hex::encode(bytes)
}

pub struct UserService;

impl UserService {
    /// Register a new account. The form is assumed validated; the
    /// password-confirmation check lives here so every caller gets it.
    pub async fn register(pool: &PgPool, form: &RegisterForm) -> Result<User, StoreError> {
        if form.password != form.password_confirm {
            return Err(StoreError::ValidationError(
                "Oops! Your passwords do not match".to_string(),
            ));
        }

        let email = normalize_email(&form.email);
        let password_hash = hash_password(&form.password)?;

        let user = UserRepository::insert(pool, form.name.trim(), &email, &password_hash).await?;
        log::info!("Registered user {}", user.email);
        Ok(user)
    }

    /// Verify credentials; None means bad email or bad password
    pub async fn authenticate(
        pool: &PgPool,
        email: &str,
        password: &str,
    ) -> Result<Option<User>, StoreError> {
        let email = normalize_email(email);

        let Some(user) = UserRepository::find_by_email(pool, &email).await? else {
            return Ok(None);
        };

        let ok = bcrypt::verify(password, &user.password_hash).unwrap_or(false);
        if !ok {
            log::info!("Failed login attempt for {}", email);
            return Ok(None);
        }

        Ok(Some(user))
    }

    pub async fn update_account(
        pool: &PgPool,
        user_id: Uuid,
        form: &AccountForm,
    ) -> Result<User, StoreError> {
        let email = normalize_email(&form.email);
        UserRepository::update_account(pool, user_id, form.name.trim(), &email).await
    }

    /// Issue a reset token for the account behind `email`, if any.
    /// Returns the user and the raw token to put in the mail.
    pub async fn start_password_reset(
        pool: &PgPool,
        email: &str,
    ) -> Result<Option<(User, String)>, StoreError> {
        let email = normalize_email(email);

        let Some(user) = UserRepository::find_by_email(pool, &email).await? else {
            return Ok(None);
        };

        let token = generate_reset_token();
        let expires_at = Utc::now() + Duration::hours(RESET_TOKEN_TTL_HOURS);
        UserRepository::set_reset_token(pool, user.id, &token, expires_at).await?;

        log::info!("Issued password reset token for {}", email);
        Ok(Some((user, token)))
    }

    /// Look up the account behind an unexpired token
    pub async fn find_by_reset_token(
        pool: &PgPool,
        token: &str,
    ) -> Result<Option<User>, StoreError> {
        UserRepository::find_by_valid_reset_token(pool, token).await
    }

    /// Complete a reset: token must still be valid, passwords must match
    pub async fn reset_password(
        pool: &PgPool,
        token: &str,
        form: &ResetForm,
    ) -> Result<User, StoreError> {
        if form.password != form.password_confirm {
            return Err(StoreError::ValidationError(
                "Oops! Your passwords do not match".to_string(),
            ));
        }

        let Some(user) = UserRepository::find_by_valid_reset_token(pool, token).await? else {
            return Err(StoreError::ValidationError(
                "Password reset is invalid or has expired".to_string(),
            ));
        };

        let password_hash = hash_password(&form.password)?;
        let user = UserRepository::update_password(pool, user.id, &password_hash).await?;

        log::info!("Password reset completed for {}", user.email);
        Ok(user)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_email() {
        assert_eq!(normalize_email("  Wes@Example.COM "), "wes@example.com");
    }

    #[test]
    fn test_reset_token_shape() {
        let token = generate_reset_token();
        assert_eq!(token.len(), 40);
        assert!(token.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn test_reset_tokens_are_unique() {
        assert_ne!(generate_reset_token(), generate_reset_token());
    }

    #[test]
    fn test_password_hash_roundtrip() {
        let hash = hash_password("correct horse battery staple").unwrap();
        assert!(bcrypt::verify("correct horse battery staple", &hash).unwrap());
        assert!(!bcrypt::verify("wrong password", &hash).unwrap());
    }
}
