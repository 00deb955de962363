// src/db/user_repository.rs
// DOCUMENTATION: User database operations
// PURPOSE: Account CRUD, reset tokens, and heart toggling

use crate::errors::StoreError;
use crate::models::User;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

const UNIQUE_VIOLATION: &str = "23505";

/// Map a sqlx error, converting unique-email violations into a
/// validation failure the register/account forms can flash.
fn map_user_error(e: sqlx::Error) -> StoreError {
    if let sqlx::Error::Database(db) = &e {
        if db.code().as_deref() == Some(UNIQUE_VIOLATION) {
            return StoreError::ValidationError(
                "That email is already registered!".to_string(),
            );
        }
    }
    log::error!("User query failed: {}", e);
    StoreError::DatabaseError(e.to_string())
}

pub struct UserRepository;

impl UserRepository {
    /// Create a new account. Email must already be normalized to lowercase.
    pub async fn insert(
        pool: &PgPool,
        name: &str,
        email: &str,
        password_hash: &str,
    ) -> Result<User, StoreError> {
        sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (name, email, password_hash)
            VALUES ($1, $2, $3)
            RETURNING *
            "#,
        )
        .bind(name)
        .bind(email)
        .bind(password_hash)
        .fetch_one(pool)
        .await
        .map_err(map_user_error)
    }

    pub async fn get_by_id(pool: &PgPool, id: Uuid) -> Result<Option<User>, StoreError> {
        sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = $1")
            .bind(id)
            .fetch_optional(pool)
            .await
            .map_err(map_user_error)
    }

    pub async fn find_by_email(pool: &PgPool, email: &str) -> Result<Option<User>, StoreError> {
        sqlx::query_as::<_, User>("SELECT * FROM users WHERE email = $1")
            .bind(email)
            .fetch_optional(pool)
            .await
            .map_err(map_user_error)
    }

    /// Update name and email on the account page
    pub async fn update_account(
        pool: &PgPool,
        id: Uuid,
        name: &str,
        email: &str,
    ) -> Result<User, StoreError> {
        sqlx::query_as::<_, User>(
            r#"
            UPDATE users
            SET name = $1, email = $2, updated_at = NOW()
            WHERE id = $3
            RETURNING *
            "#,
        )
        .bind(name)
        .bind(email)
        .bind(id)
        .fetch_one(pool)
        .await
        .map_err(map_user_error)
    }

    /// Store a password-reset token with its expiry
    pub async fn set_reset_token(
        pool: &PgPool,
        id: Uuid,
        token: &str,
        expires_at: DateTime<Utc>,
    ) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            UPDATE users
            SET reset_token = $1, reset_token_expires_at = $2, updated_at = NOW()
            WHERE id = $3
            "#,
        )
        .bind(token)
        .bind(expires_at)
        .bind(id)
        .execute(pool)
        .await
        .map_err(map_user_error)?;

        Ok(())
    }

    /// Look up a user by a reset token that has not expired yet.
    /// Token match and expiry are checked in one query.
    pub async fn find_by_valid_reset_token(
        pool: &PgPool,
        token: &str,
    ) -> Result<Option<User>, StoreError> {
        sqlx::query_as::<_, User>(
            r#"
            SELECT * FROM users
            WHERE reset_token = $1 AND reset_token_expires_at > NOW()
            "#,
        )
        .bind(token)
        .fetch_optional(pool)
        .await
        .map_err(map_user_error)
    }

    /// Replace the password hash and clear any outstanding reset token
    pub async fn update_password(
        pool: &PgPool,
        id: Uuid,
        password_hash: &str,
    ) -> Result<User, StoreError> {
        sqlx::query_as::<_, User>(
            r#"
            UPDATE users
            SET password_hash = $1,
                reset_token = NULL,
                reset_token_expires_at = NULL,
                updated_at = NOW()
            WHERE id = $2
            RETURNING *
            "#,
        )
        .bind(password_hash)
        .bind(id)
        .fetch_one(pool)
        .await
        .map_err(map_user_error)
    }

    /// Ids of the stores this user has hearted
    pub async fn hearts(pool: &PgPool, user_id: Uuid) -> Result<Vec<Uuid>, StoreError> {
        sqlx::query_scalar::<_, Uuid>(
            "SELECT store_id FROM user_hearts WHERE user_id = $1 ORDER BY created_at DESC",
        )
        .bind(user_id)
        .fetch_all(pool)
        .await
        .map_err(map_user_error)
    }

    pub async fn add_heart(
        pool: &PgPool,
        user_id: Uuid,
        store_id: Uuid,
    ) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            INSERT INTO user_hearts (user_id, store_id)
            VALUES ($1, $2)
            ON CONFLICT DO NOTHING
            "#,
        )
        .bind(user_id)
        .bind(store_id)
        .execute(pool)
        .await
        .map_err(map_user_error)?;

        Ok(())
    }

    /// Remove a heart; returns whether a row was actually deleted
    pub async fn remove_heart(
        pool: &PgPool,
        user_id: Uuid,
        store_id: Uuid,
    ) -> Result<bool, StoreError> {
        let result = sqlx::query(
            "DELETE FROM user_hearts WHERE user_id = $1 AND store_id = $2",
        )
        .bind(user_id)
        .bind(store_id)
        .execute(pool)
        .await
        .map_err(map_user_error)?;

        Ok(result.rows_affected() > 0)
    }
}
