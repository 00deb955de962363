// src/db/review_repository.rs
// DOCUMENTATION: Review database operations
// PURPOSE: Handle insert and per-store listing of reviews

use crate::errors::StoreError;
use crate::models::{Review, ReviewWithAuthor};
use sqlx::PgPool;
use uuid::Uuid;

pub struct ReviewRepository;

impl ReviewRepository {
    /// Create a new review
    pub async fn insert(
        pool: &PgPool,
        store_id: Uuid,
        author_id: Uuid,
        rating: i32,
        text: &str,
    ) -> Result<Review, StoreError> {
        sqlx::query_as::<_, Review>(
            r#"
            INSERT INTO reviews (store_id, author_id, rating, text)
            VALUES ($1, $2, $3, $4)
            RETURNING *
            "#,
        )
        .bind(store_id)
        .bind(author_id)
        .bind(rating)
        .bind(text)
        .fetch_one(pool)
        .await
        .map_err(|e| {
            log::error!("Failed to create review: {}", e);
            StoreError::DatabaseError(format!("Create review failed: {}", e))
        })
    }

    /// Reviews for a store with author names, newest first
    pub async fn list_for_store(
        pool: &PgPool,
        store_id: Uuid,
    ) -> Result<Vec<ReviewWithAuthor>, StoreError> {
        sqlx::query_as::<_, ReviewWithAuthor>(
            r#"
            SELECT r.id, r.rating, r.text, r.created_at, u.name AS author_name
            FROM reviews r
            JOIN users u ON u.id = r.author_id
            WHERE r.store_id = $1
            ORDER BY r.created_at DESC
            "#,
        )
        .bind(store_id)
        .fetch_all(pool)
        .await
        .map_err(|e| {
            log::error!("Failed to fetch reviews for store {}: {}", store_id, e);
            StoreError::DatabaseError(format!("Fetch reviews failed: {}", e))
        })
    }
}
