// src/services/review_service.rs
// DOCUMENTATION: Review business logic
// PURPOSE: Validate and store reviews against existing stores

use crate::db::{ReviewRepository, StoreRepository};
use crate::errors::StoreError;
use crate::models::{Review, ReviewForm, Store};
use sqlx::PgPool;
use uuid::Uuid;
use validator::Validate;

pub struct ReviewService;

impl ReviewService {
    /// Add a review to a store; returns the store so the caller can
    /// redirect back to its page.
    pub async fn add(
        pool: &PgPool,
        store_id: Uuid,
        author_id: Uuid,
        form: &ReviewForm,
    ) -> Result<(Store, Review), StoreError> {
        form.validate()
            .map_err(|e| StoreError::ValidationError(e.to_string()))?;

        let store = StoreRepository::get_by_id(pool, store_id).await?;
        let review =
            ReviewRepository::insert(pool, store.id, author_id, form.rating, form.text.trim())
                .await?;

        log::info!("Review added to store {} by {}", store.slug, author_id);
        Ok((store, review))
    }
}
