// src/models/review.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use validator::Validate;

/// A review left on a store
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Review {
    pub id: Uuid,
    pub store_id: Uuid,
    pub author_id: Uuid,
    pub rating: i32,
    pub text: String,
    pub created_at: DateTime<Utc>,
}

/// Review joined with its author's display name, for the store page
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct ReviewWithAuthor {
    pub id: Uuid,
    pub rating: i32,
    pub text: String,
    pub created_at: DateTime<Utc>,
    pub author_name: String,
}

/// Review submission form
#[derive(Debug, Deserialize, Validate)]
pub struct ReviewForm {
    #[validate(range(min = 1, max = 5, message = "Rating must be between 1 and 5"))]
    pub rating: i32,

    #[validate(length(min = 1, max = 5000, message = "Your review needs some text!"))]
    pub text: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_review_form_rating_bounds() {
        let form = ReviewForm {
            rating: 6,
            text: "Great tacos".to_string(),
        };
        assert!(form.validate().is_err());

        let form = ReviewForm {
            rating: 5,
            text: "Great tacos".to_string(),
        };
        assert!(form.validate().is_ok());
    }

    #[test]
    fn test_review_form_requires_text() {
        let form = ReviewForm {
            rating: 3,
            text: String::new(),
        };
        assert!(form.validate().is_err());
    }
}
