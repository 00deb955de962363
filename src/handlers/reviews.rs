// src/handlers/reviews.rs
// DOCUMENTATION: Review submission handler

use actix_session::Session;
use actix_web::{web, HttpRequest, HttpResponse};
use sqlx::PgPool;
use uuid::Uuid;

use super::{back, redirect};
use crate::errors::StoreError;
use crate::models::ReviewForm;
use crate::services::ReviewService;
use crate::session::{flash, AuthedUser};

/// POST /review/{store_id}
pub async fn add_review(
    req: HttpRequest,
    pool: web::Data<PgPool>,
    user: AuthedUser,
    session: Session,
    path: web::Path<Uuid>,
    form: web::Form<ReviewForm>,
) -> Result<HttpResponse, StoreError> {
    match ReviewService::add(pool.get_ref(), path.into_inner(), user.0.id, &form).await {
        Ok((store, _review)) => {
            flash(&session, "success", "Review saved!");
            Ok(redirect(&format!("/store/{}", store.slug)))
        }
        Err(StoreError::ValidationError(message)) => {
            flash(&session, "error", message);
            Ok(redirect(&back(&req, "/")))
        }
        Err(e) => Err(e),
    }
}

/// Configuration for review routes
pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.route("/review/{id}", web::post().to(add_review));
}
