// src/handlers/api.rs
// DOCUMENTATION: JSON endpoints backing the client-side widgets
// PURPOSE: Live search, map markers, heart toggling

use actix_web::{web, HttpResponse, Responder};
use serde::Deserialize;
use serde_json::json;
use sqlx::PgPool;
use uuid::Uuid;

use crate::errors::StoreError;
use crate::services::store_service::StoreService;
use crate::session::AuthedUser;

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    pub q: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct NearQuery {
    pub lng: f64,
    pub lat: f64,
}

/// GET /api/v1/search?q=...
/// Ranked full-text matches for the typeahead widget
pub async fn search_stores(
    pool: web::Data<PgPool>,
    query: web::Query<SearchQuery>,
) -> Result<impl Responder, StoreError> {
    let q = query.into_inner().q.unwrap_or_default();
    let results = StoreService::search(pool.get_ref(), &q).await?;
    Ok(HttpResponse::Ok().json(results))
}

/// GET /api/v1/stores/near?lng=...&lat=...
/// Stores within 10km for the map page
pub async fn near_stores(
    pool: web::Data<PgPool>,
    query: web::Query<NearQuery>,
) -> Result<impl Responder, StoreError> {
    let query = query.into_inner();
    let stores = StoreService::near(pool.get_ref(), query.lng, query.lat).await?;
    Ok(HttpResponse::Ok().json(stores))
}

/// POST /api/v1/stores/{id}/heart
/// Toggle a heart; responds with the caller's updated heart list
pub async fn heart_store(
    pool: web::Data<PgPool>,
    user: AuthedUser,
    path: web::Path<Uuid>,
) -> Result<impl Responder, StoreError> {
    let hearts: Vec<Uuid> =
        StoreService::toggle_heart(pool.get_ref(), user.0.id, path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(json!({ "hearts": hearts })))
}

/// Configuration for API routes
pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/v1")
            .route("/search", web::get().to(search_stores))
            .route("/stores/near", web::get().to(near_stores))
            .route("/stores/{id}/heart", web::post().to(heart_store)),
    );
}
