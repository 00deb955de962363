// src/models/store.rs
// DOCUMENTATION: Core data structures for stores
// PURPOSE: Database row mapping plus form and API DTOs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use validator::Validate;

/// A store listing as read from the database.
/// Coordinates are extracted from the PostGIS point with ST_X/ST_Y
/// in every query, so the struct carries plain lon/lat floats.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Store {
    pub id: Uuid,

    pub name: String,

    /// URL-safe unique identifier derived from the name
    pub slug: String,

    pub description: String,

    pub tags: Vec<String>,

    /// Physical street address
    pub address: Option<String>,

    /// Geographic coordinates - longitude (from ST_X(location))
    pub longitude: f64,

    /// Geographic coordinates - latitude (from ST_Y(location))
    pub latitude: f64,

    /// Uploaded photo filename under the uploads dir
    pub photo: Option<String>,

    /// Owning user
    pub author_id: Uuid,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Validated input for creating or updating a store.
/// Built by the handlers from the multipart form fields.
#[derive(Debug, Clone, Validate)]
pub struct StoreInput {
    #[validate(length(min = 1, max = 255, message = "Please supply a store name"))]
    pub name: String,

    #[validate(length(max = 5000, message = "That description is too long"))]
    pub description: String,

    #[validate(length(min = 1, max = 255, message = "You must supply an address"))]
    pub address: String,

    #[validate(range(min = -180.0, max = 180.0, message = "You must supply coordinates"))]
    pub longitude: f64,

    #[validate(range(min = -90.0, max = 90.0, message = "You must supply coordinates"))]
    pub latitude: f64,

    pub tags: Vec<String>,
}

/// JSON result row for the live-search endpoint
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct SearchResult {
    pub slug: String,
    pub name: String,
    pub description: String,
}

/// Geographic point as exposed on the near API
#[derive(Debug, Clone, Copy, Serialize)]
pub struct GeoPoint {
    pub lng: f64,
    pub lat: f64,
}

/// JSON result row for the near endpoint (map markers)
#[derive(Debug, Clone, Serialize)]
pub struct NearStore {
    pub slug: String,
    pub name: String,
    pub description: String,
    pub photo: Option<String>,
    pub location: GeoPoint,
}

/// Row for the top-stores ranking: store columns plus review aggregates
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct TopStore {
    pub id: Uuid,
    pub name: String,
    pub slug: String,
    pub description: String,
    pub photo: Option<String>,
    pub avg_rating: f64,
    pub review_count: i64,
}

/// Tag with the number of stores carrying it
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct TagCount {
    pub tag: String,
    pub count: i64,
}

impl Store {
    /// Project the store into a map-marker DTO
    pub fn to_near(&self) -> NearStore {
        NearStore {
            slug: self.slug.clone(),
            name: self.name.clone(),
            description: self.description.clone(),
            photo: self.photo.clone(),
            location: GeoPoint {
                lng: self.longitude,
                lat: self.latitude,
            },
        }
    }
}
