// src/db/store_repository.rs
// DOCUMENTATION: Database access layer - all store SQL queries
// PURPOSE: Abstract database operations from business logic

use crate::errors::StoreError;
use crate::models::{SearchResult, Store, StoreInput, TagCount, TopStore};
use sqlx::PgPool;
use uuid::Uuid;

/// Shared SELECT list: extracts lon/lat from the PostGIS point so rows
/// map directly onto the Store struct.
const STORE_COLUMNS: &str = r#"
    s.id, s.name, s.slug, s.description, s.tags, s.address,
    ST_X(s.location::geometry) AS longitude,
    ST_Y(s.location::geometry) AS latitude,
    s.photo, s.author_id, s.created_at, s.updated_at
"#;

/// StoreRepository: all database operations for stores
pub struct StoreRepository;

impl StoreRepository {
    /// Insert a new store and return the created record
    pub async fn insert(
        pool: &PgPool,
        input: &StoreInput,
        slug: &str,
        photo: Option<&str>,
        author_id: Uuid,
    ) -> Result<Store, StoreError> {
        let inserted: (Uuid,) = sqlx::query_as(
            r#"
            INSERT INTO stores (name, slug, description, tags, address, location, photo, author_id)
            VALUES (
                $1, $2, $3, $4, $5,
                ST_SetSRID(ST_MakePoint($6, $7), 4326)::geography,
                $8, $9
            )
            RETURNING id
            "#,
        )
        .bind(&input.name)
        .bind(slug)
        .bind(&input.description)
        .bind(&input.tags)
        .bind(&input.address)
        .bind(input.longitude)
        .bind(input.latitude)
        .bind(photo)
        .bind(author_id)
        .fetch_one(pool)
        .await
        .map_err(|e| {
            log::error!("Failed to create store: {}", e);
            StoreError::DatabaseError(e.to_string())
        })?;

        let store = Self::get_by_id(pool, inserted.0).await?;
        log::info!("Created store {} ({})", store.name, store.slug);
        Ok(store)
    }

    /// Update an existing store. The photo is only replaced when a new
    /// filename is provided; everything else is written as given.
    pub async fn update(
        pool: &PgPool,
        id: Uuid,
        input: &StoreInput,
        slug: &str,
        photo: Option<&str>,
    ) -> Result<Store, StoreError> {
        let updated: Option<(Uuid,)> = sqlx::query_as(
            r#"
            UPDATE stores
            SET name = $1,
                slug = $2,
                description = $3,
                tags = $4,
                address = $5,
                location = ST_SetSRID(ST_MakePoint($6, $7), 4326)::geography,
                photo = COALESCE($8, photo),
                updated_at = NOW()
            WHERE id = $9
            RETURNING id
            "#,
        )
        .bind(&input.name)
        .bind(slug)
        .bind(&input.description)
        .bind(&input.tags)
        .bind(&input.address)
        .bind(input.longitude)
        .bind(input.latitude)
        .bind(photo)
        .bind(id)
        .fetch_optional(pool)
        .await
        .map_err(|e| {
            log::error!("Update failed for store {}: {}", id, e);
            StoreError::DatabaseError(e.to_string())
        })?;

        match updated {
            Some((id,)) => {
                let store = Self::get_by_id(pool, id).await?;
                log::info!("Updated store {}", id);
                Ok(store)
            }
            None => Err(StoreError::NotFound(id.to_string())),
        }
    }

    /// Retrieve a store by ID
    pub async fn get_by_id(pool: &PgPool, id: Uuid) -> Result<Store, StoreError> {
        let sql = format!("SELECT {} FROM stores s WHERE s.id = $1", STORE_COLUMNS);

        sqlx::query_as::<_, Store>(&sql)
            .bind(id)
            .fetch_optional(pool)
            .await
            .map_err(|e| {
                log::error!("Database error fetching store {}: {}", id, e);
                StoreError::DatabaseError(e.to_string())
            })?
            .ok_or_else(|| StoreError::NotFound(id.to_string()))
    }

    /// Retrieve a store by slug
    pub async fn get_by_slug(pool: &PgPool, slug: &str) -> Result<Store, StoreError> {
        let sql = format!("SELECT {} FROM stores s WHERE s.slug = $1", STORE_COLUMNS);

        sqlx::query_as::<_, Store>(&sql)
            .bind(slug)
            .fetch_optional(pool)
            .await
            .map_err(|e| {
                log::error!("Database error fetching store '{}': {}", slug, e);
                StoreError::DatabaseError(e.to_string())
            })?
            .ok_or_else(|| StoreError::NotFound(slug.to_string()))
    }

    /// One page of the store listing, newest first
    pub async fn list_page(
        pool: &PgPool,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Store>, StoreError> {
        let sql = format!(
            "SELECT {} FROM stores s ORDER BY s.created_at DESC LIMIT $1 OFFSET $2",
            STORE_COLUMNS
        );

        sqlx::query_as::<_, Store>(&sql)
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await
            .map_err(|e| {
                log::error!("Store listing query error: {}", e);
                StoreError::DatabaseError(e.to_string())
            })
    }

    /// Total number of stores (for pagination)
    pub async fn count(pool: &PgPool) -> Result<i64, StoreError> {
        let count: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM stores")
            .fetch_one(pool)
            .await
            .map_err(|e| {
                log::error!("Store count query error: {}", e);
                StoreError::DatabaseError(e.to_string())
            })?;

        Ok(count.0)
    }

    /// Stores carrying a tag; with no tag, every store that has at least one
    pub async fn list_by_tag(pool: &PgPool, tag: Option<&str>) -> Result<Vec<Store>, StoreError> {
        let rows = match tag {
            Some(tag) => {
                let sql = format!(
                    "SELECT {} FROM stores s WHERE $1 = ANY(s.tags) ORDER BY s.created_at DESC",
                    STORE_COLUMNS
                );
                sqlx::query_as::<_, Store>(&sql).bind(tag).fetch_all(pool).await
            }
            None => {
                let sql = format!(
                    "SELECT {} FROM stores s WHERE array_length(s.tags, 1) >= 1 ORDER BY s.created_at DESC",
                    STORE_COLUMNS
                );
                sqlx::query_as::<_, Store>(&sql).fetch_all(pool).await
            }
        };

        rows.map_err(|e| {
            log::error!("Tag listing query error: {}", e);
            StoreError::DatabaseError(e.to_string())
        })
    }

    /// Tag cloud: every tag with the number of stores carrying it
    pub async fn tag_counts(pool: &PgPool) -> Result<Vec<TagCount>, StoreError> {
        sqlx::query_as::<_, TagCount>(
            r#"
            SELECT tag, COUNT(*) AS count
            FROM stores s, unnest(s.tags) AS tag
            GROUP BY tag
            ORDER BY count DESC, tag ASC
            "#,
        )
        .fetch_all(pool)
        .await
        .map_err(|e| {
            log::error!("Tag aggregation query error: {}", e);
            StoreError::DatabaseError(e.to_string())
        })
    }

    /// Highest-rated stores with at least `min_reviews` reviews
    pub async fn top_stores(
        pool: &PgPool,
        min_reviews: i64,
        limit: i64,
    ) -> Result<Vec<TopStore>, StoreError> {
        sqlx::query_as::<_, TopStore>(
            r#"
            SELECT s.id, s.name, s.slug, s.description, s.photo,
                   AVG(r.rating)::float8 AS avg_rating,
                   COUNT(r.id) AS review_count
            FROM stores s
            JOIN reviews r ON r.store_id = s.id
            GROUP BY s.id, s.name, s.slug, s.description, s.photo
            HAVING COUNT(r.id) >= $1
            ORDER BY avg_rating DESC
            LIMIT $2
            "#,
        )
        .bind(min_reviews)
        .bind(limit)
        .fetch_all(pool)
        .await
        .map_err(|e| {
            log::error!("Top stores query error: {}", e);
            StoreError::DatabaseError(e.to_string())
        })
    }

    /// Full-text search over name + description, best matches first
    pub async fn text_search(
        pool: &PgPool,
        query: &str,
        limit: i64,
    ) -> Result<Vec<SearchResult>, StoreError> {
        sqlx::query_as::<_, SearchResult>(
            r#"
            SELECT s.slug, s.name, s.description,
                   ts_rank(s.search_vector, plainto_tsquery('english', $1)) AS rank
            FROM stores s
            WHERE s.search_vector @@ plainto_tsquery('english', $1)
            ORDER BY rank DESC
            LIMIT $2
            "#,
        )
        .bind(query)
        .bind(limit)
        .fetch_all(pool)
        .await
        .map_err(|e| {
            log::error!("Text search query error: {}", e);
            StoreError::DatabaseError(e.to_string())
        })
    }

    /// Stores within `radius_m` meters of the given point, nearest first
    pub async fn near(
        pool: &PgPool,
        longitude: f64,
        latitude: f64,
        radius_m: f64,
        limit: i64,
    ) -> Result<Vec<Store>, StoreError> {
        let sql = format!(
            r#"
            SELECT {}
            FROM stores s
            WHERE ST_DWithin(s.location, ST_SetSRID(ST_MakePoint($1, $2), 4326)::geography, $3)
            ORDER BY ST_Distance(s.location, ST_SetSRID(ST_MakePoint($1, $2), 4326)::geography)
            LIMIT $4
            "#,
            STORE_COLUMNS
        );

        sqlx::query_as::<_, Store>(&sql)
            .bind(longitude)
            .bind(latitude)
            .bind(radius_m)
            .bind(limit)
            .fetch_all(pool)
            .await
            .map_err(|e| {
                log::error!("Near query error: {}", e);
                StoreError::DatabaseError(e.to_string())
            })
    }

    /// Stores the given user has hearted, most recently hearted first
    pub async fn list_hearted(pool: &PgPool, user_id: Uuid) -> Result<Vec<Store>, StoreError> {
        let sql = format!(
            r#"
            SELECT {}
            FROM stores s
            JOIN user_hearts h ON h.store_id = s.id
            WHERE h.user_id = $1
            ORDER BY h.created_at DESC
            "#,
            STORE_COLUMNS
        );

        sqlx::query_as::<_, Store>(&sql)
            .bind(user_id)
            .fetch_all(pool)
            .await
            .map_err(|e| {
                log::error!("Hearted stores query error: {}", e);
                StoreError::DatabaseError(e.to_string())
            })
    }

    /// Existing slugs colliding with `base`: the slug itself plus any
    /// `base-*` variants. Used to pick a unique suffix. On update the
    /// store's own row is excluded so renaming to itself is a no-op.
    pub async fn slugs_like(
        pool: &PgPool,
        base: &str,
        exclude: Option<Uuid>,
    ) -> Result<Vec<String>, StoreError> {
        sqlx::query_scalar::<_, String>(
            r#"
            SELECT s.slug FROM stores s
            WHERE (s.slug = $1 OR s.slug LIKE $1 || '-%')
              AND ($2::uuid IS NULL OR s.id <> $2)
            "#,
        )
        .bind(base)
        .bind(exclude)
        .fetch_all(pool)
        .await
        .map_err(|e| {
            log::error!("Slug lookup query error: {}", e);
            StoreError::DatabaseError(e.to_string())
        })
    }
}
