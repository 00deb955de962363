// src/services/store_service.rs
// DOCUMENTATION: Business logic for stores
// PURPOSE: Pagination, slugs, tags, rankings, search, hearts

use crate::db::{ReviewRepository, StoreRepository, UserRepository};
use crate::errors::StoreError;
use crate::models::{
    NearStore, ReviewWithAuthor, SearchResult, Store, StoreInput, TagCount, TopStore, User,
};
use sqlx::PgPool;
use uuid::Uuid;

/// Stores shown per listing page
pub const PAGE_SIZE: i64 = 6;

/// Radius for the map's near query, meters
pub const NEAR_RADIUS_M: f64 = 10_000.0;

/// Result cap for the live-search endpoint
pub const SEARCH_LIMIT: i64 = 5;

/// Result cap for the near endpoint
pub const NEAR_LIMIT: i64 = 10;

/// Minimum review count to appear in the top ranking
const TOP_MIN_REVIEWS: i64 = 2;
const TOP_LIMIT: i64 = 10;

/// One page of the store listing
#[derive(Debug)]
pub struct StorePage {
    pub stores: Vec<Store>,
    pub page: i64,
    pub pages: i64,
    pub count: i64,
}

/// Outcome of a paginated listing request: either a page, or a signal
/// that the requested page is past the end and where to go instead.
#[derive(Debug)]
pub enum PagedStores {
    Page(StorePage),
    PastEnd { requested: i64, last: i64 },
}

/// Store detail with everything the store page renders
#[derive(Debug)]
pub struct StoreDetail {
    pub store: Store,
    pub author_name: String,
    pub reviews: Vec<ReviewWithAuthor>,
}

fn total_pages(count: i64, page_size: i64) -> i64 {
    if count == 0 {
        0
    } else {
        (count + page_size - 1) / page_size
    }
}

/// Lowercase the name and collapse non-alphanumeric runs into single dashes
pub fn slugify(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    let mut last_dash = true; // suppress a leading dash

    for c in name.chars() {
        if c.is_ascii_alphanumeric() {
            slug.push(c.to_ascii_lowercase());
            last_dash = false;
        } else if !last_dash {
            slug.push('-');
            last_dash = true;
        }
    }

    while slug.ends_with('-') {
        slug.pop();
    }
    slug
}

/// Pick the next free slug given the colliding ones already taken.
/// `base` taken -> `base-1`; `base-1` taken -> `base-2`; and so on.
fn next_slug(base: &str, taken: &[String]) -> String {
    if !taken.iter().any(|s| s == base) {
        return base.to_string();
    }

    let prefix = format!("{}-", base);
    let max_suffix = taken
        .iter()
        .filter_map(|s| s.strip_prefix(&prefix))
        .filter_map(|rest| rest.parse::<u32>().ok())
        .max()
        .unwrap_or(0);

    format!("{}-{}", base, max_suffix + 1)
}

pub struct StoreService;

impl StoreService {
    /// A unique slug for `name`, skipping `exclude` (the store being renamed)
    pub async fn unique_slug(
        pool: &PgPool,
        name: &str,
        exclude: Option<Uuid>,
    ) -> Result<String, StoreError> {
        let base = slugify(name);
        if base.is_empty() {
            return Err(StoreError::ValidationError(
                "Store name must contain at least one letter or digit".to_string(),
            ));
        }

        let taken = StoreRepository::slugs_like(pool, &base, exclude).await?;
        Ok(next_slug(&base, &taken))
    }

    /// Create a store owned by `author`
    pub async fn create(
        pool: &PgPool,
        input: StoreInput,
        photo: Option<String>,
        author: Uuid,
    ) -> Result<Store, StoreError> {
        let slug = Self::unique_slug(pool, &input.name, None).await?;
        StoreRepository::insert(pool, &input, &slug, photo.as_deref(), author).await
    }

    /// Update a store. Only the owner may edit; the slug is regenerated
    /// when the name changed.
    pub async fn update(
        pool: &PgPool,
        id: Uuid,
        input: StoreInput,
        photo: Option<String>,
        user: &User,
    ) -> Result<Store, StoreError> {
        let store = StoreRepository::get_by_id(pool, id).await?;
        confirm_owner(&store, user)?;

        let slug = if store.name == input.name {
            store.slug
        } else {
            Self::unique_slug(pool, &input.name, Some(id)).await?
        };

        StoreRepository::update(pool, id, &input, &slug, photo.as_deref()).await
    }

    /// A store for the edit form, with the ownership check applied
    pub async fn for_edit(pool: &PgPool, id: Uuid, user: &User) -> Result<Store, StoreError> {
        let store = StoreRepository::get_by_id(pool, id).await?;
        confirm_owner(&store, user)?;
        Ok(store)
    }

    /// One page of the listing; flags requests past the last page
    pub async fn paginated(pool: &PgPool, page: i64) -> Result<PagedStores, StoreError> {
        let page = page.max(1);
        let offset = (page - 1) * PAGE_SIZE;

        let stores = StoreRepository::list_page(pool, PAGE_SIZE, offset).await?;
        let count = StoreRepository::count(pool).await?;
        let pages = total_pages(count, PAGE_SIZE);

        if stores.is_empty() && offset > 0 && count > 0 {
            return Ok(PagedStores::PastEnd {
                requested: page,
                last: pages,
            });
        }

        Ok(PagedStores::Page(StorePage {
            stores,
            page,
            pages,
            count,
        }))
    }

    /// Store detail page data: store, author name, reviews
    pub async fn detail(pool: &PgPool, slug: &str) -> Result<StoreDetail, StoreError> {
        let store = StoreRepository::get_by_slug(pool, slug).await?;

        let author_name = UserRepository::get_by_id(pool, store.author_id)
            .await?
            .map(|u| u.name)
            .unwrap_or_else(|| "Unknown".to_string());

        let reviews = ReviewRepository::list_for_store(pool, store.id).await?;

        Ok(StoreDetail {
            store,
            author_name,
            reviews,
        })
    }

    /// Tag cloud plus the stores for the active tag (or any tag)
    pub async fn tags_page(
        pool: &PgPool,
        active: Option<&str>,
    ) -> Result<(Vec<TagCount>, Vec<Store>), StoreError> {
        let tags = StoreRepository::tag_counts(pool).await?;
        let stores = StoreRepository::list_by_tag(pool, active).await?;
        Ok((tags, stores))
    }

    pub async fn top(pool: &PgPool) -> Result<Vec<TopStore>, StoreError> {
        StoreRepository::top_stores(pool, TOP_MIN_REVIEWS, TOP_LIMIT).await
    }

    /// Live search: blank queries short-circuit to no results
    pub async fn search(pool: &PgPool, query: &str) -> Result<Vec<SearchResult>, StoreError> {
        let query = query.trim();
        if query.is_empty() {
            return Ok(Vec::new());
        }
        StoreRepository::text_search(pool, query, SEARCH_LIMIT).await
    }

    /// Map markers near a point
    pub async fn near(
        pool: &PgPool,
        longitude: f64,
        latitude: f64,
    ) -> Result<Vec<NearStore>, StoreError> {
        validate_coordinates(longitude, latitude)?;

        let stores =
            StoreRepository::near(pool, longitude, latitude, NEAR_RADIUS_M, NEAR_LIMIT).await?;
        Ok(stores.iter().map(Store::to_near).collect())
    }

    /// Toggle a heart and return the user's updated heart list
    pub async fn toggle_heart(
        pool: &PgPool,
        user_id: Uuid,
        store_id: Uuid,
    ) -> Result<Vec<Uuid>, StoreError> {
        // 404 for unknown stores before touching the join table
        StoreRepository::get_by_id(pool, store_id).await?;

        let removed = UserRepository::remove_heart(pool, user_id, store_id).await?;
        if !removed {
            UserRepository::add_heart(pool, user_id, store_id).await?;
        }

        UserRepository::hearts(pool, user_id).await
    }

    pub async fn hearted(pool: &PgPool, user_id: Uuid) -> Result<Vec<Store>, StoreError> {
        StoreRepository::list_hearted(pool, user_id).await
    }

    /// Whether the user has hearted this store (for the store page button)
    pub async fn is_hearted(
        pool: &PgPool,
        user_id: Uuid,
        store_id: Uuid,
    ) -> Result<bool, StoreError> {
        Ok(UserRepository::hearts(pool, user_id).await?.contains(&store_id))
    }
}

fn confirm_owner(store: &Store, user: &User) -> Result<(), StoreError> {
    if store.author_id != user.id {
        return Err(StoreError::Forbidden(
            "You must own a store in order to edit it!".to_string(),
        ));
    }
    Ok(())
}

/// Reject NaN/infinite and out-of-range coordinates before they reach SQL
pub fn validate_coordinates(longitude: f64, latitude: f64) -> Result<(), StoreError> {
    if !longitude.is_finite() || !latitude.is_finite() {
        return Err(StoreError::InvalidInput(
            "Coordinates must be numbers".to_string(),
        ));
    }
    if !(-180.0..=180.0).contains(&longitude) || !(-90.0..=90.0).contains(&latitude) {
        return Err(StoreError::InvalidInput(
            "Coordinates out of range".to_string(),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slugify_basic() {
        assert_eq!(slugify("Taco Heaven"), "taco-heaven");
        assert_eq!(slugify("Mike's Pizza & Pasta"), "mike-s-pizza-pasta");
        assert_eq!(slugify("CAFE 99"), "cafe-99");
    }

    #[test]
    fn test_slugify_trims_edges_and_collapses() {
        assert_eq!(slugify("  --- Coffee!!! Shop ---  "), "coffee-shop");
        assert_eq!(slugify("!!!"), "");
    }

    #[test]
    fn test_next_slug_no_collision() {
        assert_eq!(next_slug("taco-heaven", &[]), "taco-heaven");
        // base-N rows without the base itself do not force a suffix
        assert_eq!(
            next_slug("taco-heaven", &["taco-heaven-2".to_string()]),
            "taco-heaven"
        );
    }

    #[test]
    fn test_next_slug_picks_next_suffix() {
        let taken = vec!["taco-heaven".to_string()];
        assert_eq!(next_slug("taco-heaven", &taken), "taco-heaven-1");

        let taken = vec![
            "taco-heaven".to_string(),
            "taco-heaven-1".to_string(),
            "taco-heaven-4".to_string(),
        ];
        assert_eq!(next_slug("taco-heaven", &taken), "taco-heaven-5");
    }

    #[test]
    fn test_next_slug_ignores_non_numeric_variants() {
        let taken = vec!["taco-heaven".to_string(), "taco-heaven-annex".to_string()];
        assert_eq!(next_slug("taco-heaven", &taken), "taco-heaven-1");
    }

    #[test]
    fn test_total_pages() {
        assert_eq!(total_pages(0, PAGE_SIZE), 0);
        assert_eq!(total_pages(1, PAGE_SIZE), 1);
        assert_eq!(total_pages(6, PAGE_SIZE), 1);
        assert_eq!(total_pages(7, PAGE_SIZE), 2);
        assert_eq!(total_pages(13, PAGE_SIZE), 3);
    }

    #[test]
    fn test_validate_coordinates() {
        assert!(validate_coordinates(-79.38, 43.65).is_ok());
        assert!(validate_coordinates(f64::NAN, 43.65).is_err());
        assert!(validate_coordinates(-200.0, 43.65).is_err());
        assert!(validate_coordinates(-79.38, 91.0).is_err());
    }
}
