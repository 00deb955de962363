// src/handlers/stores.rs
// DOCUMENTATION: HTML pages for stores
// PURPOSE: Parse requests, call services, render templates

use actix_multipart::form::{tempfile::TempFile, text::Text, MultipartForm};
use actix_session::Session;
use actix_web::{web, HttpResponse};
use askama::Template;
use sqlx::PgPool;
use uuid::Uuid;
use validator::Validate;

use super::{html, redirect, validation_messages, PageShell};
use crate::config::Config;
use crate::errors::StoreError;
use crate::models::{ReviewWithAuthor, Store, StoreInput};
use crate::services::photo_storage;
use crate::services::store_service::{PagedStores, StoreService};
use crate::session::{flash, AuthedUser, MaybeUser};

/// Tags a store can carry, offered as checkboxes on the form
pub const TAG_CHOICES: [&str; 5] = [
    "Wifi",
    "Open Late",
    "Family Friendly",
    "Vegetarian",
    "Licensed",
];

#[derive(Template)]
#[template(path = "stores.html")]
struct StoresTemplate {
    page: PageShell,
    heading: String,
    stores: Vec<Store>,
    pagination: Option<Pagination>,
}

struct Pagination {
    page: i64,
    pages: i64,
    count: i64,
    prev: Option<i64>,
    next: Option<i64>,
}

#[derive(Template)]
#[template(path = "store.html")]
struct StoreTemplate {
    page: PageShell,
    store: Store,
    author_name: String,
    reviews: Vec<ReviewWithAuthor>,
    hearted: bool,
}

#[derive(Template)]
#[template(path = "store_form.html")]
struct StoreFormTemplate {
    page: PageShell,
    heading: String,
    action: String,
    name: String,
    description: String,
    address: String,
    lng: String,
    lat: String,
    photo: Option<String>,
    tag_choices: Vec<TagChoice>,
    maps_key: String,
}

struct TagChoice {
    name: String,
    checked: bool,
}

#[derive(Template)]
#[template(path = "tags.html")]
struct TagsTemplate {
    page: PageShell,
    heading: String,
    tags: Vec<TagLink>,
    stores: Vec<Store>,
}

struct TagLink {
    tag: String,
    count: i64,
    active: bool,
}

#[derive(Template)]
#[template(path = "top.html")]
struct TopTemplate {
    page: PageShell,
    stores: Vec<TopStoreView>,
}

struct TopStoreView {
    name: String,
    slug: String,
    photo: Option<String>,
    avg_display: String,
    review_count: i64,
}

#[derive(Template)]
#[template(path = "map.html")]
struct MapTemplate {
    page: PageShell,
    maps_key: String,
}

/// Multipart payload of the store form. Coordinates arrive as text and
/// are parsed by hand so a typo turns into a flash, not a 400.
#[derive(Debug, MultipartForm)]
pub struct StoreUpload {
    name: Text<String>,
    description: Text<String>,
    address: Text<String>,
    lng: Text<String>,
    lat: Text<String>,
    #[multipart(rename = "tags")]
    tags: Vec<Text<String>>,
    #[multipart(limit = "10MB")]
    photo: Option<TempFile>,
}

fn to_input(form: &StoreUpload) -> Result<StoreInput, Vec<String>> {
    let longitude = form.lng.trim().parse::<f64>();
    let latitude = form.lat.trim().parse::<f64>();

    let (Ok(longitude), Ok(latitude)) = (longitude, latitude) else {
        return Err(vec!["You must supply valid coordinates!".to_string()]);
    };

    let input = StoreInput {
        name: form.name.trim().to_string(),
        description: form.description.trim().to_string(),
        address: form.address.trim().to_string(),
        longitude,
        latitude,
        tags: form.tags.iter().map(|t| t.0.clone()).collect(),
    };

    input
        .validate()
        .map_err(|e| validation_messages(&e))?;
    Ok(input)
}

fn tag_choices(selected: &[String]) -> Vec<TagChoice> {
    TAG_CHOICES
        .iter()
        .map(|&name| TagChoice {
            name: name.to_string(),
            checked: selected.iter().any(|s| s == name),
        })
        .collect()
}

/// GET / and GET /stores
pub async fn list_stores(
    pool: web::Data<PgPool>,
    user: MaybeUser,
    session: Session,
) -> Result<HttpResponse, StoreError> {
    render_listing(&pool, 1, user, session).await
}

/// GET /stores/page/{page}
pub async fn list_stores_page(
    pool: web::Data<PgPool>,
    path: web::Path<i64>,
    user: MaybeUser,
    session: Session,
) -> Result<HttpResponse, StoreError> {
    render_listing(&pool, path.into_inner(), user, session).await
}

async fn render_listing(
    pool: &PgPool,
    page_number: i64,
    user: MaybeUser,
    session: Session,
) -> Result<HttpResponse, StoreError> {
    match StoreService::paginated(pool, page_number).await? {
        PagedStores::PastEnd { requested, last } => {
            flash(
                &session,
                "info",
                format!(
                    "Hey! You asked for page {}. That page doesn't exist, so I put you on page {}.",
                    requested, last
                ),
            );
            Ok(redirect(&format!("/stores/page/{}", last)))
        }
        PagedStores::Page(listing) => {
            let pagination = (listing.pages > 1).then(|| Pagination {
                page: listing.page,
                pages: listing.pages,
                count: listing.count,
                prev: (listing.page > 1).then(|| listing.page - 1),
                next: (listing.page < listing.pages).then(|| listing.page + 1),
            });

            html(StoresTemplate {
                page: PageShell::new("Stores", &user, &session),
                heading: "Stores".to_string(),
                stores: listing.stores,
                pagination,
            })
        }
    }
}

/// GET /add
pub async fn add_store_form(
    config: web::Data<Config>,
    user: AuthedUser,
    session: Session,
) -> Result<HttpResponse, StoreError> {
    html(StoreFormTemplate {
        page: PageShell::for_user("Add Store", &user.0, &session),
        heading: "Add Store".to_string(),
        action: "/add".to_string(),
        name: String::new(),
        description: String::new(),
        address: String::new(),
        lng: String::new(),
        lat: String::new(),
        photo: None,
        tag_choices: tag_choices(&[]),
        maps_key: config.google_maps_key.clone(),
    })
}

/// POST /add - create a store
pub async fn create_store(
    pool: web::Data<PgPool>,
    config: web::Data<Config>,
    user: AuthedUser,
    session: Session,
    MultipartForm(form): MultipartForm<StoreUpload>,
) -> Result<HttpResponse, StoreError> {
    let input = match to_input(&form) {
        Ok(input) => input,
        Err(messages) => {
            for message in messages {
                flash(&session, "error", message);
            }
            return Ok(redirect("/add"));
        }
    };

    let photo = match store_photo(&config, &session, form.photo, "/add").await? {
        PhotoOutcome::Saved(filename) => Some(filename),
        PhotoOutcome::None => None,
        PhotoOutcome::Rejected(response) => return Ok(response),
    };

    let store = StoreService::create(pool.get_ref(), input, photo, user.0.id).await?;

    flash(
        &session,
        "success",
        format!(
            "Successfully created {}. Care to leave a review?",
            store.name
        ),
    );
    Ok(redirect(&format!("/store/{}", store.slug)))
}

/// POST /add/{id} - update a store
pub async fn update_store(
    pool: web::Data<PgPool>,
    config: web::Data<Config>,
    user: AuthedUser,
    session: Session,
    path: web::Path<Uuid>,
    MultipartForm(form): MultipartForm<StoreUpload>,
) -> Result<HttpResponse, StoreError> {
    let id = path.into_inner();
    let edit_url = format!("/stores/{}/edit", id);

    let input = match to_input(&form) {
        Ok(input) => input,
        Err(messages) => {
            for message in messages {
                flash(&session, "error", message);
            }
            return Ok(redirect(&edit_url));
        }
    };

    let photo = match store_photo(&config, &session, form.photo, &edit_url).await? {
        PhotoOutcome::Saved(filename) => Some(filename),
        PhotoOutcome::None => None,
        PhotoOutcome::Rejected(response) => return Ok(response),
    };

    let store = StoreService::update(pool.get_ref(), id, input, photo, &user.0).await?;

    flash(
        &session,
        "success",
        format!("Successfully updated {}.", store.name),
    );
    Ok(redirect(&edit_url))
}

enum PhotoOutcome {
    Saved(String),
    None,
    Rejected(HttpResponse),
}

/// Resize-and-store an uploaded photo, turning upload problems into a
/// flash + redirect back to the form instead of an error page.
async fn store_photo(
    config: &Config,
    session: &Session,
    photo: Option<TempFile>,
    return_to: &str,
) -> Result<PhotoOutcome, StoreError> {
    // Browsers submit an empty part when no file was chosen
    let Some(file) = photo.filter(|f| f.size > 0) else {
        return Ok(PhotoOutcome::None);
    };

    match photo_storage::save_resized(&config.uploads_dir, file).await {
        Ok(filename) => Ok(PhotoOutcome::Saved(filename)),
        Err(StoreError::UploadError(message)) => {
            flash(session, "error", message);
            Ok(PhotoOutcome::Rejected(redirect(return_to)))
        }
        Err(e) => Err(e),
    }
}

/// GET /stores/{id}/edit
pub async fn edit_store_form(
    pool: web::Data<PgPool>,
    config: web::Data<Config>,
    user: AuthedUser,
    session: Session,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, StoreError> {
    let store = StoreService::for_edit(pool.get_ref(), path.into_inner(), &user.0).await?;

    html(StoreFormTemplate {
        page: PageShell::for_user(format!("Edit {}", store.name), &user.0, &session),
        heading: format!("Edit {}", store.name),
        action: format!("/add/{}", store.id),
        name: store.name,
        description: store.description,
        address: store.address.unwrap_or_default(),
        lng: store.longitude.to_string(),
        lat: store.latitude.to_string(),
        photo: store.photo,
        tag_choices: tag_choices(&store.tags),
        maps_key: config.google_maps_key.clone(),
    })
}

/// GET /store/{slug}
pub async fn store_detail(
    pool: web::Data<PgPool>,
    user: MaybeUser,
    session: Session,
    path: web::Path<String>,
) -> Result<HttpResponse, StoreError> {
    let detail = StoreService::detail(pool.get_ref(), &path.into_inner()).await?;

    let hearted = match &user.0 {
        Some(u) => StoreService::is_hearted(pool.get_ref(), u.id, detail.store.id).await?,
        None => false,
    };

    html(StoreTemplate {
        page: PageShell::new(detail.store.name.clone(), &user, &session),
        store: detail.store,
        author_name: detail.author_name,
        reviews: detail.reviews,
        hearted,
    })
}

/// GET /tags and GET /tags/{tag}
pub async fn tags_page(
    pool: web::Data<PgPool>,
    user: MaybeUser,
    session: Session,
) -> Result<HttpResponse, StoreError> {
    render_tags(&pool, None, user, session).await
}

pub async fn tags_page_active(
    pool: web::Data<PgPool>,
    path: web::Path<String>,
    user: MaybeUser,
    session: Session,
) -> Result<HttpResponse, StoreError> {
    render_tags(&pool, Some(path.into_inner()), user, session).await
}

async fn render_tags(
    pool: &PgPool,
    active: Option<String>,
    user: MaybeUser,
    session: Session,
) -> Result<HttpResponse, StoreError> {
    let (tags, stores) = StoreService::tags_page(pool, active.as_deref()).await?;

    let tags = tags
        .into_iter()
        .map(|t| TagLink {
            active: active.as_deref() == Some(t.tag.as_str()),
            tag: t.tag,
            count: t.count,
        })
        .collect();

    let heading = active.unwrap_or_else(|| "Tags".to_string());

    html(TagsTemplate {
        page: PageShell::new(heading.clone(), &user, &session),
        heading,
        tags,
        stores,
    })
}

/// GET /top
pub async fn top_stores(
    pool: web::Data<PgPool>,
    user: MaybeUser,
    session: Session,
) -> Result<HttpResponse, StoreError> {
    let stores = StoreService::top(pool.get_ref())
        .await?
        .into_iter()
        .map(|t| TopStoreView {
            avg_display: format!("{:.1}", t.avg_rating),
            name: t.name,
            slug: t.slug,
            photo: t.photo,
            review_count: t.review_count,
        })
        .collect();

    html(TopTemplate {
        page: PageShell::new("Top Stores", &user, &session),
        stores,
    })
}

/// GET /map
pub async fn map_page(
    config: web::Data<Config>,
    user: MaybeUser,
    session: Session,
) -> Result<HttpResponse, StoreError> {
    html(MapTemplate {
        page: PageShell::new("Map", &user, &session),
        maps_key: config.google_maps_key.clone(),
    })
}

/// GET /hearts
pub async fn hearted_stores(
    pool: web::Data<PgPool>,
    user: AuthedUser,
    session: Session,
) -> Result<HttpResponse, StoreError> {
    let stores = StoreService::hearted(pool.get_ref(), user.0.id).await?;

    html(StoresTemplate {
        page: PageShell::for_user("Hearted Stores", &user.0, &session),
        heading: "Hearted Stores".to_string(),
        stores,
        pagination: None,
    })
}

/// Configuration for store page routes
pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.route("/", web::get().to(list_stores))
        .route("/stores", web::get().to(list_stores))
        .route("/stores/page/{page}", web::get().to(list_stores_page))
        .route("/add", web::get().to(add_store_form))
        .route("/add", web::post().to(create_store))
        .route("/add/{id}", web::post().to(update_store))
        .route("/stores/{id}/edit", web::get().to(edit_store_form))
        .route("/store/{slug}", web::get().to(store_detail))
        .route("/tags", web::get().to(tags_page))
        .route("/tags/{tag}", web::get().to(tags_page_active))
        .route("/top", web::get().to(top_stores))
        .route("/map", web::get().to(map_page))
        .route("/hearts", web::get().to(hearted_stores));
}
