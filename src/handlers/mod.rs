// src/handlers/mod.rs
// DOCUMENTATION: Handlers module organization
// PURPOSE: Re-export handler components and shared page plumbing

pub mod api;
pub mod auth;
pub mod health;
pub mod reviews;
pub mod stores;
pub mod users;

pub use api::config as api_config;
pub use auth::config as auth_config;
pub use health::config as health_config;
pub use reviews::config as reviews_config;
pub use stores::config as stores_config;
pub use users::config as users_config;

use crate::errors::StoreError;
use crate::models::User;
use crate::session::{take_flashes, FlashMessage, MaybeUser};
use actix_session::Session;
use actix_web::http::header;
use actix_web::{HttpRequest, HttpResponse};
use askama::Template;
use validator::ValidationErrors;

/// The slice of the current user the page chrome needs
pub struct NavUser {
    pub name: String,
}

/// Everything base.html renders: title, nav user, queued flashes.
/// Building a shell drains the flash queue.
pub struct PageShell {
    pub title: String,
    pub user: Option<NavUser>,
    pub flashes: Vec<FlashMessage>,
}

impl PageShell {
    pub fn new(title: impl Into<String>, user: &MaybeUser, session: &Session) -> Self {
        PageShell {
            title: title.into(),
            user: user.0.as_ref().map(|u| NavUser {
                name: u.name.clone(),
            }),
            flashes: take_flashes(session),
        }
    }

    pub fn for_user(title: impl Into<String>, user: &User, session: &Session) -> Self {
        PageShell {
            title: title.into(),
            user: Some(NavUser {
                name: user.name.clone(),
            }),
            flashes: take_flashes(session),
        }
    }

    pub fn anonymous(title: impl Into<String>, session: &Session) -> Self {
        PageShell {
            title: title.into(),
            user: None,
            flashes: take_flashes(session),
        }
    }
}

/// Render a template into an HTML response
pub(crate) fn html(template: impl Template) -> Result<HttpResponse, StoreError> {
    let body = template.render().map_err(|e| {
        log::error!("Template render failed: {}", e);
        StoreError::TemplateError(e.to_string())
    })?;

    Ok(HttpResponse::Ok()
        .content_type("text/html; charset=utf-8")
        .body(body))
}

/// 303 redirect, the right status after form posts
pub(crate) fn redirect(location: &str) -> HttpResponse {
    HttpResponse::SeeOther()
        .insert_header((header::LOCATION, location.to_string()))
        .finish()
}

/// Where "back" points: the Referer when present, else the fallback
pub(crate) fn back(req: &HttpRequest, fallback: &str) -> String {
    req.headers()
        .get(header::REFERER)
        .and_then(|v| v.to_str().ok())
        .unwrap_or(fallback)
        .to_string()
}

/// Flatten validator output into flash-ready messages
pub(crate) fn validation_messages(errors: &ValidationErrors) -> Vec<String> {
    errors
        .field_errors()
        .iter()
        .flat_map(|(field, errs)| {
            errs.iter().map(move |e| match &e.message {
                Some(message) => message.to_string(),
                None => format!("{} is invalid", field),
            })
        })
        .collect()
}
