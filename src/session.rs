// src/session.rs
// DOCUMENTATION: Cookie-session helpers
// PURPOSE: Flash message queue and current-user extractors

use crate::db::UserRepository;
use crate::errors::StoreError;
use crate::models::User;
use actix_session::{Session, SessionExt};
use actix_web::{dev::Payload, web, FromRequest, HttpRequest};
use futures_util::future::LocalBoxFuture;
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

/// Session key holding the logged-in user's id
const USER_ID_KEY: &str = "user_id";

/// Session key holding queued flash messages
const FLASH_KEY: &str = "_flash";

/// One-shot notification rendered on the next page load
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FlashMessage {
    /// "success", "error", "info" or "warning" - drives the banner style
    pub kind: String,
    pub message: String,
}

/// Queue a flash message for the next rendered page
pub fn flash(session: &Session, kind: &str, message: impl Into<String>) {
    let mut queued: Vec<FlashMessage> = session.get(FLASH_KEY).unwrap_or(None).unwrap_or_default();
    queued.push(FlashMessage {
        kind: kind.to_string(),
        message: message.into(),
    });
    if let Err(e) = session.insert(FLASH_KEY, queued) {
        log::warn!("Failed to queue flash message: {}", e);
    }
}

/// Drain all queued flash messages
pub fn take_flashes(session: &Session) -> Vec<FlashMessage> {
    let queued: Vec<FlashMessage> = session.get(FLASH_KEY).unwrap_or(None).unwrap_or_default();
    if !queued.is_empty() {
        session.remove(FLASH_KEY);
    }
    queued
}

/// Log a user in: rotate the session id, then record the user id
pub fn log_in(session: &Session, user_id: Uuid) -> Result<(), StoreError> {
    session.renew();
    session
        .insert(USER_ID_KEY, user_id)
        .map_err(|e| StoreError::SessionError(e.to_string()))
}

/// Log the user out. Only the user key is dropped so a goodbye flash
/// queued right after still reaches the next page.
pub fn log_out(session: &Session) {
    session.remove(USER_ID_KEY);
}

async fn load_session_user(
    session: &Session,
    pool: Option<web::Data<PgPool>>,
) -> Result<Option<User>, StoreError> {
    let Some(pool) = pool else {
        return Err(StoreError::DatabaseError(
            "database pool missing from app data".to_string(),
        ));
    };

    let user_id: Option<Uuid> = session.get(USER_ID_KEY).unwrap_or(None);
    let Some(id) = user_id else {
        return Ok(None);
    };

    match UserRepository::get_by_id(pool.get_ref(), id).await? {
        Some(user) => Ok(Some(user)),
        None => {
            // Stale cookie for a deleted account
            session.remove(USER_ID_KEY);
            Ok(None)
        }
    }
}

/// Extractor: the logged-in user. Anonymous requests are flashed and
/// redirected to the login page via `StoreError::LoginRequired`.
#[derive(Debug)]
pub struct AuthedUser(pub User);

impl FromRequest for AuthedUser {
    type Error = StoreError;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let session = req.get_session();
        let pool = req.app_data::<web::Data<PgPool>>().cloned();

        Box::pin(async move {
            match load_session_user(&session, pool).await? {
                Some(user) => Ok(AuthedUser(user)),
                None => {
                    flash(&session, "error", "Oops! You must be logged in to do that.");
                    Err(StoreError::LoginRequired)
                }
            }
        })
    }
}

/// Extractor: the logged-in user if any, for pages visible to everyone
#[derive(Debug)]
pub struct MaybeUser(pub Option<User>);

impl FromRequest for MaybeUser {
    type Error = StoreError;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let session = req.get_session();
        let pool = req.app_data::<web::Data<PgPool>>().cloned();

        Box::pin(async move { Ok(MaybeUser(load_session_user(&session, pool).await?)) })
    }
}
