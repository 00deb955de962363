// src/handlers/users.rs
// DOCUMENTATION: Registration and account handlers
// PURPOSE: Create accounts and keep profile details current

use actix_session::Session;
use actix_web::{web, HttpResponse};
use askama::Template;
use sqlx::PgPool;
use validator::Validate;

use super::{html, redirect, validation_messages, PageShell};
use crate::errors::StoreError;
use crate::models::{AccountForm, RegisterForm};
use crate::services::UserService;
use crate::session::{flash, log_in, AuthedUser, MaybeUser};

#[derive(Template)]
#[template(path = "register.html")]
struct RegisterTemplate {
    page: PageShell,
    name: String,
    email: String,
}

#[derive(Template)]
#[template(path = "account.html")]
struct AccountTemplate {
    page: PageShell,
    name: String,
    email: String,
}

/// GET /register
pub async fn register_form(user: MaybeUser, session: Session) -> Result<HttpResponse, StoreError> {
    html(RegisterTemplate {
        page: PageShell::new("Register", &user, &session),
        name: String::new(),
        email: String::new(),
    })
}

/// POST /register
/// Validate, create the account, and log the new user straight in.
/// Failures re-render the form with the submitted values preserved.
pub async fn register(
    pool: web::Data<PgPool>,
    session: Session,
    form: web::Form<RegisterForm>,
) -> Result<HttpResponse, StoreError> {
    let mut problems = Vec::new();

    if let Err(e) = form.validate() {
        problems.extend(validation_messages(&e));
    }
    if form.password != form.password_confirm {
        problems.push("Oops! Your passwords do not match".to_string());
    }

    if problems.is_empty() {
        match UserService::register(pool.get_ref(), &form).await {
            Ok(user) => {
                log_in(&session, user.id)?;
                flash(&session, "success", format!("Welcome, {}!", user.name));
                return Ok(redirect("/"));
            }
            Err(StoreError::ValidationError(message)) => problems.push(message),
            Err(e) => return Err(e),
        }
    }

    for message in problems {
        flash(&session, "error", message);
    }

    html(RegisterTemplate {
        page: PageShell::anonymous("Register", &session),
        name: form.name.clone(),
        email: form.email.clone(),
    })
}

/// GET /account
pub async fn account_page(user: AuthedUser, session: Session) -> Result<HttpResponse, StoreError> {
    html(AccountTemplate {
        page: PageShell::for_user("Edit Your Account", &user.0, &session),
        name: user.0.name.clone(),
        email: user.0.email.clone(),
    })
}

/// POST /account
pub async fn update_account(
    pool: web::Data<PgPool>,
    user: AuthedUser,
    session: Session,
    form: web::Form<AccountForm>,
) -> Result<HttpResponse, StoreError> {
    if let Err(e) = form.validate() {
        for message in validation_messages(&e) {
            flash(&session, "error", message);
        }
        return Ok(redirect("/account"));
    }

    match UserService::update_account(pool.get_ref(), user.0.id, &form).await {
        Ok(_) => {
            flash(&session, "success", "Profile updated!");
            Ok(redirect("/account"))
        }
        Err(StoreError::ValidationError(message)) => {
            flash(&session, "error", message);
            Ok(redirect("/account"))
        }
        Err(e) => Err(e),
    }
}

/// Configuration for user routes
pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.route("/register", web::get().to(register_form))
        .route("/register", web::post().to(register))
        .route("/account", web::get().to(account_page))
        .route("/account", web::post().to(update_account));
}
