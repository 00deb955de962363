// src/handlers/auth.rs
// DOCUMENTATION: Login, logout and password-reset handlers
// PURPOSE: Session establishment and credential recovery flows

use actix_governor::{Governor, GovernorConfigBuilder};
use actix_session::Session;
use actix_web::{web, HttpResponse};
use askama::Template;
use sqlx::PgPool;
use validator::Validate;

use super::{html, redirect, validation_messages, PageShell};
use crate::errors::StoreError;
use crate::models::{ForgotForm, LoginForm, ResetForm};
use crate::services::{Mailer, UserService};
use crate::session::{flash, log_in, log_out, MaybeUser};

#[derive(Template)]
#[template(path = "login.html")]
struct LoginTemplate {
    page: PageShell,
}

#[derive(Template)]
#[template(path = "reset.html")]
struct ResetTemplate {
    page: PageShell,
    token: String,
}

/// GET /login
pub async fn login_form(user: MaybeUser, session: Session) -> Result<HttpResponse, StoreError> {
    html(LoginTemplate {
        page: PageShell::new("Login", &user, &session),
    })
}

/// POST /login
pub async fn login(
    pool: web::Data<PgPool>,
    session: Session,
    form: web::Form<LoginForm>,
) -> Result<HttpResponse, StoreError> {
    match UserService::authenticate(pool.get_ref(), &form.email, &form.password).await? {
        Some(user) => {
            log_in(&session, user.id)?;
            flash(&session, "success", "You are now logged in!");
            Ok(redirect("/"))
        }
        None => {
            flash(&session, "error", "Failed login!");
            Ok(redirect("/login"))
        }
    }
}

/// GET /logout
pub async fn logout(session: Session) -> Result<HttpResponse, StoreError> {
    log_out(&session);
    flash(&session, "success", "You are now logged out!");
    Ok(redirect("/"))
}

/// POST /account/forgot
pub async fn forgot(
    pool: web::Data<PgPool>,
    mailer: web::Data<Mailer>,
    session: Session,
    form: web::Form<ForgotForm>,
) -> Result<HttpResponse, StoreError> {
    match UserService::start_password_reset(pool.get_ref(), &form.email).await? {
        Some((user, token)) => {
            if let Err(e) = mailer.send_password_reset(&user.email, &user.name, &token).await {
                log::error!("Password reset mail failed: {}", e);
                flash(
                    &session,
                    "error",
                    "Could not send the reset email. Please try again later.",
                );
                return Ok(redirect("/login"));
            }
            flash(
                &session,
                "success",
                "You have been emailed a password reset link.",
            );
        }
        None => {
            flash(&session, "error", "No account with that email exists.");
        }
    }

    Ok(redirect("/login"))
}

/// GET /account/reset/{token}
pub async fn reset_form(
    pool: web::Data<PgPool>,
    user: MaybeUser,
    session: Session,
    path: web::Path<String>,
) -> Result<HttpResponse, StoreError> {
    let token = path.into_inner();

    match UserService::find_by_reset_token(pool.get_ref(), &token).await? {
        Some(_) => html(ResetTemplate {
            page: PageShell::new("Reset your Password", &user, &session),
            token,
        }),
        None => {
            flash(&session, "error", "Password reset is invalid or has expired");
            Ok(redirect("/login"))
        }
    }
}

/// POST /account/reset/{token}
pub async fn reset(
    pool: web::Data<PgPool>,
    session: Session,
    path: web::Path<String>,
    form: web::Form<ResetForm>,
) -> Result<HttpResponse, StoreError> {
    let token = path.into_inner();
    let reset_url = format!("/account/reset/{}", token);

    if let Err(e) = form.validate() {
        for message in validation_messages(&e) {
            flash(&session, "error", message);
        }
        return Ok(redirect(&reset_url));
    }

    match UserService::reset_password(pool.get_ref(), &token, &form).await {
        Ok(user) => {
            log_in(&session, user.id)?;
            flash(
                &session,
                "success",
                "Nice! Your password has been reset, and you are now logged in.",
            );
            Ok(redirect("/"))
        }
        Err(StoreError::ValidationError(message)) => {
            flash(&session, "error", message);
            Ok(redirect(&reset_url))
        }
        Err(e) => Err(e),
    }
}

/// Configuration for auth routes. Credential posts sit behind a
/// per-peer rate limiter.
pub fn config(cfg: &mut web::ServiceConfig) {
    let limiter = GovernorConfigBuilder::default()
        .per_second(2)
        .burst_size(10)
        .finish()
        .expect("rate limiter configuration is valid");

    cfg.service(
        web::resource("/login")
            .wrap(Governor::new(&limiter))
            .route(web::get().to(login_form))
            .route(web::post().to(login)),
    )
    .route("/logout", web::get().to(logout))
    .service(
        web::resource("/account/forgot")
            .wrap(Governor::new(&limiter))
            .route(web::post().to(forgot)),
    )
    .service(
        web::resource("/account/reset/{token}")
            .route(web::get().to(reset_form))
            .route(web::post().to(reset)),
    );
}
