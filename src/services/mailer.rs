// src/services/mailer.rs
// DOCUMENTATION: Outgoing transactional mail
// PURPOSE: SMTP delivery of the password-reset message

use crate::config::Config;
use crate::errors::StoreError;
use askama::Template;
use lettre::message::{Mailbox, MultiPart};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};

/// HTML body for the password-reset mail
#[derive(Template)]
#[template(path = "email/password_reset.html")]
struct PasswordResetHtml<'a> {
    name: &'a str,
    reset_url: &'a str,
}

/// Plain-text body for the password-reset mail
#[derive(Template)]
#[template(path = "email/password_reset.txt")]
struct PasswordResetText<'a> {
    name: &'a str,
    reset_url: &'a str,
}

fn reset_url_for(app_url: &str, token: &str) -> String {
    format!("{}/account/reset/{}", app_url.trim_end_matches('/'), token)
}

/// Transactional mail sender. With no SMTP host configured the mailer
/// runs disabled and logs the reset link instead, which keeps local
/// development free of a mail relay.
#[derive(Clone)]
pub struct Mailer {
    transport: Option<AsyncSmtpTransport<Tokio1Executor>>,
    from: Mailbox,
    app_url: String,
}

impl Mailer {
    pub fn from_config(config: &Config) -> Result<Self, StoreError> {
        let from: Mailbox = config
            .mail_from
            .parse()
            .map_err(|e| StoreError::MailError(format!("Invalid MAIL_FROM address: {}", e)))?;

        let transport = if config.smtp_host.is_empty() {
            None
        } else {
            let mut builder =
                AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.smtp_host)
                    .map_err(|e| StoreError::MailError(e.to_string()))?
                    .port(config.smtp_port);

            if !config.smtp_username.is_empty() {
                builder = builder.credentials(Credentials::new(
                    config.smtp_username.clone(),
                    config.smtp_password.clone(),
                ));
            }

            Some(builder.build())
        };

        Ok(Self {
            transport,
            from,
            app_url: config.app_url.clone(),
        })
    }

    /// Send the password-reset mail with the tokenized link
    pub async fn send_password_reset(
        &self,
        to_email: &str,
        to_name: &str,
        token: &str,
    ) -> Result<(), StoreError> {
        let reset_url = reset_url_for(&self.app_url, token);

        let Some(transport) = &self.transport else {
            log::warn!(
                "SMTP disabled; password reset link for {}: {}",
                to_email,
                reset_url
            );
            return Ok(());
        };

        let html = PasswordResetHtml {
            name: to_name,
            reset_url: &reset_url,
        }
        .render()
        .map_err(|e| StoreError::TemplateError(e.to_string()))?;

        let text = PasswordResetText {
            name: to_name,
            reset_url: &reset_url,
        }
        .render()
        .map_err(|e| StoreError::TemplateError(e.to_string()))?;

        let to: Mailbox = to_email
            .parse()
            .map_err(|e| StoreError::MailError(format!("Invalid recipient address: {}", e)))?;

        let message = Message::builder()
            .from(self.from.clone())
            .to(to)
            .subject("Password Reset")
            .multipart(MultiPart::alternative_plain_html(text, html))
            .map_err(|e| StoreError::MailError(e.to_string()))?;

        transport.send(message).await.map_err(|e| {
            log::error!("Failed to send password reset mail to {}: {}", to_email, e);
            StoreError::MailError(e.to_string())
        })?;

        log::info!("Password reset mail sent to {}", to_email);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reset_url_formatting() {
        assert_eq!(
            reset_url_for("http://localhost:7777", "abc123"),
            "http://localhost:7777/account/reset/abc123"
        );
        // trailing slash on the base URL must not double up
        assert_eq!(
            reset_url_for("https://stores.example.com/", "abc123"),
            "https://stores.example.com/account/reset/abc123"
        );
    }
}
