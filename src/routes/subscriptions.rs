use std::fmt::Formatter;

use actix_web::http::StatusCode;
use actix_web::{web, HttpResponse, ResponseError};
use anyhow::Context;

use crate::domain::application::AdminRecipient;
use crate::domain::new_subscriber::{NewSubscriber, SubscriptionRejection};
use crate::domain::subscriber_email::SubscriberEmail;
use crate::mail::send_email::EmailClient;
use crate::mail::templates::{admin_notification, welcome_email};
use crate::utils::error_chain_fmt;

/// Body returned by the subscription endpoint, success or failure.
#[derive(serde::Serialize, serde::Deserialize, Debug, PartialEq, Eq)]
pub struct SubscribeReply {
    pub ok: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl SubscribeReply {
    pub fn subscribed() -> Self {
        Self {
            ok: true,
            message: Some("Subscribed".into()),
            error: None,
        }
    }

    pub fn failure(reason: &str) -> Self {
        Self {
            ok: false,
            message: None,
            error: Some(reason.into()),
        }
    }
}

#[derive(thiserror::Error)]
pub enum SubscribeError {
    #[error(transparent)]
    Rejected(#[from] SubscriptionRejection),

    // Whatever went wrong past validation; the caller only learns it was on our side.
    #[error(transparent)]
    UnexpectedError(#[from] anyhow::Error),
}

impl std::fmt::Debug for SubscribeError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        error_chain_fmt(self, f)
    }
}

impl SubscribeError {
    fn reason(&self) -> &'static str {
        match self {
            SubscribeError::Rejected(rejection) => rejection.code(),
            SubscribeError::UnexpectedError(_) => "SERVER_ERROR",
        }
    }
}

impl ResponseError for SubscribeError {
    fn status_code(&self) -> StatusCode {
        match self {
            SubscribeError::Rejected(_) => StatusCode::BAD_REQUEST,
            SubscribeError::UnexpectedError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(SubscribeReply::failure(self.reason()))
    }
}

#[tracing::instrument(
    name = "Adding a new subscriber",
    skip(payload, email_client, admin),
    fields(subscriber_email = tracing::field::Empty)
)]
pub async fn subscribe(
    payload: web::Json<serde_json::Value>,
    email_client: web::Data<EmailClient>,
    admin: web::Data<AdminRecipient>,
) -> Result<HttpResponse, SubscribeError> {
    let new_subscriber = NewSubscriber::try_from(payload.into_inner())?;
    tracing::Span::current().record(
        "subscriber_email",
        &tracing::field::display(&new_subscriber.email),
    );

    send_welcome_email(&email_client, &new_subscriber)
        .await
        .context("Failed to send welcome email")?;

    if let Some(admin_email) = admin.0.clone() {
        // Best effort: the outcome is neither awaited nor reported.
        let email_client = email_client.clone();
        let subscriber = new_subscriber.clone();
        actix_web::rt::spawn(async move {
            let _ = send_admin_notification(&email_client, &admin_email, &subscriber).await;
        });
    }

    Ok(HttpResponse::Ok().json(SubscribeReply::subscribed()))
}

#[tracing::instrument(
    name = "Send welcome email to a new subscriber",
    skip(email_client, new_subscriber)
)]
pub async fn send_welcome_email(
    email_client: &EmailClient,
    new_subscriber: &NewSubscriber,
) -> Result<(), reqwest::Error> {
    let content = welcome_email(email_client.sender_name(), new_subscriber);

    email_client
        .send_email(
            &new_subscriber.email,
            &content.subject,
            &content.html,
            &content.text,
        )
        .await
}

#[tracing::instrument(
    name = "Notify the administrator about a new subscriber",
    skip(email_client, admin_email, new_subscriber)
)]
pub async fn send_admin_notification(
    email_client: &EmailClient,
    admin_email: &SubscriberEmail,
    new_subscriber: &NewSubscriber,
) -> Result<(), reqwest::Error> {
    let content = admin_notification(new_subscriber);

    email_client
        .send_email(admin_email, &content.subject, &content.html, &content.text)
        .await
}
