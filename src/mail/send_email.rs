//! src/mail/send_email.rs

use reqwest::Client;
use secrecy::{ExposeSecret, Secret};

use crate::config::EmailClientSettings;
use crate::domain::subscriber_email::SubscriberEmail;

const SERVER_TOKEN_HEADER: &str = "X-Postmark-Server-Token";

#[derive(serde::Serialize)]
#[serde(rename_all = "PascalCase")]
struct SendEmailRequest<'a> {
    from: &'a str,
    to: &'a str,
    subject: &'a str,
    html_body: &'a str,
    text_body: &'a str,
}

/// Handle on the HTTP mail transport. Built once at startup and shared by
/// every request through `web::Data`.
#[derive(Debug)]
pub struct EmailClient {
    http_client: Client,
    base_url: String,
    sender: SubscriberEmail,
    sender_name: String,
    authorization_token: Secret<String>,
}

impl EmailClient {
    pub fn new(
        settings: &EmailClientSettings,
        sender: SubscriberEmail,
    ) -> Result<Self, reqwest::Error> {
        let http_client = Client::builder().timeout(settings.timeout()).build()?;

        Ok(Self {
            http_client,
            base_url: settings.base_url.trim_end_matches('/').to_owned(),
            sender,
            sender_name: settings.sender_name.clone(),
            authorization_token: settings.authorization_token.clone(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn sender_name(&self) -> &str {
        &self.sender_name
    }

    /// Checks that the transport is reachable and accepts our token.
    #[tracing::instrument(name = "Verifying mail transport", skip(self), fields(base_url = %self.base_url))]
    pub async fn verify(&self) -> Result<(), reqwest::Error> {
        self.http_client
            .get(format!("{}/server", self.base_url))
            .header(SERVER_TOKEN_HEADER, self.authorization_token.expose_secret())
            .send()
            .await?
            .error_for_status()?;

        Ok(())
    }

    pub async fn send_email(
        &self,
        recipient: &SubscriberEmail,
        subject: &str,
        html_content: &str,
        text_content: &str,
    ) -> Result<(), reqwest::Error> {
        let url = format!("{}/email", self.base_url);
        let from = format!("\"{}\" <{}>", self.sender_name, self.sender);
        let request_body = SendEmailRequest {
            from: &from,
            to: recipient.as_ref(),
            subject,
            html_body: html_content,
            text_body: text_content,
        };

        self.http_client
            .post(&url)
            .header(SERVER_TOKEN_HEADER, self.authorization_token.expose_secret())
            .json(&request_body)
            .send()
            .await?
            .error_for_status()?;

        Ok(())
    }
}
