use std::net::TcpListener;

use actix_web::dev::Server;
use anyhow::{anyhow, Context};

use crate::config::Configuration;
use crate::domain::application::AdminRecipient;
use crate::mail::send_email::EmailClient;
use crate::rate_limit::RateLimiter;
use crate::run::run;

pub struct AppServer {
    port: u16,
    address: String,
    server: Server,
}

impl AppServer {
    /// Builds the mail client, verifies the transport and only then starts
    /// listening. Any failure along the way aborts the build.
    pub async fn build(configuration: Configuration) -> Result<Self, anyhow::Error> {
        let sender_email = configuration
            .email_client
            .sender()
            .map_err(|e| anyhow!(e))
            .context("Invalid sender email address")?;
        let admin = configuration
            .app
            .admin()
            .map_err(|e| anyhow!(e))
            .context("Invalid admin email address")?;

        let email_client = EmailClient::new(&configuration.email_client, sender_email)
            .context("Failed to build the mail transport client")?;

        if configuration.email_client.skip_verify {
            tracing::warn!(
                base_url = email_client.base_url(),
                "Skipping mail transport verification"
            );
        } else {
            email_client
                .verify()
                .await
                .map_err(|e| {
                    tracing::error!(
                        error.cause_chain = ?e,
                        base_url = email_client.base_url(),
                        "Mail transport verification failed"
                    );
                    e
                })
                .context("Mail transport verification failed")?;
            tracing::info!(
                base_url = email_client.base_url(),
                "Mail transport verified"
            );
        }

        let listener = TcpListener::bind(format!(
            "{}:{}",
            configuration.app.host, configuration.app.port
        ))
        .context("Failed to bind the listener")?;
        let local_addr = listener.local_addr()?;

        tracing::info!("Starting service on address: {}", local_addr);

        let address = configuration.app.host.clone();
        let port = local_addr.port();
        let server = run(
            listener,
            email_client,
            AdminRecipient(admin),
            RateLimiter::from_settings(&configuration.rate_limit),
            configuration.app.cors_origin().map(str::to_owned),
        )?;

        Ok(Self {
            port,
            address,
            server,
        })
    }

    pub fn to_server_address(&self) -> String {
        format!("{}:{}", self.address, self.port)
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    pub async fn run_until_stopped(self) -> Result<(), std::io::Error> {
        self.server.await
    }
}
