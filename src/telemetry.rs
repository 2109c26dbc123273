//! Structured logging for the signup service.
//!
//! Every span and event is written as one bunyan JSON line. `log` records
//! from actix, reqwest and friends are bridged into the same output.

use anyhow::Context;
use tracing::Subscriber;
use tracing_bunyan_formatter::{BunyanFormattingLayer, JsonStorageLayer};
use tracing_log::LogTracer;
use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::{layer::SubscriberExt, EnvFilter, Registry};

/// Name the service logs under.
pub const SERVICE_NAME: &str = "newsletter_signup";

/// Builds the subscriber for `service`. `RUST_LOG` takes precedence over
/// `default_filter`.
pub fn get_subscriber<Sink>(
    service: impl Into<String>,
    default_filter: &str,
    sink: Sink,
) -> impl Subscriber + Send + Sync
where
    Sink: for<'a> MakeWriter<'a> + Send + Sync + 'static,
{
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_filter))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    Registry::default()
        .with(filter)
        .with(JsonStorageLayer)
        .with(BunyanFormattingLayer::new(service.into(), sink))
}

/// Installs `subscriber` for the whole process. Fails when called twice.
pub fn init_subscriber(subscriber: impl Subscriber + Send + Sync) -> Result<(), anyhow::Error> {
    LogTracer::init().context("Failed to bridge `log` records into tracing")?;
    tracing::subscriber::set_global_default(subscriber)
        .context("Failed to install the tracing subscriber")?;
    Ok(())
}
