use anyhow::Context;

use newsletter_signup::config::get_configuration;
use newsletter_signup::startup::AppServer;
use newsletter_signup::telemetry::{get_subscriber, init_subscriber, SERVICE_NAME};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_subscriber(get_subscriber(SERVICE_NAME, "info", std::io::stdout))?;

    let configuration = get_configuration().context("Failed to load configuration")?;
    let server = AppServer::build(configuration).await?;

    server.run_until_stopped().await?;

    Ok(())
}
