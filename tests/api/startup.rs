use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use newsletter_signup::startup::AppServer;

use crate::helpers::test_configuration;

#[tokio::test]
async fn startup_fails_when_the_mail_transport_rejects_verification() {
    let email_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/server"))
        .respond_with(ResponseTemplate::new(401))
        .expect(1)
        .mount(&email_server)
        .await;

    let outcome = AppServer::build(test_configuration(&email_server)).await;

    assert!(outcome.is_err());
}

#[tokio::test]
async fn startup_skips_verification_when_configured_to() {
    let email_server = MockServer::start().await;
    Mock::given(path("/server"))
        .respond_with(ResponseTemplate::new(500))
        .expect(0)
        .mount(&email_server)
        .await;

    let mut configuration = test_configuration(&email_server);
    configuration.email_client.skip_verify = true;

    let outcome = AppServer::build(configuration).await;

    assert!(outcome.is_ok());
}

#[tokio::test]
async fn startup_fails_on_an_invalid_admin_address() {
    let email_server = MockServer::start().await;
    let mut configuration = test_configuration(&email_server);
    configuration.email_client.skip_verify = true;
    configuration.app.admin_email = Some("not-an-email".into());

    let outcome = AppServer::build(configuration).await;

    assert!(outcome.is_err());
}
