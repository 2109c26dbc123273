use once_cell::sync::Lazy;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use newsletter_signup::config::{get_configuration, Configuration};
use newsletter_signup::startup::AppServer;
use newsletter_signup::telemetry::{get_subscriber, init_subscriber};

static TRACING: Lazy<()> = Lazy::new(|| {
    let installed = if std::env::var("TEST_LOG").is_ok() {
        init_subscriber(get_subscriber("test", "info", std::io::stdout))
    } else {
        init_subscriber(get_subscriber("test", "info", std::io::sink))
    };
    installed.expect("Failed to initialize test telemetry");
});

pub struct TestApp {
    pub addr: String,
    pub email_server: MockServer,
    pub api_client: reqwest::Client,
}

impl TestApp {
    pub async fn post_subscribe(&self, body: &serde_json::Value) -> reqwest::Response {
        self.api_client
            .post(&format!("{}/api/subscribe", &self.addr))
            .json(body)
            .send()
            .await
            .expect("Failed to execute request.")
    }

    pub async fn post_subscribe_raw(&self, body: String) -> reqwest::Response {
        self.api_client
            .post(&format!("{}/api/subscribe", &self.addr))
            .header("Content-Type", "application/json")
            .body(body)
            .send()
            .await
            .expect("Failed to execute request.")
    }

    pub async fn get(&self, route: &str) -> reqwest::Response {
        self.api_client
            .get(&format!("{}{}", &self.addr, route))
            .send()
            .await
            .expect("Failed to execute request.")
    }

    /// Bodies of every message the app handed to the mail transport so far.
    pub async fn sent_emails(&self) -> Vec<serde_json::Value> {
        self.email_server
            .received_requests()
            .await
            .unwrap()
            .into_iter()
            .filter(|request| request.url.path() == "/email")
            .map(|request| serde_json::from_slice(&request.body).unwrap())
            .collect()
    }
}

/// Configuration pointing at `email_server`, listening on a random port.
pub fn test_configuration(email_server: &MockServer) -> Configuration {
    let mut c = get_configuration().expect("should load configuration");
    c.app.host = "127.0.0.1".into();
    c.app.port = 0;
    c.app.admin_email = None;
    c.app.cors_origin = None;
    c.email_client.base_url = email_server.uri();
    c.email_client.skip_verify = false;
    c
}

pub async fn mount_transport_check(email_server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/server"))
        .respond_with(ResponseTemplate::new(200))
        .mount(email_server)
        .await;
}

pub async fn spawn_app() -> TestApp {
    spawn_app_with(|_| {}).await
}

pub async fn spawn_app_with(customize: impl FnOnce(&mut Configuration)) -> TestApp {
    Lazy::force(&TRACING);

    let email_server = MockServer::start().await;
    mount_transport_check(&email_server).await;

    let configuration = {
        let mut c = test_configuration(&email_server);
        customize(&mut c);
        c
    };

    let server = AppServer::build(configuration)
        .await
        .expect("should have created server");

    let addr = format!("http://{}", server.to_server_address());
    let _ = tokio::spawn(server.run_until_stopped());

    TestApp {
        addr,
        email_server,
        api_client: reqwest::Client::new(),
    }
}
