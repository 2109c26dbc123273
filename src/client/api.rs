use reqwest::{Client, StatusCode};

/// JSON body posted to `/api/subscribe`.
#[derive(serde::Serialize, Debug, Clone, PartialEq, Eq)]
pub struct SubscriptionPayload {
    pub email: String,
    pub interests: Vec<String>,
    pub consent: bool,
}

/// What came back from the endpoint, reduced to what the form looks at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EndpointReply {
    pub status: StatusCode,
    /// The `error` field of a JSON body, when there is one.
    pub reason: Option<String>,
}

#[derive(serde::Deserialize)]
struct ReplyBody {
    error: Option<String>,
}

pub struct SubscribeApi {
    http_client: Client,
    base_url: String,
}

impl SubscribeApi {
    /// `base_url` is the origin serving the API, e.g. `http://localhost:3000`.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            http_client: Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_owned(),
        }
    }

    /// Posts `payload`. Only failures to complete the exchange are errors;
    /// any HTTP status is a reply.
    #[tracing::instrument(name = "Posting subscription", skip(self, payload))]
    pub async fn subscribe(
        &self,
        payload: &SubscriptionPayload,
    ) -> Result<EndpointReply, reqwest::Error> {
        let response = self
            .http_client
            .post(format!("{}/api/subscribe", self.base_url))
            .json(payload)
            .send()
            .await?;

        let status = response.status();
        // Non-JSON bodies (e.g. the rate limiter's plain text) carry no reason.
        let reason = response
            .json::<ReplyBody>()
            .await
            .ok()
            .and_then(|body| body.error);

        Ok(EndpointReply { status, reason })
    }
}
