use std::time::{Duration, Instant};

use reqwest::StatusCode;

use crate::client::api::{EndpointReply, SubscribeApi, SubscriptionPayload};
use crate::client::storage::EmailStore;
use crate::client::toast::{ToastKind, Toaster};
use crate::client::validation::is_valid_email;

pub const INVALID_EMAIL_MESSAGE: &str = "Please enter a valid email address.";
pub const CONSENT_MESSAGE: &str = "Please accept the Privacy Policy to continue.";
pub const SUBSCRIBED_MESSAGE: &str =
    "You are subscribed! Check your inbox for a welcome email \u{1f389}";
pub const RATE_LIMITED_MESSAGE: &str = "Too many requests. Please try again later.";
pub const FAILURE_MESSAGE: &str = "Something went wrong. Please try again.";
pub const NETWORK_ERROR_MESSAGE: &str = "Network error. Please try again.";

/// How long the outcome of a submission stays in the status region.
pub const STATUS_DURATION: Duration = Duration::from_millis(2500);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Email,
    Consent,
}

/// How a submission attempt ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// Stopped before any request was made, because of this field.
    Blocked(Field),
    Subscribed,
    RateLimited,
    InvalidEmail,
    ConsentRequired,
    Failed,
    NetworkError,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InterestOption {
    pub value: String,
    pub checked: bool,
}

/// State of the signup form and the rules that drive it.
#[derive(Debug)]
pub struct SubscribeForm {
    email: String,
    consent: bool,
    interests: Vec<InterestOption>,
    email_error: Option<&'static str>,
    submit_enabled: bool,
    loading: bool,
    focused: Option<Field>,
    status: Option<&'static str>,
    settled_at: Option<Instant>,
}

impl SubscribeForm {
    pub fn new<I, S>(interest_options: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            email: String::new(),
            consent: false,
            interests: interest_options
                .into_iter()
                .map(|value| InterestOption {
                    value: value.into(),
                    checked: false,
                })
                .collect(),
            email_error: None,
            submit_enabled: false,
            loading: false,
            focused: None,
            status: None,
            settled_at: None,
        }
    }

    /// Fills in the remembered address, if there is a valid one.
    pub fn prefill(&mut self, store: &impl EmailStore) {
        if let Some(stored) = store.load().filter(|email| is_valid_email(email)) {
            self.email = stored;
        }
        self.update_submit_state();
    }

    pub fn email(&self) -> &str {
        &self.email
    }

    pub fn consent(&self) -> bool {
        self.consent
    }

    pub fn interests(&self) -> &[InterestOption] {
        &self.interests
    }

    pub fn email_error(&self) -> Option<&'static str> {
        self.email_error
    }

    pub fn submit_enabled(&self) -> bool {
        self.submit_enabled
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn focused(&self) -> Option<Field> {
        self.focused
    }

    /// Short text for the live status region.
    pub fn status(&self) -> Option<&'static str> {
        self.status_at(Instant::now())
    }

    pub fn status_at(&self, now: Instant) -> Option<&'static str> {
        match self.settled_at {
            Some(at) if now.saturating_duration_since(at) >= STATUS_DURATION => None,
            _ => self.status,
        }
    }

    /// Called on every change of the email field.
    pub fn input_email(&mut self, value: impl Into<String>) {
        self.email = value.into();
        self.refresh_email_error();
        self.update_submit_state();
    }

    /// Called when the email field loses focus.
    pub fn blur_email(&mut self) {
        if self.focused == Some(Field::Email) {
            self.focused = None;
        }
        self.refresh_email_error();
    }

    pub fn set_consent(&mut self, checked: bool) {
        self.consent = checked;
        self.update_submit_state();
    }

    /// Unknown values are ignored.
    pub fn set_interest(&mut self, value: &str, checked: bool) {
        if let Some(option) = self.interests.iter_mut().find(|o| o.value == value) {
            option.checked = checked;
        }
    }

    /// Validates the form and, if it passes, issues exactly one request.
    #[tracing::instrument(name = "Submitting signup form", skip_all)]
    pub async fn submit(
        &mut self,
        api: &SubscribeApi,
        toaster: &mut Toaster,
        store: &impl EmailStore,
    ) -> SubmitOutcome {
        let payload = match self.begin_submission(toaster) {
            Ok(payload) => payload,
            Err(field) => return SubmitOutcome::Blocked(field),
        };

        let reply = match api.subscribe(&payload).await {
            Ok(reply) => Some(reply),
            Err(e) => {
                tracing::warn!(error.cause_chain = ?e, "Subscription request did not complete");
                None
            }
        };

        self.finish_submission(reply, &payload.email, toaster, store)
    }

    /// Checks both conditions and enters the loading state. On failure the
    /// offending field is reported and focused.
    pub fn begin_submission(
        &mut self,
        toaster: &mut Toaster,
    ) -> Result<SubscriptionPayload, Field> {
        let email = self.email.trim().to_owned();

        if !is_valid_email(&email) {
            self.email_error = Some(INVALID_EMAIL_MESSAGE);
            self.focused = Some(Field::Email);
            self.update_submit_state();
            return Err(Field::Email);
        }

        if !self.consent {
            toaster.show(CONSENT_MESSAGE, ToastKind::Error);
            self.focused = Some(Field::Consent);
            self.update_submit_state();
            return Err(Field::Consent);
        }

        let interests = self
            .interests
            .iter()
            .filter(|option| option.checked)
            .map(|option| option.value.clone())
            .collect();

        self.loading = true;
        self.submit_enabled = false;
        self.status = Some("Submitting…");
        self.settled_at = None;

        Ok(SubscriptionPayload {
            email,
            interests,
            consent: true,
        })
    }

    /// Applies the endpoint's reply, `None` meaning the request never
    /// completed, then leaves the loading state.
    pub fn finish_submission(
        &mut self,
        reply: Option<EndpointReply>,
        submitted_email: &str,
        toaster: &mut Toaster,
        store: &impl EmailStore,
    ) -> SubmitOutcome {
        let outcome = match reply {
            None => {
                self.status = Some("Network error.");
                toaster.show(NETWORK_ERROR_MESSAGE, ToastKind::Error);
                SubmitOutcome::NetworkError
            }
            Some(reply) if reply.status.is_success() => {
                self.status = Some("Subscription successful!");
                toaster.show(SUBSCRIBED_MESSAGE, ToastKind::Success);
                if let Err(e) = store.save(submitted_email) {
                    tracing::debug!(error = %e, "Could not remember the subscribed address");
                }
                self.reset_keeping_email(submitted_email);
                SubmitOutcome::Subscribed
            }
            Some(reply) => {
                self.status = Some("Submission failed.");
                self.apply_failure(reply, toaster)
            }
        };

        self.loading = false;
        self.settled_at = Some(Instant::now());
        self.update_submit_state();
        outcome
    }

    fn apply_failure(&mut self, reply: EndpointReply, toaster: &mut Toaster) -> SubmitOutcome {
        if reply.status == StatusCode::TOO_MANY_REQUESTS {
            toaster.show(RATE_LIMITED_MESSAGE, ToastKind::Error);
            return SubmitOutcome::RateLimited;
        }

        match reply.reason.as_deref() {
            Some("INVALID_EMAIL") => {
                self.email_error = Some(INVALID_EMAIL_MESSAGE);
                self.focused = Some(Field::Email);
                SubmitOutcome::InvalidEmail
            }
            Some("CONSENT_REQUIRED") => {
                toaster.show(CONSENT_MESSAGE, ToastKind::Error);
                SubmitOutcome::ConsentRequired
            }
            _ => {
                toaster.show(FAILURE_MESSAGE, ToastKind::Error);
                SubmitOutcome::Failed
            }
        }
    }

    fn reset_keeping_email(&mut self, email: &str) {
        self.email = email.to_owned();
        self.consent = false;
        for option in &mut self.interests {
            option.checked = false;
        }
        self.email_error = None;
    }

    fn refresh_email_error(&mut self) {
        let value = self.email.trim();
        self.email_error = if value.is_empty() || is_valid_email(value) {
            None
        } else {
            Some(INVALID_EMAIL_MESSAGE)
        };
    }

    fn update_submit_state(&mut self) {
        self.submit_enabled = !self.loading && is_valid_email(&self.email) && self.consent;
    }
}
