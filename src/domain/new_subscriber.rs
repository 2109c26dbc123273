//! src/domain/new_subscriber.rs

use serde_json::Value;

use crate::domain::interests::Interests;
use crate::domain::subscriber_email::SubscriberEmail;

/// A subscription request that passed validation.
#[derive(Debug, Clone)]
pub struct NewSubscriber {
    pub email: SubscriberEmail,
    pub interests: Interests,
}

/// Why a subscription request was turned down. Checked in declaration order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum SubscriptionRejection {
    #[error("The email address is missing or malformed")]
    InvalidEmail,
    #[error("Consent to the privacy policy was not given")]
    ConsentRequired,
}

impl SubscriptionRejection {
    /// Machine-readable reason sent back to the caller.
    pub fn code(&self) -> &'static str {
        match self {
            SubscriptionRejection::InvalidEmail => "INVALID_EMAIL",
            SubscriptionRejection::ConsentRequired => "CONSENT_REQUIRED",
        }
    }
}

impl TryFrom<Value> for NewSubscriber {
    type Error = SubscriptionRejection;

    fn try_from(payload: Value) -> Result<Self, Self::Error> {
        let email = match payload.get("email") {
            Some(Value::String(email)) => SubscriberEmail::parse(email.clone())
                .map_err(|_| SubscriptionRejection::InvalidEmail)?,
            _ => return Err(SubscriptionRejection::InvalidEmail),
        };

        if payload.get("consent") != Some(&Value::Bool(true)) {
            return Err(SubscriptionRejection::ConsentRequired);
        }

        let interests = Interests::sanitize(payload.get("interests"));
        Ok(Self { email, interests })
    }
}
