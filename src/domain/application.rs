use crate::domain::subscriber_email::SubscriberEmail;

/// Operator address that receives a copy of every new subscription, if any.
#[derive(Clone, Debug, Default)]
pub struct AdminRecipient(pub Option<SubscriberEmail>);
