pub mod application;
pub mod interests;
pub mod new_subscriber;
pub mod subscriber_email;
