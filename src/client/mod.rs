//! The signup form as seen from the subscriber's side.
//!
//! [`form::SubscribeForm`] holds the form state and decides what the UI
//! shows; [`api::SubscribeApi`] talks to the subscription endpoint. The
//! email rule is kept in [`validation`], separate from the server's own.

pub mod api;
pub mod form;
pub mod storage;
pub mod toast;
pub mod validation;
