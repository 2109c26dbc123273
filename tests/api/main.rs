mod helpers;
mod home;
mod startup;
mod subscriptions;
