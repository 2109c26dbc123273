//! Bodies of the messages sent on a new subscription.

use chrono::Datelike;
use htmlescape::encode_minimal;

use crate::domain::new_subscriber::NewSubscriber;

pub struct EmailContent {
    pub subject: String,
    pub html: String,
    pub text: String,
}

pub fn welcome_email(brand: &str, subscriber: &NewSubscriber) -> EmailContent {
    let interests = &subscriber.interests;

    let mut text = vec![
        "Welcome aboard!".to_string(),
        format!("Thanks for subscribing, {}.", subscriber.email),
        "You'll start receiving weekly hand-picked recipes, tips, and seasonal menus.".to_string(),
    ];
    if !interests.is_empty() {
        text.push(format!("Your interests: {}", interests.join(", ")));
    }
    text.push("Unsubscribe anytime via the link in our emails.".to_string());

    let interest_html = if interests.is_empty() {
        String::new()
    } else {
        let escaped: Vec<String> = interests
            .as_slice()
            .iter()
            .map(|interest| encode_minimal(interest))
            .collect();
        format!(
            "<p>We'll send you more on: <strong>{}</strong></p>",
            escaped.join(", ")
        )
    };

    let html = format!(
        "<h1>Welcome aboard!</h1>\
        <p>Thanks for subscribing, {email}.</p>\
        <p>You'll start receiving weekly hand-picked recipes, tips, and seasonal menus.</p>\
        {interests}\
        <p>Not you? You can unsubscribe anytime from the footer of our emails.</p>\
        <p>&copy; {year} {brand}</p>",
        email = encode_minimal(subscriber.email.as_ref()),
        interests = interest_html,
        year = chrono::Utc::now().year(),
        brand = encode_minimal(brand),
    );

    EmailContent {
        subject: format!("Welcome to {}!", brand),
        html,
        text: text.join("\n\n"),
    }
}

pub fn admin_notification(subscriber: &NewSubscriber) -> EmailContent {
    let joined = subscriber.interests.join(", ");
    let listed = if joined.is_empty() { "N/A" } else { &joined };

    EmailContent {
        subject: "New newsletter subscriber".to_string(),
        html: format!(
            "<p><strong>New subscriber:</strong> {}</p>\
            <p><strong>Interests:</strong> {}</p>",
            encode_minimal(subscriber.email.as_ref()),
            encode_minimal(listed),
        ),
        text: format!("New subscriber: {}\nInterests: {}", subscriber.email, listed),
    }
}
