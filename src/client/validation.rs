use once_cell::sync::Lazy;
use regex::Regex;

static EMAIL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^[^\s@]+@[^\s@]+\.[^\s@]{2,}$").expect("Invalid Regex"));

/// Whether `value`, once trimmed, looks like an email address.
pub fn is_valid_email(value: &str) -> bool {
    EMAIL.is_match(value.trim())
}
