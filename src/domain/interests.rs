//! src/domain/interests.rs

use serde_json::Value;

/// At most this many interests are kept from a request.
pub const MAX_INTERESTS: usize = 10;

/// Free-form tags picked by the subscriber. Advisory only.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Interests(Vec<String>);

impl Interests {
    /// Non-arrays become an empty list, non-string entries are dropped and
    /// only the first [`MAX_INTERESTS`] strings survive.
    pub fn sanitize(value: Option<&Value>) -> Self {
        let entries = match value {
            Some(Value::Array(entries)) => entries,
            _ => return Self::default(),
        };

        Self(
            entries
                .iter()
                .filter_map(Value::as_str)
                .take(MAX_INTERESTS)
                .map(str::to_owned)
                .collect(),
        )
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_slice(&self) -> &[String] {
        &self.0
    }

    pub fn join(&self, separator: &str) -> String {
        self.0.join(separator)
    }
}
