//! # Topic Filtering
//!
//! Publishers send one message per line; the first field names the topic.
//! A subscriber receives a message only if it starts with one of its topic
//! prefixes.

/// Separator between the fields of a message.
pub const FIELD_SEPARATOR: char = ' ';

/// Set of subscribed topic prefixes.
///
/// No topics means nothing is received; the empty topic matches everything.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TopicFilter {
    /// Subscribed prefixes.
    pub topics: Vec<String>,
}

impl TopicFilter {
    /// Filter accepting every message.
    #[must_use]
    pub fn all() -> Self {
        Self {
            topics: vec![String::new()],
        }
    }

    /// Filter for specific topic prefixes.
    #[must_use]
    pub fn new<I, S>(topics: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            topics: topics.into_iter().map(Into::into).collect(),
        }
    }

    /// Check if a raw message matches one of the topics.
    #[must_use]
    pub fn matches(&self, message: &str) -> bool {
        self.topics.iter().any(|topic| message.starts_with(topic.as_str()))
    }
}

/// Split a raw message into its fields.
#[must_use]
pub fn split_message(message: &str) -> Vec<String> {
    message.split(FIELD_SEPARATOR).map(str::to_owned).collect()
}
