//! Push envelope and subscription parameter types.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Unsolicited, topic-tagged message written to a session's connection.
///
/// The `pushMessage` marker lets clients tell pushes apart from JSON-RPC
/// responses on the same stream.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PushMessage {
    /// Always `true`.
    #[serde(rename = "pushMessage")]
    pub push_message: bool,
    /// Topic the message was published under.
    pub subject: String,
    /// Arbitrary payload.
    pub message: Value,
}

impl PushMessage {
    /// Build a push envelope for `subject`.
    pub fn new(subject: impl Into<String>, message: Value) -> Self {
        Self {
            push_message: true,
            subject: subject.into(),
            message,
        }
    }

    /// Serialize to the wire text handed to `Connection::send`.
    pub fn to_text(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}

/// A single topic or a list of topics, as accepted by subscribe/unsubscribe.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TopicSelection {
    /// One topic.
    One(String),
    /// Several topics, processed in order.
    Many(Vec<String>),
}

impl TopicSelection {
    /// Run `op` on every topic, preserving the input shape in the result.
    pub fn apply(&self, mut op: impl FnMut(&str) -> bool) -> SubscriptionOutcome {
        match self {
            TopicSelection::One(topic) => SubscriptionOutcome::One(op(topic)),
            TopicSelection::Many(topics) => {
                SubscriptionOutcome::Many(topics.iter().map(|t| op(t)).collect())
            }
        }
    }
}

impl From<&str> for TopicSelection {
    fn from(topic: &str) -> Self {
        TopicSelection::One(topic.to_string())
    }
}

impl From<Vec<String>> for TopicSelection {
    fn from(topics: Vec<String>) -> Self {
        TopicSelection::Many(topics)
    }
}

/// Result of subscribe/unsubscribe: a bool, or a list of bools in input order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SubscriptionOutcome {
    /// Outcome for a single topic.
    One(bool),
    /// Outcomes for a batch, one per input topic.
    Many(Vec<bool>),
}
