use serde::{Deserialize, Deserializer, Serialize};

use crate::FlashdeckError;

/// Topic assigned to cards created without one.
pub const DEFAULT_TOPIC: &str = "General";

/// Filter sentinel selecting every card regardless of topic.
pub const ALL_TOPICS: &str = "All";

/// Number of cards requested per AI generation batch.
pub const GENERATE_BATCH_SIZE: u32 = 3;

/// Server-assigned card identifier. Opaque to the client beyond equality.
pub type CardId = i64;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Flashcard {
    pub id: CardId,
    pub question: String,
    pub answer: String,
    #[serde(default)]
    pub topic: Option<String>,
}

impl Flashcard {
    /// The card's topic, with a missing or blank topic reported as `"General"`.
    pub fn topic_label(&self) -> &str {
        match self.topic.as_deref() {
            Some(t) if !t.trim().is_empty() => t,
            _ => DEFAULT_TOPIC,
        }
    }
}

/// Request body for creating or replacing a card.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CardInput {
    #[serde(default, deserialize_with = "null_as_empty")]
    pub question: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub answer: String,
    #[serde(default)]
    pub topic: Option<String>,
}

impl CardInput {
    pub fn new(question: &str, answer: &str, topic: &str) -> Self {
        Self {
            question: question.to_string(),
            answer: answer.to_string(),
            topic: Some(topic.to_string()),
        }
    }

    pub fn validate(&self) -> Result<(), FlashdeckError> {
        if self.question.trim().is_empty() || self.answer.trim().is_empty() {
            return Err(FlashdeckError::InvalidInput(
                "both 'question' and 'answer' are required".into(),
            ));
        }
        Ok(())
    }

    /// Topic to store: trimmed, or `"General"` when missing or blank.
    pub fn resolved_topic(&self) -> String {
        normalize_topic(self.topic.as_deref().unwrap_or_default())
    }
}

/// A question/answer pair produced by the generator, not yet stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeneratedCard {
    pub question: String,
    pub answer: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerateRequest {
    #[serde(default, deserialize_with = "null_as_empty")]
    pub topic: String,
    #[serde(default = "default_batch_size")]
    pub n: u32,
}

fn default_batch_size() -> u32 {
    GENERATE_BATCH_SIZE
}

/// Missing and `null` text fields both read as empty, leaving the rejection
/// to `validate`.
fn null_as_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

impl GenerateRequest {
    pub const MAX_CARDS: u32 = 20;

    pub fn new(topic: &str, n: u32) -> Self {
        Self {
            topic: topic.to_string(),
            n,
        }
    }

    pub fn validate(&self) -> Result<(), FlashdeckError> {
        if self.topic.trim().is_empty() {
            return Err(FlashdeckError::InvalidInput("topic must not be empty".into()));
        }
        if self.n == 0 || self.n > Self::MAX_CARDS {
            return Err(FlashdeckError::InvalidInput(format!(
                "n must be between 1 and {}",
                Self::MAX_CARDS
            )));
        }
        Ok(())
    }
}

/// Trim a user-supplied topic, substituting `"General"` when blank.
pub fn normalize_topic(topic: &str) -> String {
    let trimmed = topic.trim();
    if trimmed.is_empty() {
        DEFAULT_TOPIC.to_string()
    } else {
        trimmed.to_string()
    }
}
