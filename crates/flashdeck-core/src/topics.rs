use crate::flashcard::{Flashcard, ALL_TOPICS};

/// Ordered, duplicate-free set of topic labels offered as filters.
///
/// Always begins with the `"All"` sentinel. Topics keep first-seen order and
/// are only ever added; removing the last card of a topic leaves the topic
/// in place.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TopicSet {
    topics: Vec<String>,
}

impl TopicSet {
    pub fn new() -> Self {
        Self {
            topics: vec![ALL_TOPICS.to_string()],
        }
    }

    /// `"All"` followed by each distinct card topic in first-seen order.
    pub fn from_cards(cards: &[Flashcard]) -> Self {
        let mut set = Self::new();
        for card in cards {
            set.insert(card.topic_label());
        }
        set
    }

    /// Append `topic` if absent. Returns true when the set grew.
    pub fn insert(&mut self, topic: &str) -> bool {
        if self.contains(topic) {
            return false;
        }
        self.topics.push(topic.to_string());
        true
    }

    pub fn contains(&self, topic: &str) -> bool {
        self.topics.iter().any(|t| t == topic)
    }

    pub fn position(&self, topic: &str) -> Option<usize> {
        self.topics.iter().position(|t| t == topic)
    }

    pub fn get(&self, index: usize) -> Option<&str> {
        self.topics.get(index).map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.topics.iter().map(String::as_str)
    }

    pub fn as_slice(&self) -> &[String] {
        &self.topics
    }

    pub fn len(&self) -> usize {
        self.topics.len()
    }

    /// Never true: the sentinel is always present.
    pub fn is_empty(&self) -> bool {
        self.topics.is_empty()
    }
}

impl Default for TopicSet {
    fn default() -> Self {
        Self::new()
    }
}
