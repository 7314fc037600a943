//! Flashcard view state and the operations that change it.
//!
//! [`FlashcardController`] owns the card list, the topic filter set and the
//! active filter, and reconciles them with the store after each call.
//! Renderers only ever see a `&ViewState`.

use flashdeck_core::flashcard::{normalize_topic, CardId, CardInput, Flashcard, GenerateRequest};
use flashdeck_core::{TopicSet, ALL_TOPICS, GENERATE_BATCH_SIZE};
use flashdeck_service::{FlashcardService, ServiceError};
use tracing::warn;

use crate::test_mode::TestSession;

pub const LOAD_FAILED: &str = "Failed to load flashcards";
pub const CREATE_FAILED: &str = "Failed to create flashcard";
pub const DELETE_FAILED: &str = "Failed to delete flashcard";
pub const GENERATE_FAILED: &str = "Generation failed";

/// Result of a controller operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// The operation ran to completion and state was updated.
    Applied,
    /// Input was rejected before any remote call; state is unchanged.
    Rejected,
    /// A remote call failed; the error message is set.
    Failed,
}

#[derive(Debug, Clone)]
pub struct ViewState {
    cards: Vec<Flashcard>,
    topics: TopicSet,
    active_filter: String,
    error: Option<String>,
    busy: bool,
    test: Option<TestSession>,
}

impl ViewState {
    fn new() -> Self {
        Self {
            cards: Vec::new(),
            topics: TopicSet::new(),
            active_filter: ALL_TOPICS.to_string(),
            error: None,
            busy: false,
            test: None,
        }
    }

    pub fn cards(&self) -> &[Flashcard] {
        &self.cards
    }

    pub fn topics(&self) -> &TopicSet {
        &self.topics
    }

    pub fn active_filter(&self) -> &str {
        &self.active_filter
    }

    /// Cards matching the active filter, in collection order.
    pub fn visible_cards(&self) -> Vec<&Flashcard> {
        filter_cards(&self.cards, &self.active_filter)
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn is_busy(&self) -> bool {
        self.busy
    }

    pub fn test_session(&self) -> Option<&TestSession> {
        self.test.as_ref()
    }

    pub fn is_testing(&self) -> bool {
        self.test.is_some()
    }

    fn fail(&mut self, message: &str, err: &ServiceError) {
        warn!("{message}: {err}");
        self.error = Some(message.to_string());
    }

    fn append(&mut self, card: Flashcard) {
        self.topics.insert(card.topic_label());
        self.cards.push(card);
    }
}

/// Cards whose topic (missing treated as `"General"`) equals `topic`,
/// or every card for `"All"`.
pub fn filter_cards<'a>(cards: &'a [Flashcard], topic: &str) -> Vec<&'a Flashcard> {
    if topic == ALL_TOPICS {
        cards.iter().collect()
    } else {
        cards.iter().filter(|c| c.topic_label() == topic).collect()
    }
}

pub struct FlashcardController<S> {
    service: S,
    state: ViewState,
}

impl<S: FlashcardService> FlashcardController<S> {
    /// A controller with no cards loaded yet. Call [`load`](Self::load) to populate.
    pub fn new(service: S) -> Self {
        Self {
            service,
            state: ViewState::new(),
        }
    }

    pub fn state(&self) -> &ViewState {
        &self.state
    }

    pub fn service(&self) -> &S {
        &self.service
    }

    /// Replace the card list with the store's and rebuild the topic set.
    ///
    /// On failure the current cards are kept.
    pub async fn load(&mut self) -> Outcome {
        match self.service.list_flashcards().await {
            Ok(cards) => {
                self.state.topics = TopicSet::from_cards(&cards);
                self.state.cards = cards;
                if !self.state.topics.contains(&self.state.active_filter) {
                    self.state.active_filter = ALL_TOPICS.to_string();
                }
                Outcome::Applied
            }
            Err(e) => {
                self.state.fail(LOAD_FAILED, &e);
                Outcome::Failed
            }
        }
    }

    /// Create a card from trimmed input. Blank question or answer is a no-op.
    pub async fn create(&mut self, question: &str, answer: &str, topic: &str) -> Outcome {
        let question = question.trim();
        let answer = answer.trim();
        if question.is_empty() || answer.is_empty() {
            return Outcome::Rejected;
        }

        let input = CardInput::new(question, answer, &normalize_topic(topic));
        match self.service.create_flashcard(&input).await {
            Ok(card) => {
                self.state.append(card);
                Outcome::Applied
            }
            Err(e) => {
                self.state.fail(CREATE_FAILED, &e);
                Outcome::Failed
            }
        }
    }

    /// Delete a card. Its topic stays in the topic set even if no card uses it anymore.
    pub async fn delete(&mut self, id: CardId) -> Outcome {
        match self.service.delete_flashcard(id).await {
            Ok(()) => {
                self.state.cards.retain(|c| c.id != id);
                Outcome::Applied
            }
            Err(e) => {
                self.state.fail(DELETE_FAILED, &e);
                Outcome::Failed
            }
        }
    }

    /// Generate a batch for `topic` and store each pair, one create at a time.
    ///
    /// Cards appear as each create succeeds. The first failure stops the
    /// batch; cards stored before it are kept.
    pub async fn generate_batch(&mut self, topic: &str) -> Outcome {
        let topic = topic.trim();
        if topic.is_empty() {
            return Outcome::Rejected;
        }

        self.state.busy = true;
        self.state.error = None;
        let outcome = self.run_batch(topic).await;
        self.state.busy = false;
        outcome
    }

    async fn run_batch(&mut self, topic: &str) -> Outcome {
        let request = GenerateRequest::new(topic, GENERATE_BATCH_SIZE);
        let generated = match self.service.generate_flashcards(&request).await {
            Ok(generated) => generated,
            Err(e) => {
                self.state.fail(GENERATE_FAILED, &e);
                return Outcome::Failed;
            }
        };

        for pair in &generated {
            let input = CardInput::new(&pair.question, &pair.answer, topic);
            match self.service.create_flashcard(&input).await {
                Ok(card) => self.state.append(card),
                Err(e) => {
                    self.state.fail(GENERATE_FAILED, &e);
                    return Outcome::Failed;
                }
            }
        }

        self.state.topics.insert(topic);
        Outcome::Applied
    }

    /// Select the active filter. Topics outside the set are ignored.
    pub fn set_filter(&mut self, topic: &str) -> bool {
        if !self.state.topics.contains(topic) {
            return false;
        }
        self.state.active_filter = topic.to_string();
        true
    }

    /// Step the active filter through the topic set, wrapping at either end.
    pub fn cycle_filter(&mut self, forward: bool) {
        let topics = &self.state.topics;
        let len = topics.len();
        let current = topics.position(&self.state.active_filter).unwrap_or(0);
        let next = if forward {
            (current + 1) % len
        } else {
            (current + len - 1) % len
        };
        if let Some(topic) = topics.get(next) {
            self.state.active_filter = topic.to_string();
        }
    }

    pub fn dismiss_error(&mut self) {
        self.state.error = None;
    }

    /// Enter test mode over the currently visible cards.
    /// Returns false (and stays inactive) when no card is visible.
    pub fn start_test(&mut self) -> bool {
        let snapshot: Vec<Flashcard> = self.state.visible_cards().into_iter().cloned().collect();
        match TestSession::start(snapshot) {
            Some(session) => {
                self.state.test = Some(session);
                true
            }
            None => false,
        }
    }

    pub fn exit_test(&mut self) {
        self.state.test = None;
    }

    pub fn next_card(&mut self) {
        if let Some(session) = self.state.test.as_mut() {
            session.next();
        }
    }

    pub fn prev_card(&mut self) {
        if let Some(session) = self.state.test.as_mut() {
            session.prev();
        }
    }

    pub fn toggle_reveal(&mut self) {
        if let Some(session) = self.state.test.as_mut() {
            session.toggle_reveal();
        }
    }
}
