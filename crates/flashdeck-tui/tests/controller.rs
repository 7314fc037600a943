//! Behaviour of the flashcard view controller against a scripted store.

use std::sync::Mutex;

use async_trait::async_trait;
use flashdeck_core::flashcard::{CardId, CardInput, Flashcard, GenerateRequest, GeneratedCard};
use flashdeck_service::{FlashcardService, ServiceError};
use flashdeck_tui::controller::{
    filter_cards, FlashcardController, Outcome, CREATE_FAILED, DELETE_FAILED, GENERATE_FAILED,
    LOAD_FAILED,
};

#[derive(Default)]
struct Script {
    cards: Vec<Flashcard>,
    next_id: CardId,
    creates: usize,
    /// 1-based create call that fails.
    fail_create_at: Option<usize>,
    fail_list: bool,
    fail_delete: bool,
    fail_generate: bool,
    generated: Vec<GeneratedCard>,
    last_generate: Option<GenerateRequest>,
    created_inputs: Vec<CardInput>,
}

#[derive(Default)]
struct ScriptedService {
    script: Mutex<Script>,
}

impl ScriptedService {
    fn with_cards(cards: Vec<Flashcard>) -> Self {
        let next_id = cards.iter().map(|c| c.id).max().unwrap_or(0) + 1;
        Self {
            script: Mutex::new(Script {
                cards,
                next_id,
                ..Default::default()
            }),
        }
    }

    fn empty() -> Self {
        Self::with_cards(Vec::new())
    }

    fn edit(&self, f: impl FnOnce(&mut Script)) {
        f(&mut self.script.lock().unwrap());
    }

    fn creates(&self) -> usize {
        self.script.lock().unwrap().creates
    }
}

#[async_trait]
impl FlashcardService for ScriptedService {
    async fn list_flashcards(&self) -> Result<Vec<Flashcard>, ServiceError> {
        let s = self.script.lock().unwrap();
        if s.fail_list {
            return Err(ServiceError::Network("connection refused".into()));
        }
        Ok(s.cards.clone())
    }

    async fn create_flashcard(&self, input: &CardInput) -> Result<Flashcard, ServiceError> {
        let mut s = self.script.lock().unwrap();
        s.creates += 1;
        s.created_inputs.push(input.clone());
        if s.fail_create_at == Some(s.creates) {
            return Err(ServiceError::Network("500 Internal Server Error".into()));
        }
        let card = Flashcard {
            id: s.next_id,
            question: input.question.clone(),
            answer: input.answer.clone(),
            topic: input.topic.clone(),
        };
        s.next_id += 1;
        s.cards.push(card.clone());
        Ok(card)
    }

    async fn update_flashcard(
        &self,
        id: CardId,
        _input: &CardInput,
    ) -> Result<Flashcard, ServiceError> {
        Err(ServiceError::NotFound(format!("flashcard {id}")))
    }

    async fn delete_flashcard(&self, id: CardId) -> Result<(), ServiceError> {
        let mut s = self.script.lock().unwrap();
        if s.fail_delete {
            return Err(ServiceError::Network("timeout".into()));
        }
        s.cards.retain(|c| c.id != id);
        Ok(())
    }

    async fn generate_flashcards(
        &self,
        request: &GenerateRequest,
    ) -> Result<Vec<GeneratedCard>, ServiceError> {
        let mut s = self.script.lock().unwrap();
        s.last_generate = Some(request.clone());
        if s.fail_generate {
            return Err(ServiceError::Generation("model refused".into()));
        }
        Ok(s.generated.clone())
    }
}

fn card(id: CardId, topic: Option<&str>) -> Flashcard {
    Flashcard {
        id,
        question: format!("Q{id}"),
        answer: format!("A{id}"),
        topic: topic.map(str::to_string),
    }
}

fn pairs(n: usize) -> Vec<GeneratedCard> {
    (1..=n)
        .map(|i| GeneratedCard {
            question: format!("gen Q{i}"),
            answer: format!("gen A{i}"),
        })
        .collect()
}

fn topics_of<S: FlashcardService>(c: &FlashcardController<S>) -> Vec<String> {
    c.state().topics().iter().map(str::to_string).collect()
}

// ---- Load ----

#[tokio::test]
async fn load_builds_topics_in_first_seen_order() {
    let svc = ScriptedService::with_cards(vec![
        card(1, Some("B")),
        card(2, Some("A")),
        card(3, Some("B")),
        card(4, None),
        card(5, Some("  ")),
    ]);
    let mut c = FlashcardController::new(svc);

    assert_eq!(c.load().await, Outcome::Applied);
    assert_eq!(c.state().cards().len(), 5);
    assert_eq!(topics_of(&c), ["All", "B", "A", "General"]);
    assert_eq!(c.state().active_filter(), "All");
    assert!(c.state().error().is_none());
}

#[tokio::test]
async fn failed_first_load_leaves_cards_empty_and_sets_error() {
    let svc = ScriptedService::empty();
    svc.edit(|s| s.fail_list = true);
    let mut c = FlashcardController::new(svc);

    assert_eq!(c.load().await, Outcome::Failed);
    assert!(c.state().cards().is_empty());
    assert_eq!(topics_of(&c), ["All"]);
    assert_eq!(c.state().error(), Some(LOAD_FAILED));
}

#[tokio::test]
async fn reload_resets_filter_when_topic_vanished() {
    let svc = ScriptedService::with_cards(vec![card(1, Some("Math"))]);
    let mut c = FlashcardController::new(svc);
    c.load().await;
    assert!(c.set_filter("Math"));

    c.service().edit(|s| s.cards.clear());
    c.load().await;
    assert_eq!(c.state().active_filter(), "All");
}

// ---- Create ----

#[tokio::test]
async fn create_with_blank_fields_is_noop() {
    let mut c = FlashcardController::new(ScriptedService::empty());
    c.load().await;

    assert_eq!(c.create("", "4", "Math").await, Outcome::Rejected);
    assert_eq!(c.create("2+2?", "   ", "Math").await, Outcome::Rejected);

    assert!(c.state().cards().is_empty());
    assert_eq!(topics_of(&c), ["All"]);
    assert_eq!(c.service().creates(), 0);
}

#[tokio::test]
async fn create_trims_and_defaults_blank_topic() {
    let mut c = FlashcardController::new(ScriptedService::empty());
    c.load().await;

    assert_eq!(c.create("  2+2?  ", " 4 ", "   ").await, Outcome::Applied);

    let created = &c.state().cards()[0];
    assert_eq!(created.question, "2+2?");
    assert_eq!(created.answer, "4");
    assert_eq!(created.topic.as_deref(), Some("General"));
    assert_eq!(topics_of(&c), ["All", "General"]);
}

#[tokio::test]
async fn create_failure_sets_error_and_keeps_cards() {
    let svc = ScriptedService::with_cards(vec![card(1, Some("Math"))]);
    svc.edit(|s| s.fail_create_at = Some(1));
    let mut c = FlashcardController::new(svc);
    c.load().await;

    assert_eq!(c.create("Q", "A", "Physics").await, Outcome::Failed);
    assert_eq!(c.state().cards().len(), 1);
    assert_eq!(topics_of(&c), ["All", "Math"]);
    assert_eq!(c.state().error(), Some(CREATE_FAILED));
}

// ---- Delete ----

#[tokio::test]
async fn deleting_last_card_of_topic_keeps_topic() {
    let svc = ScriptedService::with_cards(vec![card(1, Some("Math")), card(2, Some("Art"))]);
    let mut c = FlashcardController::new(svc);
    c.load().await;

    assert_eq!(c.delete(1).await, Outcome::Applied);
    assert_eq!(topics_of(&c), ["All", "Math", "Art"]);
    assert!(c.set_filter("Math"));
    assert!(c.state().visible_cards().is_empty());
}

#[tokio::test]
async fn delete_failure_keeps_card() {
    let svc = ScriptedService::with_cards(vec![card(1, None)]);
    svc.edit(|s| s.fail_delete = true);
    let mut c = FlashcardController::new(svc);
    c.load().await;

    assert_eq!(c.delete(1).await, Outcome::Failed);
    assert_eq!(c.state().cards().len(), 1);
    assert_eq!(c.state().error(), Some(DELETE_FAILED));

    c.dismiss_error();
    assert!(c.state().error().is_none());
}

// ---- Filter ----

#[test]
fn filter_treats_missing_topic_as_general() {
    let cards = vec![card(1, Some("Math")), card(2, None), card(3, Some("General"))];

    assert_eq!(filter_cards(&cards, "All").len(), 3);
    let general: Vec<_> = filter_cards(&cards, "General").iter().map(|c| c.id).collect();
    assert_eq!(general, [2, 3]);
    let math: Vec<_> = filter_cards(&cards, "Math").iter().map(|c| c.id).collect();
    assert_eq!(math, [1]);
}

#[tokio::test]
async fn set_filter_rejects_unknown_topic_and_cycle_wraps() {
    let svc = ScriptedService::with_cards(vec![card(1, Some("A")), card(2, Some("B"))]);
    let mut c = FlashcardController::new(svc);
    c.load().await;

    assert!(!c.set_filter("Nope"));
    assert_eq!(c.state().active_filter(), "All");

    c.cycle_filter(true);
    assert_eq!(c.state().active_filter(), "A");
    c.cycle_filter(true);
    c.cycle_filter(true);
    assert_eq!(c.state().active_filter(), "All");
    c.cycle_filter(false);
    assert_eq!(c.state().active_filter(), "B");
}

// ---- GenerateBatch ----

#[tokio::test]
async fn generate_batch_requests_three_and_appends_in_order() {
    let svc = ScriptedService::empty();
    svc.edit(|s| s.generated = pairs(3));
    let mut c = FlashcardController::new(svc);
    c.load().await;

    assert_eq!(c.generate_batch("  Rust ").await, Outcome::Applied);

    let questions: Vec<_> = c.state().cards().iter().map(|c| c.question.as_str()).collect();
    assert_eq!(questions, ["gen Q1", "gen Q2", "gen Q3"]);
    assert!(c.state().cards().iter().all(|c| c.topic_label() == "Rust"));
    assert_eq!(topics_of(&c), ["All", "Rust"]);
    assert!(!c.state().is_busy());
    assert!(c.state().error().is_none());

    let script = c.service().script.lock().unwrap();
    let request = script.last_generate.as_ref().unwrap();
    assert_eq!(request.topic, "Rust");
    assert_eq!(request.n, 3);
}

#[tokio::test]
async fn generate_batch_partial_failure_keeps_earlier_cards() {
    let svc = ScriptedService::empty();
    svc.edit(|s| {
        s.generated = pairs(3);
        s.fail_create_at = Some(2);
    });
    let mut c = FlashcardController::new(svc);
    c.load().await;

    assert_eq!(c.generate_batch("Rust").await, Outcome::Failed);
    assert_eq!(c.state().cards().len(), 1);
    assert_eq!(c.state().cards()[0].question, "gen Q1");
    // The surviving card brings its topic along.
    assert_eq!(topics_of(&c), ["All", "Rust"]);
    assert_eq!(c.state().error(), Some(GENERATE_FAILED));
    assert!(!c.state().is_busy());
    // Creation stops at the failure.
    assert_eq!(c.service().creates(), 2);
}

#[tokio::test]
async fn generate_batch_total_failure() {
    let svc = ScriptedService::empty();
    svc.edit(|s| s.fail_generate = true);
    let mut c = FlashcardController::new(svc);
    c.load().await;

    assert_eq!(c.generate_batch("Rust").await, Outcome::Failed);
    assert!(c.state().cards().is_empty());
    assert_eq!(topics_of(&c), ["All"]);
    assert_eq!(c.state().error(), Some(GENERATE_FAILED));
    assert!(!c.state().is_busy());
}

#[tokio::test]
async fn generate_batch_clears_previous_error() {
    let svc = ScriptedService::empty();
    svc.edit(|s| {
        s.fail_list = true;
        s.generated = pairs(1);
    });
    let mut c = FlashcardController::new(svc);
    c.load().await;
    assert!(c.state().error().is_some());

    assert_eq!(c.generate_batch("Rust").await, Outcome::Applied);
    assert!(c.state().error().is_none());
}

#[tokio::test]
async fn generate_batch_blank_topic_is_noop() {
    let mut c = FlashcardController::new(ScriptedService::empty());
    c.load().await;

    assert_eq!(c.generate_batch("   ").await, Outcome::Rejected);
    assert!(c.service().script.lock().unwrap().last_generate.is_none());
    assert!(!c.state().is_busy());
}

// ---- Test mode ----

#[tokio::test]
async fn test_mode_over_filtered_cards_clamps_at_both_ends() {
    let svc = ScriptedService::with_cards(vec![
        card(1, Some("Math")),
        card(2, Some("Art")),
        card(3, Some("Math")),
    ]);
    let mut c = FlashcardController::new(svc);
    c.load().await;
    c.set_filter("Math");

    assert!(c.start_test());
    let session = c.state().test_session().unwrap();
    assert_eq!(session.len(), 2);
    assert_eq!(session.current().id, 1);

    c.prev_card();
    assert_eq!(c.state().test_session().unwrap().index(), 0);

    c.next_card();
    c.next_card();
    let session = c.state().test_session().unwrap();
    assert_eq!(session.index(), 1);
    assert_eq!(session.current().id, 3);

    c.toggle_reveal();
    assert!(c.state().test_session().unwrap().is_revealed());

    c.exit_test();
    assert!(!c.state().is_testing());
}

#[tokio::test]
async fn test_mode_snapshot_ignores_later_deletes() {
    let svc = ScriptedService::with_cards(vec![card(1, None), card(2, None)]);
    let mut c = FlashcardController::new(svc);
    c.load().await;
    assert!(c.start_test());

    c.delete(2).await;
    c.next_card();
    assert_eq!(c.state().test_session().unwrap().current().id, 2);
}

#[tokio::test]
async fn test_mode_rejected_with_no_visible_cards() {
    let svc = ScriptedService::with_cards(vec![card(1, Some("Math"))]);
    let mut c = FlashcardController::new(svc);
    c.load().await;
    c.delete(1).await;
    c.set_filter("Math");

    assert!(!c.start_test());
    assert!(!c.state().is_testing());
}

// ---- End to end ----

#[tokio::test]
async fn create_filter_delete_scenario() {
    let mut c = FlashcardController::new(ScriptedService::empty());
    c.load().await;

    assert_eq!(c.create("2+2?", "4", "Math").await, Outcome::Applied);
    let created = c.state().cards()[0].clone();
    assert_eq!(created.topic_label(), "Math");
    assert_eq!(topics_of(&c), ["All", "Math"]);

    assert!(c.set_filter("Math"));
    let visible: Vec<_> = c.state().visible_cards().iter().map(|c| c.id).collect();
    assert_eq!(visible, [created.id]);

    assert_eq!(c.delete(created.id).await, Outcome::Applied);
    assert!(c.state().cards().is_empty());
    assert_eq!(topics_of(&c), ["All", "Math"]);
}
