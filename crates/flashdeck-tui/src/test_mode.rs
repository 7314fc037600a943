use flashdeck_core::Flashcard;

/// One pass of sequential review over a fixed snapshot of cards.
///
/// The snapshot is taken when the session starts and never changes, so
/// `index < len` holds for the whole session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TestSession {
    cards: Vec<Flashcard>,
    index: usize,
    revealed: bool,
}

impl TestSession {
    /// Start a session over `cards`. Returns `None` when there is nothing to review.
    pub fn start(cards: Vec<Flashcard>) -> Option<Self> {
        if cards.is_empty() {
            return None;
        }
        Some(Self {
            cards,
            index: 0,
            revealed: false,
        })
    }

    pub fn current(&self) -> &Flashcard {
        &self.cards[self.index]
    }

    pub fn index(&self) -> usize {
        self.index
    }

    /// 1-based position for display ("Card 2 of 5").
    pub fn position(&self) -> usize {
        self.index + 1
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    pub fn cards(&self) -> &[Flashcard] {
        &self.cards
    }

    pub fn is_revealed(&self) -> bool {
        self.revealed
    }

    pub fn is_first(&self) -> bool {
        self.index == 0
    }

    pub fn is_last(&self) -> bool {
        self.index + 1 == self.cards.len()
    }

    /// Advance one card; stays put on the last card.
    pub fn next(&mut self) {
        self.index = (self.index + 1).min(self.cards.len() - 1);
    }

    /// Go back one card; stays put on the first card.
    pub fn prev(&mut self) {
        self.index = self.index.saturating_sub(1);
    }

    pub fn toggle_reveal(&mut self) {
        self.revealed = !self.revealed;
    }
}
