use std::collections::HashSet;

use crossterm::event::{KeyCode, KeyEvent};
use flashdeck_core::flashcard::{CardId, Flashcard};
use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, List, ListItem, ListState};

/// Cursor and flip state over whatever cards are currently visible.
///
/// The card slice is supplied on each call because filtering and remote
/// updates change it underneath the cursor.
pub struct CardList {
    list_state: ListState,
    flipped: HashSet<CardId>,
}

impl CardList {
    pub fn new() -> Self {
        Self {
            list_state: ListState::default(),
            flipped: HashSet::new(),
        }
    }

    /// Index of the highlighted card, clamped to `len`.
    pub fn selected(&self, len: usize) -> Option<usize> {
        if len == 0 {
            return None;
        }
        Some(self.list_state.selected().unwrap_or(0).min(len - 1))
    }

    pub fn selected_card<'a>(&self, cards: &[&'a Flashcard]) -> Option<&'a Flashcard> {
        self.selected(cards.len()).map(|i| cards[i])
    }

    /// Re-anchor the cursor after the visible list changed size.
    pub fn clamp(&mut self, len: usize) {
        self.list_state.select(self.selected(len));
    }

    pub fn is_flipped(&self, id: CardId) -> bool {
        self.flipped.contains(&id)
    }

    pub fn handle_key(&mut self, key: KeyEvent, cards: &[&Flashcard]) {
        let len = cards.len();
        let Some(current) = self.selected(len) else {
            return;
        };
        match key.code {
            KeyCode::Char('j') | KeyCode::Down => {
                if current + 1 < len {
                    self.list_state.select(Some(current + 1));
                }
            }
            KeyCode::Char('k') | KeyCode::Up => {
                if current > 0 {
                    self.list_state.select(Some(current - 1));
                }
            }
            // Jump to first/last
            KeyCode::Char('g') => self.list_state.select(Some(0)),
            KeyCode::Char('G') => self.list_state.select(Some(len - 1)),
            KeyCode::Enter | KeyCode::Char(' ') => {
                let id = cards[current].id;
                if !self.flipped.remove(&id) {
                    self.flipped.insert(id);
                }
            }
            _ => {}
        }
    }

    pub fn render(&self, frame: &mut Frame, area: Rect, cards: &[&Flashcard], filter: &str) {
        let title = format!(" {filter} ({}) ", cards.len());
        let block = Block::default()
            .title(title)
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Cyan));

        if cards.is_empty() {
            let empty = ListItem::new(Line::from(Span::styled(
                "No flashcards yet. Press n to add one or a to generate.",
                Style::default().fg(Color::DarkGray),
            )));
            frame.render_widget(List::new(vec![empty]).block(block), area);
            return;
        }

        let items: Vec<ListItem> = cards
            .iter()
            .map(|card| {
                let topic_span = Span::styled(
                    format!("[{}] ", card.topic_label()),
                    Style::default().fg(Color::Magenta),
                );
                let mut lines = vec![Line::from(vec![topic_span, Span::raw(&card.question)])];
                if self.is_flipped(card.id) {
                    lines.push(Line::from(Span::styled(
                        format!("    {}", card.answer),
                        Style::default().fg(Color::Green),
                    )));
                }
                ListItem::new(lines)
            })
            .collect();

        let list = List::new(items)
            .block(block)
            .highlight_style(
                Style::default()
                    .fg(Color::Black)
                    .bg(Color::Cyan)
                    .bold(),
            )
            .highlight_symbol("> ");

        let mut state = self.list_state.clone();
        state.select(self.selected(cards.len()));
        frame.render_stateful_widget(list, area, &mut state);
    }
}

impl Default for CardList {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::KeyModifiers;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn make_cards(n: i64) -> Vec<Flashcard> {
        (1..=n)
            .map(|id| Flashcard {
                id,
                question: format!("Q{id}"),
                answer: format!("A{id}"),
                topic: None,
            })
            .collect()
    }

    #[test]
    fn empty_list_has_no_selection() {
        let list = CardList::new();
        assert_eq!(list.selected(0), None);
        assert!(list.selected_card(&[]).is_none());
    }

    #[test]
    fn navigation_stays_in_bounds() {
        let cards = make_cards(3);
        let refs: Vec<&Flashcard> = cards.iter().collect();
        let mut list = CardList::new();

        list.handle_key(key(KeyCode::Char('k')), &refs);
        assert_eq!(list.selected(3), Some(0));

        list.handle_key(key(KeyCode::Char('G')), &refs);
        assert_eq!(list.selected_card(&refs).unwrap().id, 3);

        list.handle_key(key(KeyCode::Char('j')), &refs);
        assert_eq!(list.selected(3), Some(2));

        list.handle_key(key(KeyCode::Char('g')), &refs);
        assert_eq!(list.selected(3), Some(0));
    }

    #[test]
    fn selection_clamps_when_list_shrinks() {
        let cards = make_cards(3);
        let refs: Vec<&Flashcard> = cards.iter().collect();
        let mut list = CardList::new();
        list.handle_key(key(KeyCode::Char('G')), &refs);

        list.clamp(1);
        assert_eq!(list.selected(1), Some(0));
        list.clamp(0);
        assert_eq!(list.selected(0), None);
    }

    #[test]
    fn enter_flips_selected_card() {
        let cards = make_cards(2);
        let refs: Vec<&Flashcard> = cards.iter().collect();
        let mut list = CardList::new();
        list.handle_key(key(KeyCode::Enter), &refs);
        assert!(list.is_flipped(1));
        assert!(!list.is_flipped(2));
        list.handle_key(key(KeyCode::Enter), &refs);
        assert!(!list.is_flipped(1));
    }
}
