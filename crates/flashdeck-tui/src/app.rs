use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent};
use flashdeck_core::flashcard::{Flashcard, DEFAULT_TOPIC};
use flashdeck_service::HttpService;
use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Clear, List, ListItem, Paragraph, Wrap};
use tokio::runtime::Runtime;

use crate::components::card_list::CardList;
use crate::components::dashboard::Dashboard;
use crate::controller::{FlashcardController, Outcome, ViewState};
use crate::test_mode::TestSession;

/// What the app is currently doing
#[derive(Debug, Clone)]
pub enum Mode {
    /// Browsing the card list
    Normal,
    /// Filling in the new-card form
    NewCard {
        question: String,
        answer: String,
        topic: String,
        field: CardField,
    },
    /// Typing a topic for AI generation
    Generate { input: String },
    /// Confirm delete card
    ConfirmDelete { card: Flashcard },
    /// Sequential review of the visible cards
    Test,
    /// Static analytics view
    Dashboard,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CardField {
    Question,
    Answer,
    Topic,
}

impl CardField {
    fn next(self) -> Self {
        match self {
            CardField::Question => CardField::Answer,
            CardField::Answer => CardField::Topic,
            CardField::Topic => CardField::Question,
        }
    }

    fn prev(self) -> Self {
        match self {
            CardField::Question => CardField::Topic,
            CardField::Answer => CardField::Question,
            CardField::Topic => CardField::Answer,
        }
    }
}

pub struct App {
    runtime: Runtime,
    controller: FlashcardController<HttpService>,
    list: CardList,
    mode: Mode,
    status_message: Option<String>,
    /// Topic prefilled into the next new-card form.
    last_topic: String,
    /// Set by handle_key when the user submits a topic for generation.
    /// The event loop draws once (so the busy banner shows) and then calls
    /// [`App::process_generate_request`].
    pub generate_request: Option<String>,
}

impl App {
    pub fn new(service: HttpService) -> Result<Self> {
        let runtime = Runtime::new()?;
        let mut controller = FlashcardController::new(service);
        runtime.block_on(controller.load());

        Ok(Self {
            runtime,
            controller,
            list: CardList::new(),
            mode: Mode::Normal,
            status_message: None,
            last_topic: DEFAULT_TOPIC.to_string(),
            generate_request: None,
        })
    }

    pub fn mode(&self) -> &Mode {
        &self.mode
    }

    pub fn state(&self) -> &ViewState {
        self.controller.state()
    }

    pub fn status_message(&self) -> Option<&str> {
        self.status_message.as_deref()
    }

    /// Card under the list cursor, if any card is visible.
    pub fn selected_card(&self) -> Option<&Flashcard> {
        let visible = self.state().visible_cards();
        self.list.selected_card(&visible)
    }

    pub fn is_input_mode(&self) -> bool {
        matches!(self.mode, Mode::NewCard { .. } | Mode::Generate { .. })
    }

    fn refresh(&mut self) {
        self.runtime.block_on(self.controller.load());
        self.clamp_cursor();
    }

    fn clamp_cursor(&mut self) {
        let len = self.state().visible_cards().len();
        self.list.clamp(len);
    }

    /// Run a queued generation. Called by the event loop after the busy frame is drawn.
    pub fn process_generate_request(&mut self) {
        let Some(topic) = self.generate_request.take() else {
            return;
        };
        let before = self.state().cards().len();
        let outcome = self.runtime.block_on(self.controller.generate_batch(&topic));
        let added = self.state().cards().len() - before;
        self.clamp_cursor();

        match outcome {
            Outcome::Applied => {
                self.status_message = Some(format!("Generated {added} cards for {topic}"));
                self.mode = Mode::Normal;
            }
            Outcome::Failed if added > 0 => {
                self.status_message = Some(format!("Stored {added} cards before failure"));
            }
            Outcome::Failed | Outcome::Rejected => {}
        }
    }

    pub fn handle_key(&mut self, key: KeyEvent) {
        self.status_message = None;

        match &self.mode.clone() {
            Mode::Normal => self.handle_normal(key),
            Mode::NewCard {
                question,
                answer,
                topic,
                field,
            } => self.handle_new_card(key, question.clone(), answer.clone(), topic.clone(), *field),
            Mode::Generate { input } => self.handle_generate(key, input.clone()),
            Mode::ConfirmDelete { card } => self.handle_confirm_delete(key, card.clone()),
            Mode::Test => self.handle_test(key),
            Mode::Dashboard => {
                if matches!(key.code, KeyCode::Esc | KeyCode::Char('b')) {
                    self.mode = Mode::Normal;
                }
            }
        }
    }

    fn handle_normal(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char('n') => {
                self.mode = Mode::NewCard {
                    question: String::new(),
                    answer: String::new(),
                    topic: self.last_topic.clone(),
                    field: CardField::Question,
                };
            }
            KeyCode::Char('a') => {
                self.mode = Mode::Generate {
                    input: String::new(),
                };
            }
            KeyCode::Char('d') => {
                if let Some(card) = self.selected_card().cloned() {
                    self.mode = Mode::ConfirmDelete { card };
                }
            }
            KeyCode::Char('t') => {
                if self.controller.start_test() {
                    self.mode = Mode::Test;
                } else {
                    self.status_message = Some("No cards to test".into());
                }
            }
            KeyCode::Char('D') => self.mode = Mode::Dashboard,
            KeyCode::Char('r') => self.refresh(),
            KeyCode::Char('x') => self.controller.dismiss_error(),
            KeyCode::Tab | KeyCode::Char(']') => {
                self.controller.cycle_filter(true);
                self.clamp_cursor();
            }
            KeyCode::BackTab | KeyCode::Char('[') => {
                self.controller.cycle_filter(false);
                self.clamp_cursor();
            }
            _ => {
                let visible = self.controller.state().visible_cards();
                self.list.handle_key(key, &visible);
            }
        }
    }

    fn handle_new_card(
        &mut self,
        key: KeyEvent,
        mut question: String,
        mut answer: String,
        mut topic: String,
        field: CardField,
    ) {
        match key.code {
            KeyCode::Tab | KeyCode::Down => {
                self.mode = Mode::NewCard {
                    question,
                    answer,
                    topic,
                    field: field.next(),
                };
            }
            KeyCode::BackTab | KeyCode::Up => {
                self.mode = Mode::NewCard {
                    question,
                    answer,
                    topic,
                    field: field.prev(),
                };
            }
            KeyCode::Enter => {
                let outcome = self
                    .runtime
                    .block_on(self.controller.create(&question, &answer, &topic));
                match outcome {
                    Outcome::Applied => {
                        self.last_topic = topic;
                        self.clamp_cursor();
                        self.status_message = Some("Card added".into());
                        self.mode = Mode::Normal;
                    }
                    // Blank fields or a failed create keep the form as typed.
                    Outcome::Rejected | Outcome::Failed => {
                        self.mode = Mode::NewCard {
                            question,
                            answer,
                            topic,
                            field,
                        };
                    }
                }
            }
            KeyCode::Esc => self.mode = Mode::Normal,
            KeyCode::Backspace => {
                match field {
                    CardField::Question => question.pop(),
                    CardField::Answer => answer.pop(),
                    CardField::Topic => topic.pop(),
                };
                self.mode = Mode::NewCard {
                    question,
                    answer,
                    topic,
                    field,
                };
            }
            KeyCode::Char(c) => {
                match field {
                    CardField::Question => question.push(c),
                    CardField::Answer => answer.push(c),
                    CardField::Topic => topic.push(c),
                }
                self.mode = Mode::NewCard {
                    question,
                    answer,
                    topic,
                    field,
                };
            }
            _ => {}
        }
    }

    fn handle_generate(&mut self, key: KeyEvent, mut input: String) {
        if self.generate_request.is_some() {
            return;
        }
        match key.code {
            KeyCode::Enter => {
                if !input.trim().is_empty() {
                    self.generate_request = Some(input.clone());
                }
                self.mode = Mode::Generate { input };
            }
            KeyCode::Esc => self.mode = Mode::Normal,
            KeyCode::Backspace => {
                input.pop();
                self.mode = Mode::Generate { input };
            }
            KeyCode::Char(c) => {
                input.push(c);
                self.mode = Mode::Generate { input };
            }
            _ => {}
        }
    }

    fn handle_confirm_delete(&mut self, key: KeyEvent, card: Flashcard) {
        if matches!(key.code, KeyCode::Char('y') | KeyCode::Char('Y')) {
            if self.runtime.block_on(self.controller.delete(card.id)) == Outcome::Applied {
                self.status_message = Some("Card deleted".into());
            }
            self.clamp_cursor();
        }
        self.mode = Mode::Normal;
    }

    fn handle_test(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Right | KeyCode::Char('l') | KeyCode::Char('j') => {
                self.controller.next_card()
            }
            KeyCode::Left | KeyCode::Char('h') | KeyCode::Char('k') => {
                self.controller.prev_card()
            }
            KeyCode::Enter | KeyCode::Char(' ') => self.controller.toggle_reveal(),
            KeyCode::Esc => {
                self.controller.exit_test();
                self.mode = Mode::Normal;
            }
            _ => {}
        }
    }

    // ---- Rendering ----

    pub fn render(&self, frame: &mut Frame) {
        let area = frame.area();

        let layout = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(1),
                Constraint::Min(0),
                Constraint::Length(1),
            ])
            .split(area);

        self.render_title_bar(frame, layout[0]);
        match &self.mode {
            Mode::Test => self.render_test(frame, layout[1]),
            Mode::Dashboard => Dashboard.render(frame, layout[1]),
            _ => self.render_browser(frame, layout[1]),
        }
        self.render_status_bar(frame, layout[2]);

        // Overlays
        match &self.mode {
            Mode::NewCard {
                question,
                answer,
                topic,
                field,
            } => self.render_new_card(frame, question, answer, topic, *field, area),
            Mode::Generate { input } => {
                let label = if self.generate_request.is_some() || self.state().is_busy() {
                    "Generating... "
                } else {
                    "Generate cards about: "
                };
                self.render_input_bar(frame, label, input, area)
            }
            Mode::ConfirmDelete { card } => self.render_confirm_delete_dialog(frame, card, area),
            Mode::Normal | Mode::Test | Mode::Dashboard => {}
        }
    }

    fn render_title_bar(&self, frame: &mut Frame, area: Rect) {
        let state = self.state();
        let title = Line::from(vec![
            Span::styled(" flashdeck ", Style::default().bold().fg(Color::Cyan)),
            Span::raw("| "),
            Span::styled(
                format!("Topic: {}", state.active_filter()),
                Style::default().fg(Color::Yellow),
            ),
            Span::styled(
                format!(" ({} cards)", state.cards().len()),
                Style::default().fg(Color::DarkGray),
            ),
        ]);
        frame.render_widget(title, area);
    }

    fn render_browser(&self, frame: &mut Frame, area: Rect) {
        let state = self.state();
        let (body, error_area) = match state.error() {
            Some(_) => {
                let split = Layout::default()
                    .direction(Direction::Vertical)
                    .constraints([Constraint::Length(1), Constraint::Min(0)])
                    .split(area);
                (split[1], Some(split[0]))
            }
            None => (area, None),
        };

        if let (Some(message), Some(error_area)) = (state.error(), error_area) {
            let line = Line::from(vec![
                Span::styled(format!(" {message} "), Style::default().fg(Color::White).bg(Color::Red)),
                Span::styled("  (x to dismiss)", Style::default().fg(Color::DarkGray)),
            ]);
            frame.render_widget(line, error_area);
        }

        let columns = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(72), Constraint::Percentage(28)])
            .split(body);

        let visible = state.visible_cards();
        self.list
            .render(frame, columns[0], &visible, state.active_filter());
        self.render_topics(frame, columns[1]);
    }

    fn render_topics(&self, frame: &mut Frame, area: Rect) {
        let state = self.state();
        let items: Vec<ListItem> = state
            .topics()
            .iter()
            .map(|topic| {
                if topic == state.active_filter() {
                    ListItem::new(Line::from(vec![
                        Span::raw("* "),
                        Span::styled(topic, Style::default().fg(Color::Yellow).bold()),
                    ]))
                } else {
                    ListItem::new(format!("  {topic}"))
                }
            })
            .collect();

        let list = List::new(items).block(
            Block::default()
                .title(" Topics ")
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Magenta)),
        );
        frame.render_widget(list, area);
    }

    fn render_test(&self, frame: &mut Frame, area: Rect) {
        let Some(session) = self.state().test_session() else {
            return;
        };
        let popup = centered_rect(70, 60, area);
        let card = session.current();

        let block = Block::default()
            .title(format!(
                " Card {} of {} [{}] ",
                session.position(),
                session.len(),
                card.topic_label()
            ))
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Cyan));

        let mut lines = vec![
            Line::from(Span::styled(&card.question, Style::default().bold())),
            Line::from(""),
        ];
        if session.is_revealed() {
            lines.push(Line::from(Span::styled(
                &card.answer,
                Style::default().fg(Color::Green),
            )));
        } else {
            lines.push(Line::from(Span::styled(
                "(Enter to show answer)",
                Style::default().fg(Color::DarkGray),
            )));
        }
        lines.push(Line::from(""));
        lines.push(Line::from(test_nav_hint(session)));

        let paragraph = Paragraph::new(lines)
            .block(block)
            .wrap(Wrap { trim: false })
            .alignment(Alignment::Center);
        frame.render_widget(paragraph, popup);
    }

    fn render_status_bar(&self, frame: &mut Frame, area: Rect) {
        if let Some(ref msg) = self.status_message {
            let line = Line::from(Span::styled(
                format!(" {msg}"),
                Style::default().fg(Color::Green),
            ));
            frame.render_widget(line, area);
            return;
        }

        let hints = match &self.mode {
            Mode::Normal => vec![
                ("q", "quit"),
                ("j/k", "nav"),
                ("Enter", "flip"),
                ("Tab", "topic"),
                ("n", "new"),
                ("a", "generate"),
                ("d", "del"),
                ("t", "test"),
                ("D", "dashboard"),
                ("r", "reload"),
            ],
            Mode::NewCard { .. } => vec![("Tab", "field"), ("Enter", "add"), ("Esc", "cancel")],
            Mode::Generate { .. } => vec![("Enter", "generate"), ("Esc", "cancel")],
            Mode::ConfirmDelete { .. } => vec![("y", "confirm"), ("any", "cancel")],
            Mode::Test => vec![
                ("h/l", "prev/next"),
                ("Enter", "show/hide"),
                ("Esc", "exit test"),
            ],
            Mode::Dashboard => vec![("Esc", "back"), ("q", "quit")],
        };

        let spans: Vec<Span> = hints
            .into_iter()
            .flat_map(|(key, desc)| {
                vec![
                    Span::styled(
                        format!(" {key}"),
                        Style::default().fg(Color::Yellow).bold(),
                    ),
                    Span::raw(format!(" {desc} ")),
                ]
            })
            .collect();

        frame.render_widget(Line::from(spans), area);
    }

    fn render_input_bar(&self, frame: &mut Frame, label: &str, input: &str, area: Rect) {
        let input_area = Rect {
            x: area.x,
            y: area.y + area.height.saturating_sub(3),
            width: area.width,
            height: 3.min(area.height),
        };
        frame.render_widget(Clear, input_area);
        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Cyan));
        let line = Line::from(vec![
            Span::styled(label, Style::default().fg(Color::Cyan).bold()),
            Span::raw(input),
            Span::styled("_", Style::default().fg(Color::DarkGray)),
        ]);
        frame.render_widget(Paragraph::new(line).block(block), input_area);
    }

    fn render_new_card(
        &self,
        frame: &mut Frame,
        question: &str,
        answer: &str,
        topic: &str,
        field: CardField,
        area: Rect,
    ) {
        let popup = centered_rect(60, 40, area);
        frame.render_widget(Clear, popup);

        let block = Block::default()
            .title(" New Flashcard ")
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Magenta));

        let inner = block.inner(popup);
        frame.render_widget(block, popup);

        let label_style = |f: CardField| {
            if f == field {
                Style::default().fg(Color::Cyan).bold()
            } else {
                Style::default()
            }
        };

        let lines = vec![
            Line::from(vec![
                Span::styled("Question: ", label_style(CardField::Question)),
                Span::raw(question),
            ]),
            Line::from(""),
            Line::from(vec![
                Span::styled("Answer:   ", label_style(CardField::Answer)),
                Span::raw(answer),
            ]),
            Line::from(""),
            Line::from(vec![
                Span::styled("Topic:    ", label_style(CardField::Topic)),
                Span::raw(topic),
            ]),
        ];

        frame.render_widget(Paragraph::new(lines).wrap(Wrap { trim: false }), inner);
    }

    fn render_confirm_delete_dialog(&self, frame: &mut Frame, card: &Flashcard, area: Rect) {
        let popup = centered_rect(50, 20, area);
        frame.render_widget(Clear, popup);

        let block = Block::default()
            .title(" Confirm Delete ")
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Red));

        let text = format!("Delete \"{}\"?\n\n(y)es / (any key) cancel", card.question);
        let paragraph = Paragraph::new(text)
            .block(block)
            .wrap(Wrap { trim: false })
            .alignment(Alignment::Center);
        frame.render_widget(paragraph, popup);
    }
}

fn test_nav_hint(session: &TestSession) -> Vec<Span<'static>> {
    let dim = Style::default().fg(Color::DarkGray);
    let active = Style::default().fg(Color::Yellow);
    vec![
        Span::styled("< Prev", if session.is_first() { dim } else { active }),
        Span::raw("   "),
        Span::styled("Next >", if session.is_last() { dim } else { active }),
    ]
}

fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(area);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}
