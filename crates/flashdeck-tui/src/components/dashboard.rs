//! Study analytics view. All figures are demo data until the store records
//! review history.

use ratatui::prelude::*;
use ratatui::symbols;
use ratatui::widgets::{
    Axis, Bar, BarChart, BarGroup, Block, Borders, Chart, Dataset, GraphType, List, ListItem,
    Paragraph, Sparkline,
};

pub const KPIS: [(&str, &str); 4] = [
    ("Active Days", "6 / 7"),
    ("Streak", "4 days"),
    ("Reviews/Day", "41 avg"),
    ("Accuracy", "86%"),
];

/// (day, reviews, minutes)
pub const STUDY_VOLUME: [(&str, u64, u64); 7] = [
    ("Mon", 24, 18),
    ("Tue", 35, 22),
    ("Wed", 18, 12),
    ("Thu", 42, 28),
    ("Fri", 30, 20),
    ("Sat", 55, 36),
    ("Sun", 40, 25),
];

/// (deck, easy %, good %, hard %)
pub const RECALL_ACCURACY: [(&str, u64, u64, u64); 3] = [
    ("Python", 62, 28, 10),
    ("JS", 58, 30, 12),
    ("Math", 70, 22, 8),
];

/// Average interval growth per day, in hundredths (1.20 -> 120).
pub const SRS_INTERVALS: [u64; 7] = [120, 140, 135, 160, 155, 170, 165];

/// (days since last review, recall %)
pub const RETENTION_CURVE: [(f64, f64); 7] = [
    (1.0, 92.0),
    (2.0, 88.0),
    (3.0, 81.0),
    (5.0, 72.0),
    (8.0, 63.0),
    (13.0, 51.0),
    (21.0, 42.0),
];

/// (factor, score out of 100)
pub const DIFFICULTY: [(&str, u64); 5] = [
    ("Miss Rate", 65),
    ("Time to Answer", 40),
    ("Requeue Freq", 55),
    ("Confusion", 45),
    ("Hints Used", 30),
];

pub const ALERTS: [&str; 3] = [
    "Longest streak: 4 days",
    "Fastest improvement: Python deck (+12% this week)",
    "Overdue risk: 18 cards due tomorrow",
];

#[derive(Debug, Default, Clone, Copy)]
pub struct Dashboard;

impl Dashboard {
    pub fn render(&self, frame: &mut Frame, area: Rect) {
        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3),
                Constraint::Percentage(45),
                Constraint::Min(8),
                Constraint::Length(5),
            ])
            .split(area);

        self.render_kpis(frame, rows[0]);

        let charts = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
            .split(rows[1]);
        self.render_study_volume(frame, charts[0]);
        self.render_recall_accuracy(frame, charts[1]);

        let lower = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([
                Constraint::Percentage(30),
                Constraint::Percentage(40),
                Constraint::Percentage(30),
            ])
            .split(rows[2]);
        self.render_srs_health(frame, lower[0]);
        self.render_retention(frame, lower[1]);
        self.render_difficulty(frame, lower[2]);

        self.render_alerts(frame, rows[3]);
    }

    fn render_kpis(&self, frame: &mut Frame, area: Rect) {
        let cells = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Ratio(1, 4); 4])
            .split(area);
        for ((label, value), cell) in KPIS.iter().zip(cells.iter()) {
            let line = Line::from(vec![
                Span::styled(format!("{label}: "), Style::default().fg(Color::DarkGray)),
                Span::styled(*value, Style::default().fg(Color::Yellow).bold()),
            ]);
            let paragraph = Paragraph::new(line)
                .alignment(Alignment::Center)
                .block(Block::default().borders(Borders::ALL));
            frame.render_widget(paragraph, *cell);
        }
    }

    fn render_study_volume(&self, frame: &mut Frame, area: Rect) {
        let groups: Vec<BarGroup> = STUDY_VOLUME
            .iter()
            .map(|(day, reviews, minutes)| {
                BarGroup::default().label(Line::from(*day)).bars(&[
                    Bar::default()
                        .value(*reviews)
                        .style(Style::default().fg(Color::LightYellow)),
                    Bar::default()
                        .value(*minutes)
                        .style(Style::default().fg(Color::LightRed)),
                ])
            })
            .collect();

        let mut chart = BarChart::default()
            .block(
                Block::default()
                    .title(" Study Volume (reviews / minutes) ")
                    .borders(Borders::ALL),
            )
            .bar_width(2)
            .bar_gap(0)
            .group_gap(2);
        for group in groups {
            chart = chart.data(group);
        }
        frame.render_widget(chart, area);
    }

    fn render_recall_accuracy(&self, frame: &mut Frame, area: Rect) {
        let mut chart = BarChart::default()
            .block(
                Block::default()
                    .title(" Recall Accuracy by Deck (easy / good / hard) ")
                    .borders(Borders::ALL),
            )
            .bar_width(3)
            .bar_gap(0)
            .group_gap(3)
            .max(100);
        for (deck, easy, good, hard) in RECALL_ACCURACY {
            chart = chart.data(BarGroup::default().label(Line::from(deck)).bars(&[
                Bar::default().value(easy).style(Style::default().fg(Color::Green)),
                Bar::default().value(good).style(Style::default().fg(Color::Blue)),
                Bar::default().value(hard).style(Style::default().fg(Color::Red)),
            ]));
        }
        frame.render_widget(chart, area);
    }

    fn render_srs_health(&self, frame: &mut Frame, area: Rect) {
        let sparkline = Sparkline::default()
            .block(
                Block::default()
                    .title(" SRS Health (avg interval growth) ")
                    .borders(Borders::ALL),
            )
            .data(&SRS_INTERVALS[..])
            .style(Style::default().fg(Color::LightYellow));
        frame.render_widget(sparkline, area);
    }

    fn render_retention(&self, frame: &mut Frame, area: Rect) {
        let dataset = Dataset::default()
            .name("recall %")
            .marker(symbols::Marker::Braille)
            .graph_type(GraphType::Line)
            .style(Style::default().fg(Color::Magenta))
            .data(&RETENTION_CURVE);

        let chart = Chart::new(vec![dataset])
            .block(
                Block::default()
                    .title(" Retention Curve (days since last review) ")
                    .borders(Borders::ALL),
            )
            .x_axis(
                Axis::default()
                    .bounds([0.0, 21.0])
                    .labels(vec![Span::raw("0"), Span::raw("10"), Span::raw("21")]),
            )
            .y_axis(
                Axis::default()
                    .bounds([0.0, 100.0])
                    .labels(vec![Span::raw("0"), Span::raw("50"), Span::raw("100")]),
            );
        frame.render_widget(chart, area);
    }

    fn render_difficulty(&self, frame: &mut Frame, area: Rect) {
        let bars: Vec<Bar> = DIFFICULTY
            .iter()
            .map(|(factor, score)| {
                Bar::default()
                    .label(Line::from(*factor))
                    .value(*score)
                    .style(Style::default().fg(Color::LightMagenta))
            })
            .collect();

        let chart = BarChart::default()
            .block(
                Block::default()
                    .title(" Difficulty Profile ")
                    .borders(Borders::ALL),
            )
            .direction(Direction::Horizontal)
            .bar_width(1)
            .bar_gap(0)
            .max(100)
            .data(BarGroup::default().bars(&bars));
        frame.render_widget(chart, area);
    }

    fn render_alerts(&self, frame: &mut Frame, area: Rect) {
        let items: Vec<ListItem> = ALERTS
            .iter()
            .map(|alert| ListItem::new(format!("• {alert}")))
            .collect();
        let list = List::new(items).block(
            Block::default()
                .title(" Personal Bests & Alerts ")
                .borders(Borders::ALL),
        );
        frame.render_widget(list, area);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ratatui::backend::TestBackend;

    #[test]
    fn recall_rows_sum_to_100() {
        for (deck, easy, good, hard) in RECALL_ACCURACY {
            assert_eq!(easy + good + hard, 100, "{deck}");
        }
    }

    #[test]
    fn retention_is_monotonic() {
        for pair in RETENTION_CURVE.windows(2) {
            assert!(pair[0].0 < pair[1].0);
            assert!(pair[0].1 > pair[1].1);
        }
    }

    #[test]
    fn difficulty_scores_are_percentages() {
        for (factor, score) in DIFFICULTY {
            assert!(score <= 100, "{factor}");
        }
    }

    #[test]
    fn difficulty_panel_is_drawn() {
        let mut terminal = Terminal::new(TestBackend::new(160, 50)).unwrap();
        terminal
            .draw(|frame| {
                let area = frame.area();
                Dashboard.render(frame, area);
            })
            .unwrap();
        let text: String = terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|cell| cell.symbol())
            .collect();
        assert!(text.contains("Difficulty Profile"));
    }

    #[test]
    fn renders_into_small_and_large_terminals() {
        for (w, h) in [(40, 12), (160, 50)] {
            let mut terminal = Terminal::new(TestBackend::new(w, h)).unwrap();
            terminal
                .draw(|frame| {
                    let area = frame.area();
                    Dashboard.render(frame, area);
                })
                .unwrap();
        }
    }
}
