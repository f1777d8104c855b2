use ratatui::buffer::Buffer;
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Paragraph, Widget};
use rust_i18n::t;

use crate::engine::listening::{ListeningEngine, ListeningStatus};
use crate::ui::components::progress_bar::ProgressBar;
use crate::ui::theme::Theme;

pub fn status_text(status: &ListeningStatus) -> String {
    match status {
        ListeningStatus::Idle => t!("listening.status_idle").to_string(),
        ListeningStatus::Playing(word) => t!("listening.status_playing", word = word).to_string(),
        ListeningStatus::Waiting => t!("listening.status_waiting").to_string(),
        ListeningStatus::Paused => t!("listening.status_paused").to_string(),
        ListeningStatus::Finished => t!("listening.status_finished").to_string(),
        ListeningStatus::PlaybackFailed(word) => {
            t!("listening.status_failed", word = word).to_string()
        }
    }
}

/// Listening mode: the current word large in the middle, its translation
/// below, status and playlist progress at the bottom.
pub struct ListeningPanel<'a> {
    engine: &'a ListeningEngine,
    theme: &'a Theme,
}

impl<'a> ListeningPanel<'a> {
    pub fn new(engine: &'a ListeningEngine, theme: &'a Theme) -> Self {
        Self { engine, theme }
    }
}

impl Widget for ListeningPanel<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let colors = &self.theme.colors;
        let display = self.engine.display();
        let def = self.engine.chapter().definition();

        let block = Block::bordered()
            .title(format!(
                " {} · {} ",
                t!("listening.title"),
                t!("chapters.name", number = def.number, name = def.name)
            ))
            .border_style(Style::default().fg(colors.accent()))
            .style(Style::default().bg(colors.bg()));
        let inner = block.inner(area);
        block.render(area, buf);

        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Min(4),
                Constraint::Length(1),
                Constraint::Length(1),
                Constraint::Length(3),
            ])
            .split(inner);

        let word_lines = match display.word {
            Some(word) => vec![
                Line::from(""),
                Line::from(Span::styled(
                    word.text.clone(),
                    Style::default()
                        .fg(colors.accent())
                        .add_modifier(Modifier::BOLD),
                )),
                Line::from(Span::styled(
                    word.translation.clone(),
                    Style::default().fg(colors.fg()),
                )),
            ],
            None => vec![
                Line::from(""),
                Line::from(Span::styled(
                    t!("listening.press_play").to_string(),
                    Style::default().fg(colors.muted()),
                )),
            ],
        };
        Paragraph::new(word_lines)
            .alignment(Alignment::Center)
            .render(rows[0], buf);

        let status_color = match self.engine.status() {
            ListeningStatus::PlaybackFailed(_) => colors.error(),
            ListeningStatus::Finished => colors.success(),
            _ => colors.muted(),
        };
        Paragraph::new(Line::from(Span::styled(
            status_text(self.engine.status()),
            Style::default().fg(status_color),
        )))
        .alignment(Alignment::Center)
        .render(rows[1], buf);

        let music = self.engine.music();
        let music_text = if !music.has_tracks() {
            t!("listening.music_none").to_string()
        } else if music.is_enabled() {
            t!("listening.music_on").to_string()
        } else {
            t!("listening.music_off").to_string()
        };
        Paragraph::new(Line::from(Span::styled(
            music_text,
            Style::default().fg(colors.accent_dim()),
        )))
        .alignment(Alignment::Center)
        .render(rows[2], buf);

        ProgressBar::new(&t!("listening.progress"), display.progress, self.theme)
            .with_label(format!("{} / {}", display.position, display.total))
            .render(rows[3], buf);
    }
}
