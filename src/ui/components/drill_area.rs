use ratatui::buffer::Buffer;
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Paragraph, Widget, Wrap};
use rust_i18n::t;

use crate::engine::drill::{GameMode, Phase, STARTING_HEARTS, Session};
use crate::engine::events::{AnswerResult, Instruction};
use crate::engine::timer::LOW_TIME_SECS;
use crate::ui::theme::Theme;
use crate::ui::tr;

const HEART_FULL: &str = "♥";
const HEART_EMPTY: &str = "♡";

pub fn hearts_display(hearts: u32) -> String {
    let full = hearts.min(STARTING_HEARTS) as usize;
    let empty = STARTING_HEARTS as usize - full;
    format!("{}{}", HEART_FULL.repeat(full), HEART_EMPTY.repeat(empty))
}

/// The in-game view: status line, instruction, answer box and feedback.
pub struct DrillArea<'a> {
    session: &'a Session,
    theme: &'a Theme,
}

impl<'a> DrillArea<'a> {
    pub fn new(session: &'a Session, theme: &'a Theme) -> Self {
        Self { session, theme }
    }

    fn status_line(&self) -> Line<'static> {
        let colors = &self.theme.colors;
        let s = self.session;
        let mut spans = Vec::new();

        spans.push(Span::styled(
            hearts_display(s.hearts),
            Style::default().fg(colors.heart()),
        ));
        spans.push(Span::raw("   "));
        spans.push(Span::styled(
            t!(
                "drill.word_counter",
                current = (s.index + 1).min(s.total_words()),
                total = s.total_words()
            )
            .to_string(),
            Style::default().fg(colors.fg()),
        ));
        spans.push(Span::raw("   "));
        spans.push(Span::styled(
            t!("drill.score", score = s.score).to_string(),
            Style::default().fg(colors.accent()),
        ));

        if s.timer_running() {
            let remaining = s.time_remaining();
            let color = if remaining <= LOW_TIME_SECS {
                colors.timer_low()
            } else {
                colors.timer()
            };
            spans.push(Span::raw("   "));
            spans.push(Span::styled(
                t!("drill.timer", secs = remaining).to_string(),
                Style::default().fg(color).add_modifier(Modifier::BOLD),
            ));
        }
        if s.mode == GameMode::Action && s.carry_over > 0 && s.phase == Phase::Reviewing {
            spans.push(Span::raw("   "));
            spans.push(Span::styled(
                t!("drill.carry_over", secs = s.carry_over).to_string(),
                Style::default().fg(colors.success()),
            ));
        }
        Line::from(spans)
    }

    fn instruction_lines(&self) -> Vec<Line<'static>> {
        let colors = &self.theme.colors;
        match self.session.instruction() {
            Some(Instruction::Translate(translation)) => vec![
                Line::from(Span::styled(
                    t!("drill.translate").to_string(),
                    Style::default().fg(colors.muted()),
                )),
                Line::from(Span::styled(
                    translation,
                    Style::default()
                        .fg(colors.accent())
                        .add_modifier(Modifier::BOLD),
                )),
            ],
            Some(Instruction::Listen) => vec![
                Line::from(Span::styled(
                    t!("drill.listen").to_string(),
                    Style::default().fg(colors.muted()),
                )),
                Line::from(Span::styled(
                    t!("drill.replay_hint").to_string(),
                    Style::default().fg(colors.accent_dim()),
                )),
            ],
            None => Vec::new(),
        }
    }

    fn result_line(&self) -> Option<Line<'static>> {
        let colors = &self.theme.colors;
        if self.session.phase != Phase::Reviewing {
            return None;
        }
        let line = match self.session.last_result.as_ref()? {
            AnswerResult::Correct { answer } => Line::from(Span::styled(
                t!("drill.result_correct", answer = answer).to_string(),
                Style::default().fg(colors.success()).add_modifier(Modifier::BOLD),
            )),
            AnswerResult::Incorrect { typed, expected } => Line::from(vec![
                Span::styled(
                    t!("drill.result_incorrect", typed = typed).to_string(),
                    Style::default().fg(colors.error()),
                ),
                Span::raw("  "),
                Span::styled(
                    t!("drill.result_expected", expected = expected).to_string(),
                    Style::default().fg(colors.fg()),
                ),
            ]),
            AnswerResult::TimedOut { expected } => Line::from(vec![
                Span::styled(
                    t!("drill.result_timeout").to_string(),
                    Style::default().fg(colors.warning()),
                ),
                Span::raw("  "),
                Span::styled(
                    t!("drill.result_expected", expected = expected).to_string(),
                    Style::default().fg(colors.fg()),
                ),
            ]),
        };
        Some(line)
    }
}

impl Widget for DrillArea<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let colors = &self.theme.colors;

        let block = Block::bordered()
            .title(format!(
                " {} · {} ",
                tr(&format!("mode.{}", self.session.mode.as_str())),
                tr(&format!("difficulty.{}", self.session.difficulty.as_str()))
            ))
            .border_style(Style::default().fg(colors.border_focused()))
            .style(Style::default().bg(colors.bg()));
        let inner = block.inner(area);
        block.render(area, buf);

        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(1),
                Constraint::Length(1),
                Constraint::Length(3),
                Constraint::Length(3),
                Constraint::Length(2),
                Constraint::Min(0),
            ])
            .split(inner);

        Paragraph::new(self.status_line())
            .alignment(Alignment::Center)
            .render(rows[0], buf);

        Paragraph::new(self.instruction_lines())
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: true })
            .render(rows[2], buf);

        let answering = self.session.phase == Phase::Answering;
        let input_block = Block::bordered()
            .title(format!(" {} ", t!("drill.answer")))
            .border_style(Style::default().fg(if answering {
                colors.accent()
            } else {
                colors.border()
            }))
            .style(Style::default().bg(colors.input_bg()));
        let input_area = centered_width(rows[3], 40);
        let mut input = vec![Span::styled(
            self.session.input.clone(),
            Style::default().fg(colors.fg()),
        )];
        if answering {
            input.push(Span::styled(
                "█",
                Style::default().fg(colors.accent()),
            ));
        }
        Paragraph::new(Line::from(input))
            .block(input_block)
            .render(input_area, buf);

        if let Some(line) = self.result_line() {
            Paragraph::new(line)
                .alignment(Alignment::Center)
                .render(rows[4], buf);
        }
    }
}

fn centered_width(area: Rect, width: u16) -> Rect {
    let w = width.min(area.width);
    Rect::new(area.x + (area.width - w) / 2, area.y, w, area.height)
}
