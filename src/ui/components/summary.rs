use ratatui::buffer::Buffer;
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Paragraph, Widget, Wrap};
use rust_i18n::t;

use crate::app::SessionReport;
use crate::engine::chapters::{ChapterOutcome, UNLOCK_THRESHOLD};
use crate::engine::drill::MissReason;
use crate::ui::components::progress_bar::ProgressBar;
use crate::ui::theme::Theme;
use crate::ui::tr;

pub fn outcome_message(outcome: ChapterOutcome) -> String {
    match outcome {
        ChapterOutcome::KeepPracticing => {
            t!("result.keep_practicing", threshold = UNLOCK_THRESHOLD).to_string()
        }
        ChapterOutcome::SwitchToAction => t!("result.switch_to_action").to_string(),
        ChapterOutcome::NextUnlocked(next) => t!(
            "result.next_unlocked",
            number = next.definition().number,
            name = next.definition().name
        )
        .to_string(),
        ChapterOutcome::AllComplete => t!("result.all_complete").to_string(),
    }
}

/// End-of-session screen: score, accuracy gauge, chapter outcome and the
/// words that were missed.
pub struct SessionSummaryView<'a> {
    report: &'a SessionReport,
    theme: &'a Theme,
}

impl<'a> SessionSummaryView<'a> {
    pub fn new(report: &'a SessionReport, theme: &'a Theme) -> Self {
        Self { report, theme }
    }
}

impl Widget for SessionSummaryView<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let colors = &self.theme.colors;
        let summary = &self.report.summary;

        let title = if summary.out_of_hearts {
            t!("result.title_out_of_hearts")
        } else {
            t!("result.title")
        };
        let block = Block::bordered()
            .title(format!(" {title} "))
            .border_style(Style::default().fg(colors.accent()))
            .style(Style::default().bg(colors.bg()));
        let inner = block.inner(area);
        block.render(area, buf);

        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(5),
                Constraint::Length(3),
                Constraint::Length(3),
                Constraint::Min(0),
            ])
            .split(inner);

        let label_style = Style::default().fg(colors.muted());
        let value_style = Style::default().fg(colors.fg()).add_modifier(Modifier::BOLD);
        let stats_lines = vec![
            Line::from(vec![
                Span::styled(format!("{}: ", t!("result.score")), label_style),
                Span::styled(summary.score.to_string(), value_style),
                Span::raw("    "),
                Span::styled(format!("{}: ", t!("result.correct")), label_style),
                Span::styled(
                    format!("{} / {}", summary.correct, summary.total_words),
                    value_style,
                ),
            ]),
            Line::from(vec![
                Span::styled(format!("{}: ", t!("result.mode")), label_style),
                Span::styled(tr(&format!("mode.{}", summary.mode.as_str())), value_style),
                Span::raw("    "),
                Span::styled(format!("{}: ", t!("result.difficulty")), label_style),
                Span::styled(
                    tr(&format!("difficulty.{}", summary.difficulty.as_str())),
                    value_style,
                ),
            ]),
            Line::from(vec![
                Span::styled(format!("{}: ", t!("result.streak")), label_style),
                Span::styled(
                    t!(
                        "result.streak_value",
                        streak = self.report.streak,
                        best = self.report.best_streak
                    )
                    .to_string(),
                    value_style,
                ),
            ]),
            Line::from(if self.report.update.new_best {
                Span::styled(
                    t!("result.new_best").to_string(),
                    Style::default().fg(colors.success()),
                )
            } else {
                Span::raw("")
            }),
        ];
        Paragraph::new(stats_lines)
            .alignment(Alignment::Center)
            .render(rows[0], buf);

        ProgressBar::new(
            &t!("result.accuracy"),
            summary.accuracy as f64 / 100.0,
            self.theme,
        )
        .render(rows[1], buf);

        let outcome_color = if self.report.outcome.is_pass() {
            colors.success()
        } else {
            colors.warning()
        };
        Paragraph::new(Line::from(Span::styled(
            outcome_message(self.report.outcome),
            Style::default().fg(outcome_color).add_modifier(Modifier::BOLD),
        )))
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true })
        .render(rows[2], buf);

        let mut missed_lines = Vec::new();
        if summary.missed.is_empty() {
            missed_lines.push(Line::from(Span::styled(
                t!("result.no_missed").to_string(),
                Style::default().fg(colors.success()),
            )));
        } else {
            missed_lines.push(Line::from(Span::styled(
                t!("result.missed_title").to_string(),
                Style::default().fg(colors.fg()).add_modifier(Modifier::BOLD),
            )));
            for missed in &summary.missed {
                let reason = match missed.reason {
                    MissReason::Timeout => t!("result.reason_timeout"),
                    MissReason::Incorrect => t!("result.reason_incorrect"),
                };
                missed_lines.push(Line::from(vec![
                    Span::styled(format!("  {}", missed.word), Style::default().fg(colors.error())),
                    Span::styled(
                        format!("  ({})", missed.translation),
                        Style::default().fg(colors.fg()),
                    ),
                    Span::styled(format!("  {reason}"), Style::default().fg(colors.muted())),
                ]));
            }
        }
        Paragraph::new(missed_lines)
            .block(Block::bordered().border_style(Style::default().fg(colors.border())))
            .render(rows[3], buf);
    }
}
