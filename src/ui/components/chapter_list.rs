use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Paragraph, Widget};
use rust_i18n::t;

use crate::engine::chapters::{ChapterBook, ChapterId, ChapterStatus};
use crate::ui::theme::Theme;

/// Status badge plus suffix for one chapter row.
pub fn chapter_badge(book: &ChapterBook, id: ChapterId) -> (&'static str, String) {
    match book.status(id) {
        ChapterStatus::Completed => (
            "✅",
            t!("chapters.best", score = book.progress(id).best_score).to_string(),
        ),
        ChapterStatus::Available => ("🔓", t!("chapters.available").to_string()),
        ChapterStatus::Locked => ("🔒", t!("chapters.locked").to_string()),
    }
}

pub struct ChapterList<'a> {
    book: &'a ChapterBook,
    selected: usize,
    current: ChapterId,
    theme: &'a Theme,
}

impl<'a> ChapterList<'a> {
    pub fn new(book: &'a ChapterBook, selected: usize, current: ChapterId, theme: &'a Theme) -> Self {
        Self {
            book,
            selected,
            current,
            theme,
        }
    }
}

impl Widget for ChapterList<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let colors = &self.theme.colors;

        let block = Block::bordered()
            .title(format!(
                " {} ({}/{}) ",
                t!("chapters.title"),
                self.book.completed_count(),
                ChapterId::all().len()
            ))
            .border_style(Style::default().fg(colors.accent()))
            .style(Style::default().bg(colors.bg()));
        let inner = block.inner(area);
        block.render(area, buf);

        let mut lines = vec![Line::from("")];
        for (i, &id) in ChapterId::all().iter().enumerate() {
            let def = id.definition();
            let (badge, suffix) = chapter_badge(self.book, id);
            let is_selected = i == self.selected;
            let locked = self.book.status(id) == ChapterStatus::Locked;

            let indicator = if is_selected { " > " } else { "   " };
            let current = if id == self.current { " *" } else { "" };
            let mut name_style = Style::default().fg(if locked {
                colors.locked()
            } else if is_selected {
                colors.accent()
            } else {
                colors.fg()
            });
            if is_selected {
                name_style = name_style.add_modifier(Modifier::BOLD);
            }

            lines.push(Line::from(vec![
                Span::styled(indicator.to_string(), Style::default().fg(colors.accent())),
                Span::raw(format!("{badge} ")),
                Span::styled(
                    t!("chapters.name", number = def.number, name = def.name).to_string(),
                    name_style,
                ),
                Span::styled(current.to_string(), Style::default().fg(colors.accent())),
                Span::styled(format!("   {suffix}"), Style::default().fg(colors.muted())),
            ]));
            lines.push(Line::from(""));
        }

        Paragraph::new(lines).render(inner, buf);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::drill::GameMode;

    #[test]
    fn test_badges_follow_progress() {
        let mut book = ChapterBook::new();
        assert_eq!(chapter_badge(&book, ChapterId::CapitalOne).0, "🔓");
        assert_eq!(chapter_badge(&book, ChapterId::CapitalTwo).0, "🔒");

        book.update_progress(ChapterId::CapitalOne, GameMode::Action, 85);
        let (badge, suffix) = chapter_badge(&book, ChapterId::CapitalOne);
        assert_eq!(badge, "✅");
        assert!(suffix.contains("85"));
        assert_eq!(chapter_badge(&book, ChapterId::CapitalTwo).0, "🔓");
    }
}
