use ratatui::buffer::Buffer;
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Paragraph, Widget};
use rust_i18n::t;

use crate::ui::theme::Theme;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MenuAction {
    StartDrill,
    Listening,
    Chapters,
    Settings,
    Quit,
}

/// Labels are locale keys so a language switch shows up on the next frame.
pub struct MenuItem {
    pub key: char,
    pub label_key: &'static str,
    pub description_key: &'static str,
    pub action: MenuAction,
}

pub struct Menu<'a> {
    pub items: Vec<MenuItem>,
    pub selected: usize,
    pub theme: &'a Theme,
}

impl<'a> Menu<'a> {
    pub fn new(theme: &'a Theme) -> Self {
        Self {
            items: vec![
                MenuItem {
                    key: '1',
                    label_key: "menu.start",
                    description_key: "menu.start_desc",
                    action: MenuAction::StartDrill,
                },
                MenuItem {
                    key: '2',
                    label_key: "menu.listening",
                    description_key: "menu.listening_desc",
                    action: MenuAction::Listening,
                },
                MenuItem {
                    key: 'c',
                    label_key: "menu.chapters",
                    description_key: "menu.chapters_desc",
                    action: MenuAction::Chapters,
                },
                MenuItem {
                    key: 's',
                    label_key: "menu.settings",
                    description_key: "menu.settings_desc",
                    action: MenuAction::Settings,
                },
                MenuItem {
                    key: 'q',
                    label_key: "menu.quit",
                    description_key: "menu.quit_desc",
                    action: MenuAction::Quit,
                },
            ],
            selected: 0,
            theme,
        }
    }

    pub fn next(&mut self) {
        self.selected = (self.selected + 1) % self.items.len();
    }

    pub fn prev(&mut self) {
        if self.selected > 0 {
            self.selected -= 1;
        } else {
            self.selected = self.items.len() - 1;
        }
    }

    pub fn selected_action(&self) -> MenuAction {
        self.items
            .get(self.selected)
            .map(|item| item.action)
            .unwrap_or(MenuAction::StartDrill)
    }

    pub fn action_for_key(&self, key: char) -> Option<MenuAction> {
        self.items
            .iter()
            .find(|item| item.key == key)
            .map(|item| item.action)
    }
}

impl Widget for &Menu<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let colors = &self.theme.colors;

        let block = Block::bordered()
            .border_style(Style::default().fg(colors.border()))
            .style(Style::default().bg(colors.bg()));
        let inner = block.inner(area);
        block.render(area, buf);

        let layout = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(5),
                Constraint::Length(1),
                Constraint::Min(0),
            ])
            .split(inner);

        let title_lines = vec![
            Line::from(""),
            Line::from(Span::styled(
                t!("app.name").to_string(),
                Style::default()
                    .fg(colors.accent())
                    .add_modifier(Modifier::BOLD),
            )),
            Line::from(Span::styled(
                t!("app.tagline").to_string(),
                Style::default().fg(colors.fg()),
            )),
            Line::from(""),
        ];

        let title = Paragraph::new(title_lines).alignment(Alignment::Center);
        title.render(layout[0], buf);

        let menu_layout = Layout::default()
            .direction(Direction::Vertical)
            .constraints(
                self.items
                    .iter()
                    .map(|_| Constraint::Length(3))
                    .collect::<Vec<_>>(),
            )
            .split(layout[2]);

        for (i, item) in self.items.iter().enumerate() {
            let is_selected = i == self.selected;
            let indicator = if is_selected { ">" } else { " " };

            let label_text = format!(" {indicator} [{}] {}", item.key, t!(item.label_key));
            let desc_text = format!("     {}", t!(item.description_key));

            let label_style = if is_selected {
                Style::default()
                    .fg(colors.accent())
                    .add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(colors.fg())
            };
            let lines = vec![
                Line::from(Span::styled(label_text, label_style)),
                Line::from(Span::styled(desc_text, Style::default().fg(colors.muted()))),
            ];

            if let Some(&slot) = menu_layout.get(i) {
                Paragraph::new(lines).render(slot, buf);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_menu_wraps_both_ways() {
        let theme = Theme::default();
        let mut menu = Menu::new(&theme);
        menu.prev();
        assert_eq!(menu.selected_action(), MenuAction::Quit);
        menu.next();
        assert_eq!(menu.selected_action(), MenuAction::StartDrill);
    }

    #[test]
    fn test_shortcut_keys() {
        let theme = Theme::default();
        let menu = Menu::new(&theme);
        assert_eq!(menu.action_for_key('2'), Some(MenuAction::Listening));
        assert_eq!(menu.action_for_key('x'), None);
    }
}
