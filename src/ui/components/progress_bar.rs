use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::Style;
use ratatui::widgets::{Block, Widget};

use crate::ui::theme::Theme;

/// One-row gauge inside a titled border. The centred label defaults to a
/// percentage; `with_label` replaces it (e.g. "4 / 18").
pub struct ProgressBar<'a> {
    pub title: String,
    pub ratio: f64,
    pub label: Option<String>,
    pub theme: &'a Theme,
}

impl<'a> ProgressBar<'a> {
    pub fn new(title: &str, ratio: f64, theme: &'a Theme) -> Self {
        Self {
            title: title.to_string(),
            ratio: ratio.clamp(0.0, 1.0),
            label: None,
            theme,
        }
    }

    pub fn with_label(mut self, label: String) -> Self {
        self.label = Some(label);
        self
    }
}

impl Widget for ProgressBar<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let colors = &self.theme.colors;

        let block = Block::bordered()
            .title(format!(" {} ", self.title))
            .border_style(Style::default().fg(colors.border()));
        let inner = block.inner(area);
        block.render(area, buf);

        if inner.width == 0 || inner.height == 0 {
            return;
        }

        let filled_width = (self.ratio * inner.width as f64) as u16;
        let label = self
            .label
            .unwrap_or_else(|| format!("{:.0}%", self.ratio * 100.0));

        for x in inner.x..inner.x + inner.width {
            let style = if x < inner.x + filled_width {
                Style::default().fg(colors.bg()).bg(colors.bar_filled())
            } else {
                Style::default().fg(colors.fg()).bg(colors.bar_empty())
            };
            buf[(x, inner.y)].set_style(style);
        }

        let label_width = label.chars().count() as u16;
        let label_x = inner.x + (inner.width.saturating_sub(label_width)) / 2;
        buf.set_string(label_x, inner.y, &label, Style::default().fg(colors.fg()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ratio_is_clamped() {
        let theme = Theme::default();
        assert_eq!(ProgressBar::new("x", 1.7, &theme).ratio, 1.0);
        assert_eq!(ProgressBar::new("x", -0.2, &theme).ratio, 0.0);
    }

    #[test]
    fn test_renders_custom_label() {
        let theme = Theme::default();
        let area = Rect::new(0, 0, 20, 3);
        let mut buf = Buffer::empty(area);
        ProgressBar::new("words", 0.5, &theme)
            .with_label("4 / 8".to_string())
            .render(area, &mut buf);
        let row: String = (0..20).map(|x| buf[(x, 1)].symbol().to_string()).collect();
        assert!(row.contains("4 / 8"));
    }
}
