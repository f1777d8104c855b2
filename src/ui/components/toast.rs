use ratatui::buffer::Buffer;
use ratatui::layout::{Alignment, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Clear, Paragraph, Widget};

use crate::app::Toast;
use crate::ui::theme::Theme;
use crate::ui::tr;

pub struct ToastView<'a> {
    toast: &'a Toast,
    theme: &'a Theme,
}

impl<'a> ToastView<'a> {
    pub fn new(toast: &'a Toast, theme: &'a Theme) -> Self {
        Self { toast, theme }
    }

    /// Top-right corner of `area`, sized to the message.
    pub fn area(&self, area: Rect) -> Rect {
        let text_width = tr(self.toast.notice.key()).chars().count() as u16 + 4;
        let width = text_width.min(area.width);
        let height = 3.min(area.height);
        Rect::new(area.x + area.width - width, area.y, width, height)
    }
}

impl Widget for ToastView<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let color = self.theme.colors.severity(self.toast.notice.severity());
        let target = self.area(area);
        Clear.render(target, buf);
        Paragraph::new(Line::from(Span::styled(
            tr(self.toast.notice.key()),
            Style::default().fg(color).add_modifier(Modifier::BOLD),
        )))
        .alignment(Alignment::Center)
        .block(
            Block::bordered()
                .border_style(Style::default().fg(color))
                .style(Style::default().bg(self.theme.colors.bg())),
        )
        .render(target, buf);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::events::Notice;

    #[test]
    fn test_toast_fits_inside_area() {
        let theme = Theme::default();
        let toast = Toast {
            notice: Notice::NoListeningWords,
            expires_at: 0,
        };
        let view = ToastView::new(&toast, &theme);
        let area = Rect::new(0, 0, 10, 2);
        let r = view.area(area);
        assert!(r.width <= 10 && r.height <= 2);
        assert_eq!(r.x + r.width, 10);
    }
}
