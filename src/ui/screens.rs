use ratatui::Frame;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Paragraph, Widget};
use rust_i18n::t;

use crate::app::{App, AppScreen, SettingsField};
use crate::ui::components::chapter_list::ChapterList;
use crate::ui::components::drill_area::DrillArea;
use crate::ui::components::listening_panel::ListeningPanel;
use crate::ui::components::summary::SessionSummaryView;
use crate::ui::components::toast::ToastView;
use crate::ui::layout::{AppLayout, centered_rect, pack_hint_lines};
use crate::ui::tr;

pub fn render(frame: &mut Frame, app: &App) {
    let area = frame.area();
    let colors = &app.theme.colors;

    let bg = Block::default().style(Style::default().bg(colors.bg()));
    frame.render_widget(bg, area);

    let hints = footer_hints(app.screen);
    let hint_refs: Vec<&str> = hints.iter().map(String::as_str).collect();
    let hint_lines = pack_hint_lines(&hint_refs, area.width as usize);
    let layout = AppLayout::new(area, hint_lines.len() as u16);

    render_header(frame, app, layout.header);

    match app.screen {
        AppScreen::Menu => render_menu(frame, app, layout.main),
        AppScreen::Drill => render_drill(frame, app, layout.main),
        AppScreen::DrillResult => render_result(frame, app, layout.main),
        AppScreen::Listening => render_listening(frame, app, layout.main),
        AppScreen::Chapters => render_chapters(frame, app, layout.main),
        AppScreen::Settings => render_settings(frame, app, layout.main),
    }

    let footer: Vec<Line> = hint_lines
        .into_iter()
        .map(|l| Line::from(Span::styled(l, Style::default().fg(colors.muted()))))
        .collect();
    frame.render_widget(Paragraph::new(footer), layout.footer);

    if let Some(toast) = &app.toast {
        ToastView::new(toast, app.theme).render(layout.main, frame.buffer_mut());
    }
}

fn footer_hints(screen: AppScreen) -> Vec<String> {
    let keys: &[&str] = match screen {
        AppScreen::Menu => &["hints.menu_nav", "hints.menu_select", "hints.quit"],
        AppScreen::Drill => &[
            "hints.submit",
            "hints.hint",
            "hints.replay",
            "hints.quit_drill",
        ],
        AppScreen::DrillResult => &[
            "hints.retry",
            "hints.result_listening",
            "hints.result_chapters",
            "hints.back",
        ],
        AppScreen::Listening => &[
            "hints.play_pause",
            "hints.prev_next",
            "hints.stop",
            "hints.music",
            "hints.chapter",
            "hints.back",
        ],
        AppScreen::Chapters => &["hints.menu_nav", "hints.chapter_select", "hints.back"],
        AppScreen::Settings => &["hints.settings_nav", "hints.settings_change", "hints.settings_save"],
    };
    keys.iter().map(|k| tr(k)).collect()
}

fn render_header(frame: &mut Frame, app: &App, area: Rect) {
    let colors = &app.theme.colors;
    let def = app.chapter().definition();

    let streak_text = if app.stats.streak > 0 {
        format!(" | {}", t!("header.streak", days = app.stats.streak))
    } else {
        String::new()
    };
    let header_info = format!(
        " {} | {} | {}{}",
        t!("chapters.name", number = def.number, name = def.name),
        tr(&format!("mode.{}", app.config.game_mode.as_str())),
        tr(&format!("difficulty.{}", app.config.difficulty.as_str())),
        streak_text,
    );
    let header = Paragraph::new(Line::from(vec![
        Span::styled(
            format!(" {} ", t!("app.name")),
            Style::default()
                .fg(colors.header_fg())
                .bg(colors.header_bg())
                .add_modifier(Modifier::BOLD),
        ),
        Span::styled(
            header_info,
            Style::default().fg(colors.muted()).bg(colors.header_bg()),
        ),
    ]))
    .style(Style::default().bg(colors.header_bg()));
    frame.render_widget(header, area);
}

fn render_menu(frame: &mut Frame, app: &App, area: Rect) {
    let menu_area = centered_rect(50, 90, area);
    frame.render_widget(&app.menu, menu_area);
}

fn render_drill(frame: &mut Frame, app: &App, area: Rect) {
    let Some(session) = app.drill.session() else {
        return;
    };
    let drill_area = centered_rect(70, 70, area);
    frame.render_widget(DrillArea::new(session, app.theme), drill_area);
}

fn render_result(frame: &mut Frame, app: &App, area: Rect) {
    let Some(report) = &app.last_report else {
        return;
    };
    let result_area = centered_rect(60, 90, area);
    frame.render_widget(SessionSummaryView::new(report, app.theme), result_area);
}

fn render_listening(frame: &mut Frame, app: &App, area: Rect) {
    let panel_area = centered_rect(60, 70, area);
    frame.render_widget(ListeningPanel::new(&app.listening, app.theme), panel_area);
}

fn render_chapters(frame: &mut Frame, app: &App, area: Rect) {
    let list_area = centered_rect(50, 60, area);
    frame.render_widget(
        ChapterList::new(&app.chapters, app.chapter_selected, app.chapter(), app.theme),
        list_area,
    );
}

pub fn settings_value(app: &App, field: SettingsField) -> String {
    let config = &app.config;
    match field {
        SettingsField::GameMode => tr(&format!("mode.{}", config.game_mode.as_str())),
        SettingsField::Difficulty => tr(&format!("difficulty.{}", config.difficulty.as_str())),
        SettingsField::WordCount => config.word_count.to_string(),
        SettingsField::ShowTranslation => {
            if config.show_translation {
                t!("settings.on").to_string()
            } else {
                t!("settings.off").to_string()
            }
        }
        SettingsField::Chapter => {
            let def = app.chapter().definition();
            t!("chapters.name", number = def.number, name = def.name).to_string()
        }
        SettingsField::Theme => config.theme.clone(),
        SettingsField::Language => tr(&format!("language.{}", config.language)),
    }
}

fn render_settings(frame: &mut Frame, app: &App, area: Rect) {
    let colors = &app.theme.colors;

    let centered = centered_rect(60, 90, area);
    let block = Block::bordered()
        .title(format!(" {} ", t!("settings.title")))
        .border_style(Style::default().fg(colors.accent()))
        .style(Style::default().bg(colors.bg()));
    let inner = block.inner(centered);
    block.render(centered, frame.buffer_mut());

    let fields = SettingsField::ALL;
    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Length(fields.len() as u16 * 2),
            Constraint::Min(0),
        ])
        .split(inner);

    let field_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints(fields.iter().map(|_| Constraint::Length(2)).collect::<Vec<_>>())
        .split(layout[1]);

    for (i, field) in fields.iter().enumerate() {
        let is_selected = i == app.settings_selected;
        let indicator = if is_selected { " > " } else { "   " };

        let label_text = format!("{indicator}{}:", t!(field.label_key()));
        let value_text = format!("  < {} >", settings_value(app, *field));

        let label_style = if is_selected {
            Style::default()
                .fg(colors.accent())
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(colors.fg())
        };
        let value_style = Style::default().fg(if is_selected {
            colors.fg()
        } else {
            colors.muted()
        });

        let line = Line::from(vec![
            Span::styled(label_text, label_style),
            Span::styled(value_text, value_style),
        ]);
        if let Some(&slot) = field_layout.get(i) {
            Paragraph::new(line).render(slot, frame.buffer_mut());
        }
    }
}
