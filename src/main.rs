use std::io;
use std::path::PathBuf;
use std::time::{Duration, Instant};

use anyhow::{Result, bail};
use clap::Parser;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use tracing::{info, warn};

use ordr::app::{App, AppScreen};
use ordr::audio::default_player;
use ordr::catalog::Difficulty;
use ordr::config::{Config, LANGUAGES, MAX_WORD_COUNT, MIN_WORD_COUNT};
use ordr::engine::chapters::ChapterId;
use ordr::engine::drill::GameMode;
use ordr::event::{AppEvent, EventHandler};
use ordr::logging;
use ordr::store::json_store::JsonStore;
use ordr::ui::components::menu::MenuAction;
use ordr::ui::theme::Theme;

#[derive(Parser)]
#[command(name = "ordr", version, about = "Norwegian vocabulary drills in the terminal")]
struct Cli {
    #[arg(short, long, help = "Game mode (practice, action)")]
    mode: Option<String>,

    #[arg(short, long, help = "Difficulty (easy, medium, hard)")]
    difficulty: Option<String>,

    #[arg(short, long, help = "Number of words per session")]
    words: Option<usize>,

    #[arg(short, long, help = "Chapter to start in (capital_one, ...)")]
    chapter: Option<String>,

    #[arg(short, long, help = "Theme name")]
    theme: Option<String>,

    #[arg(long, help = "Interface language (en, nb)")]
    lang: Option<String>,

    #[arg(long, help = "Directory for the log file")]
    log_dir: Option<PathBuf>,

    #[arg(short, long, help = "Debug-level logging")]
    verbose: bool,
}

impl Cli {
    /// Command-line overrides win over the config file.
    fn apply(&self, config: &mut Config) -> Result<()> {
        if let Some(mode) = &self.mode {
            let Some(mode) = GameMode::from_key(mode) else {
                bail!("unknown mode {mode:?}, expected practice or action");
            };
            config.game_mode = mode;
        }
        if let Some(difficulty) = &self.difficulty {
            let Some(difficulty) = Difficulty::from_key(difficulty) else {
                bail!("unknown difficulty {difficulty:?}, expected easy, medium or hard");
            };
            config.difficulty = difficulty;
        }
        if let Some(words) = self.words {
            if !(MIN_WORD_COUNT..=MAX_WORD_COUNT).contains(&words) {
                bail!("--words must be between {MIN_WORD_COUNT} and {MAX_WORD_COUNT}");
            }
            config.word_count = words;
        }
        if let Some(chapter) = &self.chapter {
            let Some(chapter) = ChapterId::from_key(chapter) else {
                bail!("unknown chapter {chapter:?}");
            };
            config.set_chapter(chapter);
        }
        if let Some(theme) = &self.theme {
            config.theme = theme.clone();
        }
        if let Some(lang) = &self.lang {
            if !LANGUAGES.contains(&lang.as_str()) {
                bail!("unsupported language {lang:?}, expected one of {LANGUAGES:?}");
            }
            config.language = lang.clone();
        }
        Ok(())
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let log_dir = cli.log_dir.clone().unwrap_or_else(logging::default_log_dir);
    if let Err(err) = logging::init_tracing(&log_dir, cli.verbose) {
        eprintln!("ordr: logging disabled: {err}");
    }

    let mut config = Config::load().unwrap_or_else(|err| {
        warn!(%err, "could not read config, using defaults");
        Config::default()
    });
    cli.apply(&mut config)?;
    let themes = Theme::available_themes();
    let theme_refs: Vec<&str> = themes.iter().map(String::as_str).collect();
    config.validate(&theme_refs);

    let store = match JsonStore::new() {
        Ok(store) => Some(store),
        Err(err) => {
            warn!(%err, "progress will not be saved");
            None
        }
    };
    let audio = default_player(PathBuf::from(&config.audio_dir));
    let mut app = App::new(config, store, audio);
    info!(chapter = app.chapter().to_key(), "starting");

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;

    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let events = EventHandler::new(Duration::from_millis(100));

    let result = run_app(&mut terminal, &mut app, &events);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(err) = result {
        eprintln!("Error: {err:?}");
    }

    Ok(())
}

fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
    events: &EventHandler,
) -> Result<()> {
    let started = Instant::now();
    let now_ms = || started.elapsed().as_millis() as u64;

    loop {
        terminal.draw(|frame| ordr::ui::screens::render(frame, app))?;

        match events.next()? {
            AppEvent::Key(key) => handle_key(app, key, now_ms()),
            AppEvent::Tick | AppEvent::Resize(_, _) => {}
        }
        app.tick(now_ms());

        if app.should_quit {
            return Ok(());
        }
    }
}

fn handle_key(app: &mut App, key: KeyEvent, now_ms: u64) {
    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
        app.go_to_menu(now_ms);
        app.should_quit = true;
        return;
    }

    match app.screen {
        AppScreen::Menu => handle_menu_key(app, key, now_ms),
        AppScreen::Drill => handle_drill_key(app, key, now_ms),
        AppScreen::DrillResult => handle_result_key(app, key, now_ms),
        AppScreen::Listening => handle_listening_key(app, key, now_ms),
        AppScreen::Chapters => handle_chapters_key(app, key, now_ms),
        AppScreen::Settings => handle_settings_key(app, key),
    }
}

fn run_menu_action(app: &mut App, action: MenuAction, now_ms: u64) {
    match action {
        MenuAction::StartDrill => {
            app.start_drill(now_ms);
        }
        MenuAction::Listening => app.go_to_listening(now_ms),
        MenuAction::Chapters => app.go_to_chapters(),
        MenuAction::Settings => app.go_to_settings(),
        MenuAction::Quit => app.should_quit = true,
    }
}

fn handle_menu_key(app: &mut App, key: KeyEvent, now_ms: u64) {
    match key.code {
        KeyCode::Esc => app.should_quit = true,
        KeyCode::Up | KeyCode::Char('k') => app.menu.prev(),
        KeyCode::Down | KeyCode::Char('j') => app.menu.next(),
        KeyCode::Enter => {
            let action = app.menu.selected_action();
            run_menu_action(app, action, now_ms);
        }
        KeyCode::Char(ch) => {
            if let Some(action) = app.menu.action_for_key(ch) {
                run_menu_action(app, action, now_ms);
            }
        }
        _ => {}
    }
}

fn handle_drill_key(app: &mut App, key: KeyEvent, now_ms: u64) {
    match key.code {
        KeyCode::Esc => app.quit_drill(now_ms),
        KeyCode::Enter => app.submit(now_ms),
        KeyCode::Tab => app.hint(now_ms),
        KeyCode::F(2) => app.replay_clip(now_ms),
        KeyCode::Backspace => app.backspace(),
        KeyCode::Char(ch) => app.type_char(ch),
        _ => {}
    }
}

fn handle_result_key(app: &mut App, key: KeyEvent, now_ms: u64) {
    match key.code {
        KeyCode::Char('r') | KeyCode::Enter => {
            app.start_drill(now_ms);
        }
        KeyCode::Char('l') => app.go_to_listening(now_ms),
        KeyCode::Char('c') => app.go_to_chapters(),
        KeyCode::Esc | KeyCode::Char('q') => app.go_to_menu(now_ms),
        _ => {}
    }
}

fn handle_listening_key(app: &mut App, key: KeyEvent, now_ms: u64) {
    match key.code {
        KeyCode::Char(' ') | KeyCode::Enter => app.listening_toggle(now_ms),
        KeyCode::Right | KeyCode::Char('n') => app.listening_next(now_ms),
        KeyCode::Left | KeyCode::Char('p') => app.listening_previous(now_ms),
        KeyCode::Char('s') => app.listening_stop(now_ms),
        KeyCode::Char('m') => app.listening_toggle_music(now_ms),
        KeyCode::Char('c') => app.listening_cycle_chapter(now_ms),
        KeyCode::Esc | KeyCode::Char('q') => app.go_to_menu(now_ms),
        _ => {}
    }
}

fn handle_chapters_key(app: &mut App, key: KeyEvent, now_ms: u64) {
    match key.code {
        KeyCode::Up | KeyCode::Char('k') => app.chapters_prev(),
        KeyCode::Down | KeyCode::Char('j') => app.chapters_next(),
        KeyCode::Enter => {
            if app.select_chapter(now_ms) {
                app.go_to_menu(now_ms);
            }
        }
        KeyCode::Esc | KeyCode::Char('q') => app.go_to_menu(now_ms),
        _ => {}
    }
}

fn handle_settings_key(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Esc => {
            app.save_config();
            app.screen = AppScreen::Menu;
        }
        KeyCode::Up | KeyCode::Char('k') => app.settings_prev(),
        KeyCode::Down | KeyCode::Char('j') => app.settings_next(),
        KeyCode::Enter | KeyCode::Right | KeyCode::Char('l') => app.settings_cycle_forward(),
        KeyCode::Left | KeyCode::Char('h') => app.settings_cycle_backward(),
        _ => {}
    }
}
