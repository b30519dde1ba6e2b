pub mod ui;

use clap::{error::ErrorKind, CommandFactory, Parser};
use crossterm::{
    event::{
        DisableMouseCapture, EnableMouseCapture, KeyCode, KeyEvent, KeyEventKind, KeyModifiers,
        MouseButton, MouseEvent, MouseEventKind,
    },
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
    tty::IsTty,
};
use ratatui::{
    backend::{Backend, CrosstermBackend},
    layout::Rect,
    Frame, Terminal,
};
use std::{
    error::Error,
    io::{self, stdin},
    path::PathBuf,
    sync::mpsc::Receiver,
    time::Duration,
};
use tapr::{
    app_dirs::AppDirs,
    config::{Config, ConfigStore, FileConfigStore},
    difficulty::Difficulty,
    game::{Game, Snapshot, Tap},
    runtime::{Clock, CrosstermEventSource, FixedTicker, GameEvent, Runner, SystemClock},
    scheduler::Millis,
};

const TICK_RATE_MS: u64 = 25;

/// reaction-timing tui: hit the targets before they vanish
#[derive(Parser, Debug, Clone)]
#[clap(
    version,
    about,
    long_about = "A reaction-timing game for the terminal. Targets pop up in the arena; click them before they expire. Each round lasts 30 seconds."
)]
pub struct Cli {
    /// difficulty preselected in the menu
    #[clap(short = 'd', long, value_enum)]
    difficulty: Option<Difficulty>,

    /// seed for target placement, for reproducible rounds
    #[clap(long)]
    seed: Option<u64>,

    /// write logs here instead of the default state directory
    #[clap(long)]
    log_file: Option<PathBuf>,

    /// store --difficulty and --seed as the new defaults
    #[clap(long)]
    save_config: bool,
}

impl Cli {
    /// Overlay command line flags on the stored config
    fn apply(&self, config: &mut Config) {
        if let Some(difficulty) = self.difficulty {
            config.difficulty = difficulty;
        }
        if self.seed.is_some() {
            config.seed = self.seed;
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AppState {
    Menu,
    Playing,
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Flow {
    Continue,
    Quit,
}

#[derive(Debug)]
pub struct App {
    pub game: Game,
    pub selected: Difficulty,
    /// Latest published game state; what the screens draw
    pub view: Snapshot,
    pub arena_rect: Rect,
    updates: Receiver<Snapshot>,
}

impl App {
    pub fn new(config: &Config) -> Self {
        let mut game = Game::with_seed(config.seed);
        let updates = game.subscribe();
        Self {
            view: game.snapshot(),
            game,
            selected: config.difficulty,
            arena_rect: Rect::default(),
            updates,
        }
    }

    pub fn state(&self) -> AppState {
        if self.view.active {
            AppState::Playing
        } else {
            AppState::Menu
        }
    }

    /// Recompute the arena for a new terminal size
    pub fn resize(&mut self, area: Rect) {
        self.arena_rect = ui::arena_rect(area);
        self.game.set_arena(ui::arena::arena_for(self.arena_rect));
    }

    pub fn advance_to(&mut self, now: Millis) {
        self.game.advance_to(now);
    }

    /// Pull published snapshots; true if anything changed
    pub fn sync(&mut self) -> bool {
        let mut changed = false;
        for snapshot in self.updates.try_iter() {
            self.view = snapshot;
            changed = true;
        }
        changed
    }

    fn handle_key(&mut self, key: KeyEvent) -> Flow {
        if key.kind != KeyEventKind::Press {
            return Flow::Continue;
        }
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            return Flow::Quit;
        }

        match self.state() {
            AppState::Menu => match key.code {
                KeyCode::Esc | KeyCode::Char('q') => return Flow::Quit,
                KeyCode::Enter | KeyCode::Char(' ') => {
                    self.game.start_round(self.selected);
                }
                KeyCode::Char('1') => self.selected = Difficulty::Easy,
                KeyCode::Char('2') => self.selected = Difficulty::Medium,
                KeyCode::Char('3') => self.selected = Difficulty::Hard,
                KeyCode::Left => self.selected = self.selected.prev(),
                KeyCode::Right | KeyCode::Tab => self.selected = self.selected.next(),
                _ => {}
            },
            AppState::Playing => {
                if key.code == KeyCode::Esc {
                    self.game.end_round();
                }
            }
        }
        Flow::Continue
    }

    fn handle_mouse(&mut self, mouse: MouseEvent) {
        if self.state() != AppState::Playing {
            return;
        }
        if let MouseEventKind::Down(MouseButton::Left) = mouse.kind {
            // clicks outside the arena (scoreboard, legend) are not taps
            if let Some(p) = ui::arena::cell_center(self.arena_rect, mouse.column, mouse.row) {
                self.game.on_tap(Tap::At(p));
            }
        }
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();

    if !stdin().is_tty() {
        let mut cmd = Cli::command();
        cmd.error(ErrorKind::Io, "stdin must be a tty").exit();
    }

    if let Some(path) = cli.log_file.clone().or_else(AppDirs::log_path) {
        if let Err(e) = tapr::logging::init_file_logger(&path) {
            eprintln!("logging disabled ({}): {e}", path.display());
        }
    }

    let store = FileConfigStore::new();
    let mut config = store.load();
    cli.apply(&mut config);
    if cli.save_config {
        store.save(&config)?;
    }
    log::info!(
        "starting with difficulty {} seed {:?}",
        config.difficulty,
        config.seed
    );

    enable_raw_mode()?;

    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut app = App::new(&config);
    let result = start_tui(&mut terminal, &mut app);

    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    result
}

fn start_tui<B: Backend>(terminal: &mut Terminal<B>, app: &mut App) -> Result<(), Box<dyn Error>> {
    let runner = Runner::new(
        CrosstermEventSource::new(),
        FixedTicker::new(Duration::from_millis(TICK_RATE_MS)),
    );
    let clock = SystemClock::new();

    let size = terminal.size()?;
    app.resize(Rect::new(0, 0, size.width, size.height));
    terminal.draw(|f| ui(app, f))?;

    loop {
        let event = runner.step();
        app.advance_to(clock.now_ms());

        let redraw = match event {
            GameEvent::Tick => false,
            GameEvent::Resize(width, height) => {
                app.resize(Rect::new(0, 0, width, height));
                true
            }
            GameEvent::Key(key) => {
                if app.handle_key(key) == Flow::Quit {
                    break;
                }
                true
            }
            GameEvent::Mouse(mouse) => {
                app.handle_mouse(mouse);
                false
            }
        };

        if app.sync() || redraw {
            terminal.draw(|f| ui(app, f))?;
        }
    }

    log::info!("quit");
    Ok(())
}

fn ui(app: &App, f: &mut Frame) {
    ui::screen::current_screen(app.state()).render(app, f);
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use clap::Parser;
    use crossterm::event::KeyEventState;
    use ratatui::{backend::TestBackend, Terminal};
    use tapr::session::ROUND_SECS;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn click(column: u16, row: u16) -> MouseEvent {
        MouseEvent {
            kind: MouseEventKind::Down(MouseButton::Left),
            column,
            row,
            modifiers: KeyModifiers::NONE,
        }
    }

    fn app() -> App {
        let mut app = App::new(&Config {
            difficulty: Difficulty::Medium,
            seed: Some(11),
        });
        app.resize(Rect::new(0, 0, 80, 24));
        app
    }

    #[test]
    fn test_cli_default_values() {
        let cli = Cli::parse_from(["tapr"]);
        assert_eq!(cli.difficulty, None);
        assert_eq!(cli.seed, None);
        assert_eq!(cli.log_file, None);
        assert!(!cli.save_config);
    }

    #[test]
    fn test_cli_flags() {
        let cli = Cli::parse_from(["tapr", "-d", "hard", "--seed", "9", "--save-config"]);
        assert_eq!(cli.difficulty, Some(Difficulty::Hard));
        assert_eq!(cli.seed, Some(9));
        assert!(cli.save_config);

        let cli = Cli::parse_from(["tapr", "--difficulty", "easy"]);
        assert_eq!(cli.difficulty, Some(Difficulty::Easy));
    }

    #[test]
    fn test_cli_rejects_unknown_difficulty() {
        assert!(Cli::try_parse_from(["tapr", "-d", "insane"]).is_err());
    }

    #[test]
    fn test_cli_overrides_config_only_where_given() {
        let mut config = Config {
            difficulty: Difficulty::Easy,
            seed: Some(5),
        };
        Cli::parse_from(["tapr", "-d", "hard"]).apply(&mut config);
        assert_eq!(config.difficulty, Difficulty::Hard);
        assert_eq!(config.seed, Some(5));
    }

    #[test]
    fn test_menu_keys_select_difficulty() {
        let mut app = app();
        app.handle_key(key(KeyCode::Char('1')));
        assert_eq!(app.selected, Difficulty::Easy);
        app.handle_key(key(KeyCode::Left));
        assert_eq!(app.selected, Difficulty::Hard);
        app.handle_key(key(KeyCode::Right));
        assert_eq!(app.selected, Difficulty::Easy);
        app.handle_key(key(KeyCode::Char('3')));
        assert_eq!(app.selected, Difficulty::Hard);
    }

    #[test]
    fn test_enter_starts_a_round_with_the_selection() {
        let mut app = app();
        app.handle_key(key(KeyCode::Char('3')));
        app.handle_key(key(KeyCode::Enter));
        assert!(app.sync());
        assert_eq!(app.state(), AppState::Playing);
        assert_eq!(app.view.difficulty, Difficulty::Hard);
        assert_eq!(app.view.time_left, ROUND_SECS);
    }

    #[test]
    fn test_difficulty_keys_are_ignored_while_playing() {
        let mut app = app();
        app.handle_key(key(KeyCode::Enter));
        app.sync();
        app.handle_key(key(KeyCode::Char('1')));
        assert_eq!(app.selected, Difficulty::Medium);
        assert_eq!(app.handle_key(key(KeyCode::Char('q'))), Flow::Continue);
    }

    #[test]
    fn test_esc_ends_round_then_quits() {
        let mut app = app();
        app.handle_key(key(KeyCode::Enter));
        app.sync();
        assert_eq!(app.handle_key(key(KeyCode::Esc)), Flow::Continue);
        app.sync();
        assert_eq!(app.state(), AppState::Menu);
        assert_eq!(app.handle_key(key(KeyCode::Esc)), Flow::Quit);
    }

    #[test]
    fn test_ctrl_c_quits_anywhere() {
        let mut app = app();
        app.handle_key(key(KeyCode::Enter));
        app.sync();
        let ctrl_c = KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL);
        assert_eq!(app.handle_key(ctrl_c), Flow::Quit);
    }

    #[test]
    fn test_key_release_is_ignored() {
        let mut app = app();
        let release = KeyEvent {
            code: KeyCode::Enter,
            modifiers: KeyModifiers::NONE,
            kind: KeyEventKind::Release,
            state: KeyEventState::NONE,
        };
        app.handle_key(release);
        app.sync();
        assert_eq!(app.state(), AppState::Menu);
    }

    #[test]
    fn test_click_on_target_scores() {
        let mut app = app();
        app.handle_key(key(KeyCode::Enter));
        app.advance_to(1200);
        app.sync();
        let target = app.view.live_targets[0].clone();

        // first arena cell whose center lies in the target
        let rect = app.arena_rect;
        let (column, row) = (rect.top()..rect.bottom())
            .flat_map(|row| (rect.left()..rect.right()).map(move |column| (column, row)))
            .find(|&(column, row)| {
                ui::arena::cell_center(rect, column, row).is_some_and(|p| target.contains(p))
            })
            .expect("target covers at least one cell");

        app.handle_mouse(click(column, row));
        app.sync();
        assert_eq!(app.view.score, 1);
        assert_eq!(app.view.misses, 0);
        assert!(app.view.live_targets[0].hit);
    }

    #[test]
    fn test_click_outside_arena_is_not_a_tap() {
        let mut app = app();
        app.handle_key(key(KeyCode::Enter));
        app.sync();
        // scoreboard row
        app.handle_mouse(click(10, 1));
        app.sync();
        assert_eq!(app.view.misses, 0);
    }

    #[test]
    fn test_click_on_empty_arena_is_a_miss() {
        let mut app = app();
        app.handle_key(key(KeyCode::Enter));
        app.sync();
        let rect = app.arena_rect;
        app.handle_mouse(click(rect.x, rect.y));
        app.sync();
        assert_eq!(app.view.misses, 1);
    }

    #[test]
    fn test_clicks_in_menu_are_ignored() {
        let mut app = app();
        let rect = app.arena_rect;
        app.handle_mouse(click(rect.x, rect.y));
        assert!(!app.sync());
        assert_eq!(app.view.misses, 0);
    }

    #[test]
    fn test_resize_updates_arena() {
        let mut app = app();
        app.resize(Rect::new(0, 0, 120, 40));
        let arena = app.game.arena();
        assert_eq!(
            arena.width,
            app.arena_rect.width as f64 * ui::arena::CELL_WIDTH
        );
        assert_eq!(
            arena.height,
            app.arena_rect.height as f64 * ui::arena::CELL_HEIGHT
        );
    }

    #[test]
    fn test_round_ends_back_in_menu() {
        let mut app = app();
        app.handle_key(key(KeyCode::Enter));
        app.advance_to(30_000);
        app.sync();
        assert_matches!(app.state(), AppState::Menu);
        assert_eq!(app.view.time_left, 0);
        assert!(app.view.live_targets.is_empty());
    }

    #[test]
    fn test_ui_renders_both_screens() {
        let mut app = app();
        let mut terminal = Terminal::new(TestBackend::new(80, 24)).unwrap();

        terminal.draw(|f| ui(&app, f)).unwrap();
        let content: String = terminal
            .backend()
            .buffer()
            .content
            .iter()
            .map(|c| c.symbol())
            .collect();
        assert!(content.contains("(enter) start"));

        app.handle_key(key(KeyCode::Enter));
        app.advance_to(1200);
        app.sync();
        terminal.draw(|f| ui(&app, f)).unwrap();
        let content: String = terminal
            .backend()
            .buffer()
            .content
            .iter()
            .map(|c| c.symbol())
            .collect();
        assert!(content.contains("score"));
        assert!(content.contains("█"));
    }

    #[test]
    fn test_tick_rate_is_fast_enough_for_feedback_window() {
        assert!(TICK_RATE_MS < tapr::game::HIT_FEEDBACK_MS);
    }
}
