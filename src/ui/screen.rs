use ratatui::Frame;

use crate::{App, AppState};

/// A UI Screen boundary: responsible for rendering one app state
pub trait Screen {
    fn render(&self, app: &App, f: &mut Frame);
}

/// Difficulty selector, start control and last round's result
pub struct MenuScreen;

impl Screen for MenuScreen {
    fn render(&self, app: &App, f: &mut Frame) {
        crate::ui::render_menu(app, f.area(), f.buffer_mut());
    }
}

/// Scoreboard and arena while a round runs
pub struct RoundScreen;

impl Screen for RoundScreen {
    fn render(&self, app: &App, f: &mut Frame) {
        crate::ui::render_round(app, f.area(), f.buffer_mut());
    }
}

/// Helper to construct the appropriate screen for the current state
pub fn current_screen(state: AppState) -> Box<dyn Screen> {
    match state {
        AppState::Menu => Box::new(MenuScreen),
        AppState::Playing => Box::new(RoundScreen),
    }
}
