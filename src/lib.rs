// Library surface for the headless game core and the terminal runtime.
// The ratatui screens live in the binary.
pub mod app_dirs;
pub mod config;
pub mod difficulty;
pub mod game;
pub mod logging;
pub mod runtime;
pub mod scheduler;
pub mod session;
pub mod target;
pub mod time_series;
pub mod util;
