pub mod cli;
pub mod settings;

pub use cli::{CliConfig, Command, Order, ThemeAction};
pub use settings::{SessionStore, Settings};
