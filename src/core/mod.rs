pub mod app;

pub use app::{AppState, BirthdayService, RemovalReport, Theme};
