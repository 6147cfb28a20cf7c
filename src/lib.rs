pub mod config;
pub mod core;
pub mod domain;
pub mod supabase;
pub mod utils;

pub use config::{CliConfig, SessionStore, Settings};
pub use core::{AppState, BirthdayService, Theme};
pub use domain::model::{BirthdayDraft, BirthdayRecord, Session};
pub use domain::ports::{AuthProvider, BirthdayStore, PhotoStore, SortOrder};
pub use supabase::SupabaseClient;
pub use utils::error::{AppError, Result};
