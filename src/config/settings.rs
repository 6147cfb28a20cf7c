use crate::core::Theme;
use crate::domain::model::Session;
use crate::utils::error::{AppError, Result};
use crate::utils::validation::{validate_non_empty_string, validate_url, Validate};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

fn default_table() -> String {
    "birthdays".to_string()
}

fn default_bucket() -> String {
    "photos".to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Settings {
    pub supabase: SupabaseSettings,
    #[serde(default)]
    pub display: DisplaySettings,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct SupabaseSettings {
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub anon_key: String,
    #[serde(default = "default_table")]
    pub table: String,
    #[serde(default = "default_bucket")]
    pub bucket: String,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default)]
pub struct DisplaySettings {
    #[serde(default)]
    pub theme: Theme,
}

impl Settings {
    pub fn default_path() -> Result<PathBuf> {
        let dirs = ProjectDirs::from("", "", "birthday-tracker").ok_or_else(|| {
            AppError::ConfigError {
                message: "could not determine the user config directory".to_string(),
            }
        })?;
        Ok(dirs.config_dir().join("config.toml"))
    }

    /// Loads the settings file if it exists, then applies the
    /// `SUPABASE_URL` / `SUPABASE_ANON_KEY` environment overrides.
    pub fn load(path: &Path) -> Result<Self> {
        let mut settings = if path.exists() {
            let raw = std::fs::read_to_string(path)?;
            toml::from_str(&raw)?
        } else {
            Settings::default()
        };

        if let Ok(url) = std::env::var("SUPABASE_URL") {
            settings.supabase.url = url;
        }
        if let Ok(key) = std::env::var("SUPABASE_ANON_KEY") {
            settings.supabase.anon_key = key;
        }

        Ok(settings)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let raw = toml::to_string_pretty(self)?;
        std::fs::write(path, raw)?;
        Ok(())
    }
}

impl Validate for Settings {
    fn validate(&self) -> Result<()> {
        if self.supabase.url.is_empty() {
            return Err(AppError::MissingConfigError {
                field: "supabase.url (or SUPABASE_URL)".to_string(),
            });
        }
        if self.supabase.anon_key.is_empty() {
            return Err(AppError::MissingConfigError {
                field: "supabase.anon_key (or SUPABASE_ANON_KEY)".to_string(),
            });
        }
        validate_url("supabase.url", &self.supabase.url)?;
        validate_non_empty_string("supabase.table", &self.supabase.table)?;
        validate_non_empty_string("supabase.bucket", &self.supabase.bucket)?;
        Ok(())
    }
}

/// Persists the signed-in session next to the settings file so later
/// invocations stay authenticated until `logout`.
#[derive(Debug, Clone)]
pub struct SessionStore {
    path: PathBuf,
}

impl SessionStore {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    /// `session.toml` in the same directory as the given settings file.
    pub fn beside(settings_path: &Path) -> Self {
        let dir = settings_path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_default();
        Self::new(dir.join("session.toml"))
    }

    pub fn load(&self) -> Result<Option<Session>> {
        if !self.path.exists() {
            return Ok(None);
        }
        let raw = std::fs::read_to_string(&self.path)?;
        Ok(Some(toml::from_str(&raw)?))
    }

    pub fn save(&self, session: &Session) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&self.path, toml::to_string_pretty(session)?)?;
        Ok(())
    }

    pub fn clear(&self) -> Result<()> {
        if self.path.exists() {
            std::fs::remove_file(&self.path)?;
        }
        Ok(())
    }
}
