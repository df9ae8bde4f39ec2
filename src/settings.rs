// Generator configuration, stored as a JSON file next to the other app data.
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::Write;
use std::path::Path;

use crate::error::SettingsError;

pub const API_KEY_ENV: &str = "OPENAI_API_KEY";
pub const DEFAULT_SETTINGS_PATH: &str = "./data/settings.json";

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct Settings {
    pub openai_api_key: Option<String>, // Optional API key for OpenAI services.
    pub api_base_url: Option<String>,   // Alternate OpenAI-compatible endpoint.
    pub model: String,
    pub request_timeout_secs: u64,
    pub max_tokens: u32,
    pub max_retries: u32, // Extra attempts after a generation failure. 0 disables retry.
    pub debug_mode: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            openai_api_key: None,
            api_base_url: None,
            model: "gpt-4o-mini".to_string(),
            request_timeout_secs: 60,
            max_tokens: 1000,
            max_retries: 0,
            debug_mode: false,
        }
    }
}

impl Settings {
    // Load settings from the default path, falling back to defaults when the
    // file does not exist yet. The environment key always wins.
    pub fn load() -> Result<Self, SettingsError> {
        let settings = if Path::new(DEFAULT_SETTINGS_PATH).exists() {
            Self::load_settings_from_file(DEFAULT_SETTINGS_PATH)?
        } else {
            Self::default()
        };
        Ok(settings.with_env_overrides())
    }

    pub fn load_settings_from_file(path: impl AsRef<Path>) -> Result<Self, SettingsError> {
        let data = fs::read_to_string(path)?;
        let settings = serde_json::from_str(&data)?;
        Ok(settings)
    }

    pub fn save_to_file(&self, path: impl AsRef<Path>) -> Result<(), SettingsError> {
        let path = path.as_ref();
        let data = serde_json::to_string_pretty(self)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let mut file = fs::File::create(path)?;
        file.write_all(data.as_bytes())?;
        Ok(())
    }

    pub fn with_env_overrides(self) -> Self {
        self.with_api_key_from(std::env::var(API_KEY_ENV).ok())
    }

    fn with_api_key_from(mut self, key: Option<String>) -> Self {
        if let Some(key) = key.filter(|key| !key.trim().is_empty()) {
            self.openai_api_key = Some(key);
        }
        self
    }
}
