//! Application configuration: backend selection and preference defaults.
//!
//! Values come from a key lookup so the same parser serves process
//! environment variables natively and build-time constants in the browser.

#[cfg(test)]
#[path = "config_test.rs"]
mod config_test;

use shell::{StoreOptions, Theme};

use crate::i18n;

/// Settings for the hosted backend.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct BackendConfig {
    pub api_key: String,
    pub auth_domain: String,
    pub project_id: String,
    pub app_id: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub backend: BackendConfig,
    /// In-memory auth and documents instead of the hosted backend.
    pub use_mock: bool,
    pub default_language: String,
    pub default_theme: Theme,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            backend: BackendConfig::default(),
            use_mock: true,
            default_language: i18n::DEFAULT_LANGUAGE.to_owned(),
            default_theme: Theme::Light,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("{key} must be `true` or `false`, got {value:?}")]
    InvalidFlag { key: &'static str, value: String },
    #[error("unsupported DEFAULT_LANGUAGE {0:?}")]
    UnsupportedLanguage(String),
    #[error("DEFAULT_THEME must be `light` or `dark`, got {0:?}")]
    InvalidTheme(String),
}

impl AppConfig {
    /// Build config from the process environment.
    ///
    /// # Errors
    ///
    /// See [`AppConfig::from_lookup`].
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build config from a key lookup.
    ///
    /// Optional:
    /// - `FIREBASE_API_KEY`, `FIREBASE_AUTH_DOMAIN`, `FIREBASE_PROJECT_ID`,
    ///   `FIREBASE_APP_ID`: hosted backend settings
    /// - `USE_MOCK`: `true` forces the in-memory backend. A missing API key
    ///   selects it as well.
    /// - `DEFAULT_LANGUAGE`: default `ru`
    /// - `DEFAULT_THEME`: `light` (default) or `dark`
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when a present value cannot be parsed.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let read = |key: &str| lookup(key).map(|v| v.trim().to_owned()).filter(|v| !v.is_empty());

        let backend = BackendConfig {
            api_key: read("FIREBASE_API_KEY").unwrap_or_default(),
            auth_domain: read("FIREBASE_AUTH_DOMAIN").unwrap_or_default(),
            project_id: read("FIREBASE_PROJECT_ID").unwrap_or_default(),
            app_id: read("FIREBASE_APP_ID").unwrap_or_default(),
        };

        let forced_mock = parse_flag("USE_MOCK", read("USE_MOCK").as_deref())?;
        let use_mock = forced_mock || backend.api_key.is_empty();

        let default_language = match read("DEFAULT_LANGUAGE") {
            Some(lang) if i18n::is_supported(&lang) => lang,
            Some(lang) => return Err(ConfigError::UnsupportedLanguage(lang)),
            None => i18n::DEFAULT_LANGUAGE.to_owned(),
        };

        let default_theme = match read("DEFAULT_THEME") {
            Some(raw) => Theme::parse(&raw).ok_or(ConfigError::InvalidTheme(raw))?,
            None => Theme::Light,
        };

        Ok(Self { backend, use_mock, default_language, default_theme })
    }

    /// Defaults handed to the state store.
    #[must_use]
    pub fn store_options(&self) -> StoreOptions {
        StoreOptions { default_theme: self.default_theme, default_language: self.default_language.clone() }
    }
}

fn parse_flag(key: &'static str, raw: Option<&str>) -> Result<bool, ConfigError> {
    match raw {
        None => Ok(false),
        Some(v) if v.eq_ignore_ascii_case("true") || v == "1" => Ok(true),
        Some(v) if v.eq_ignore_ascii_case("false") || v == "0" => Ok(false),
        Some(v) => Err(ConfigError::InvalidFlag { key, value: v.to_owned() }),
    }
}
