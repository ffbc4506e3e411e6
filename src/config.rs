use crate::error::ConfigError;
use crate::locale::Locale;
use std::env;

pub const DEFAULT_DATABASE_URL: &str = "sqlite:rank_bote.db";
pub const DEFAULT_STORAGE_KEY: &str = "progress-analytics-data";
pub const DEFAULT_MAX_IMPORT_BYTES: u64 = 5 * 1024 * 1024;

/// Runtime settings, read from the environment (and `.env` via dotenvy).
#[derive(Debug, Clone)]
pub struct Config {
    pub discord_token: String,
    pub database_url: String,
    pub storage_key: String,
    pub export_locale: Locale,
    pub max_import_bytes: u64,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Builds a config from any variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let discord_token = lookup("DISCORD_TOKEN")
            .filter(|token| !token.trim().is_empty())
            .ok_or(ConfigError::Missing { name: "DISCORD_TOKEN" })?;

        let export_locale = match lookup("RANK_BOTE_EXPORT_LOCALE") {
            Some(value) => value.parse().map_err(|_| ConfigError::Invalid {
                field: "RANK_BOTE_EXPORT_LOCALE",
                value,
            })?,
            None => Locale::default(),
        };

        let max_import_bytes = match lookup("RANK_BOTE_MAX_IMPORT_BYTES") {
            Some(value) => value.trim().parse().map_err(|_| ConfigError::Invalid {
                field: "RANK_BOTE_MAX_IMPORT_BYTES",
                value,
            })?,
            None => DEFAULT_MAX_IMPORT_BYTES,
        };

        Ok(Self {
            discord_token,
            database_url: lookup("DATABASE_URL").unwrap_or_else(|| DEFAULT_DATABASE_URL.to_string()),
            storage_key: lookup("RANK_BOTE_STORAGE_KEY").unwrap_or_else(|| DEFAULT_STORAGE_KEY.to_string()),
            export_locale,
            max_import_bytes,
        })
    }
}
