//! Application configuration at ~/.config/blackbook/config.toml,
//! overlaid with `BLACKBOOK_*` environment variables.

use std::net::SocketAddr;
use std::path::{Path, PathBuf};

use config::{Config, Environment, File};
use serde::Deserialize;

use crate::error::{BlackbookError, BlackbookResult};

static DEFAULT_LISTEN: &str = "127.0.0.1:4096";
static DEFAULT_VIEW: &str = "/main/calendar";

fn default_listen() -> SocketAddr {
    SocketAddr::from(([127, 0, 0, 1], 4096))
}

fn default_view() -> String {
    DEFAULT_VIEW.to_string()
}

fn default_lookback_days() -> u32 {
    1
}

/// A user created at startup unless one with this username exists.
#[derive(Deserialize, Clone, Debug, PartialEq)]
pub struct SeedUser {
    pub username: String,
    pub name: String,
    pub password: String,
}

#[derive(Deserialize, Clone, Debug, PartialEq)]
pub struct AppConfig {
    #[serde(default = "default_listen")]
    pub listen: SocketAddr,

    /// Where a session navigates after logging in.
    #[serde(default = "default_view")]
    pub default_view: String,

    /// Extra days loaded before a calendar range so events running over
    /// midnight into it are not missed.
    #[serde(default = "default_lookback_days")]
    pub calendar_lookback_days: u32,

    pub seed_admin: Option<SeedUser>,
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            listen: default_listen(),
            default_view: default_view(),
            calendar_lookback_days: default_lookback_days(),
            seed_admin: None,
        }
    }
}

fn environment() -> Environment {
    Environment::with_prefix("BLACKBOOK")
        .prefix_separator("_")
        .separator("__")
}

impl AppConfig {
    pub fn config_path() -> BlackbookResult<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| BlackbookError::Config("Could not determine config directory".into()))?
            .join("blackbook");

        Ok(config_dir.join("config.toml"))
    }

    /// Load from the default location, creating a commented template
    /// there first if nothing exists yet.
    pub fn load() -> BlackbookResult<Self> {
        let config_path = Self::config_path()?;

        if !config_path.exists() {
            Self::create_default_config(&config_path)?;
        }

        Self::load_from(&config_path)
    }

    /// Load from `path` (`~` is expanded). A missing file yields defaults.
    ///
    /// `BLACKBOOK_<KEY>` environment variables win over the file; nested
    /// keys are joined with `__`, as in `BLACKBOOK_SEED_ADMIN__PASSWORD`.
    pub fn load_from(path: &Path) -> BlackbookResult<Self> {
        Self::load_with(path, environment())
    }

    fn load_with(path: &Path, environment: Environment) -> BlackbookResult<Self> {
        let expanded = shellexpand::tilde(&path.to_string_lossy()).into_owned();

        Config::builder()
            .add_source(File::from(PathBuf::from(expanded)).required(false))
            .add_source(environment)
            .build()
            .map_err(|e| BlackbookError::Config(e.to_string()))?
            .try_deserialize()
            .map_err(|e| BlackbookError::Config(e.to_string()))
    }

    /// Create a default config file with all options commented out.
    pub fn create_default_config(path: &Path) -> BlackbookResult<()> {
        let contents = format!(
            "\
# blackbook configuration

# Address the server listens on:
# listen = \"{DEFAULT_LISTEN}\"

# View opened after login:
# default_view = \"{DEFAULT_VIEW}\"

# Days loaded before the visible calendar range:
# calendar_lookback_days = 1

# Administrator created on first start:
# [seed_admin]
# username = \"admin\"
# name = \"Administrator\"
# password = \"change me\"
"
        );

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                BlackbookError::Config(format!("Could not create config directory: {e}"))
            })?;
        }

        std::fs::write(path, contents)
            .map_err(|e| BlackbookError::Config(format!("Could not write config file: {e}")))?;

        Ok(())
    }
}
