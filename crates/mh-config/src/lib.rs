//! # mh-config
//!
//! Layered configuration loading for mhouse using figment.
//!
//! Configuration sources (in priority order, highest wins):
//! 1. Environment variables (`MH_*` prefix, `__` as separator)
//! 2. Project-level `.mhouse/config.toml`
//! 3. User-level `~/.config/mhouse/config.toml`
//! 4. Built-in defaults
//!
//! Figment maps `MH_AUTH__JWT_SECRET` -> `auth.jwt_secret`,
//! `MH_DATABASE__PATH` -> `database.path`, etc.
//!
//! ```no_run
//! use mh_config::MhConfig;
//!
//! let config = MhConfig::load_with_dotenv().expect("config");
//! if config.auth.is_configured() {
//!     println!("tokens verified with issuer {:?}", config.auth.issuer());
//! }
//! ```

mod auth;
mod database;
mod error;
mod general;

pub use auth::{AttributionPolicy, AuthConfig};
pub use database::{DatabaseConfig, IN_MEMORY};
pub use error::ConfigError;
pub use general::GeneralConfig;

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Project-local config file, relative to the working directory.
pub const LOCAL_CONFIG_PATH: &str = ".mhouse/config.toml";

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct MhConfig {
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub auth: AuthConfig,
    #[serde(default)]
    pub general: GeneralConfig,
}

impl MhConfig {
    /// Load configuration from TOML files and environment variables.
    ///
    /// Does not read `.env`; see [`Self::load_with_dotenv`].
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Figment` if a source is malformed.
    pub fn load() -> Result<Self, ConfigError> {
        let config: Self = Self::figment().extract()?;
        config.validate()?;
        Ok(config)
    }

    /// Load `.env` from the workspace root, then [`Self::load`].
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Figment` if a source is malformed.
    pub fn load_with_dotenv() -> Result<Self, ConfigError> {
        Self::load_dotenv_from_workspace();
        Self::load()
    }

    /// Build the figment provider chain.
    #[must_use]
    pub fn figment() -> Figment {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        if let Some(global_path) = Self::global_config_path() {
            if global_path.exists() {
                figment = figment.merge(Toml::file(global_path));
            }
        }

        let local_path = PathBuf::from(LOCAL_CONFIG_PATH);
        if local_path.exists() {
            figment = figment.merge(Toml::file(local_path));
        }

        figment.merge(Env::prefixed("MH_").split("__"))
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.database.path.trim().is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "database.path".into(),
                reason: "must not be empty".into(),
            });
        }
        if self.auth.user_id_claim.trim().is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "auth.user_id_claim".into(),
                reason: "must not be empty".into(),
            });
        }
        Ok(())
    }

    fn global_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("mhouse").join("config.toml"))
    }

    /// Walks up from `CARGO_MANIFEST_DIR` (at most 3 levels) looking for
    /// `.env`, falling back to the current directory.
    fn load_dotenv_from_workspace() {
        if let Ok(manifest_dir) = std::env::var("CARGO_MANIFEST_DIR") {
            let mut dir = PathBuf::from(manifest_dir);
            for _ in 0..3 {
                let env_path = dir.join(".env");
                if env_path.exists() {
                    let _ = dotenvy::from_path(&env_path);
                    return;
                }
                if !dir.pop() {
                    break;
                }
            }
        }

        let _ = dotenvy::dotenv();
    }
}
