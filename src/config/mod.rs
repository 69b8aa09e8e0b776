use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::{
    currency::{CurrencyCode, CurrencyFormatter, DEFAULT_CURRENCY, DEFAULT_LOCALE},
    errors::{Result, WorklogError},
    utils::{
        paths::PathResolver,
        persistence::{ensure_dir, load_json, save_json},
    },
};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    pub locale: String,
    pub currency: String,
    /// Records snapshot; defaults to `records.json` in the application directory.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_file: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            locale: DEFAULT_LOCALE.into(),
            currency: DEFAULT_CURRENCY.into(),
            data_file: None,
        }
    }
}

impl Config {
    pub fn formatter(&self) -> CurrencyFormatter {
        CurrencyFormatter::new(CurrencyCode::new(&self.currency), &self.locale)
    }

    pub fn records_path(&self, base: &Path) -> PathBuf {
        self.data_file
            .clone()
            .unwrap_or_else(|| PathResolver::records_file_in(base))
    }

    fn validate(&self) -> Result<()> {
        let code = self.currency.trim();
        if code.len() != 3 || !code.chars().all(|ch| ch.is_ascii_alphabetic()) {
            return Err(WorklogError::Config(format!(
                "currency `{}` is not an ISO 4217 code",
                self.currency
            )));
        }
        if self.locale.trim().is_empty() {
            return Err(WorklogError::Config("locale must not be empty".into()));
        }
        Ok(())
    }
}

pub struct ConfigManager {
    base: PathBuf,
    path: PathBuf,
}

impl ConfigManager {
    pub fn new() -> Result<Self> {
        Self::with_base_dir(PathResolver::base_dir())
    }

    pub fn with_base_dir(base: PathBuf) -> Result<Self> {
        ensure_dir(&base)?;
        Ok(Self {
            path: PathResolver::config_file_in(&base),
            base,
        })
    }

    pub fn load(&self) -> Result<Config> {
        let config: Config = load_json(&self.path)?.unwrap_or_default();
        config.validate()?;
        Ok(config)
    }

    pub fn save(&self, config: &Config) -> Result<()> {
        config.validate()?;
        save_json(config, &self.path)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn base_dir(&self) -> &Path {
        &self.base
    }
}
