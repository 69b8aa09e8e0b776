use dirs::home_dir;
use std::{
    env,
    path::{Path, PathBuf},
};

const DEFAULT_DIR_NAME: &str = ".worklog";
const CONFIG_FILE: &str = "config.json";
const RECORDS_FILE: &str = "records.json";
const HOME_ENV: &str = "WORKLOG_HOME";

pub struct PathResolver;

impl PathResolver {
    /// Application data directory: `$WORKLOG_HOME`, else `~/.worklog`.
    pub fn base_dir() -> PathBuf {
        if let Some(custom) = env::var_os(HOME_ENV) {
            return PathBuf::from(custom);
        }
        home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(DEFAULT_DIR_NAME)
    }

    pub fn config_file_in(base: &Path) -> PathBuf {
        base.join(CONFIG_FILE)
    }

    pub fn records_file_in(base: &Path) -> PathBuf {
        base.join(RECORDS_FILE)
    }
}
