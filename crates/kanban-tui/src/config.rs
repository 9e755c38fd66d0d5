use std::env;
use std::path::PathBuf;

use anyhow::Context;

#[derive(Debug, Clone)]
pub struct RemoteConfig {
    pub url: String,
    pub key: String,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub data_dir: PathBuf,
    pub remote: Option<RemoteConfig>,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        let data_dir = match env::var("KANBAN_DATA_DIR") {
            Ok(dir) if !dir.trim().is_empty() => PathBuf::from(dir),
            _ => default_data_dir()?,
        };

        // Both must be set for the goal screen to be available
        let remote = match (env::var("KANBAN_REMOTE_URL"), env::var("KANBAN_REMOTE_KEY")) {
            (Ok(url), Ok(key)) if !url.trim().is_empty() && !key.trim().is_empty() => {
                Some(RemoteConfig { url, key })
            }
            _ => None,
        };

        Ok(Self { data_dir, remote })
    }

    pub fn log_path(&self) -> PathBuf {
        self.data_dir.join("kanban.log")
    }
}

fn default_data_dir() -> anyhow::Result<PathBuf> {
    Ok(dirs::data_dir()
        .context("Could not find data directory")?
        .join("kanban"))
}
