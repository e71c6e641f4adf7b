use std::env;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::Result;
use crate::query::SortBy;
use crate::user::Role;

pub const CONFIG_FILE: &str = "config.yaml";

/// Overrides `api_base_url` when set.
pub const API_URL_ENV: &str = "GREENGROVES_API_URL";

/// Settings stored in `.greengroves/config.yaml`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CatalogConfig {
    /// Base URL of the REST backend the catalog mirrors.
    pub api_base_url: String,
    /// Role of the person running the CLI; gates mutations.
    pub role: Role,
    /// Sort used by `list` when none is given.
    pub default_sort: SortBy,
    /// Item count above which a warning is printed.
    pub item_warning_threshold: usize,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            api_base_url: "http://localhost:5000/api".to_string(),
            role: Role::Admin,
            default_sort: SortBy::Latest,
            item_warning_threshold: 1000,
        }
    }
}

impl CatalogConfig {
    /// Load from `data_dir`, falling back to defaults when the file is
    /// missing. Environment overrides are applied last.
    pub fn load(data_dir: &Path) -> Result<Self> {
        let path = data_dir.join(CONFIG_FILE);
        let mut config = if path.exists() {
            let text = fs::read_to_string(&path)?;
            serde_yaml::from_str(&text)?
        } else {
            debug!(path = %path.display(), "no config file, using defaults");
            Self::default()
        };

        if let Ok(url) = env::var(API_URL_ENV) {
            if !url.trim().is_empty() {
                config.api_base_url = url.trim().to_string();
            }
        }

        Ok(config)
    }

    pub fn save(&self, data_dir: &Path) -> Result<()> {
        let yaml = serde_yaml::to_string(self)?;
        fs::write(data_dir.join(CONFIG_FILE), yaml)?;
        Ok(())
    }
}
