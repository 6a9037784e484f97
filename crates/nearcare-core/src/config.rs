// SPDX-License-Identifier: MIT
// Copyright (c) 2026 StarTuz

use crate::catalog::{load_source, Catalog, CatalogSet, FieldMap, LoadOptions, SourceFormat};
use crate::category::Category;
use crate::{CoreError, DEFAULT_RESULT_LIMIT, DEFAULT_TRIGGER_KEYWORD};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

/// One data file wired to a category.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceConfig {
    pub category: Category,
    pub path: PathBuf,
    pub format: SourceFormat,
    #[serde(default)]
    pub fields: FieldMap,
    #[serde(default)]
    pub dedup_by_name: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BotConfig {
    #[serde(default = "default_trigger_keyword")]
    pub trigger_keyword: String,
    #[serde(default = "default_result_limit")]
    pub result_limit: usize,
    #[serde(default)]
    pub default_coordinate: f64,
    pub sources: Vec<SourceConfig>,
}

fn default_trigger_keyword() -> String {
    DEFAULT_TRIGGER_KEYWORD.to_string()
}

fn default_result_limit() -> usize {
    DEFAULT_RESULT_LIMIT
}

impl Default for BotConfig {
    fn default() -> Self {
        Self {
            trigger_keyword: default_trigger_keyword(),
            result_limit: default_result_limit(),
            default_coordinate: 0.0,
            sources: Vec::new(),
        }
    }
}

impl BotConfig {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {:?}", path))?;
        let config: BotConfig = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse config file {:?}", path))?;
        log::debug!(
            "[Config] Loaded {:?}: {} source(s), trigger '{}', limit {}",
            path,
            config.sources.len(),
            config.trigger_keyword,
            config.result_limit
        );
        Ok(config)
    }

    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                fs::create_dir_all(parent).context("Failed to create config directory")?;
            }
        }
        let content = serde_json::to_string_pretty(self).context("Failed to serialize config")?;
        fs::write(path, content).with_context(|| format!("Failed to write config file {:?}", path))
    }

    /// Rejects settings that would make the bot unusable: a blank trigger, a
    /// trigger that is also a category token, a zero result limit, or a
    /// category wired to more than one source.
    pub fn validate(&self) -> Result<(), CoreError> {
        let trigger = self.trigger_keyword.trim();
        if trigger.is_empty() {
            return Err(CoreError::InvalidConfig(
                "trigger_keyword must not be blank".to_string(),
            ));
        }
        if let Some(category) = Category::from_text(trigger) {
            return Err(CoreError::InvalidConfig(format!(
                "trigger_keyword '{}' collides with category {}",
                trigger, category
            )));
        }
        if self.result_limit == 0 {
            return Err(CoreError::InvalidConfig(
                "result_limit must be at least 1".to_string(),
            ));
        }

        let mut seen = HashSet::new();
        for source in &self.sources {
            if !seen.insert(source.category) {
                return Err(CoreError::InvalidConfig(format!(
                    "category {} is configured more than once",
                    source.category
                )));
            }
        }
        Ok(())
    }

    /// Loads every configured source. Relative paths are resolved against
    /// `base_dir` (normally the directory holding the config file).
    pub fn build_catalogs(&self, base_dir: &Path) -> Result<CatalogSet, CoreError> {
        self.validate()?;

        let mut catalogs = CatalogSet::new();
        for source in &self.sources {
            let path = if source.path.is_absolute() {
                source.path.clone()
            } else {
                base_dir.join(&source.path)
            };
            let raw = load_source(&path, source.format)?;
            let options = LoadOptions {
                fields: source.fields.clone(),
                dedup_by_name: source.dedup_by_name,
                default_coordinate: self.default_coordinate,
            };
            catalogs.insert(Catalog::load(source.category, raw, &options));
        }
        Ok(catalogs)
    }
}
