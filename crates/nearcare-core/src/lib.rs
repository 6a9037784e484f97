// SPDX-License-Identifier: MIT
// Copyright (c) 2026 StarTuz

pub mod catalog;
pub mod category;
pub mod config;
pub mod dispatch;
pub mod facility;
pub mod geo;
pub mod nearest;
pub mod reply;
pub mod session;

use std::path::PathBuf;
use thiserror::Error;

pub use catalog::{Catalog, CatalogSet, FieldMap, LoadOptions, RawRecord, SourceFormat};
pub use category::Category;
pub use config::BotConfig;
pub use dispatch::{CategorySelectionOutcome, DispatchError, Dispatcher};
pub use facility::FacilityRecord;
pub use geo::distance_km;
pub use nearest::{nearest, Match, QueryResult};
pub use session::SessionStore;

/// Default number of facilities returned for a location query.
pub const DEFAULT_RESULT_LIMIT: usize = 3;

/// Default text that asks the bot for the category menu.
pub const DEFAULT_TRIGGER_KEYWORD: &str = "查詢";

#[derive(Error, Debug)]
pub enum CoreError {
    #[error("Catalog error: {0}")]
    Catalog(#[from] catalog::CatalogError),
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

/// Platform config directory used when no config path is given.
pub fn get_config_root() -> PathBuf {
    directories::ProjectDirs::from("org", "nearcare", "NearCare")
        .map(|dirs| dirs.config_dir().to_path_buf())
        .unwrap_or_else(|| PathBuf::from("."))
}

/// Default location of the bot configuration file.
pub fn default_config_path() -> PathBuf {
    get_config_root().join("nearcare.json")
}
