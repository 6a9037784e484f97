// SPDX-License-Identifier: MIT
// Copyright (c) 2026 StarTuz

use crate::catalog::{has_usable_coordinates, CatalogSet};
use crate::category::Category;
use crate::config::BotConfig;
use crate::nearest::QueryResult;
use crate::session::SessionStore;
use crate::{DEFAULT_RESULT_LIMIT, DEFAULT_TRIGGER_KEYWORD};
use std::sync::Arc;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DispatchError {
    #[error("No category selected yet")]
    NoCategorySelected,
    #[error("Category {0} has no catalog available")]
    CategoryNotImplemented(Category),
}

/// What the transport should say back after a text message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CategorySelectionOutcome {
    /// Present the category menu.
    ShowMenu(Vec<Category>),
    /// The selection was stored; ask the user to share a location.
    PromptForLocation(Category),
    /// Neither the trigger keyword nor a category.
    Unrecognized,
}

/// Routes chat events to the session store and the catalogs.
pub struct Dispatcher {
    catalogs: CatalogSet,
    sessions: Arc<SessionStore>,
    trigger_keyword: String,
    result_limit: usize,
}

impl Dispatcher {
    pub fn new(catalogs: CatalogSet, sessions: Arc<SessionStore>) -> Self {
        Self {
            catalogs,
            sessions,
            trigger_keyword: DEFAULT_TRIGGER_KEYWORD.to_string(),
            result_limit: DEFAULT_RESULT_LIMIT,
        }
    }

    pub fn from_config(
        config: &BotConfig,
        catalogs: CatalogSet,
        sessions: Arc<SessionStore>,
    ) -> Self {
        Self::new(catalogs, sessions)
            .with_trigger_keyword(&config.trigger_keyword)
            .with_result_limit(config.result_limit)
    }

    pub fn with_trigger_keyword(mut self, keyword: &str) -> Self {
        self.trigger_keyword = keyword.trim().to_string();
        self
    }

    pub fn with_result_limit(mut self, k: usize) -> Self {
        self.result_limit = k;
        self
    }

    pub fn catalogs(&self) -> &CatalogSet {
        &self.catalogs
    }

    pub fn sessions(&self) -> &SessionStore {
        &self.sessions
    }

    pub fn result_limit(&self) -> usize {
        self.result_limit
    }

    /// Handles a text message. Only a recognized category token touches the
    /// session; the trigger keyword and unknown text leave it as it was.
    pub fn handle_category_text(&self, user_id: &str, text: &str) -> CategorySelectionOutcome {
        let text = text.trim();
        if text == self.trigger_keyword {
            log::debug!("[Dispatch] {} asked for the category menu", user_id);
            return CategorySelectionOutcome::ShowMenu(Category::ALL.to_vec());
        }

        match Category::from_text(text) {
            Some(category) => {
                self.sessions.set_category(user_id, category);
                CategorySelectionOutcome::PromptForLocation(category)
            }
            None => {
                log::debug!("[Dispatch] {} sent unrecognized text: '{}'", user_id, text);
                CategorySelectionOutcome::Unrecognized
            }
        }
    }

    /// Handles a shared location: consumes the user's pending selection and
    /// returns the nearest facilities from that category's catalog.
    pub fn handle_location(
        &self,
        user_id: &str,
        lat: f64,
        lon: f64,
    ) -> Result<QueryResult, DispatchError> {
        let category = self
            .sessions
            .consume_category(user_id)
            .ok_or(DispatchError::NoCategorySelected)?;

        let catalog = self.catalogs.get(category).ok_or_else(|| {
            log::warn!(
                "[Dispatch] {} selected {} but no catalog is wired for it",
                user_id,
                category
            );
            DispatchError::CategoryNotImplemented(category)
        })?;

        let result = catalog.nearest(lat, lon, self.result_limit);
        for m in result.iter().filter(|m| !has_usable_coordinates(&m.record)) {
            log::warn!(
                "[Dispatch] '{}' ranked for ({}, {}) with default coordinates ({:.2} km)",
                m.record.name,
                lat,
                lon,
                m.distance_km
            );
        }
        log::info!(
            "[Dispatch] {} -> {} result(s) from {} ({} records)",
            user_id,
            result.len(),
            category,
            catalog.len()
        );
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Catalog;
    use crate::facility::FacilityRecord;

    fn dispatcher() -> Dispatcher {
        let clinics = Catalog::from_records(
            Category::Clinic,
            vec![
                FacilityRecord::new("C1", 25.02, 121.55),
                FacilityRecord::new("C2", 25.04, 121.56),
            ],
        );
        let catalogs: CatalogSet = vec![clinics].into_iter().collect();
        Dispatcher::new(catalogs, Arc::new(SessionStore::new()))
    }

    #[test]
    fn test_trigger_shows_menu_without_touching_session() {
        let d = dispatcher();
        d.handle_category_text("u1", "診所");
        assert_eq!(
            d.handle_category_text("u1", " 查詢 "),
            CategorySelectionOutcome::ShowMenu(Category::ALL.to_vec())
        );
        assert_eq!(d.sessions().pending_category("u1"), Some(Category::Clinic));
    }

    #[test]
    fn test_category_prompts_for_location() {
        let d = dispatcher();
        assert_eq!(
            d.handle_category_text("u1", "地區醫院"),
            CategorySelectionOutcome::PromptForLocation(Category::DistrictHospital)
        );
        assert_eq!(
            d.sessions().pending_category("u1"),
            Some(Category::DistrictHospital)
        );
    }

    #[test]
    fn test_unrecognized_keeps_pending_selection() {
        let d = dispatcher();
        d.handle_category_text("u1", "診所");
        assert_eq!(
            d.handle_category_text("u1", "hello"),
            CategorySelectionOutcome::Unrecognized
        );
        assert_eq!(d.sessions().pending_category("u1"), Some(Category::Clinic));
    }

    #[test]
    fn test_location_without_selection() {
        let d = dispatcher();
        assert_eq!(
            d.handle_location("u1", 25.0, 121.5),
            Err(DispatchError::NoCategorySelected)
        );
    }

    #[test]
    fn test_unwired_category_is_not_implemented_and_consumed() {
        let d = dispatcher();
        d.handle_category_text("u1", "據點");
        assert_eq!(
            d.handle_location("u1", 25.0, 121.5),
            Err(DispatchError::CategoryNotImplemented(Category::PointOfInterest))
        );
        assert_eq!(
            d.handle_location("u1", 25.0, 121.5),
            Err(DispatchError::NoCategorySelected)
        );
    }

    #[test]
    fn test_location_uses_result_limit() {
        let d = dispatcher().with_result_limit(1);
        d.handle_category_text("u1", "CLINIC");
        let result = d.handle_location("u1", 25.02, 121.55).unwrap();
        assert_eq!(result.len(), 1);
        assert_eq!(result[0].record.name, "C1");
    }

    #[test]
    fn test_custom_trigger_keyword() {
        let d = dispatcher().with_trigger_keyword("menu");
        assert!(matches!(
            d.handle_category_text("u1", "menu"),
            CategorySelectionOutcome::ShowMenu(_)
        ));
        assert_eq!(
            d.handle_category_text("u1", "查詢"),
            CategorySelectionOutcome::Unrecognized
        );
    }
}
