// SPDX-License-Identifier: MIT
// Copyright (c) 2026 StarTuz

use crate::category::Category;
use chrono::{DateTime, Duration, Utc};
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

#[derive(Debug, Clone, Copy, PartialEq)]
struct PendingSelection {
    category: Category,
    selected_at: DateTime<Utc>,
}

/// Pending category selections, one per user.
///
/// Every operation holds the lock for its whole read-modify-write, so two
/// messages from the same user never interleave and `consume_category` is an
/// atomic get-and-clear. Re-selecting overwrites (last write wins).
#[derive(Debug, Default)]
pub struct SessionStore {
    pending: Mutex<HashMap<String, PendingSelection>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, PendingSelection>> {
        // The map only holds plain values, so a panic elsewhere cannot leave it
        // half-updated.
        self.pending.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Records the user's selection and returns the one it replaced.
    pub fn set_category(&self, user_id: &str, category: Category) -> Option<Category> {
        let previous = self.lock().insert(
            user_id.to_string(),
            PendingSelection {
                category,
                selected_at: Utc::now(),
            },
        );
        log::debug!("[Session] {} selected {}", user_id, category);
        previous.map(|p| p.category)
    }

    /// Removes and returns the user's pending selection.
    pub fn consume_category(&self, user_id: &str) -> Option<Category> {
        let pending = self.lock().remove(user_id)?;
        log::debug!(
            "[Session] {} consumed {} ({}s after selection)",
            user_id,
            pending.category,
            (Utc::now() - pending.selected_at).num_seconds()
        );
        Some(pending.category)
    }

    /// The user's pending selection, left in place.
    pub fn pending_category(&self, user_id: &str) -> Option<Category> {
        self.lock().get(user_id).map(|p| p.category)
    }

    /// Drops selections made more than `max_age` ago. Returns how many were dropped.
    ///
    /// A non-positive `max_age`, or one reaching past the earliest
    /// representable time, keeps everything.
    pub fn prune_older_than(&self, max_age: Duration) -> usize {
        if max_age <= Duration::zero() {
            return 0;
        }
        let Some(cutoff) = Utc::now().checked_sub_signed(max_age) else {
            return 0;
        };
        let mut pending = self.lock();
        let before = pending.len();
        pending.retain(|_, p| p.selected_at >= cutoff);
        let dropped = before - pending.len();
        if dropped > 0 {
            log::info!("[Session] Pruned {} stale selection(s)", dropped);
        }
        dropped
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn test_consume_after_set() {
        let store = SessionStore::new();
        store.set_category("u1", Category::Clinic);
        assert_eq!(store.consume_category("u1"), Some(Category::Clinic));
        assert_eq!(store.consume_category("u1"), None);
        assert!(store.is_empty());
    }

    #[test]
    fn test_last_write_wins() {
        let store = SessionStore::new();
        assert_eq!(store.set_category("u1", Category::Clinic), None);
        assert_eq!(
            store.set_category("u1", Category::DistrictHospital),
            Some(Category::Clinic)
        );
        assert_eq!(store.len(), 1);
        assert_eq!(store.consume_category("u1"), Some(Category::DistrictHospital));
    }

    #[test]
    fn test_users_are_independent() {
        let store = SessionStore::new();
        store.set_category("u1", Category::Clinic);
        store.set_category("u2", Category::PointOfInterest);
        assert_eq!(store.consume_category("u2"), Some(Category::PointOfInterest));
        assert_eq!(store.pending_category("u1"), Some(Category::Clinic));
        assert_eq!(store.consume_category("u3"), None);
    }

    #[test]
    fn test_peek_does_not_consume() {
        let store = SessionStore::new();
        store.set_category("u1", Category::Clinic);
        assert_eq!(store.pending_category("u1"), Some(Category::Clinic));
        assert_eq!(store.pending_category("u1"), Some(Category::Clinic));
        assert_eq!(store.consume_category("u1"), Some(Category::Clinic));
    }

    #[test]
    fn test_prune_older_than() {
        let store = SessionStore::new();
        store.set_category("u1", Category::Clinic);
        assert_eq!(store.prune_older_than(Duration::hours(1)), 0);
        assert_eq!(store.len(), 1);

        thread::sleep(std::time::Duration::from_millis(20));
        assert_eq!(store.prune_older_than(Duration::milliseconds(1)), 1);
        assert!(store.is_empty());
    }

    #[test]
    fn test_prune_with_non_positive_age_keeps_selections() {
        let store = SessionStore::new();
        store.set_category("u1", Category::Clinic);
        thread::sleep(std::time::Duration::from_millis(5));

        assert_eq!(store.prune_older_than(Duration::zero()), 0);
        assert_eq!(store.prune_older_than(Duration::seconds(-1)), 0);
        assert_eq!(store.pending_category("u1"), Some(Category::Clinic));
    }

    #[test]
    fn test_prune_with_huge_age_keeps_selections() {
        let store = SessionStore::new();
        store.set_category("u1", Category::Clinic);

        assert_eq!(store.prune_older_than(Duration::seconds(1_000_000_000_000_000)), 0);
        assert_eq!(store.prune_older_than(Duration::MAX), 0);
        assert_eq!(store.pending_category("u1"), Some(Category::Clinic));
    }

    #[test]
    fn test_concurrent_consume_hands_out_each_selection_once() {
        let store = Arc::new(SessionStore::new());
        for i in 0..64 {
            store.set_category(&format!("user-{}", i), Category::Clinic);
        }

        // Eight threads race to consume every user's selection.
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let store = Arc::clone(&store);
                thread::spawn(move || {
                    (0..64)
                        .filter(|i| store.consume_category(&format!("user-{}", i)).is_some())
                        .count()
                })
            })
            .collect();

        let total: usize = handles.into_iter().map(|h| h.join().unwrap()).sum();
        assert_eq!(total, 64);
        assert!(store.is_empty());
    }
}
