//! Quote cart store.
//!
//! `QuoteStore` owns one [`QuoteState`] and is the only way to change it.
//! Every operation is total: ids that match nothing are no-ops. After any
//! change the state is written through the injected persistence adapter;
//! write failures are logged and otherwise ignored.

use std::sync::Arc;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::pricing::{Catalog, Estimate, OptionMap, OptionValue, Pricer};

use super::models::{EventDetailsPatch, QuoteState, SelectedService};
use super::persistence::QuotePersistence;

pub struct QuoteStore {
    key: String,
    state: QuoteState,
    catalog: Arc<Catalog>,
    persistence: Arc<dyn QuotePersistence>,
}

impl std::fmt::Debug for QuoteStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QuoteStore")
            .field("key", &self.key)
            .field("state", &self.state)
            .finish_non_exhaustive()
    }
}

impl QuoteStore {
    /// Open the store under `key`, restoring its record if one exists.
    ///
    /// An unreadable record is logged and the store starts empty.
    pub fn open(
        key: impl Into<String>,
        catalog: Arc<Catalog>,
        persistence: Arc<dyn QuotePersistence>,
    ) -> Self {
        let key = key.into();
        let state = match persistence.load(&key) {
            Ok(state) => state.unwrap_or_default(),
            Err(e) => {
                warn!("Failed to restore quote '{}', starting empty: {}", key, e);
                QuoteState::default()
            }
        };
        Self::with_state(key, state, catalog, persistence)
    }

    /// Open the store only if a readable record exists under `key`
    pub fn open_existing(
        key: impl Into<String>,
        catalog: Arc<Catalog>,
        persistence: Arc<dyn QuotePersistence>,
    ) -> Option<Self> {
        let key = key.into();
        match persistence.load(&key) {
            Ok(Some(state)) => Some(Self::with_state(key, state, catalog, persistence)),
            Ok(None) => None,
            Err(e) => {
                warn!("Failed to restore quote '{}': {}", key, e);
                None
            }
        }
    }

    fn with_state(
        key: String,
        mut state: QuoteState,
        catalog: Arc<Catalog>,
        persistence: Arc<dyn QuotePersistence>,
    ) -> Self {
        // Cached subtotals from storage may predate the current catalog
        let pricer = Pricer::lenient(&catalog);
        for entry in &mut state.services {
            entry.subtotal = pricer
                .service_price(&entry.service_key, &entry.options)
                .unwrap_or(0);
        }
        Self {
            key,
            state,
            catalog,
            persistence,
        }
    }

    pub fn state(&self) -> &QuoteState {
        &self.state
    }

    pub fn services(&self) -> &[SelectedService] {
        &self.state.services
    }

    /// Add a service with every option at its default.
    ///
    /// Returns the instance id of the cart entry for `service_key`. If the
    /// service is already in the cart nothing changes and the existing id is
    /// returned. Keys missing from the catalog are ignored.
    pub fn add_service(&mut self, service_key: &str) -> Option<String> {
        if let Some(existing) = self.state.service_by_key(service_key) {
            return Some(existing.id.clone());
        }
        let Some(entry) = self.catalog.service(service_key) else {
            debug!("Ignoring unknown service '{}'", service_key);
            return None;
        };

        let options = entry.default_options();
        let subtotal = self.price(service_key, &options);
        let id = Uuid::new_v4().to_string();
        self.state.services.push(SelectedService {
            id: id.clone(),
            service_key: service_key.to_string(),
            options,
            subtotal,
        });
        self.persist();
        Some(id)
    }

    /// Remove a cart entry. Returns whether anything was removed.
    pub fn remove_service(&mut self, instance_id: &str) -> bool {
        let before = self.state.services.len();
        self.state.services.retain(|s| s.id != instance_id);
        let removed = self.state.services.len() != before;
        if removed {
            self.persist();
        }
        removed
    }

    /// Set one option on a cart entry and reprice it.
    ///
    /// The value is stored as given; bounds and choices are not checked.
    pub fn update_service_option(
        &mut self,
        instance_id: &str,
        option_id: &str,
        value: OptionValue,
    ) -> bool {
        let pricer = Pricer::lenient(&self.catalog);
        let Some(entry) = self.state.services.iter_mut().find(|s| s.id == instance_id) else {
            return false;
        };
        entry.options.insert(option_id.to_string(), value);
        entry.subtotal = pricer
            .service_price(&entry.service_key, &entry.options)
            .unwrap_or(0);
        self.persist();
        true
    }

    pub fn update_event_details(&mut self, patch: EventDetailsPatch) {
        patch.apply(&mut self.state.event_details);
        self.persist();
    }

    /// Flip membership of an add-on. Returns whether it is now selected.
    pub fn toggle_add_on(&mut self, add_on_id: &str) -> bool {
        let selected = if self.state.selected_add_ons.remove(add_on_id) {
            false
        } else {
            self.state.selected_add_ons.insert(add_on_id.to_string());
            true
        };
        self.persist();
        selected
    }

    /// Current estimate, recomputed from the state on every call
    pub fn estimate(&self) -> Estimate {
        let pricer = Pricer::lenient(&self.catalog);
        pricer
            .estimate(
                self.state
                    .services
                    .iter()
                    .map(|s| (s.service_key.as_str(), &s.options)),
                self.state.selected_add_ons.iter().map(String::as_str),
                self.state.event_details.duration,
            )
            .unwrap_or_else(|_| Estimate::empty())
    }

    /// Return to the empty initial state
    pub fn reset(&mut self) {
        self.state = QuoteState::default();
        self.persist();
    }

    fn price(&self, service_key: &str, options: &OptionMap) -> i64 {
        Pricer::lenient(&self.catalog)
            .service_price(service_key, options)
            .unwrap_or(0)
    }

    fn persist(&self) {
        if let Err(e) = self.persistence.save(&self.key, &self.state) {
            warn!("Failed to persist quote '{}': {}", self.key, e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pricing::compute_service_price;
    use crate::quote::persistence::{MemoryPersistence, PersistenceError};
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;

    const KEY: &str = "quote-storage/test";

    fn builtin() -> Arc<Catalog> {
        Arc::new(Catalog::builtin().clone())
    }

    fn new_store() -> (QuoteStore, Arc<MemoryPersistence>) {
        let persistence = Arc::new(MemoryPersistence::new());
        let store = QuoteStore::open(KEY, builtin(), persistence.clone());
        (store, persistence)
    }

    fn assert_subtotals_fresh(store: &QuoteStore) {
        for entry in store.services() {
            assert_eq!(
                entry.subtotal,
                compute_service_price(&entry.service_key, &entry.options),
                "stale subtotal for {}",
                entry.service_key
            );
        }
    }

    struct FailingPersistence;

    impl QuotePersistence for FailingPersistence {
        fn load(&self, key: &str) -> Result<Option<QuoteState>, PersistenceError> {
            Err(PersistenceError::InvalidKey(key.to_string()))
        }

        fn save(&self, key: &str, _state: &QuoteState) -> Result<(), PersistenceError> {
            Err(PersistenceError::InvalidKey(key.to_string()))
        }
    }

    // ==================== add / remove tests ====================

    #[test]
    fn test_add_service_uses_defaults() {
        let (mut store, _) = new_store();
        let id = store.add_service("acscent").unwrap();

        let entry = store.state().service(&id).unwrap();
        assert_eq!(entry.service_key, "acscent");
        assert_eq!(
            entry.options,
            Catalog::builtin().service("acscent").unwrap().default_options()
        );
        assert_eq!(entry.subtotal, 3_000_000);
        assert_subtotals_fresh(&store);
    }

    #[test]
    fn test_add_service_is_idempotent() {
        let (mut store, _) = new_store();
        let first = store.add_service("photoBooth");
        let second = store.add_service("photoBooth");

        assert_eq!(first, second);
        assert_eq!(store.services().len(), 1);
    }

    #[test]
    fn test_add_unknown_service_is_noop() {
        let (mut store, persistence) = new_store();
        assert!(store.add_service("hologram").is_none());
        assert!(store.services().is_empty());
        assert!(persistence.is_empty());
    }

    #[test]
    fn test_services_keep_insertion_order() {
        let (mut store, _) = new_store();
        store.add_service("rental");
        store.add_service("acscent");
        store.add_service("mediaArt");
        let keys: Vec<&str> = store
            .services()
            .iter()
            .map(|s| s.service_key.as_str())
            .collect();
        assert_eq!(keys, vec!["rental", "acscent", "mediaArt"]);
    }

    #[test]
    fn test_remove_service() {
        let (mut store, _) = new_store();
        let id = store.add_service("acscent").unwrap();
        store.add_service("rental");

        assert!(store.remove_service(&id));
        assert_eq!(store.services().len(), 1);
        assert_eq!(store.services()[0].service_key, "rental");
    }

    #[test]
    fn test_remove_unknown_id_leaves_services_unchanged() {
        let (mut store, _) = new_store();
        store.add_service("acscent");
        let before = store.state().clone();

        assert!(!store.remove_service("no-such-id"));
        assert_eq!(store.state(), &before);
    }

    // ==================== option update tests ====================

    #[test]
    fn test_update_option_recomputes_subtotal() {
        let (mut store, _) = new_store();
        let id = store.add_service("acscent").unwrap();

        assert!(store.update_service_option(&id, "boothCount", OptionValue::Number(3)));
        assert_eq!(store.services()[0].subtotal, 3_000_000 + 2 * 1_500_000);
        assert_subtotals_fresh(&store);

        assert!(store.update_service_option(&id, "customBottle", true.into()));
        assert_eq!(store.services()[0].subtotal, 3_000_000 + 2 * 1_500_000 + 1_000_000);
        assert_subtotals_fresh(&store);
    }

    #[test]
    fn test_update_option_passes_out_of_range_through() {
        let (mut store, _) = new_store();
        let id = store.add_service("photoBooth").unwrap();

        assert!(store.update_service_option(&id, "kioskCount", OptionValue::Number(40)));
        assert_eq!(
            store.services()[0].options["kioskCount"],
            OptionValue::Number(40)
        );
        assert_subtotals_fresh(&store);
    }

    #[test]
    fn test_update_option_unknown_instance_is_noop() {
        let (mut store, _) = new_store();
        store.add_service("acscent");
        let before = store.state().clone();

        assert!(!store.update_service_option("missing", "boothCount", OptionValue::Number(2)));
        assert_eq!(store.state(), &before);
    }

    // ==================== event / add-on tests ====================

    #[test]
    fn test_update_event_details_merges() {
        let (mut store, _) = new_store();
        store.update_event_details(EventDetailsPatch {
            location: Some("Busan".to_string()),
            ..Default::default()
        });
        store.update_event_details(EventDetailsPatch {
            duration: Some(3),
            ..Default::default()
        });

        let details = &store.state().event_details;
        assert_eq!(details.location, "Busan");
        assert_eq!(details.duration, 3);
    }

    #[test]
    fn test_toggle_add_on() {
        let (mut store, _) = new_store();
        assert!(store.toggle_add_on("staffing"));
        assert!(store.state().selected_add_ons.contains("staffing"));
        assert!(!store.toggle_add_on("staffing"));
        assert!(store.state().selected_add_ons.is_empty());
    }

    // ==================== estimate tests ====================

    #[test]
    fn test_estimate_multi_day() {
        let (mut store, _) = new_store();
        store.add_service("acscent");
        store.update_event_details(EventDetailsPatch {
            duration: Some(3),
            ..Default::default()
        });

        let estimate = store.estimate();
        assert_eq!(estimate.subtotal, 3_000_000);
        assert_eq!(estimate.duration_multiplier, dec!(1.6));
        assert_eq!(estimate.total, 4_800_000);
    }

    #[test]
    fn test_estimate_with_add_ons() {
        let (mut store, _) = new_store();
        store.add_service("photoBooth");
        store.toggle_add_on("staffing");
        store.toggle_add_on("transport");
        store.toggle_add_on("unknown-extra");

        let estimate = store.estimate();
        assert_eq!(estimate.subtotal, 2_000_000);
        assert_eq!(estimate.add_ons_total, 1_300_000);
        assert_eq!(estimate.total, 3_300_000);
    }

    #[test]
    fn test_estimate_tracks_state_changes() {
        let (mut store, _) = new_store();
        let id = store.add_service("mediaArt").unwrap();
        assert_eq!(store.estimate().total, 5_000_000);

        store.update_service_option(&id, "screenSize", "medium".into());
        assert_eq!(store.estimate().total, 7_500_000);

        store.remove_service(&id);
        assert_eq!(store.estimate().total, 0);
    }

    #[test]
    fn test_reset_then_estimate_is_empty() {
        let (mut store, _) = new_store();
        store.add_service("spatialDesign");
        store.toggle_add_on("videoRecap");
        store.update_event_details(EventDetailsPatch {
            duration: Some(4),
            ..Default::default()
        });

        store.reset();
        let estimate = store.estimate();
        assert_eq!(estimate.subtotal, 0);
        assert_eq!(estimate.add_ons_total, 0);
        assert_eq!(estimate.duration_multiplier, Decimal::ONE);
        assert_eq!(estimate.total, 0);
        assert_eq!(store.state(), &QuoteState::default());
    }

    #[test]
    fn test_estimate_saturates_on_huge_pass_through_values() {
        let (mut store, _) = new_store();
        let id = store.add_service("mediaArt").unwrap();
        store.update_service_option(&id, "contentCount", OptionValue::Number(1_000_000_000_000));
        store.update_event_details(EventDetailsPatch {
            duration: Some(1_000_000_000_000),
            ..Default::default()
        });

        let estimate = store.estimate();
        assert_eq!(estimate.subtotal, 5_000_000 + 700_000 * 1_000_000_000_000);
        assert_eq!(estimate.total, i64::MAX);
    }

    // ==================== persistence tests ====================

    #[test]
    fn test_mutations_are_persisted_and_restored() {
        let (mut store, persistence) = new_store();
        let id = store.add_service("acscent").unwrap();
        store.update_service_option(&id, "scentRange", "signature".into());
        store.toggle_add_on("branding");

        let restored = QuoteStore::open(KEY, builtin(), persistence.clone());
        assert_eq!(restored.state(), store.state());
        assert_eq!(restored.estimate(), store.estimate());
    }

    #[test]
    fn test_restore_reprices_stale_subtotals() {
        let persistence = Arc::new(MemoryPersistence::new());
        let mut state = QuoteState::default();
        state.services.push(SelectedService {
            id: "x".to_string(),
            service_key: "rental".to_string(),
            options: Default::default(),
            subtotal: 1,
        });
        persistence.save(KEY, &state).unwrap();

        let store = QuoteStore::open(KEY, builtin(), persistence);
        assert_eq!(store.services()[0].subtotal, 1_200_000);
        assert_subtotals_fresh(&store);
    }

    #[test]
    fn test_open_existing_requires_record() {
        let persistence = Arc::new(MemoryPersistence::new());
        assert!(QuoteStore::open_existing(KEY, builtin(), persistence.clone()).is_none());

        persistence.save(KEY, &QuoteState::default()).unwrap();
        assert!(QuoteStore::open_existing(KEY, builtin(), persistence).is_some());
    }

    #[test]
    fn test_persistence_failures_do_not_break_operations() {
        let mut store = QuoteStore::open(KEY, builtin(), Arc::new(FailingPersistence));
        let id = store.add_service("acscent").unwrap();
        assert!(store.update_service_option(&id, "boothCount", OptionValue::Number(2)));
        store.reset();
        assert!(store.services().is_empty());
    }
}
