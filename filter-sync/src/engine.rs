//! The query synchronization engine: the single owner of the effective
//! filter state and the only component that writes the URL.
//!
//! On every navigation the engine resolves the route's registry entry,
//! overlays the URL's decoded parameters on the route defaults, normalizes
//! the address bar to the canonical encoding, and republishes. UI updates
//! come back in through [`SyncEngine::update_filters`] and flow out the same
//! way, so the URL, the published state, and the form can never disagree for
//! longer than one turn of the loop.

use std::collections::HashSet;
use std::sync::Arc;

use indexmap::IndexMap;
use parking_lot::Mutex;
use tokio::sync::watch;
use tracing::debug;
use tracing::trace;

use crmdesk_filter_model::codec::decode_query;
use crmdesk_filter_model::codec::encode_state;
use crmdesk_filter_model::fields::FilterFieldDescriptor;
use crmdesk_filter_model::location::Location;
use crmdesk_filter_model::value::FilterPatch;
use crmdesk_filter_model::value::FilterState;

use crate::registry::FilterRegistry;
use crate::registry::RouteFilterConfig;
use crate::routes::route_key_for_path;

/// Reads and rewrites the address bar on behalf of the engine.
///
/// `replace` is a history-replacing rewrite and must not feed back into the
/// host's navigation events; the engine relies on that to avoid loops.
pub trait AddressBar: Send + Sync {
    fn current(&self) -> Location;
    fn replace(&self, location: Location);
}

/// In-memory address bar for tests and headless hosts.
#[derive(Default)]
pub struct MemoryAddressBar {
    current: Mutex<Location>,
    replaces: Mutex<Vec<Location>>,
}

impl MemoryAddressBar {
    pub fn new(initial: Location) -> Self {
        Self {
            current: Mutex::new(initial),
            replaces: Mutex::new(Vec::new()),
        }
    }

    /// Host-side navigation: swaps the current location without recording a
    /// rewrite.
    pub fn navigate(&self, location: Location) {
        *self.current.lock() = location;
    }

    pub fn replace_count(&self) -> usize {
        self.replaces.lock().len()
    }

    pub fn last_replace(&self) -> Option<Location> {
        self.replaces.lock().last().cloned()
    }
}

impl AddressBar for MemoryAddressBar {
    fn current(&self) -> Location {
        self.current.lock().clone()
    }

    fn replace(&self, location: Location) {
        *self.current.lock() = location.clone();
        self.replaces.lock().push(location);
    }
}

/// The engine's published view of the active route's filters.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct FilterSnapshot {
    /// `None` on routes with no registered filter configuration.
    pub route_key: Option<String>,
    pub filters: FilterState,
}

struct EngineState {
    route_key: Option<String>,
    filters: FilterState,
    epoch: u64,
}

pub struct SyncEngine {
    registry: Arc<FilterRegistry>,
    address_bar: Arc<dyn AddressBar>,
    base_path: String,
    state: Mutex<EngineState>,
    tx: watch::Sender<FilterSnapshot>,
}

impl SyncEngine {
    pub fn new(
        registry: Arc<FilterRegistry>,
        address_bar: Arc<dyn AddressBar>,
        base_path: impl Into<String>,
    ) -> Arc<Self> {
        let (tx, _rx) = watch::channel(FilterSnapshot::default());
        Arc::new(Self {
            registry,
            address_bar,
            base_path: base_path.into(),
            state: Mutex::new(EngineState {
                route_key: None,
                filters: FilterState::new(),
                epoch: 0,
            }),
            tx,
        })
    }

    pub fn registry(&self) -> &Arc<FilterRegistry> {
        &self.registry
    }

    /// Synchronous snapshot of the current effective state.
    pub fn current(&self) -> FilterSnapshot {
        let state = self.state.lock();
        FilterSnapshot {
            route_key: state.route_key.clone(),
            filters: state.filters.clone(),
        }
    }

    /// Subscribes to the published state. The receiver immediately holds the
    /// current snapshot and is notified on every subsequent change.
    pub fn subscribe(&self) -> watch::Receiver<FilterSnapshot> {
        self.tx.subscribe()
    }

    /// Monotone counter bumped on every navigation. Debounced form updates
    /// and option-provider results captured under an older epoch are stale
    /// and must be discarded.
    pub fn route_epoch(&self) -> u64 {
        self.state.lock().epoch
    }

    /// Entry point for navigation events from the host router. Recomputes
    /// the effective state for the new location and normalizes the address
    /// bar to the canonical encoding of that state.
    pub fn handle_navigation(&self, location: &Location) {
        let route_key = route_key_for_path(location.path(), &self.base_path)
            .filter(|key| self.registry.config(key).is_some())
            .map(str::to_string);

        let Some(key) = route_key else {
            let mut state = self.state.lock();
            state.epoch += 1;
            state.route_key = None;
            state.filters = FilterState::new();
            drop(state);
            self.publish();
            return;
        };
        let Some(config) = self.registry.config(&key) else {
            return;
        };

        let decoded = decode_query(location.query(), config.tracked_fields());
        let mut merged = config.defaults().clone();
        for (field_key, value) in decoded {
            merged.insert(field_key, value);
        }

        let desired = desired_query(&merged, config.tracked_fields(), location.query());
        if desired != *location.query() {
            debug!(route = %key, "normalizing query string");
            self.address_bar
                .replace(Location::with_query(location.path(), desired));
        }

        let mut state = self.state.lock();
        state.epoch += 1;
        state.route_key = Some(key);
        state.filters = merged;
        drop(state);
        self.publish();
    }

    /// Merges `patch` onto the current effective state and reflects the
    /// result into the URL. Keys outside the route's tracked set are
    /// ignored; unrelated query parameters already in the URL are preserved.
    pub fn update_filters(&self, patch: FilterPatch) {
        let (key, mut filters) = {
            let state = self.state.lock();
            let Some(key) = state.route_key.clone() else {
                trace!("update_filters ignored outside a filterable route");
                return;
            };
            (key, state.filters.clone())
        };
        let Some(config) = self.registry.config(&key) else {
            return;
        };

        for (field_key, value) in patch {
            if config.tracked_field(&field_key).is_none() {
                trace!(route = %key, field = %field_key, "ignoring update for untracked field");
                continue;
            }
            match value {
                Some(value) if !value.is_empty() => {
                    filters.insert(field_key, value);
                }
                _ => {
                    filters.shift_remove(&field_key);
                }
            }
        }

        self.commit(key, filters, config);
    }

    /// Discards all overrides and republishes exactly the route's registered
    /// defaults.
    pub fn reset_to_defaults(&self) {
        let Some((key, config)) = self.active_config() else {
            return;
        };
        self.commit(key, config.defaults().clone(), config);
    }

    /// Publishes an empty state and removes every tracked field from the
    /// URL.
    pub fn clear_filters(&self) {
        let Some((key, config)) = self.active_config() else {
            return;
        };
        self.commit(key, FilterState::new(), config);
    }

    fn active_config(&self) -> Option<(String, &RouteFilterConfig)> {
        let key = self.state.lock().route_key.clone()?;
        let config = self.registry.config(&key)?;
        Some((key, config))
    }

    fn commit(&self, key: String, filters: FilterState, config: &RouteFilterConfig) {
        let location = self.address_bar.current();
        let desired = desired_query(&filters, config.tracked_fields(), location.query());
        if desired != *location.query() {
            debug!(route = %key, "writing filters to the address bar");
            self.address_bar
                .replace(Location::with_query(location.path(), desired));
        }

        let mut state = self.state.lock();
        state.route_key = Some(key);
        state.filters = filters;
        drop(state);
        self.publish();
    }

    fn publish(&self) {
        let snapshot = self.current();
        let changed = self.tx.send_if_modified(|slot| {
            if *slot == snapshot {
                return false;
            }
            *slot = snapshot.clone();
            true
        });
        if changed {
            trace!(route = ?snapshot.route_key, "published filter state");
        }
    }
}

/// The canonical query for a state: unrelated parameters first, in their
/// existing order, then the encoded tracked fields in descriptor order.
fn desired_query(
    filters: &FilterState,
    tracked: &[FilterFieldDescriptor],
    current: &IndexMap<String, String>,
) -> IndexMap<String, String> {
    let tracked_keys: HashSet<&str> = tracked.iter().map(|field| field.key.as_str()).collect();
    let encoded = encode_state(filters);
    let mut desired = IndexMap::new();
    for (key, value) in current {
        if !tracked_keys.contains(key.as_str()) {
            desired.insert(key.clone(), value.clone());
        }
    }
    for field in tracked {
        if let Some(value) = encoded.get(&field.key) {
            desired.insert(field.key.clone(), value.clone());
        }
    }
    desired
}
