//! Per-session wiring of the filter core.
//!
//! One [`FilterSession`] is created per signed-in application session and
//! dropped on teardown; nothing in this crate is a process-wide singleton.

use std::sync::Arc;

use parking_lot::Mutex;

use crmdesk_filter_model::location::Location;

use crate::config::SyncConfig;
use crate::engine::AddressBar;
use crate::engine::SyncEngine;
use crate::form::FilterForm;
use crate::prefs::FilePreferenceStore;
use crate::prefs::MemoryPreferenceStore;
use crate::prefs::PreferenceStore;
use crate::registry::FilterRegistry;
use crate::visibility::PanelVisibility;
use crate::visibility::is_filterable_route;

pub struct FilterSession {
    config: SyncConfig,
    registry: Arc<FilterRegistry>,
    engine: Arc<SyncEngine>,
    visibility: Mutex<PanelVisibility>,
}

impl FilterSession {
    /// Builds the session with the preference store the config asks for: a
    /// file-backed one when `preferences_file` is set, in-memory otherwise.
    pub fn new(
        registry: FilterRegistry,
        address_bar: Arc<dyn AddressBar>,
        config: SyncConfig,
    ) -> Self {
        let prefs: Arc<dyn PreferenceStore> = match &config.preferences_file {
            Some(path) => Arc::new(FilePreferenceStore::new(path)),
            None => Arc::new(MemoryPreferenceStore::new()),
        };
        Self::with_preferences(registry, address_bar, prefs, config)
    }

    pub fn with_preferences(
        registry: FilterRegistry,
        address_bar: Arc<dyn AddressBar>,
        prefs: Arc<dyn PreferenceStore>,
        config: SyncConfig,
    ) -> Self {
        let registry = Arc::new(registry);
        let engine = SyncEngine::new(Arc::clone(&registry), address_bar, config.base_path.clone());
        let visibility = Mutex::new(PanelVisibility::new(prefs));
        Self {
            config,
            registry,
            engine,
            visibility,
        }
    }

    pub fn engine(&self) -> &Arc<SyncEngine> {
        &self.engine
    }

    pub fn registry(&self) -> &Arc<FilterRegistry> {
        &self.registry
    }

    pub fn config(&self) -> &SyncConfig {
        &self.config
    }

    /// Binds a filter form to this session's engine using the configured
    /// debounce window.
    pub fn activate_form(&self) -> FilterForm {
        FilterForm::activate(Arc::clone(&self.engine), self.config.debounce())
    }

    /// Routes one navigation event to the engine and the visibility policy.
    pub fn handle_navigation(&self, location: &Location) {
        self.engine.handle_navigation(location);
        let filterable = is_filterable_route(
            location.path(),
            &self.config.base_path,
            self.registry.route_keys(),
        );
        self.visibility.lock().handle_navigation(filterable);
    }

    pub fn toggle_panel(&self) -> bool {
        self.visibility.lock().toggle()
    }

    pub fn panel_shown(&self) -> bool {
        self.visibility.lock().is_shown()
    }
}
