//! Decides whether the filter panel is available on the current route and
//! tracks the user's persisted show/hide preference.

use std::sync::Arc;

use crate::prefs::PANEL_SHOWN_KEY;
use crate::prefs::PreferenceStore;
use crate::routes::route_key_for_path;

/// True only for top-level list routes on the allow-list. Detail, create,
/// and edit sub-routes are never filterable, even when their base segment
/// is allow-listed.
pub fn is_filterable_route<'a, I>(path: &str, base_path: &str, allow_list: I) -> bool
where
    I: IntoIterator<Item = &'a str>,
{
    match route_key_for_path(path, base_path) {
        Some(key) => allow_list.into_iter().any(|route| route == key),
        None => false,
    }
}

/// Show/hide state machine for the filter panel.
///
/// The persisted preference only changes on an explicit toggle; navigating
/// to a non-filterable route forces the panel closed without overwriting
/// it, and the preference is restored on returning to a filterable route.
pub struct PanelVisibility {
    prefs: Arc<dyn PreferenceStore>,
    preferred: bool,
    forced_closed: bool,
}

impl PanelVisibility {
    /// An absent stored preference reads as "hidden".
    pub fn new(prefs: Arc<dyn PreferenceStore>) -> Self {
        let preferred = prefs.load(PANEL_SHOWN_KEY).unwrap_or(false);
        Self {
            prefs,
            preferred,
            forced_closed: true,
        }
    }

    pub fn handle_navigation(&mut self, filterable: bool) {
        self.forced_closed = !filterable;
    }

    /// Flips the preference. A no-op on non-filterable routes.
    pub fn toggle(&mut self) -> bool {
        if self.forced_closed {
            return self.is_shown();
        }
        self.preferred = !self.preferred;
        self.prefs.store(PANEL_SHOWN_KEY, self.preferred);
        self.is_shown()
    }

    pub fn is_shown(&self) -> bool {
        !self.forced_closed && self.preferred
    }
}
