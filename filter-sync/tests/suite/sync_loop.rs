use std::sync::Arc;

use crmdesk_filter_model::location::Location;
use crmdesk_filter_model::value::FilterPatch;
use crmdesk_filter_model::value::FilterValue;
use crmdesk_filter_sync::AddressBar;
use crmdesk_filter_sync::FilterSession;
use crmdesk_filter_sync::MemoryAddressBar;
use crmdesk_filter_sync::SyncConfig;
use pretty_assertions::assert_eq;

use super::support::console_registry;

fn session_at(raw: &str) -> (FilterSession, Arc<MemoryAddressBar>) {
    let address_bar = Arc::new(MemoryAddressBar::new(Location::parse(raw)));
    let session = FilterSession::new(
        console_registry(),
        address_bar.clone(),
        SyncConfig::default(),
    );
    session.handle_navigation(&address_bar.current());
    (session, address_bar)
}

#[test]
fn bare_visit_is_normalized_to_the_encoded_defaults() {
    let (session, address_bar) = session_at("/crm/orders");
    assert_eq!(address_bar.replace_count(), 1);
    assert_eq!(
        address_bar.current().to_string(),
        "/crm/orders?page=1&limit=10&sortBy=createdAt&sortOrder=desc"
    );
    let filters = session.engine().current().filters;
    assert_eq!(filters.get("sortOrder"), Some(&FilterValue::choice("desc")));
}

#[test]
fn normalization_preserves_untracked_parameters() {
    let (_, address_bar) = session_at("/crm/students?tab=notes");
    let current = address_bar.current();
    assert_eq!(current.param("tab"), Some("notes"));
    assert_eq!(current.param("page"), Some("1"));
}

#[test]
fn url_overrides_merge_onto_defaults() {
    let (session, _) = session_at("/crm/students?page=2&sortBy=email");
    let filters = session.engine().current().filters;
    assert_eq!(filters.get("page"), Some(&FilterValue::Number(2.0)));
    assert_eq!(filters.get("limit"), Some(&FilterValue::Number(10.0)));
    assert_eq!(filters.get("sortBy"), Some(&FilterValue::text("email")));
    assert_eq!(filters.get("sortOrder"), Some(&FilterValue::choice("asc")));
}

#[test]
fn clear_then_reset_restores_the_registered_defaults() {
    let (session, address_bar) = session_at("/crm/payments?method=card&page=7");
    let engine = session.engine();
    engine.clear_filters();
    assert!(engine.current().filters.is_empty());
    assert!(address_bar.current().query().is_empty());

    engine.reset_to_defaults();
    let defaults = session
        .registry()
        .defaults("payments")
        .cloned()
        .expect("payments is registered");
    assert_eq!(engine.current().filters, defaults);
}

#[test]
fn repeated_updates_write_the_url_once() {
    let (session, address_bar) = session_at("/crm/students");
    let baseline = address_bar.replace_count();
    let mut patch = FilterPatch::new();
    patch.insert("status".to_string(), Some(FilterValue::choice("active")));
    session.engine().update_filters(patch.clone());
    session.engine().update_filters(patch);
    assert_eq!(address_bar.replace_count(), baseline + 1);
}

#[test]
fn panel_follows_route_filterability() {
    let (session, address_bar) = session_at("/crm/students");
    assert!(!session.panel_shown());
    assert!(session.toggle_panel());

    address_bar.navigate(Location::parse("/crm/students/42/edit"));
    session.handle_navigation(&address_bar.current());
    assert!(!session.panel_shown());

    address_bar.navigate(Location::parse("/crm/students"));
    session.handle_navigation(&address_bar.current());
    assert!(session.panel_shown());
}

#[test]
fn detail_routes_expose_no_filters() {
    let (session, address_bar) = session_at("/crm/orders/17");
    assert_eq!(session.engine().current().route_key, None);
    assert_eq!(address_bar.replace_count(), 0);
    assert!(!session.panel_shown());
}
