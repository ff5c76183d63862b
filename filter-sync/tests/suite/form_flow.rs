use std::sync::Arc;
use std::sync::atomic::AtomicUsize;
use std::sync::atomic::Ordering;
use std::time::Duration;

use async_trait::async_trait;
use crmdesk_filter_model::fields::OptionProvider;
use crmdesk_filter_model::fields::SelectOption;
use crmdesk_filter_model::location::Location;
use crmdesk_filter_model::value::FilterValue;
use crmdesk_filter_sync::AddressBar;
use crmdesk_filter_sync::BuiltinProviders;
use crmdesk_filter_sync::FilterSession;
use crmdesk_filter_sync::MemoryAddressBar;
use crmdesk_filter_sync::SyncConfig;
use crmdesk_filter_sync::builtin_registry;
use pretty_assertions::assert_eq;

use super::support::FailingProvider;
use super::support::StaticProvider;
use super::support::console_registry;

const DEBOUNCE: Duration = Duration::from_millis(300);

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

/// Lets spawned form tasks (stream sync, option fetches) run.
async fn settle() {
    tokio::time::sleep(Duration::from_millis(1)).await;
}

#[tokio::test(start_paused = true)]
async fn rapid_edits_collapse_to_one_apply() {
    let (session, address_bar) = session_at("/crm/students");
    let form = session.activate_form();
    settle().await;
    let baseline = address_bar.replace_count();

    form.set_value("status", Some(FilterValue::choice("active")));
    tokio::time::sleep(Duration::from_millis(100)).await;
    form.set_value("status", Some(FilterValue::choice("paused")));
    tokio::time::sleep(Duration::from_millis(100)).await;
    form.set_value("status", Some(FilterValue::choice("archived")));
    tokio::time::sleep(Duration::from_millis(400)).await;

    assert_eq!(address_bar.replace_count(), baseline + 1);
    assert_eq!(address_bar.current().param("status"), Some("archived"));
    assert_eq!(
        session.engine().current().filters.get("status"),
        Some(&FilterValue::choice("archived"))
    );
}

#[tokio::test(start_paused = true)]
async fn edits_within_the_debounce_window_are_not_applied_early() {
    let (session, address_bar) = session_at("/crm/students");
    let form = session.activate_form();
    settle().await;
    let baseline = address_bar.replace_count();

    form.set_value("status", Some(FilterValue::choice("active")));
    tokio::time::sleep(DEBOUNCE / 2).await;
    assert_eq!(address_bar.replace_count(), baseline);
}

#[tokio::test(start_paused = true)]
async fn navigating_away_discards_the_pending_debounce() {
    let (session, address_bar) = session_at("/crm/students");
    let form = session.activate_form();
    settle().await;

    form.set_value("status", Some(FilterValue::choice("active")));
    address_bar.navigate(Location::parse("/crm/orders"));
    session.handle_navigation(&address_bar.current());
    let after_navigation = address_bar.current();
    tokio::time::sleep(Duration::from_millis(500)).await;

    // The stale edit never reached the new route's state or URL.
    assert_eq!(address_bar.current(), after_navigation);
    assert_eq!(session.engine().current().filters.get("status"), None);
    drop(form);
}

#[tokio::test(start_paused = true)]
async fn apply_now_bypasses_the_debounce() {
    let (session, address_bar) = session_at("/crm/students");
    let form = session.activate_form();
    settle().await;
    let baseline = address_bar.replace_count();

    form.set_value("status", Some(FilterValue::choice("active")));
    form.apply_now();
    assert_eq!(address_bar.replace_count(), baseline + 1);
    assert_eq!(address_bar.current().param("status"), Some("active"));

    // The superseded timer does not apply a second time.
    tokio::time::sleep(Duration::from_millis(400)).await;
    assert_eq!(address_bar.replace_count(), baseline + 1);
}

#[tokio::test(start_paused = true)]
async fn stream_repopulation_does_not_echo_back_into_the_url() {
    let (session, address_bar) = session_at("/crm/students");
    let form = session.activate_form();
    settle().await;

    address_bar.navigate(Location::parse("/crm/students?status=archived"));
    session.handle_navigation(&address_bar.current());
    settle().await;
    let writes = address_bar.replace_count();

    let input = form
        .inputs()
        .into_iter()
        .find(|input| input.descriptor.key == "status")
        .expect("status input exists");
    assert_eq!(input.value, Some(FilterValue::choice("archived")));

    tokio::time::sleep(Duration::from_millis(500)).await;
    assert_eq!(address_bar.replace_count(), writes);
}

#[tokio::test(start_paused = true)]
async fn provider_options_resolve_and_label_display_values() {
    let (session, _) = session_at("/crm/students");
    let form = session.activate_form();
    settle().await;

    form.set_value("courseId", Some(FilterValue::choice("c-2")));
    form.apply_now();
    assert_eq!(form.display_value("courseId").as_deref(), Some("Advanced Rust"));
    assert_eq!(form.active_filter_count(), 1);
}

#[tokio::test(start_paused = true)]
async fn provider_failure_degrades_to_an_empty_option_list() {
    let address_bar = Arc::new(MemoryAddressBar::new(Location::parse("/crm/courses")));
    let others: Arc<dyn OptionProvider> = Arc::new(StaticProvider::new(Vec::new()));
    let registry = builtin_registry(&BuiltinProviders {
        courses: others.clone(),
        instructors: Arc::new(FailingProvider),
        students: others.clone(),
        classes: others,
    })
    .expect("builtin registry builds");
    let session = FilterSession::new(registry, address_bar.clone(), SyncConfig::default());
    session.handle_navigation(&address_bar.current());
    let form = session.activate_form();
    settle().await;

    let input = form
        .inputs()
        .into_iter()
        .find(|input| input.descriptor.key == "instructorId")
        .expect("instructor input exists");
    assert!(input.options.is_empty());

    // The raw value still renders when no label is known.
    form.set_value("instructorId", Some(FilterValue::choice("u-9")));
    assert_eq!(form.display_value("instructorId").as_deref(), Some("u-9"));
}

/// First call answers slowly with a stale list; later calls answer quickly.
struct SlowThenFast {
    calls: AtomicUsize,
}

#[async_trait]
impl OptionProvider for SlowThenFast {
    async fn options(&self) -> anyhow::Result<Vec<SelectOption>> {
        if self.calls.fetch_add(1, Ordering::SeqCst) == 0 {
            tokio::time::sleep(Duration::from_millis(500)).await;
            Ok(vec![SelectOption::new("c-1", "Stale Course")])
        } else {
            tokio::time::sleep(Duration::from_millis(10)).await;
            Ok(vec![SelectOption::new("c-1", "Fresh Course")])
        }
    }
}

#[tokio::test(start_paused = true)]
async fn stale_provider_results_are_discarded_after_reactivation() {
    let address_bar = Arc::new(MemoryAddressBar::new(Location::parse("/crm/students")));
    let others: Arc<dyn OptionProvider> = Arc::new(StaticProvider::new(Vec::new()));
    let registry = builtin_registry(&BuiltinProviders {
        courses: Arc::new(SlowThenFast {
            calls: AtomicUsize::new(0),
        }),
        instructors: others.clone(),
        students: others.clone(),
        classes: others,
    })
    .expect("builtin registry builds");
    let session = FilterSession::new(registry, address_bar.clone(), SyncConfig::default());
    session.handle_navigation(&address_bar.current());
    let form = session.activate_form();
    settle().await;

    // Leave and return before the first (slow) fetch completes.
    address_bar.navigate(Location::parse("/crm/settings"));
    session.handle_navigation(&address_bar.current());
    settle().await;
    address_bar.navigate(Location::parse("/crm/students"));
    session.handle_navigation(&address_bar.current());
    tokio::time::sleep(Duration::from_millis(50)).await;

    let fresh = form
        .inputs()
        .into_iter()
        .find(|input| input.descriptor.key == "courseId")
        .expect("course input exists");
    assert_eq!(fresh.options, vec![SelectOption::new("c-1", "Fresh Course")]);

    // Let the slow first call finish; its stale result must not overwrite.
    tokio::time::sleep(Duration::from_millis(600)).await;
    let after = form
        .inputs()
        .into_iter()
        .find(|input| input.descriptor.key == "courseId")
        .expect("course input exists");
    assert_eq!(after.options, vec![SelectOption::new("c-1", "Fresh Course")]);
}

#[tokio::test(start_paused = true)]
async fn clear_field_applies_immediately() {
    let (session, address_bar) = session_at("/crm/students?status=active");
    let form = session.activate_form();
    settle().await;
    assert_eq!(form.active_filter_count(), 1);

    form.clear_field("status");
    assert_eq!(form.active_filter_count(), 0);
    assert_eq!(address_bar.current().param("status"), None);
    assert_eq!(session.engine().current().filters.get("status"), None);
}

#[tokio::test(start_paused = true)]
async fn reset_restores_defaults_and_repopulates_the_form() {
    let (session, address_bar) = session_at("/crm/students?status=active&page=5");
    let form = session.activate_form();
    settle().await;

    form.reset();
    settle().await;
    assert_eq!(address_bar.current().param("status"), None);
    assert_eq!(address_bar.current().param("page"), Some("1"));
    let input = form
        .inputs()
        .into_iter()
        .find(|input| input.descriptor.key == "status")
        .expect("status input exists");
    assert_eq!(input.value, None);
}
