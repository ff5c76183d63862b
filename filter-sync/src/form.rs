//! The generic filter form controller.
//!
//! Builds one input per descriptor for the active route, debounces user
//! edits before handing them to the engine, resolves option providers once
//! per route activation, and repopulates from the engine's stream without
//! re-entering `update_filters` for updates it is reacting to.

use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tokio_util::sync::CancellationToken;
use tracing::warn;

use crmdesk_filter_model::codec::DATE_FORMAT;
use crmdesk_filter_model::codec::encode_value;
use crmdesk_filter_model::fields::FilterFieldDescriptor;
use crmdesk_filter_model::fields::OptionProvider;
use crmdesk_filter_model::fields::OptionSource;
use crmdesk_filter_model::fields::SelectOption;
use crmdesk_filter_model::value::FilterPatch;
use crmdesk_filter_model::value::FilterState;
use crmdesk_filter_model::value::FilterValue;

use crate::engine::FilterSnapshot;
use crate::engine::SyncEngine;

pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(300);

/// One rendered input in the filter form.
#[derive(Debug, Clone)]
pub struct FieldInput {
    pub descriptor: FilterFieldDescriptor,
    pub value: Option<FilterValue>,
    /// Resolved options for select kinds; empty until a provider answers.
    pub options: Vec<SelectOption>,
}

struct FormState {
    route_key: Option<String>,
    /// Bumped whenever the bound route changes; provider results tagged
    /// with an older activation are discarded.
    activation: u64,
    inputs: Vec<FieldInput>,
    /// The last value set handed to the engine (or received from it).
    /// Repopulation from the stream updates this too, which is what keeps
    /// externally-driven updates from being re-applied.
    last_applied: FilterState,
    /// Bumped on every user edit; a debounce timer only fires for the
    /// generation it was started with.
    edit_generation: u64,
}

pub struct FilterForm {
    engine: Arc<SyncEngine>,
    debounce: Duration,
    state: Arc<Mutex<FormState>>,
    shutdown: CancellationToken,
}

impl FilterForm {
    /// Binds a form to the engine and starts following its stream. Must be
    /// called from within a tokio runtime.
    pub fn activate(engine: Arc<SyncEngine>, debounce: Duration) -> Self {
        let state = Arc::new(Mutex::new(FormState {
            route_key: None,
            activation: 0,
            inputs: Vec::new(),
            last_applied: FilterState::new(),
            edit_generation: 0,
        }));
        let shutdown = CancellationToken::new();

        let mut rx = engine.subscribe();
        Self::sync_from_engine(&engine, &state, &shutdown, rx.borrow_and_update().clone());

        {
            let engine = Arc::clone(&engine);
            let state = Arc::clone(&state);
            let token = shutdown.clone();
            tokio::spawn(async move {
                loop {
                    tokio::select! {
                        _ = token.cancelled() => break,
                        changed = rx.changed() => {
                            if changed.is_err() {
                                break;
                            }
                            let snapshot = rx.borrow_and_update().clone();
                            Self::sync_from_engine(&engine, &state, &token, snapshot);
                        }
                    }
                }
            });
        }

        Self {
            engine,
            debounce,
            state,
            shutdown,
        }
    }

    /// Records a user edit and schedules a debounced apply. Passing `None`
    /// empties the field, which will clear it on apply.
    pub fn set_value(&self, key: &str, value: Option<FilterValue>) {
        let scheduled = {
            let mut state = self.state.lock();
            let Some(input) = state
                .inputs
                .iter_mut()
                .find(|input| input.descriptor.key == key)
            else {
                return;
            };
            input.value = value;
            state.edit_generation += 1;
            state.edit_generation
        };
        self.schedule_apply(scheduled, self.engine.route_epoch());
    }

    /// Applies any pending edits immediately, bypassing the debounce.
    pub fn apply_now(&self) {
        // Invalidate outstanding timers before applying.
        self.state.lock().edit_generation += 1;
        Self::apply_pending(&self.engine, &self.state, None, None);
    }

    /// Restores the route's registered defaults.
    pub fn reset(&self) {
        self.state.lock().edit_generation += 1;
        self.engine.reset_to_defaults();
    }

    /// Empties one field and applies the change immediately.
    pub fn clear_field(&self, key: &str) {
        {
            let mut state = self.state.lock();
            let Some(input) = state
                .inputs
                .iter_mut()
                .find(|input| input.descriptor.key == key)
            else {
                return;
            };
            input.value = None;
            state.edit_generation += 1;
        }
        Self::apply_pending(&self.engine, &self.state, None, None);
    }

    /// Number of declared fields currently holding a non-empty value.
    pub fn active_filter_count(&self) -> usize {
        self.state
            .lock()
            .inputs
            .iter()
            .filter(|input| {
                input
                    .value
                    .as_ref()
                    .is_some_and(|value| !value.is_empty())
            })
            .count()
    }

    /// Human-readable rendering of a field's current value; select values
    /// resolve through the cached option list.
    pub fn display_value(&self, key: &str) -> Option<String> {
        let state = self.state.lock();
        let input = state
            .inputs
            .iter()
            .find(|input| input.descriptor.key == key)?;
        let value = input.value.as_ref()?;
        if value.is_empty() {
            return None;
        }
        Some(render_value(value, &input.options))
    }

    /// Snapshot of the rendered inputs, in form order.
    pub fn inputs(&self) -> Vec<FieldInput> {
        self.state.lock().inputs.clone()
    }

    fn sync_from_engine(
        engine: &Arc<SyncEngine>,
        state: &Arc<Mutex<FormState>>,
        shutdown: &CancellationToken,
        snapshot: FilterSnapshot,
    ) {
        let fetches = {
            let mut state_guard = state.lock();
            if state_guard.route_key != snapshot.route_key {
                state_guard.route_key = snapshot.route_key.clone();
                state_guard.activation += 1;
                state_guard.inputs = build_inputs(engine, snapshot.route_key.as_deref());
                dynamic_providers(&state_guard.inputs)
            } else {
                Vec::new()
            }
        };
        for (key, source) in fetches {
            Self::spawn_option_fetch(state, shutdown, key, source);
        }

        let mut state_guard = state.lock();
        for input in &mut state_guard.inputs {
            input.value = snapshot.filters.get(&input.descriptor.key).cloned();
        }
        state_guard.last_applied = collect_non_empty(&state_guard.inputs);
    }

    fn spawn_option_fetch(
        state: &Arc<Mutex<FormState>>,
        shutdown: &CancellationToken,
        key: String,
        source: Arc<dyn OptionProvider>,
    ) {
        let activation = state.lock().activation;
        let state = Arc::clone(state);
        let token = shutdown.clone();
        tokio::spawn(async move {
            let options = match source.options().await {
                Ok(options) => options,
                Err(error) => {
                    warn!(field = %key, %error, "filter option provider failed");
                    Vec::new()
                }
            };
            if token.is_cancelled() {
                return;
            }
            let mut state = state.lock();
            // A result for a superseded activation is stale; drop it.
            if state.activation != activation {
                return;
            }
            if let Some(input) = state
                .inputs
                .iter_mut()
                .find(|input| input.descriptor.key == key)
            {
                input.options = options;
            }
        });
    }

    fn schedule_apply(&self, generation: u64, epoch: u64) {
        let engine = Arc::clone(&self.engine);
        let state = Arc::clone(&self.state);
        let debounce = self.debounce;
        let token = self.shutdown.clone();
        tokio::spawn(async move {
            tokio::select! {
                _ = token.cancelled() => {}
                _ = tokio::time::sleep(debounce) => {
                    Self::apply_pending(&engine, &state, Some(generation), Some(epoch));
                }
            }
        });
    }

    fn apply_pending(
        engine: &SyncEngine,
        state: &Mutex<FormState>,
        generation: Option<u64>,
        epoch: Option<u64>,
    ) {
        let patch = {
            let mut state = state.lock();
            if let Some(generation) = generation
                && state.edit_generation != generation
            {
                // A newer edit restarted the debounce window.
                return;
            }
            if let Some(epoch) = epoch
                && engine.route_epoch() != epoch
            {
                // The route changed since the edit; the pending values are
                // stale and must not leak into the new route's state.
                return;
            }
            let combined = collect_non_empty(&state.inputs);
            if combined == state.last_applied {
                return;
            }
            let patch = build_patch(&state.inputs);
            state.last_applied = combined;
            patch
        };
        engine.update_filters(patch);
    }
}

impl Drop for FilterForm {
    fn drop(&mut self) {
        self.shutdown.cancel();
    }
}

fn build_inputs(engine: &Arc<SyncEngine>, route_key: Option<&str>) -> Vec<FieldInput> {
    let Some(key) = route_key else {
        return Vec::new();
    };
    engine
        .registry()
        .fields(key)
        .iter()
        .map(|descriptor| {
            let options = match descriptor.kind.option_source() {
                Some(OptionSource::Static(options)) => options.clone(),
                _ => Vec::new(),
            };
            FieldInput {
                descriptor: descriptor.clone(),
                value: None,
                options,
            }
        })
        .collect()
}

fn dynamic_providers(inputs: &[FieldInput]) -> Vec<(String, Arc<dyn OptionProvider>)> {
    inputs
        .iter()
        .filter_map(|input| match input.descriptor.kind.option_source() {
            Some(OptionSource::Provider(provider)) => {
                Some((input.descriptor.key.clone(), provider.clone()))
            }
            _ => None,
        })
        .collect()
}

fn collect_non_empty(inputs: &[FieldInput]) -> FilterState {
    let mut state = FilterState::new();
    for input in inputs {
        if let Some(value) = &input.value
            && !value.is_empty()
        {
            state.insert(input.descriptor.key.clone(), value.clone());
        }
    }
    state
}

/// The full field set as a patch: non-empty values set, everything else
/// cleared, so an emptied input removes its key from the URL.
fn build_patch(inputs: &[FieldInput]) -> FilterPatch {
    let mut patch = FilterPatch::new();
    for input in inputs {
        let value = input
            .value
            .clone()
            .filter(|value| !value.is_empty());
        patch.insert(input.descriptor.key.clone(), value);
    }
    patch
}

fn render_value(value: &FilterValue, options: &[SelectOption]) -> String {
    match value {
        FilterValue::Text(text) => text.clone(),
        FilterValue::Number(_) => encode_value(value),
        FilterValue::Flag(true) => "Yes".to_string(),
        FilterValue::Flag(false) => "No".to_string(),
        FilterValue::Date(date) => date.format(DATE_FORMAT).to_string(),
        FilterValue::DateRange(range) => match (range.start(), range.end()) {
            (Some(start), Some(end)) => format!(
                "{} to {}",
                start.format(DATE_FORMAT),
                end.format(DATE_FORMAT)
            ),
            (Some(start), None) => format!("from {}", start.format(DATE_FORMAT)),
            (None, Some(end)) => format!("until {}", end.format(DATE_FORMAT)),
            (None, None) => String::new(),
        },
        FilterValue::Choice(choice) => resolve_label(choice, options),
        FilterValue::Choices(values) => values
            .iter()
            .map(|value| resolve_label(value, options))
            .collect::<Vec<_>>()
            .join(", "),
    }
}

fn resolve_label(value: &str, options: &[SelectOption]) -> String {
    options
        .iter()
        .find(|option| option.value == value)
        .map(|option| option.label.clone())
        .unwrap_or_else(|| value.to_string())
}
