use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use serde::Deserialize;
use serde::Serialize;

/// Universal query keys tracked on every registered list route, in addition
/// to the route's own field descriptors.
pub const PAGE: &str = "page";
pub const LIMIT: &str = "limit";
pub const SORT_BY: &str = "sortBy";
pub const SORT_ORDER: &str = "sortOrder";
pub const SEARCH: &str = "search";

/// A selectable value/label pair offered by a select-type field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectOption {
    pub value: String,
    pub label: String,
}

impl SelectOption {
    pub fn new(value: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            label: label.into(),
        }
    }
}

/// Asynchronous supplier of options for a select field backed by another
/// collection (e.g. "pick an instructor"). The core only consumes this
/// contract, never the entity-fetching logic behind it.
#[async_trait]
pub trait OptionProvider: Send + Sync {
    async fn options(&self) -> anyhow::Result<Vec<SelectOption>>;
}

/// Where a select field's options come from. A select field carries a source
/// by construction, so "select with no options" is unrepresentable.
#[derive(Clone)]
pub enum OptionSource {
    Static(Vec<SelectOption>),
    Provider(Arc<dyn OptionProvider>),
}

impl OptionSource {
    pub fn is_dynamic(&self) -> bool {
        matches!(self, OptionSource::Provider(_))
    }
}

impl fmt::Debug for OptionSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OptionSource::Static(options) => f.debug_tuple("Static").field(options).finish(),
            OptionSource::Provider(_) => f.debug_tuple("Provider").finish(),
        }
    }
}

/// Inclusive bounds and step hint for a numeric field. Values outside the
/// bounds fail to decode and are dropped rather than clamped.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct NumberBounds {
    pub min: Option<f64>,
    pub max: Option<f64>,
    pub step: Option<f64>,
}

impl NumberBounds {
    pub fn at_least(min: f64) -> Self {
        Self {
            min: Some(min),
            ..Self::default()
        }
    }

    pub fn between(min: f64, max: f64) -> Self {
        Self {
            min: Some(min),
            max: Some(max),
            step: None,
        }
    }

    pub fn contains(&self, value: f64) -> bool {
        if let Some(min) = self.min
            && value < min
        {
            return false;
        }
        if let Some(max) = self.max
            && value > max
        {
            return false;
        }
        true
    }
}

/// The kind of input a filter field renders as, together with the data that
/// kind needs.
#[derive(Debug, Clone)]
pub enum FieldKind {
    Text,
    Number(NumberBounds),
    Boolean,
    Date,
    DateRange,
    Select(OptionSource),
    MultiSelect(OptionSource),
}

impl FieldKind {
    /// Dynamic fields resolve their option list through a provider at route
    /// activation time.
    pub fn is_dynamic(&self) -> bool {
        self.option_source().is_some_and(OptionSource::is_dynamic)
    }

    pub fn option_source(&self) -> Option<&OptionSource> {
        match self {
            FieldKind::Select(source) | FieldKind::MultiSelect(source) => Some(source),
            _ => None,
        }
    }
}

/// Describes one filter input on a list route.
#[derive(Debug, Clone)]
pub struct FilterFieldDescriptor {
    pub key: String,
    pub label: String,
    pub kind: FieldKind,
}

impl FilterFieldDescriptor {
    pub fn new(key: impl Into<String>, label: impl Into<String>, kind: FieldKind) -> Self {
        Self {
            key: key.into(),
            label: label.into(),
            kind,
        }
    }

    pub fn text(key: impl Into<String>, label: impl Into<String>) -> Self {
        Self::new(key, label, FieldKind::Text)
    }

    pub fn number(key: impl Into<String>, label: impl Into<String>, bounds: NumberBounds) -> Self {
        Self::new(key, label, FieldKind::Number(bounds))
    }

    pub fn boolean(key: impl Into<String>, label: impl Into<String>) -> Self {
        Self::new(key, label, FieldKind::Boolean)
    }

    pub fn date(key: impl Into<String>, label: impl Into<String>) -> Self {
        Self::new(key, label, FieldKind::Date)
    }

    pub fn date_range(key: impl Into<String>, label: impl Into<String>) -> Self {
        Self::new(key, label, FieldKind::DateRange)
    }

    pub fn select_static(
        key: impl Into<String>,
        label: impl Into<String>,
        options: Vec<SelectOption>,
    ) -> Self {
        Self::new(key, label, FieldKind::Select(OptionSource::Static(options)))
    }

    pub fn select_provider(
        key: impl Into<String>,
        label: impl Into<String>,
        provider: Arc<dyn OptionProvider>,
    ) -> Self {
        Self::new(
            key,
            label,
            FieldKind::Select(OptionSource::Provider(provider)),
        )
    }

    pub fn multi_select_static(
        key: impl Into<String>,
        label: impl Into<String>,
        options: Vec<SelectOption>,
    ) -> Self {
        Self::new(
            key,
            label,
            FieldKind::MultiSelect(OptionSource::Static(options)),
        )
    }

    pub fn multi_select_provider(
        key: impl Into<String>,
        label: impl Into<String>,
        provider: Arc<dyn OptionProvider>,
    ) -> Self {
        Self::new(
            key,
            label,
            FieldKind::MultiSelect(OptionSource::Provider(provider)),
        )
    }

    pub fn is_dynamic(&self) -> bool {
        self.kind.is_dynamic()
    }
}

/// The field descriptors for the universal query keys. Every registered
/// route tracks these in addition to its own descriptors; `page` and `limit`
/// reject values below 1 instead of clamping them.
pub fn universal_fields() -> Vec<FilterFieldDescriptor> {
    vec![
        FilterFieldDescriptor::number(PAGE, "Page", NumberBounds::at_least(1.0)),
        FilterFieldDescriptor::number(LIMIT, "Per page", NumberBounds::at_least(1.0)),
        FilterFieldDescriptor::text(SORT_BY, "Sort by"),
        FilterFieldDescriptor::select_static(
            SORT_ORDER,
            "Sort order",
            vec![
                SelectOption::new("asc", "Ascending"),
                SelectOption::new("desc", "Descending"),
            ],
        ),
        FilterFieldDescriptor::text(SEARCH, "Search"),
    ]
}
