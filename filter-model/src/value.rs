use chrono::NaiveDate;
use indexmap::IndexMap;

/// The merged filter state for the active route: field key to typed value.
/// Insertion order is contractual; it drives the canonical query encoding.
pub type FilterState = IndexMap<String, FilterValue>;

/// A partial update applied onto the current effective state. `Some` sets a
/// field, `None` clears it, absent keys are left untouched.
pub type FilterPatch = IndexMap<String, Option<FilterValue>>;

/// A typed filter value, one variant per field kind.
#[derive(Debug, Clone, PartialEq)]
pub enum FilterValue {
    Text(String),
    Number(f64),
    Flag(bool),
    Date(NaiveDate),
    DateRange(DateRange),
    Choice(String),
    Choices(Vec<String>),
}

impl FilterValue {
    pub fn text(value: impl Into<String>) -> Self {
        FilterValue::Text(value.into())
    }

    pub fn choice(value: impl Into<String>) -> Self {
        FilterValue::Choice(value.into())
    }

    pub fn choices<I, S>(values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        FilterValue::Choices(values.into_iter().map(Into::into).collect())
    }

    /// Empty values are omitted from the URL; absence means "not set".
    pub fn is_empty(&self) -> bool {
        match self {
            FilterValue::Text(text) => text.is_empty(),
            FilterValue::Choice(choice) => choice.is_empty(),
            FilterValue::Choices(values) => values.is_empty(),
            FilterValue::Number(_)
            | FilterValue::Flag(_)
            | FilterValue::Date(_)
            | FilterValue::DateRange(_) => false,
        }
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            FilterValue::Number(number) => Some(*number),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            FilterValue::Text(text) => Some(text),
            FilterValue::Choice(choice) => Some(choice),
            _ => None,
        }
    }
}

/// A date interval with at least one bound set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    start: Option<NaiveDate>,
    end: Option<NaiveDate>,
}

impl DateRange {
    /// Returns `None` when both bounds are absent.
    pub fn new(start: Option<NaiveDate>, end: Option<NaiveDate>) -> Option<Self> {
        if start.is_none() && end.is_none() {
            return None;
        }
        Some(Self { start, end })
    }

    pub fn between(start: NaiveDate, end: NaiveDate) -> Self {
        Self {
            start: Some(start),
            end: Some(end),
        }
    }

    pub fn from(start: NaiveDate) -> Self {
        Self {
            start: Some(start),
            end: None,
        }
    }

    pub fn until(end: NaiveDate) -> Self {
        Self {
            start: None,
            end: Some(end),
        }
    }

    pub fn start(&self) -> Option<NaiveDate> {
        self.start
    }

    pub fn end(&self) -> Option<NaiveDate> {
        self.end
    }
}
