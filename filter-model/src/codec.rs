//! Conversion between typed filter values and the string-only query
//! parameter representation.
//!
//! Encoding omits empty values entirely; absence on the wire means "not
//! set". Decoding is permissive: a parameter that fails to parse for its
//! declared field kind is dropped, never surfaced as an error. Default
//! merging is the engine's job, not the codec's.

use chrono::NaiveDate;
use indexmap::IndexMap;

use crate::fields::FieldKind;
use crate::fields::FilterFieldDescriptor;
use crate::value::DateRange;
use crate::value::FilterState;
use crate::value::FilterValue;

pub const DATE_FORMAT: &str = "%Y-%m-%d";
const RANGE_SEPARATOR: &str = "..";
const LIST_SEPARATOR: char = ',';

/// Encodes every non-empty value in `state` to its query-parameter form,
/// preserving the state's key order.
pub fn encode_state(state: &FilterState) -> IndexMap<String, String> {
    let mut params = IndexMap::new();
    for (key, value) in state {
        if value.is_empty() {
            continue;
        }
        params.insert(key.clone(), encode_value(value));
    }
    params
}

pub fn encode_value(value: &FilterValue) -> String {
    match value {
        FilterValue::Text(text) => text.clone(),
        FilterValue::Number(number) => format_number(*number),
        FilterValue::Flag(flag) => flag.to_string(),
        FilterValue::Date(date) => date.format(DATE_FORMAT).to_string(),
        FilterValue::DateRange(range) => {
            let start = range
                .start()
                .map(|date| date.format(DATE_FORMAT).to_string())
                .unwrap_or_default();
            let end = range
                .end()
                .map(|date| date.format(DATE_FORMAT).to_string())
                .unwrap_or_default();
            format!("{start}{RANGE_SEPARATOR}{end}")
        }
        FilterValue::Choice(choice) => choice.clone(),
        FilterValue::Choices(values) => values.join(","),
    }
}

/// Decodes the parameters present in `params` against the given field
/// descriptors. Fields with no parameter are omitted from the result;
/// unparsable values are dropped.
pub fn decode_query(
    params: &IndexMap<String, String>,
    fields: &[FilterFieldDescriptor],
) -> FilterState {
    let mut state = FilterState::new();
    for field in fields {
        let Some(raw) = params.get(&field.key) else {
            continue;
        };
        if let Some(value) = decode_value(raw, &field.kind) {
            state.insert(field.key.clone(), value);
        }
    }
    state
}

pub fn decode_value(raw: &str, kind: &FieldKind) -> Option<FilterValue> {
    if raw.is_empty() {
        return None;
    }
    match kind {
        FieldKind::Text => Some(FilterValue::Text(raw.to_string())),
        FieldKind::Number(bounds) => {
            let number = raw.parse::<f64>().ok()?;
            if !number.is_finite() || !bounds.contains(number) {
                return None;
            }
            Some(FilterValue::Number(number))
        }
        FieldKind::Boolean => match raw {
            "true" => Some(FilterValue::Flag(true)),
            "false" => Some(FilterValue::Flag(false)),
            _ => None,
        },
        FieldKind::Date => NaiveDate::parse_from_str(raw, DATE_FORMAT)
            .ok()
            .map(FilterValue::Date),
        FieldKind::DateRange => decode_range(raw),
        FieldKind::Select(_) => Some(FilterValue::Choice(raw.to_string())),
        FieldKind::MultiSelect(_) => {
            let values: Vec<String> = raw
                .split(LIST_SEPARATOR)
                .filter(|part| !part.is_empty())
                .map(str::to_string)
                .collect();
            if values.is_empty() {
                return None;
            }
            Some(FilterValue::Choices(values))
        }
    }
}

fn decode_range(raw: &str) -> Option<FilterValue> {
    let (start_raw, end_raw) = raw.split_once(RANGE_SEPARATOR)?;
    let start = parse_range_bound(start_raw)?;
    let end = parse_range_bound(end_raw)?;
    DateRange::new(start, end).map(FilterValue::DateRange)
}

/// An empty bound is an open end; a present bound must parse.
fn parse_range_bound(raw: &str) -> Option<Option<NaiveDate>> {
    if raw.is_empty() {
        return Some(None);
    }
    NaiveDate::parse_from_str(raw, DATE_FORMAT).ok().map(Some)
}

/// Integral values print without a fractional suffix so that `page=2` does
/// not round-trip as `page=2.0`.
fn format_number(number: f64) -> String {
    if number.fract() == 0.0 && number.abs() < 1e15 {
        format!("{}", number as i64)
    } else {
        number.to_string()
    }
}
