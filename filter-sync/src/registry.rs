//! The filter-configuration registry: which list routes have filters, what
//! their defaults are, and which fields they render.
//!
//! The registry is assembled once at startup through [`RegistryBuilder`] and
//! is immutable afterwards; every structural rule (unique routes, unique
//! fields, defaults that match their field's kind) is checked at
//! construction so the engine never has to re-validate at runtime.

use indexmap::IndexMap;

use crmdesk_filter_model::fields::FieldKind;
use crmdesk_filter_model::fields::FilterFieldDescriptor;
use crmdesk_filter_model::fields::universal_fields;
use crmdesk_filter_model::value::FilterState;
use crmdesk_filter_model::value::FilterValue;

use crate::error::RegistryError;

/// Filter configuration for one registered list route.
#[derive(Debug, Clone)]
pub struct RouteFilterConfig {
    route_key: String,
    defaults: FilterState,
    fields: Vec<FilterFieldDescriptor>,
    tracked: Vec<FilterFieldDescriptor>,
}

impl RouteFilterConfig {
    pub fn route_key(&self) -> &str {
        &self.route_key
    }

    pub fn defaults(&self) -> &FilterState {
        &self.defaults
    }

    /// The route's declared input fields: static-option fields first, then
    /// dynamically-populated fields, each group in registration order.
    pub fn fields(&self) -> &[FilterFieldDescriptor] {
        &self.fields
    }

    /// Declared fields plus the universal keys (`page`, `limit`, `sortBy`,
    /// `sortOrder`, `search`); this is the set the engine reads from and
    /// writes to the URL.
    pub fn tracked_fields(&self) -> &[FilterFieldDescriptor] {
        &self.tracked
    }

    pub fn tracked_field(&self, key: &str) -> Option<&FilterFieldDescriptor> {
        self.tracked.iter().find(|field| field.key == key)
    }
}

/// Builder for one route's filter configuration.
pub struct RouteConfigBuilder {
    route_key: String,
    defaults: FilterState,
    static_fields: Vec<FilterFieldDescriptor>,
    dynamic_fields: Vec<FilterFieldDescriptor>,
}

impl RouteConfigBuilder {
    pub fn new(route_key: impl Into<String>) -> Self {
        Self {
            route_key: route_key.into(),
            defaults: FilterState::new(),
            static_fields: Vec::new(),
            dynamic_fields: Vec::new(),
        }
    }

    pub fn default_value(mut self, key: impl Into<String>, value: FilterValue) -> Self {
        self.defaults.insert(key.into(), value);
        self
    }

    /// Registers a field. Static and dynamic fields keep separate ordering
    /// so the rendered form always lists static inputs first.
    pub fn field(mut self, descriptor: FilterFieldDescriptor) -> Self {
        if descriptor.is_dynamic() {
            self.dynamic_fields.push(descriptor);
        } else {
            self.static_fields.push(descriptor);
        }
        self
    }

    fn build(self) -> Result<RouteFilterConfig, RegistryError> {
        let route = self.route_key;
        let mut fields = self.static_fields;
        fields.extend(self.dynamic_fields);

        for (index, field) in fields.iter().enumerate() {
            if fields[..index].iter().any(|other| other.key == field.key) {
                return Err(RegistryError::DuplicateField {
                    route,
                    field: field.key.clone(),
                });
            }
            validate_bounds(&route, field)?;
        }

        let mut tracked = fields.clone();
        for universal in universal_fields() {
            if !tracked.iter().any(|field| field.key == universal.key) {
                tracked.push(universal);
            }
        }

        for (key, value) in &self.defaults {
            let Some(field) = tracked.iter().find(|field| field.key == *key) else {
                return Err(RegistryError::UnknownDefaultField {
                    route,
                    field: key.clone(),
                });
            };
            if !value_matches_kind(value, &field.kind) {
                return Err(RegistryError::MismatchedDefault {
                    route,
                    field: key.clone(),
                });
            }
        }

        Ok(RouteFilterConfig {
            route_key: route,
            defaults: self.defaults,
            fields,
            tracked,
        })
    }
}

/// Read-only catalogue of route filter configurations.
#[derive(Debug)]
pub struct FilterRegistry {
    routes: IndexMap<String, RouteFilterConfig>,
}

impl FilterRegistry {
    pub fn builder() -> RegistryBuilder {
        RegistryBuilder::new()
    }

    pub fn config(&self, route_key: &str) -> Option<&RouteFilterConfig> {
        self.routes.get(route_key)
    }

    pub fn fields(&self, route_key: &str) -> &[FilterFieldDescriptor] {
        self.config(route_key)
            .map(RouteFilterConfig::fields)
            .unwrap_or_default()
    }

    pub fn defaults(&self, route_key: &str) -> Option<&FilterState> {
        self.config(route_key).map(RouteFilterConfig::defaults)
    }

    /// The allow-list of filterable list routes, in registration order.
    pub fn route_keys(&self) -> impl Iterator<Item = &str> {
        self.routes.keys().map(String::as_str)
    }
}

#[derive(Default)]
pub struct RegistryBuilder {
    routes: Vec<RouteConfigBuilder>,
}

impl RegistryBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn route(mut self, route: RouteConfigBuilder) -> Self {
        self.routes.push(route);
        self
    }

    pub fn build(self) -> Result<FilterRegistry, RegistryError> {
        let mut routes = IndexMap::new();
        for builder in self.routes {
            let config = builder.build()?;
            let key = config.route_key().to_string();
            if routes.insert(key.clone(), config).is_some() {
                return Err(RegistryError::DuplicateRoute(key));
            }
        }
        Ok(FilterRegistry { routes })
    }
}

fn validate_bounds(route: &str, field: &FilterFieldDescriptor) -> Result<(), RegistryError> {
    if let FieldKind::Number(bounds) = &field.kind
        && let (Some(min), Some(max)) = (bounds.min, bounds.max)
        && min > max
    {
        return Err(RegistryError::InvalidBounds {
            route: route.to_string(),
            field: field.key.clone(),
            min,
            max,
        });
    }
    Ok(())
}

fn value_matches_kind(value: &FilterValue, kind: &FieldKind) -> bool {
    matches!(
        (value, kind),
        (FilterValue::Text(_), FieldKind::Text)
            | (FilterValue::Number(_), FieldKind::Number(_))
            | (FilterValue::Flag(_), FieldKind::Boolean)
            | (FilterValue::Date(_), FieldKind::Date)
            | (FilterValue::DateRange(_), FieldKind::DateRange)
            | (FilterValue::Choice(_), FieldKind::Select(_))
            | (FilterValue::Choices(_), FieldKind::MultiSelect(_))
    )
}
