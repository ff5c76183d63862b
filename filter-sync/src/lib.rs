//! Runtime for the crmdesk filter core: the registry of per-route filter
//! configurations, the query synchronization engine that keeps the effective
//! filter state and the address bar consistent in both directions, the
//! generic filter form controller, and the panel visibility policy.

pub mod builtin;
pub mod config;
pub mod engine;
pub mod error;
pub mod form;
pub mod prefs;
pub mod registry;
pub mod routes;
pub mod session;
pub mod visibility;

pub use builtin::BuiltinProviders;
pub use builtin::builtin_registry;
pub use config::SyncConfig;
pub use engine::AddressBar;
pub use engine::FilterSnapshot;
pub use engine::MemoryAddressBar;
pub use engine::SyncEngine;
pub use error::ConfigError;
pub use error::RegistryError;
pub use form::FieldInput;
pub use form::FilterForm;
pub use prefs::FilePreferenceStore;
pub use prefs::MemoryPreferenceStore;
pub use prefs::PreferenceStore;
pub use registry::FilterRegistry;
pub use registry::RegistryBuilder;
pub use registry::RouteConfigBuilder;
pub use registry::RouteFilterConfig;
pub use session::FilterSession;
pub use visibility::PanelVisibility;
pub use visibility::is_filterable_route;
