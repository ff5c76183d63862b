use std::path::PathBuf;

use thiserror::Error;

/// Construction-time registry failures. The registry is validated once at
/// startup; none of these can occur mid-session.
#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("route `{0}` is registered more than once")]
    DuplicateRoute(String),

    #[error("route `{route}` declares field `{field}` more than once")]
    DuplicateField { route: String, field: String },

    #[error("route `{route}` has a default for unknown field `{field}`")]
    UnknownDefaultField { route: String, field: String },

    #[error("route `{route}` default for `{field}` does not match the field's kind")]
    MismatchedDefault { route: String, field: String },

    #[error("route `{route}` field `{field}` has min {min} greater than max {max}")]
    InvalidBounds {
        route: String,
        field: String,
        min: f64,
        max: f64,
    },
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config at `{path}`")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config at `{path}`")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("debounce_ms must be greater than zero")]
    ZeroDebounce,
}
