use std::fmt;

use indexmap::IndexMap;
use url::form_urlencoded;

/// An in-app navigation target: a path plus its query parameters.
///
/// Query values are stored decoded; percent-encoding is applied when the
/// location is rendered back to a string. Keys are unique; multi-valued
/// fields are comma-joined by the codec before they reach the query.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Location {
    path: String,
    query: IndexMap<String, String>,
}

impl Location {
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            query: IndexMap::new(),
        }
    }

    pub fn with_query(path: impl Into<String>, query: IndexMap<String, String>) -> Self {
        Self {
            path: path.into(),
            query,
        }
    }

    /// Parses a `path?query` string. A missing query part yields an empty
    /// parameter map; a repeated key keeps the last occurrence.
    pub fn parse(raw: &str) -> Self {
        match raw.split_once('?') {
            Some((path, query)) => {
                let mut pairs = IndexMap::new();
                for (key, value) in form_urlencoded::parse(query.as_bytes()) {
                    pairs.insert(key.into_owned(), value.into_owned());
                }
                Self {
                    path: path.to_string(),
                    query: pairs,
                }
            }
            None => Self::new(raw),
        }
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn query(&self) -> &IndexMap<String, String> {
        &self.query
    }

    pub fn param(&self, key: &str) -> Option<&str> {
        self.query.get(key).map(String::as_str)
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.query.is_empty() {
            return write!(f, "{}", self.path);
        }
        let mut serializer = form_urlencoded::Serializer::new(String::new());
        for (key, value) in &self.query {
            serializer.append_pair(key, value);
        }
        write!(f, "{}?{}", self.path, serializer.finish())
    }
}
