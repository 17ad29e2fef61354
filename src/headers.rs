//! Ordered, case-preserving header collection
//!
//! Stub servers echo header names back the way the client spelled them, so
//! this collection keeps the original casing and insertion order while
//! comparing names ASCII case-insensitively. `http::HeaderMap` lowercases
//! names, which is why it is only used at the edges (see
//! [`Headers::to_header_map`] and the `From<&HeaderMap>` impl).

use std::fmt;

use http::header::{HeaderMap, HeaderName, HeaderValue};
use serde::{Deserialize, Serialize};

use crate::error::RewriteError;

/// Ordered multi-map of header name to values.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Headers {
    entries: Vec<(String, String)>,
}

impl Headers {
    /// Create an empty header collection.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style [`Headers::append`].
    pub fn with(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.append(name, value);
        self
    }

    /// Add a value without touching existing values for the same name.
    pub fn append(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.entries.push((name.into(), value.into()));
    }

    /// Replace every value for `name` with a single `value`.
    ///
    /// The header keeps the position of its first occurrence; the new
    /// spelling of the name wins.
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();

        match self.position(&name) {
            Some(first) => {
                self.entries[first] = (name.clone(), value);
                let mut index = 0;
                self.entries.retain(|(existing, _)| {
                    let keep = index <= first || !existing.eq_ignore_ascii_case(&name);
                    index += 1;
                    keep
                });
            }
            None => self.entries.push((name, value)),
        }
    }

    /// Remove all values for `name`, returning how many were dropped.
    pub fn remove(&mut self, name: &str) -> usize {
        let before = self.entries.len();
        self.entries
            .retain(|(existing, _)| !existing.eq_ignore_ascii_case(name));
        before - self.entries.len()
    }

    /// First value for `name`.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(existing, _)| existing.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    /// All values for `name`, in insertion order.
    pub fn get_all<'a, 'n>(&'a self, name: &'n str) -> impl Iterator<Item = &'a str> + 'n
    where
        'a: 'n,
    {
        self.entries
            .iter()
            .filter(move |(existing, _)| existing.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    /// Whether at least one value exists for `name`.
    pub fn contains(&self, name: &str) -> bool {
        self.position(name).is_some()
    }

    /// Distinct header names in order of first appearance.
    pub fn keys(&self) -> Vec<&str> {
        let mut keys: Vec<&str> = Vec::new();
        for (name, _) in &self.entries {
            if !keys.iter().any(|seen| seen.eq_ignore_ascii_case(name)) {
                keys.push(name);
            }
        }
        keys
    }

    /// Iterate over `(name, value)` pairs in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries
            .iter()
            .map(|(name, value)| (name.as_str(), value.as_str()))
    }

    /// Number of `(name, value)` entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the collection holds no headers.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Convert into an `http::HeaderMap`.
    ///
    /// # Errors
    ///
    /// Returns [`RewriteError`] if a name or value is not legal HTTP.
    pub fn to_header_map(&self) -> Result<HeaderMap, RewriteError> {
        let mut map = HeaderMap::with_capacity(self.entries.len());
        for (name, value) in &self.entries {
            let header_name =
                HeaderName::from_bytes(name.as_bytes()).map_err(|e| {
                    RewriteError::InvalidHeaderName {
                        name: name.clone(),
                        reason: e.to_string(),
                    }
                })?;
            map.append(header_name, header_value(name, value)?);
        }
        Ok(map)
    }

    fn position(&self, name: &str) -> Option<usize> {
        self.entries
            .iter()
            .position(|(existing, _)| existing.eq_ignore_ascii_case(name))
    }
}

/// Parse `value` as an HTTP header value destined for `name`.
pub(crate) fn header_value(name: &str, value: &str) -> Result<HeaderValue, RewriteError> {
    HeaderValue::from_str(value).map_err(|e| RewriteError::InvalidHeaderValue {
        name: name.to_string(),
        reason: e.to_string(),
    })
}

/// Media-type portion of a Content-Type value, without parameters.
///
/// ```rust
/// use cors_stub_headers::headers::mime_type_part;
///
/// assert_eq!(mime_type_part("text/html; charset=utf-8"), "text/html");
/// ```
pub fn mime_type_part(content_type: &str) -> &str {
    content_type.split(';').next().unwrap_or_default().trim()
}

impl From<&HeaderMap> for Headers {
    fn from(map: &HeaderMap) -> Self {
        map.iter()
            .map(|(name, value)| {
                (
                    name.as_str().to_string(),
                    String::from_utf8_lossy(value.as_bytes()).into_owned(),
                )
            })
            .collect()
    }
}

impl<K, V> FromIterator<(K, V)> for Headers
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            entries: iter
                .into_iter()
                .map(|(name, value)| (name.into(), value.into()))
                .collect(),
        }
    }
}

impl fmt::Display for Headers {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[")?;
        for (i, (name, value)) in self.entries.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{}: {}", name, value)?;
        }
        f.write_str("]")
    }
}
