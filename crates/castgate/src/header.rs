use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Credentials injected into every outbound fetch of one media session.
///
/// Names keep the spelling the sender supplied. Names are unique ignoring
/// ASCII case, so every entry reaches the wire.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct HeaderSet(BTreeMap<String, String>);

impl HeaderSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a header set from the `customData.headers` payload of a LOAD.
    ///
    /// When names collide ignoring case, the first one in sorted order wins
    /// (`Authorization` over `authorization`).
    pub fn from_json(value: &Value) -> Self {
        let Value::Object(map) = value else {
            log::warn!("customData.headers is not an object, ignoring it");
            return Self::default();
        };

        let mut entries: Vec<_> = map.iter().collect();
        entries.sort_by(|a, b| a.0.cmp(b.0));

        let mut headers = Self::default();
        for (name, value) in entries {
            let value = match value {
                Value::String(s) => s.clone(),
                Value::Number(n) => n.to_string(),
                Value::Bool(b) => b.to_string(),
                _ => {
                    log::warn!("Dropping header {name}: value is not a scalar");
                    continue;
                }
            };
            if let Some(kept) = headers.find_ignore_case(name) {
                log::warn!("Dropping header {name}: duplicates {kept}");
                continue;
            }
            headers.0.insert(name.clone(), value);
        }
        headers
    }

    fn find_ignore_case(&self, name: &str) -> Option<&str> {
        self.names().find(|k| k.eq_ignore_ascii_case(name))
    }

    /// Set a header, replacing any entry whose name differs only in case.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        self.0.retain(|k, _| !k.eq_ignore_ascii_case(&name));
        self.0.insert(name, value.into());
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.0.get(name).map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &String)> {
        self.0.iter()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<K, V> FromIterator<(K, V)> for HeaderSet
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        let mut headers = Self::default();
        for (name, value) in iter {
            headers.insert(name, value);
        }
        headers
    }
}

/// Holds the header set established by the most recent LOAD.
///
/// Every write is a whole-value replacement.
#[derive(Debug, Default)]
pub struct HeaderStore {
    current: HeaderSet,
}

impl HeaderStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn replace(&mut self, headers: HeaderSet) {
        log::debug!(
            "Header store replaced: [{}]",
            headers.names().collect::<Vec<_>>().join(", ")
        );
        self.current = headers;
    }

    pub fn clear(&mut self) {
        self.replace(HeaderSet::new());
    }

    pub fn current(&self) -> &HeaderSet {
        &self.current
    }
}
