use std::collections::BTreeMap;

use url::Url;

use crate::header::HeaderSet;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestKind {
    Manifest,
    Segment,
    License,
}

/// An outbound fetch the host is about to issue.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NetworkRequest {
    pub kind: RequestKind,
    pub url: Url,
    pub headers: BTreeMap<String, String>,
}

impl NetworkRequest {
    pub fn new(kind: RequestKind, url: Url) -> Self {
        Self {
            kind,
            url,
            headers: BTreeMap::new(),
        }
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    /// Header value, compared case-insensitively like HTTP does.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

/// Force the session headers onto `request`, overwriting host defaults.
pub fn augment(headers: &HeaderSet, request: &mut NetworkRequest) {
    for (name, value) in headers.iter() {
        // drop host defaults spelled differently so only one copy is sent
        request
            .headers
            .retain(|k, _| k == name || !k.eq_ignore_ascii_case(name));
        request.headers.insert(name.clone(), value.clone());
    }
}
