use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use url::Url;

use crate::{
    classify::{classify, StreamClassification},
    error::{ReceiverError, ReceiverResult},
    header::{HeaderSet, HeaderStore},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum StreamType {
    Buffered,
    Live,
    #[serde(other)]
    None,
}

/// Application-defined payload of a LOAD.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomData {
    /// Raw header payload. Parsed leniently by [`HeaderSet::from_json`].
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub headers: Option<Value>,

    #[serde(
        default,
        deserialize_with = "lenient_bool",
        skip_serializing_if = "Option::is_none"
    )]
    pub is_live: Option<bool>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Media description carried by a LOAD command.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoadRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content_id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content_type: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stream_type: Option<StreamType>,

    #[serde(
        default,
        deserialize_with = "lenient_custom_data",
        skip_serializing_if = "Option::is_none"
    )]
    pub custom_data: Option<CustomData>,
}

/// Accepts `true`/`false`, their string spellings and `0`/`1`.
fn lenient_bool<'de, D>(deserializer: D) -> Result<Option<bool>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        None | Some(Value::Null) => None,
        Some(Value::Bool(b)) => Some(b),
        Some(Value::String(s)) if s.eq_ignore_ascii_case("true") => Some(true),
        Some(Value::String(s)) if s.eq_ignore_ascii_case("false") => Some(false),
        Some(Value::Number(n)) if n.as_u64() == Some(1) => Some(true),
        Some(Value::Number(n)) if n.as_u64() == Some(0) => Some(false),
        Some(other) => {
            log::warn!("Ignoring customData.isLive: unsupported value {other}");
            None
        }
    })
}

/// `customData` belongs to the sender, so a malformed one is dropped
/// instead of failing the whole LOAD.
fn lenient_custom_data<'de, D>(deserializer: D) -> Result<Option<CustomData>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        None | Some(Value::Null) => None,
        Some(value @ Value::Object(_)) => match serde_json::from_value(value) {
            Ok(custom_data) => Some(custom_data),
            Err(e) => {
                log::warn!("Ignoring malformed customData: {e}");
                None
            }
        },
        Some(_) => {
            log::warn!("Ignoring customData: not an object");
            None
        }
    })
}

impl LoadRequest {
    pub fn new(content_id: impl Into<String>) -> Self {
        Self {
            content_id: Some(content_id.into()),
            ..Default::default()
        }
    }

    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = Some(content_type.into());
        self
    }

    pub fn with_stream_type(mut self, stream_type: StreamType) -> Self {
        self.stream_type = Some(stream_type);
        self
    }

    pub fn with_headers(mut self, headers: &HeaderSet) -> ReceiverResult<Self> {
        let headers = serde_json::to_value(headers)?;
        self.custom_data.get_or_insert_with(Default::default).headers = Some(headers);
        Ok(self)
    }

    pub fn with_live_hint(mut self, is_live: bool) -> Self {
        self.custom_data.get_or_insert_with(Default::default).is_live = Some(is_live);
        self
    }

    pub fn from_json(data: &str) -> ReceiverResult<Self> {
        Ok(serde_json::from_str(data)?)
    }

    /// Content id, if present and not blank.
    pub fn locator(&self) -> Option<&str> {
        self.content_id
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadSummary {
    pub classification: StreamClassification,
    pub header_count: usize,
}

#[derive(Debug)]
pub struct Interception {
    /// The request to hand back to the host, corrected when accepted.
    pub request: LoadRequest,
    pub outcome: ReceiverResult<LoadSummary>,
}

/// Validate and correct a LOAD, then install its headers into `store`.
///
/// A rejected LOAD is returned untouched and leaves `store` as it was.
pub fn intercept_load(store: &mut HeaderStore, mut request: LoadRequest) -> Interception {
    let Some(locator) = request.locator().map(str::to_string) else {
        log::error!("Rejecting LOAD without content id");
        return Interception {
            request,
            outcome: Err(ReceiverError::MissingContentId),
        };
    };

    if let Err(e) = Url::parse(&locator) {
        log::warn!("Content id is not an absolute URL ({e}), classifying it as-is");
    }

    let custom_data = request.custom_data.as_ref();
    let classification = classify(
        &locator,
        request.stream_type,
        custom_data.and_then(|c| c.is_live),
    );
    let headers = custom_data
        .and_then(|c| c.headers.as_ref())
        .map(HeaderSet::from_json)
        .unwrap_or_default();

    if let Some(content_type) = classification.content_type {
        if request.content_type.as_deref() != Some(content_type) {
            log::info!(
                "Content type corrected: {} -> {content_type}",
                request.content_type.as_deref().unwrap_or("<none>")
            );
        }
        request.content_type = Some(content_type.to_string());
    }
    if request.stream_type != Some(classification.stream_type) {
        log::info!(
            "Stream type corrected: {:?} -> {:?} ({:?})",
            request.stream_type,
            classification.stream_type,
            classification.signals
        );
    }
    request.stream_type = Some(classification.stream_type);

    let header_count = headers.len();
    store.replace(headers);

    Interception {
        request,
        outcome: Ok(LoadSummary {
            classification,
            header_count,
        }),
    }
}
