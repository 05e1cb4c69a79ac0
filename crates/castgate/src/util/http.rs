use std::str::FromStr;

use bytes::Bytes;
use reqwest::{
    header::{HeaderMap, HeaderName, HeaderValue},
    Client, ClientBuilder,
};

use crate::{
    error::{ReceiverError, ReceiverResult},
    request::NetworkRequest,
};

#[derive(Clone, Default)]
pub struct HttpClient {
    client: Client,
}

impl HttpClient {
    pub fn new(builder: ClientBuilder) -> ReceiverResult<Self> {
        let client = builder
            .build()
            .map_err(|e| ReceiverError::HostUnavailable(e.to_string()))?;
        Ok(Self { client })
    }

    pub async fn fetch(&self, request: &NetworkRequest) -> ReceiverResult<Bytes> {
        log::debug!("Fetching {:?} {}", request.kind, request.url);

        let response = self
            .client
            .get(request.url.clone())
            .headers(to_header_map(request))
            .send()
            .await?;
        if !response.status().is_success() {
            let status = response.status();
            if let Ok(body) = response.text().await {
                tracing::warn!("Error body: {body}");
            }
            return Err(ReceiverError::HttpError(status));
        }

        Ok(response.bytes().await?)
    }
}

/// Headers that can not be expressed on the wire are skipped.
fn to_header_map(request: &NetworkRequest) -> HeaderMap {
    let mut headers = HeaderMap::with_capacity(request.headers.len());
    for (name, value) in &request.headers {
        let Ok(header_name) = HeaderName::from_str(name) else {
            log::warn!("Skipping invalid header name: {name}");
            continue;
        };
        let Ok(header_value) = HeaderValue::from_str(value) else {
            log::warn!("Skipping header {name}: invalid value");
            continue;
        };
        headers.insert(header_name, header_value);
    }
    headers
}
