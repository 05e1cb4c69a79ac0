use thiserror::Error;

#[derive(Error, Debug)]
pub enum ReceiverError {
    #[error("LOAD request has no content id")]
    MissingContentId,

    #[error("HTTP error: {0}")]
    HttpError(reqwest::StatusCode),

    #[error("Invalid m3u8 file: {0}")]
    M3u8ParseError(String),

    #[error("Master playlist has no variant")]
    NoVariant,

    #[error("Host unavailable: {0}")]
    HostUnavailable(String),

    #[error(transparent)]
    IOError(#[from] std::io::Error),

    #[error(transparent)]
    UrlParseError(#[from] url::ParseError),

    #[error(transparent)]
    RequestError(#[from] reqwest::Error),

    #[error(transparent)]
    JsonError(#[from] serde_json::Error),
}

impl ReceiverError {
    /// Detailed error code reported alongside an ERROR playback event.
    ///
    /// HTTP failures carry their status so observers can single out 401/403.
    pub fn detailed_code(&self) -> String {
        match self {
            Self::HttpError(status) => format!("NETWORK_HTTP_{}", status.as_u16()),
            Self::RequestError(e) => match e.status() {
                Some(status) => format!("NETWORK_HTTP_{}", status.as_u16()),
                None => "NETWORK_REQUEST".to_string(),
            },
            Self::M3u8ParseError(_) | Self::NoVariant => "MANIFEST_PARSE".to_string(),
            Self::MissingContentId => "LOAD_INVALID".to_string(),
            Self::UrlParseError(_) => "LOAD_INVALID_URL".to_string(),
            Self::HostUnavailable(_) => "HOST_UNAVAILABLE".to_string(),
            Self::IOError(_) | Self::JsonError(_) => "GENERIC".to_string(),
        }
    }
}

pub type ReceiverResult<T> = Result<T, ReceiverError>;
