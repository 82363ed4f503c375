use thiserror::Error;

/// Errors from the Kitsu API client.
#[derive(Debug, Error)]
pub enum KitsuError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("invalid URL: {0}")]
    Url(#[from] url::ParseError),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("invalid resource id: {0:?}")]
    InvalidId(String),

    #[error("parse error: {0}")]
    Parse(String),
}
