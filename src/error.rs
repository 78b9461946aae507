use reqwest::StatusCode;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ApiError {
    /// The remote service refused to create a resource that already exists.
    #[error("Resource already exists: {0}")]
    Conflict(String),

    #[error("Resource not found")]
    NotFound,

    #[error("Quotes API returned {status}: {body}")]
    Status { status: StatusCode, body: String },

    #[error("Quotes API request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Malformed response from quotes API: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("Invalid API URL: {0}")]
    InvalidUrl(String),
}

impl ApiError {
    pub const fn is_conflict(&self) -> bool {
        matches!(self, Self::Conflict(_))
    }
}

#[derive(Error, Debug)]
pub enum HandlerError {
    #[error(transparent)]
    Api(#[from] ApiError),

    #[error("Telegram request failed: {0}")]
    Telegram(#[from] teloxide::RequestError),
}

#[derive(Error, Debug)]
pub enum BotError {
    #[error("Invalid configuration: {0}")]
    ConfigInvalid(String),
}
