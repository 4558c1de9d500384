//! Error types for the DeepL client.
//!
//! # Design
//! Four failure families are kept apart so callers can react to each one
//! differently:
//! - `ValidationError`: the request was rejected locally, nothing was sent.
//! - `TransportError`: the HTTP exchange itself failed (DNS, connect, timeout).
//! - `ApiError`: the server answered with a non-200 status, classified by code.
//! - `MalformedResponse`: the server answered 200 with an unexpected body.

use std::error::Error as StdError;

use thiserror::Error;

/// Non-standard status code DeepL uses for "quota exceeded".
pub const STATUS_QUOTA_EXCEEDED: u16 = 456;

/// A convenience alias for `Result<T, Error>`.
pub type Result<T> = std::result::Result<T, Error>;

/// Top-level error returned by every client operation.
#[derive(Debug, Error)]
pub enum Error {
    #[error("invalid request: {0}")]
    InvalidRequest(#[from] ValidationError),

    #[error("transport failure: {0}")]
    Transport(#[from] TransportError),

    #[error(transparent)]
    Api(#[from] ApiError),

    /// The server returned 200 but the body did not match the expected schema.
    #[error("malformed response: {0}")]
    MalformedResponse(String),

    /// A document job reached the `error` state.
    #[error("document translation failed: {message}")]
    DocumentTranslation { message: String },

    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// Request rejected before any network I/O.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("'{0}' must not be empty")]
    Empty(&'static str),

    #[error("'{0}' must not be omitted")]
    Missing(&'static str),

    #[error("body size of {size} bytes exceeds the maximum of {limit} bytes")]
    BodyTooLarge { size: usize, limit: usize },
}

impl ValidationError {
    /// The request field that failed validation, if the failure is field-specific.
    pub fn field(&self) -> Option<&'static str> {
        match self {
            ValidationError::Empty(field) | ValidationError::Missing(field) => Some(field),
            ValidationError::BodyTooLarge { .. } => None,
        }
    }
}

/// Classified non-200 answer from the API. The message is the `message`
/// field of the JSON error body when the server sent one.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ApiError {
    #[error("server returned status code 400 (wrong request){}", detail(.0))]
    WrongRequest(Option<String>),

    #[error("server returned status code 403 (authorization failed){}", detail(.0))]
    AuthFailed(Option<String>),

    #[error("server returned status code 404 (not found){}", detail(.0))]
    NotFound(Option<String>),

    #[error("server returned status code 413 (request entity too large){}", detail(.0))]
    RequestEntityTooLarge(Option<String>),

    #[error("server returned status code 429 (too many requests){}", detail(.0))]
    TooManyRequests(Option<String>),

    #[error("server returned status code 456 (quota exceeded){}", detail(.0))]
    QuotaExceeded(Option<String>),

    #[error("server returned unexpected status code: {0}")]
    UnexpectedStatus(u16),
}

fn detail(message: &Option<String>) -> String {
    match message {
        Some(message) => format!(": {message:?}"),
        None => String::new(),
    }
}

impl ApiError {
    pub fn status(&self) -> u16 {
        match self {
            ApiError::WrongRequest(_) => 400,
            ApiError::AuthFailed(_) => 403,
            ApiError::NotFound(_) => 404,
            ApiError::RequestEntityTooLarge(_) => 413,
            ApiError::TooManyRequests(_) => 429,
            ApiError::QuotaExceeded(_) => STATUS_QUOTA_EXCEEDED,
            ApiError::UnexpectedStatus(status) => *status,
        }
    }

    pub fn message(&self) -> Option<&str> {
        match self {
            ApiError::WrongRequest(message)
            | ApiError::AuthFailed(message)
            | ApiError::NotFound(message)
            | ApiError::RequestEntityTooLarge(message)
            | ApiError::TooManyRequests(message)
            | ApiError::QuotaExceeded(message) => message.as_deref(),
            ApiError::UnexpectedStatus(_) => None,
        }
    }
}

/// Failure below the HTTP status layer, passed through unclassified.
#[derive(Debug, Error)]
#[error("{source}")]
pub struct TransportError {
    #[source]
    source: Box<dyn StdError + Send + Sync>,
}

impl TransportError {
    pub fn new(source: impl Into<Box<dyn StdError + Send + Sync>>) -> Self {
        Self {
            source: source.into(),
        }
    }
}

/// Invalid or incomplete client configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("environment variable {0} is not set")]
    MissingVar(&'static str),

    #[error("invalid value {value:?} for {name}")]
    InvalidValue { name: &'static str, value: String },

    #[error("invalid endpoint url {url:?}: {reason}")]
    InvalidEndpoint { url: String, reason: String },
}
