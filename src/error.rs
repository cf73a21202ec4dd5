//! Error types for the content API and site configuration

use thiserror::Error;

/// Errors raised while talking to the content API or normalizing its documents
#[derive(Error, Debug)]
pub enum ApiError {
    /// Transport-level failure (DNS, TLS, connection reset, ...)
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The API answered with a non-success status
    #[error("{url} responded with status {status}")]
    Status { status: u16, url: String },

    /// The response body did not match the expected shape
    #[error("Failed to decode API response: {0}")]
    Decode(#[from] serde_json::Error),

    /// No document of the given type carries this uid
    #[error("No {document_type} document with uid '{uid}'")]
    NotFound { document_type: String, uid: String },

    /// A pagination cursor that is not an absolute http(s) URL
    #[error("Invalid cursor '{cursor}': {reason}")]
    InvalidCursor { cursor: String, reason: String },

    /// A cursor pointing outside the configured API host
    #[error("Cursor host '{host}' does not match the API host '{expected}'")]
    ForeignCursor { host: String, expected: String },

    /// The API metadata endpoint did not advertise a master ref
    #[error("The API did not report a master ref")]
    NoMasterRef,

    /// A document came back without the uid used for routing
    #[error("Document {id} has no uid")]
    MissingIdentifier { id: String },

    /// A uid lookup returned a different document than requested
    #[error("Requested uid '{expected}' but the API returned '{found}'")]
    IdentifierMismatch { expected: String, found: String },
}

impl ApiError {
    /// Whether this error means the requested document does not exist
    pub fn is_not_found(&self) -> bool {
        matches!(self, ApiError::NotFound { .. })
    }
}

/// Result alias for content API calls
pub type ApiResult<T> = std::result::Result<T, ApiError>;

/// Invalid site configuration
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse config: {0}")]
    Parse(#[from] serde_yaml::Error),

    #[error("Failed to read .env file: {0}")]
    Dotenv(#[from] dotenvy::Error),

    #[error("Invalid environment variable: {0}")]
    Env(#[from] envy::Error),

    #[error("Unknown locale '{0}'")]
    UnknownLocale(String),

    #[error("Unknown timezone '{0}'")]
    UnknownTimezone(String),

    #[error("Invalid API endpoint '{endpoint}': {reason}")]
    InvalidEndpoint { endpoint: String, reason: String },

    #[error("words_per_minute must be greater than zero")]
    ZeroWordsPerMinute,
}
