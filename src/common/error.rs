use thiserror::Error;

#[derive(Error, Debug)]
pub enum SyncError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON deserialization failed: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML deserialization failed: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Environment variable error: {0}")]
    Env(#[from] std::env::VarError),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Authentication failed: {0}")]
    Auth(String),

    #[error("Catalog API error (status {status}): {message}")]
    Api {
        status: u16,
        message: String,
        /// The request payload that triggered the error, for diagnostics.
        payload: Option<String>,
    },

    #[error("Malformed catalog response: {0}")]
    MalformedResponse(String),

    #[error("Missing required field: {0}")]
    MissingField(String),

    #[error("Contributor without a name on {0}")]
    MissingName(String),

    #[error("License cannot be resolved against the license vocabulary: {0}")]
    UnmappableLicense(String),
}

impl SyncError {
    /// Errors that abort the whole run instead of just the current entity.
    ///
    /// Transport and authentication failures indicate the catalog is not
    /// reachable at all; an unmappable license without the ignore flag
    /// indicates a broken vocabulary rather than one bad input.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            SyncError::Http(_)
                | SyncError::Auth(_)
                | SyncError::Config(_)
                | SyncError::UnmappableLicense(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, SyncError>;
