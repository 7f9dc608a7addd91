// ================================================================
// File: mensajera-common/src/error.rs
// ================================================================

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Not found error: {0}")]
    NotFound(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Provider-side rejection. Carries the provider's error body verbatim.
    #[error("Provider error: {0}")]
    Provider(String),

    /// A precondition of the whole operation failed (missing template,
    /// empty recipient list, campaign already completed, ...).
    #[error("Precondition error: {0}")]
    Precondition(String),

    /// SESSION send attempted on a conversation whose 24h window is closed.
    #[error("Session closed: {0}")]
    SessionClosed(String),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Key derivation error: {0}")]
    KeyDerivation(String),

    #[error("Encryption error: {0}")]
    Encryption(String),

    #[error("Decryption error: {0}")]
    Decryption(String),

    #[error("Address parse error: {0}")]
    AddrParse(#[from] std::net::AddrParseError),

    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    #[error("Uuid error: {0}")]
    Uuid(#[from] uuid::Error),
}

impl From<String> for Error {
    fn from(s: String) -> Self {
        Error::Parse(s)
    }
}

impl From<&str> for Error {
    fn from(s: &str) -> Self {
        Error::Parse(s.to_string())
    }
}

impl From<anyhow::Error> for Error {
    fn from(e: anyhow::Error) -> Self {
        Error::Parse(e.to_string())
    }
}
