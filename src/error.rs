//! Error types for xmpp-alt-connections.
//!
//! Resolvers never surface these to callers; they are returned by the DNS and
//! HTTP backends and by server startup.

/// Result type alias.
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// DNS lookup error.
    #[error("DNS error: {0}")]
    Dns(#[from] hickory_resolver::error::ResolveError),

    /// HTTP fetch error (connect, TLS, timeout, non-success status).
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Malformed XML document.
    #[error("XML error: {0}")]
    Xml(#[from] roxmltree::Error),

    /// Fetched document exceeded the configured size limit.
    #[error("document too large: {size} bytes (limit {limit})")]
    DocumentTooLarge {
        /// Bytes received.
        size: usize,
        /// Configured limit.
        limit: usize,
    },

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Backend-specific lookup error.
    #[error("Lookup error: {0}")]
    Lookup(String),
}

impl Error {
    /// Create a lookup error.
    pub fn lookup<S: Into<String>>(msg: S) -> Self {
        Self::Lookup(msg.into())
    }
}
