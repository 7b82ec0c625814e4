//! Error types for the LiG sync core.

use thiserror::Error;

/// A shared error type for every LiG crate.
///
/// Variants are structured so callers can tell an expired login apart from a
/// flaky network or a malformed record without string matching.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum LigError {
    /// Login rejected by the server
    #[error("Authentication failed: {0}")]
    Auth(String),

    /// An authenticated call was made without a session
    #[error("Not logged in")]
    NotLoggedIn,

    /// Transport failure (timeout, connection reset, DNS)
    #[error("Network error: {0}")]
    Network(String),

    /// Non-success HTTP status
    #[error("HTTP {status}: {body}")]
    Http { status: u16, body: String },

    /// Entity not found error with type information
    #[error("Entity not found: {entity_type} '{id}'")]
    NotFound {
        entity_type: &'static str,
        id: String,
    },

    /// Malformed JSON record
    #[error("Decode error: {0}")]
    Decode(String),

    /// Record is well-formed JSON but violates the object schema
    #[error("Schema error: {0}")]
    Schema(String),

    /// Downloaded asset count differs from what the object layout needs
    #[error("Asset count mismatch: expected {expected}, got {actual}")]
    AssetMismatch { expected: usize, actual: usize },

    /// The scene host could not import an asset
    #[error("Import error: {0}")]
    Import(String),

    /// IO error (file system operations)
    #[error("IO error: {message}")]
    Io { message: String },

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Serialization/deserialization error
    #[error("Serialization error: {format} - {message}")]
    Serialization { format: String, message: String },

    /// Multiple errors
    #[error("Multiple errors occurred ({} total)", .0.len())]
    Multiple(Vec<LigError>),
}

impl LigError {
    // ============================================================================
    // Constructor helpers
    // ============================================================================

    pub fn auth(message: impl Into<String>) -> Self {
        Self::Auth(message.into())
    }

    pub fn network(message: impl Into<String>) -> Self {
        Self::Network(message.into())
    }

    pub fn http(status: u16, body: impl Into<String>) -> Self {
        Self::Http {
            status,
            body: body.into(),
        }
    }

    /// Creates a NotFound error
    pub fn not_found(entity_type: &'static str, id: impl Into<String>) -> Self {
        Self::NotFound {
            entity_type,
            id: id.into(),
        }
    }

    pub fn decode(message: impl Into<String>) -> Self {
        Self::Decode(message.into())
    }

    pub fn schema(message: impl Into<String>) -> Self {
        Self::Schema(message.into())
    }

    pub fn import(message: impl Into<String>) -> Self {
        Self::Import(message.into())
    }

    /// Creates an IO error
    pub fn io(message: impl Into<String>) -> Self {
        Self::Io {
            message: message.into(),
        }
    }

    /// Creates a Config error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    // ============================================================================
    // Type checking methods
    // ============================================================================

    pub fn is_auth(&self) -> bool {
        matches!(self, Self::Auth(_))
    }

    pub fn is_not_logged_in(&self) -> bool {
        matches!(self, Self::NotLoggedIn)
    }

    pub fn is_network(&self) -> bool {
        matches!(self, Self::Network(_))
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    pub fn is_decode(&self) -> bool {
        matches!(self, Self::Decode(_))
    }

    /// Errors that should abort a whole batch rather than one object.
    ///
    /// A lost session or an unreachable server means no later object can
    /// succeed either.
    pub fn is_fatal_for_batch(&self) -> bool {
        matches!(
            self,
            Self::Auth(_) | Self::NotLoggedIn | Self::Network(_) | Self::Http { status: 401, .. }
        )
    }
}

// ============================================================================
// From implementations for automatic conversion
// ============================================================================

impl From<std::io::Error> for LigError {
    fn from(err: std::io::Error) -> Self {
        Self::Io {
            message: format!("{} (kind: {:?})", err, err.kind()),
        }
    }
}

impl From<serde_json::Error> for LigError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization {
            format: "JSON".to_string(),
            message: err.to_string(),
        }
    }
}

impl From<toml::de::Error> for LigError {
    fn from(err: toml::de::Error) -> Self {
        Self::Serialization {
            format: "TOML".to_string(),
            message: err.to_string(),
        }
    }
}

impl From<toml::ser::Error> for LigError {
    fn from(err: toml::ser::Error) -> Self {
        Self::Serialization {
            format: "TOML".to_string(),
            message: err.to_string(),
        }
    }
}

/// A type alias for `Result<T, LigError>`.
pub type Result<T> = std::result::Result<T, LigError>;
