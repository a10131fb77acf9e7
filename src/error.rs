//! Error types for character image generation.

/// Errors that can occur while generating or editing character images.
#[derive(Debug, thiserror::Error)]
pub enum PersonaError {
    /// API key missing, unselected, or rejected upstream.
    #[error("authentication failed: {0}")]
    Auth(String),

    /// API returned an error response not classified further.
    #[error("API error: {status} - {message}")]
    Api {
        /// HTTP status code returned by the service.
        status: u16,
        /// Error body, passed through verbatim.
        message: String,
    },

    /// Content was blocked by safety filters.
    #[error("content blocked: {0}")]
    ContentBlocked(String),

    /// The generation call succeeded but returned no image part.
    #[error("no image generated")]
    NoImageGenerated,

    /// The edit call succeeded but returned no image part.
    #[error("editing failed: response contained no image")]
    EditFailed,

    /// A generate or edit was attempted while another is in flight.
    #[error("a generation is already in progress")]
    Busy,

    /// Invalid request parameters (e.g. malformed data URL).
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// Failed to decode base64 image data.
    #[error("failed to decode: {0}")]
    Decode(String),

    /// Network or HTTP error.
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// I/O error (e.g. saving an exported image).
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl PersonaError {
    /// Returns true if this failure means the selected credential is
    /// missing, expired, or rejected, and the user must re-authenticate.
    pub fn is_credential_error(&self) -> bool {
        matches!(self, Self::Auth(_))
    }
}

/// Result type alias for character image operations.
pub type Result<T> = std::result::Result<T, PersonaError>;
