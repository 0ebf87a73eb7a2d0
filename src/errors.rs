//! Error types for the GamblePro client
//!
//! One root error carries every failure the client can surface. Local
//! pre-checks (authentication, balance, input shape) never reach the
//! network; transport and HTTP failures carry the server message when
//! the response body provides one.

use thiserror::Error;

/// Root error type for all client operations
#[derive(Debug, Error)]
pub enum ClientError {
    /// No authenticated session
    #[error("Authentication required: please login to continue")]
    AuthRequired,

    /// Credentials rejected or session invalid
    #[error("Authentication failed: {0}")]
    Auth(String),

    /// Optimistic local balance check failed
    #[error("Insufficient balance: requested ₹{requested:.2}, available ₹{available:.2}")]
    InsufficientBalance { requested: f64, available: f64 },

    /// Malformed amount or missing field
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// Transport failure (connection refused, timeout, bad body)
    #[error("Network error: {0}")]
    Network(String),

    /// Non-2xx response, with the body's message when it carried one
    #[error("Server error ({status}): {}", .message.as_deref().unwrap_or("request failed"))]
    Server { status: u16, message: Option<String> },

    /// Configuration load or validation failure
    #[error("Configuration error: {0}")]
    Configuration(#[from] ConfigurationError),

    /// Credential store failure
    #[error("Storage error: {0}")]
    Storage(String),
}

/// Input validation errors raised before any request is sent
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("Invalid amount: {0}")]
    InvalidAmount(String),
    #[error("Minimum {what} amount is ₹{minimum}")]
    BelowMinimum { what: &'static str, minimum: f64 },
    #[error("Missing details: {0}")]
    MissingField(String),
    #[error("Invalid selection: {0}")]
    InvalidSelection(String),
}

/// Configuration and validation errors
#[derive(Debug, Error)]
pub enum ConfigurationError {
    #[error("Validation failed: {0}")]
    ValidationFailed(String),
    #[error("Missing required field: {0}")]
    MissingRequired(String),
    #[error("Invalid value for {field}: '{value}' ({reason})")]
    InvalidValue { field: String, value: String, reason: String },
    #[error("Failed to load configuration: {0}")]
    LoadFailed(String),
    #[error("Failed to save configuration: {0}")]
    SaveFailed(String),
}

impl ClientError {
    /// Message suitable for a user-facing notice.
    ///
    /// Server and auth errors yield the server-provided text; everything
    /// else falls back to `fallback`.
    pub fn user_message(&self, fallback: &str) -> String {
        match self {
            ClientError::Server { message: Some(message), .. } => message.clone(),
            ClientError::Auth(message) if !message.is_empty() => message.clone(),
            ClientError::Validation(e) => e.to_string(),
            ClientError::InsufficientBalance { .. } => {
                "Please deposit funds to continue playing".to_string()
            }
            ClientError::AuthRequired => "Please login to place bets".to_string(),
            _ => fallback.to_string(),
        }
    }

    /// True when the server rejected the credential
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, ClientError::Auth(_))
            || matches!(self, ClientError::Server { status: 401, .. })
    }
}

// External error conversions
impl From<reqwest::Error> for ClientError {
    fn from(e: reqwest::Error) -> Self {
        ClientError::Network(e.to_string())
    }
}

impl From<url::ParseError> for ClientError {
    fn from(e: url::ParseError) -> Self {
        ClientError::Configuration(ConfigurationError::InvalidValue {
            field: "api.base_url".to_string(),
            value: String::new(),
            reason: e.to_string(),
        })
    }
}

impl From<serde_json::Error> for ClientError {
    fn from(e: serde_json::Error) -> Self {
        ClientError::Network(format!("Malformed response body: {}", e))
    }
}

impl From<std::io::Error> for ClientError {
    fn from(e: std::io::Error) -> Self {
        ClientError::Storage(e.to_string())
    }
}

impl From<toml::de::Error> for ClientError {
    fn from(e: toml::de::Error) -> Self {
        ClientError::Configuration(ConfigurationError::LoadFailed(e.to_string()))
    }
}

/// Convenience type alias for Results
pub type ClientResult<T> = Result<T, ClientError>;
