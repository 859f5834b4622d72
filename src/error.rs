//! Error types for the gateway
//!
//! All modules use `GatewayResult<T>` as their return type. Every error that
//! crosses a component boundary carries its kind plus enough context (job
//! path, token, underlying message) to render a precise caller-facing message.

use serde::Serialize;
use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for gateway operations
pub type GatewayResult<T> = Result<T, GatewayError>;

/// All errors that can occur in the gateway
#[derive(Error, Debug)]
pub enum GatewayError {
    // Remote outcomes
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Transient failure while {context}: {message}")]
    Transient { context: String, message: String },

    #[error("{operation} failed after {attempts} attempts: {last}")]
    RetriesExhausted {
        operation: String,
        attempts: u32,
        #[source]
        last: Box<GatewayError>,
    },

    #[error("Remote server answered {status} while {context}: {message}")]
    Remote {
        status: u16,
        context: String,
        message: String,
    },

    #[error("Malformed payload from remote server while {context}: {reason}")]
    MalformedPayload { context: String, reason: String },

    // Client input errors
    #[error("Invalid build identifier '{token}' for job '{job_path}': expected a build number or one of {expected}")]
    InvalidIdentifierFormat {
        job_path: String,
        token: String,
        expected: String,
    },

    #[error("Build identifier '{token}' does not resolve to a build of job '{job_path}'")]
    UnresolvableIdentifier { job_path: String, token: String },

    #[error("Invalid request: {0}")]
    Validation(String),

    #[error("Already exists: {0}")]
    AlreadyExists(String),

    // Configuration errors
    #[error("Jenkins server is not configured: {0}")]
    NotConfigured(String),

    #[error("Invalid configuration at {path}: {reason}")]
    ConfigInvalid { path: PathBuf, reason: String },

    #[error("Failed to create config directory {path}: {source}")]
    ConfigDirCreate {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // IO errors
    #[error("IO error: {context}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },

    // Serialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("TOML serialize error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),

    // General errors
    #[error("Internal error: {0}")]
    Internal(String),

    #[error("{0}")]
    User(String),
}

/// Caller-facing classification of an error
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    NotFound,
    Unauthorized,
    Transient,
    RetriesExhausted,
    InvalidIdentifierFormat,
    UnresolvableIdentifier,
    Validation,
    AlreadyExists,
    Remote,
    Internal,
}

impl ErrorKind {
    /// Transport status code a handler should answer with
    pub fn http_status(self) -> u16 {
        match self {
            Self::NotFound => 404,
            Self::Unauthorized => 401,
            Self::Transient | Self::RetriesExhausted => 503,
            Self::InvalidIdentifierFormat | Self::UnresolvableIdentifier | Self::Validation => 400,
            Self::AlreadyExists => 409,
            Self::Remote => 502,
            Self::Internal => 500,
        }
    }
}

impl GatewayError {
    /// Create an IO error with context
    pub fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            context: context.into(),
            source,
        }
    }

    /// Create a transient (retryable) failure
    pub fn transient(context: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Transient {
            context: context.into(),
            message: message.into(),
        }
    }

    /// Create a malformed payload error
    pub fn malformed(context: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::MalformedPayload {
            context: context.into(),
            reason: reason.into(),
        }
    }

    /// Check if error is retryable
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Transient { .. })
    }

    /// Classify the error for callers
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::NotFound(_) => ErrorKind::NotFound,
            Self::Unauthorized(_) => ErrorKind::Unauthorized,
            Self::Transient { .. } => ErrorKind::Transient,
            Self::RetriesExhausted { .. } => ErrorKind::RetriesExhausted,
            Self::InvalidIdentifierFormat { .. } => ErrorKind::InvalidIdentifierFormat,
            Self::UnresolvableIdentifier { .. } => ErrorKind::UnresolvableIdentifier,
            Self::Validation(_) | Self::User(_) => ErrorKind::Validation,
            Self::AlreadyExists(_) => ErrorKind::AlreadyExists,
            Self::Remote { .. } | Self::MalformedPayload { .. } => ErrorKind::Remote,
            _ => ErrorKind::Internal,
        }
    }

    /// Transport status code for this error
    pub fn http_status(&self) -> u16 {
        self.kind().http_status()
    }

    /// Structured error body: `{"error", "kind", "status_code"}`
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::json!({
            "error": self.to_string(),
            "kind": self.kind(),
            "status_code": self.http_status(),
        })
    }

    /// Get actionable hint for the error
    pub fn hint(&self) -> Option<&'static str> {
        match self {
            Self::NotConfigured(_) => {
                Some("Set JENKINS_URL, JENKINS_USER and JENKINS_API_TOKEN or run: jenkins-gateway config init")
            }
            Self::Unauthorized(_) => Some("Check the Jenkins user and API token"),
            Self::Transient { .. } | Self::RetriesExhausted { .. } => {
                Some("The Jenkins server is unavailable or overloaded, retry later")
            }
            Self::InvalidIdentifierFormat { .. } => {
                Some("Use a build number such as 42 or a keyword such as lastBuild")
            }
            Self::UnresolvableIdentifier { .. } => {
                Some("The job has no build of that kind yet, list builds with: jenkins-gateway builds <job>")
            }
            _ => None,
        }
    }
}
