//! Error types for signups.
//!
//! Every failure the service can produce is a variant of [`Error`]. Variants
//! are grouped into an [`ErrorKind`], which decides the HTTP status a request
//! handler answers with.

use std::path::PathBuf;

use axum::{
    extract::rejection::QueryRejection,
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;
use tracing::error;

/// The main error type for signups operations.
#[derive(Error, Debug)]
pub enum Error {
    // === Roster Errors ===
    /// The named activity does not exist in the store.
    #[error("Activity not found")]
    ActivityNotFound {
        /// Name that was looked up.
        name: String,
    },

    /// The student is already on the activity's participant list.
    #[error("Student is already signed up")]
    AlreadySignedUp,

    /// The activity has reached its maximum participant count.
    #[error("Activity is at full capacity")]
    ActivityFull,

    /// The student is not on the activity's participant list.
    #[error("Student is not signed up for this activity")]
    NotSignedUp,

    // === Authentication Errors ===
    /// No `Authorization` header was sent.
    #[error("Not authenticated")]
    MissingCredentials,

    /// The `Authorization` header is not valid basic auth.
    #[error("Invalid authentication credentials")]
    MalformedCredentials,

    /// No teacher matches the supplied username and password.
    #[error("Invalid teacher credentials")]
    InvalidCredentials,

    // === Request Errors ===
    /// A required query parameter was absent.
    #[error("missing query parameter: {name}")]
    MissingParameter {
        /// Name of the parameter.
        name: &'static str,
    },

    /// The query string could not be decoded into the expected parameters.
    #[error("invalid query string: {message}")]
    InvalidQuery {
        /// Decoder message.
        message: String,
    },

    // === Storage Errors ===
    /// A store document could not be read.
    #[error("failed to read {path}: {source}")]
    StoreRead {
        /// Path of the document.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: std::io::Error,
    },

    /// A store document is not valid JSON of the expected shape.
    #[error("failed to parse {path}: {source}")]
    StoreParse {
        /// Path of the document.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: serde_json::Error,
    },

    /// The activities document could not be written back.
    #[error("failed to write {path}: {source}")]
    StoreWrite {
        /// Path of the document.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: std::io::Error,
    },

    // === Configuration Errors ===
    /// Failed to load configuration.
    #[error("failed to load configuration: {0}")]
    ConfigLoad(Box<figment::Error>),

    /// Configuration validation failed.
    #[error("invalid configuration: {message}")]
    ConfigValidation {
        /// Description of the validation failure.
        message: String,
    },

    // === I/O Errors ===
    /// File system or socket operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    // === Serialization Errors ===
    /// JSON serialization/deserialization failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// A specialized Result type for signups operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Broad classification of an [`Error`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The addressed resource does not exist.
    NotFound,
    /// The request conflicts with the current roster.
    InvalidState,
    /// Credentials are missing or wrong.
    Unauthorized,
    /// The request itself is incomplete.
    InvalidRequest,
    /// The on-disk store is missing, corrupt or unwritable.
    Storage,
    /// Configuration could not be loaded.
    Config,
}

impl From<figment::Error> for Error {
    fn from(err: figment::Error) -> Self {
        Self::ConfigLoad(Box::new(err))
    }
}

impl From<QueryRejection> for Error {
    fn from(rejection: QueryRejection) -> Self {
        Self::InvalidQuery {
            message: rejection.body_text(),
        }
    }
}

impl Error {
    /// Create an activity-not-found error.
    #[must_use]
    pub fn activity_not_found(name: impl Into<String>) -> Self {
        Self::ActivityNotFound { name: name.into() }
    }

    /// Classify this error.
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::ActivityNotFound { .. } => ErrorKind::NotFound,
            Self::AlreadySignedUp | Self::ActivityFull | Self::NotSignedUp => {
                ErrorKind::InvalidState
            }
            Self::MissingCredentials | Self::MalformedCredentials | Self::InvalidCredentials => {
                ErrorKind::Unauthorized
            }
            Self::MissingParameter { .. } | Self::InvalidQuery { .. } => {
                ErrorKind::InvalidRequest
            }
            Self::StoreRead { .. }
            | Self::StoreParse { .. }
            | Self::StoreWrite { .. }
            | Self::Io(_)
            | Self::Json(_) => ErrorKind::Storage,
            Self::ConfigLoad(_) | Self::ConfigValidation { .. } => ErrorKind::Config,
        }
    }

    /// HTTP status code a request handler answers this error with.
    #[must_use]
    pub fn status_code(&self) -> StatusCode {
        match self.kind() {
            ErrorKind::NotFound => StatusCode::NOT_FOUND,
            ErrorKind::InvalidState => StatusCode::BAD_REQUEST,
            ErrorKind::Unauthorized => StatusCode::UNAUTHORIZED,
            ErrorKind::InvalidRequest => StatusCode::UNPROCESSABLE_ENTITY,
            ErrorKind::Storage | ErrorKind::Config => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Check if this error is an authentication failure.
    #[must_use]
    pub fn is_unauthorized(&self) -> bool {
        self.kind() == ErrorKind::Unauthorized
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status = self.status_code();

        let detail = if status.is_server_error() {
            error!(error = %self, "request failed");
            "Internal Server Error".to_string()
        } else {
            self.to_string()
        };

        let mut response = (status, Json(json!({ "detail": detail }))).into_response();
        if self.is_unauthorized() {
            response
                .headers_mut()
                .insert(header::WWW_AUTHENTICATE, HeaderValue::from_static("Basic"));
        }
        response
    }
}
