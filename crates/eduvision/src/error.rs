//! Error types for eduvision.
//!
//! This module defines all error types used throughout the eduvision crate,
//! providing detailed context for debugging and user-friendly error messages.

use std::path::PathBuf;
use thiserror::Error;

/// Message used when the server reports a failure without an `error` field.
pub const GENERIC_REQUEST_FAILURE: &str = "Request failed";

/// The main error type for eduvision operations.
#[derive(Error, Debug)]
pub enum Error {
    // === Request Errors ===
    /// The API answered with a non-success status.
    ///
    /// The message is the server-provided error string, already augmented with
    /// any suggested identifiers.
    #[error("{message}")]
    Request {
        /// HTTP status code returned by the API.
        status: u16,
        /// Message to surface to the user.
        message: String,
    },

    /// The request never produced a response (connection, DNS, body read).
    #[error("{0}")]
    Transport(String),

    /// The API answered successfully but the payload did not match the schema.
    #[error("invalid {endpoint} payload: {message}")]
    Validation {
        /// The endpoint whose payload failed validation.
        endpoint: String,
        /// Description of the mismatch.
        message: String,
    },

    /// The configured API base is not a usable URL.
    #[error("invalid API base '{base}': {message}")]
    InvalidApiBase {
        /// The rejected base URL.
        base: String,
        /// Why it was rejected.
        message: String,
    },

    // === Session Errors ===
    /// No student identifier could be resolved.
    #[error("no student PRN available; sign in with `eduv login <PRN>`")]
    MissingSession,

    // === Storage Errors ===
    /// Failed to open or create the database.
    #[error("failed to open database at {path}: {source}")]
    DatabaseOpen {
        /// Path to the database file.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: rusqlite::Error,
    },

    /// A database query failed.
    #[error("database query failed: {0}")]
    DatabaseQuery(#[from] rusqlite::Error),

    /// Failed to run database migrations.
    #[error("database migration failed: {message}")]
    DatabaseMigration {
        /// Description of what went wrong.
        message: String,
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
    /// File system operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Failed to create a required directory.
    #[error("failed to create directory {path}: {source}")]
    DirectoryCreate {
        /// Path that couldn't be created.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: std::io::Error,
    },

    // === Serialization Errors ===
    /// JSON serialization/deserialization failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// A specialized Result type for eduvision operations.
pub type Result<T> = std::result::Result<T, Error>;

impl From<figment::Error> for Error {
    fn from(err: figment::Error) -> Self {
        Self::ConfigLoad(Box::new(err))
    }
}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        Self::Transport(err.to_string())
    }
}

impl Error {
    /// Create a new request error.
    #[must_use]
    pub fn request(status: u16, message: impl Into<String>) -> Self {
        Self::Request {
            status,
            message: message.into(),
        }
    }

    /// Create a new transport error.
    #[must_use]
    pub fn transport(message: impl Into<String>) -> Self {
        Self::Transport(message.into())
    }

    /// Create a new validation error for the given endpoint.
    #[must_use]
    pub fn validation(endpoint: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Validation {
            endpoint: endpoint.into(),
            message: message.into(),
        }
    }

    /// HTTP status for request errors.
    #[must_use]
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Request { status, .. } => Some(*status),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_error_displays_message_verbatim() {
        let err = Error::request(404, "Student not found. Try one of: X1, X2");
        assert_eq!(err.to_string(), "Student not found. Try one of: X1, X2");
        assert_eq!(err.status(), Some(404));
    }

    #[test]
    fn test_transport_error_display() {
        let err = Error::transport("connection refused");
        assert_eq!(err.to_string(), "connection refused");
        assert_eq!(err.status(), None);
    }

    #[test]
    fn test_validation_error_display() {
        let err = Error::validation("dashboard", "missing field `student`");
        let msg = err.to_string();
        assert!(msg.contains("dashboard"));
        assert!(msg.contains("missing field `student`"));
    }

    #[test]
    fn test_missing_session_hint() {
        assert!(Error::MissingSession.to_string().contains("eduv login"));
    }

    #[test]
    fn test_invalid_api_base_display() {
        let err = Error::InvalidApiBase {
            base: "ftp://nope".to_string(),
            message: "unsupported scheme".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("ftp://nope"));
        assert!(msg.contains("unsupported scheme"));
    }

    #[test]
    fn test_from_io_error() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: Error = io_err.into();
        assert!(err.to_string().contains("file not found"));
    }

    #[test]
    fn test_from_rusqlite_error() {
        let result = rusqlite::Connection::open_with_flags(
            "/nonexistent/path/db.sqlite",
            rusqlite::OpenFlags::SQLITE_OPEN_READ_ONLY,
        );
        if let Err(sqlite_err) = result {
            let err: Error = sqlite_err.into();
            assert!(matches!(err, Error::DatabaseQuery(_)));
        }
    }

    #[test]
    fn test_from_json_error() {
        let json_result: std::result::Result<i32, serde_json::Error> =
            serde_json::from_str("not valid json");
        if let Err(json_err) = json_result {
            let err: Error = json_err.into();
            assert!(matches!(err, Error::Json(_)));
        }
    }

    #[test]
    fn test_database_migration_error_display() {
        let err = Error::DatabaseMigration {
            message: "version mismatch".to_string(),
        };
        assert!(err.to_string().contains("version mismatch"));
    }

    #[test]
    fn test_config_validation_error_display() {
        let err = Error::ConfigValidation {
            message: "empty api base".to_string(),
        };
        assert!(err.to_string().contains("empty api base"));
    }

    #[test]
    fn test_directory_create_error_display() {
        let io_err = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "access denied");
        let err = Error::DirectoryCreate {
            path: PathBuf::from("/root/forbidden"),
            source: io_err,
        };
        assert!(err.to_string().contains("/root/forbidden"));
    }
}
