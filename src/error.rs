//! Error types shared by the HTTP output.
//!
//! Configuration problems surface as [`ConfigError`] at startup. Anything that
//! prevents a request from completing on the wire is a [`TransportError`];
//! whether it reaches the caller is decided by the dispatcher's
//! `raise_on_error` policy. Unsuccessful HTTP statuses are never errors.

use std::io;

use thiserror::Error;

/// Errors raised while resolving configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// `endpoint_url` was absent or blank.
    #[error("missing required parameter 'endpoint_url'")]
    MissingEndpoint,
    /// `endpoint_url` could not be parsed as an absolute URL with a host.
    #[error("invalid endpoint_url '{url}': {reason}")]
    InvalidEndpoint { url: String, reason: String },
    /// A typed value was rejected in strict mode.
    #[error("invalid value '{value}' for parameter '{key}'")]
    InvalidValue { key: String, value: String },
    /// The configuration file could not be read.
    #[error("failed to read configuration: {0}")]
    Io(#[from] io::Error),
    /// The configuration file was not valid INI.
    #[error("configuration is not valid INI: {0}")]
    Ini(String),
}

impl ConfigError {
    /// Create an invalid value error.
    pub fn invalid_value(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self::InvalidValue {
            key: key.into(),
            value: value.into(),
        }
    }
}

/// Failure to complete a network exchange with the endpoint.
#[derive(Debug, Error)]
pub enum TransportError {
    /// The session could not be established (TLS setup, client construction).
    #[error("{message}")]
    Connect { message: String },
    /// The request failed below the HTTP layer (refused, reset, DNS, TLS, protocol).
    #[error("{message}")]
    Request { kind: String, message: String },
    /// The response arrived but its body could not be read.
    #[error("failed to read response body: {0}")]
    Body(#[from] io::Error),
}

impl TransportError {
    /// Create a connection setup error.
    pub fn connect(message: impl Into<String>) -> Self {
        Self::Connect {
            message: message.into(),
        }
    }

    /// Create a request-level error tagged with `kind`.
    pub fn request(kind: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Request {
            kind: kind.into(),
            message: message.into(),
        }
    }

    /// Short classification used in log lines.
    pub fn kind(&self) -> &str {
        match self {
            Self::Connect { .. } => "ConnectError",
            Self::Request { kind, .. } => kind,
            Self::Body(_) => "BodyReadError",
        }
    }
}

/// Errors returned from a send or an emission run.
#[derive(Debug, Error)]
pub enum OutputError {
    /// A transport failure raised under `raise_on_error`.
    #[error("transport error: {0}")]
    Transport(#[from] TransportError),
    /// The record could not be encoded into a request body.
    #[error("failed to serialise record: {0}")]
    Serialize(#[from] serde_json::Error),
}
