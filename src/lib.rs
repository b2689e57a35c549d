//! Station Telemetry Library
//!
//! A Rust library for decoding raw automatic weather station telemetry and cloud
//! vendor API responses into one canonical observation + health record.
//!
//! This library provides tools for:
//! - Decoding and encoding the `+`-delimited station telegram (four layout variants)
//! - Decoding the `,`-delimited station telegram used by the second hardware vendor
//! - Normalizing three generations of the cloud vendor API into the same record shape
//! - Timestamp sanity checking with drift annotation and data-completeness bitmasks
//! - Running paced polling cycles that persist observations and derive station status

pub mod config;
pub mod constants;

// Core application modules
pub mod app {
    pub mod models;
    pub mod services {
        pub mod cloud_adapter;
        pub mod comma_telegram;
        pub mod field_parsers;
        pub mod ingestion;
        pub mod plus_telegram;
        pub mod telemetry_quality;
    }
    pub mod adapters {
        pub mod directory;
        pub mod store;
    }
}

// CLI modules
pub mod cli {
    pub mod args;
    pub mod commands;
}

// Re-export commonly used types
pub use app::models::{StationHealth, StationObservation, StationStatus};
pub use config::Config;

/// Result type alias for telemetry processing
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for telemetry decoding, fetching and persistence
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// Structurally malformed telegram; the record is discarded
    #[error("Telegram format error: {message}")]
    Format { message: String },

    /// A single optional field could not be parsed
    #[error("Field '{field}' could not be parsed from '{token}'")]
    Field { field: String, token: String },

    /// Network or HTTP failure talking to an upstream API
    #[error("Transport error for {url}: {message}")]
    Transport { url: String, message: String },

    /// Upstream JSON could not be decoded into the expected shape
    #[error("Decode error in {context}: {source}")]
    Decode {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    /// Upstream JSON decoded but lacked a required field
    #[error("Missing required field '{field}' in {context}")]
    MissingField { context: String, field: String },

    /// Upstream field present but unusable
    #[error("Invalid value '{value}' for '{field}' in {context}")]
    InvalidValue {
        context: String,
        field: String,
        value: String,
    },

    /// Failure reported by the persistence collaborator
    #[error("Persistence error: {message}")]
    Persistence { message: String },

    /// Configuration error
    #[error("Configuration error: {message}")]
    Configuration { message: String },

    /// I/O operation failed
    #[error("I/O error: {message}")]
    Io {
        message: String,
        #[source]
        source: std::io::Error,
    },

    /// Configuration file could not be parsed
    #[error("YAML error in {path}: {source}")]
    Yaml {
        path: String,
        #[source]
        source: serde_yaml::Error,
    },

    /// Processing stopped by a cancellation request
    #[error("Processing cancelled: {reason}")]
    Cancelled { reason: String },
}

impl Error {
    /// Create a telegram format error
    pub fn format(message: impl Into<String>) -> Self {
        Self::Format {
            message: message.into(),
        }
    }

    /// Create a single-field parse error
    pub fn field(field: impl Into<String>, token: impl Into<String>) -> Self {
        Self::Field {
            field: field.into(),
            token: token.into(),
        }
    }

    /// Create a transport error
    pub fn transport(url: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Transport {
            url: url.into(),
            message: message.into(),
        }
    }

    /// Create a JSON decode error with context
    pub fn decode(context: impl Into<String>, source: serde_json::Error) -> Self {
        Self::Decode {
            context: context.into(),
            source,
        }
    }

    /// Create a missing required field error
    pub fn missing_field(context: impl Into<String>, field: impl Into<String>) -> Self {
        Self::MissingField {
            context: context.into(),
            field: field.into(),
        }
    }

    /// Create an invalid upstream value error
    pub fn invalid_value(
        context: impl Into<String>,
        field: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        Self::InvalidValue {
            context: context.into(),
            field: field.into(),
            value: value.into(),
        }
    }

    /// Create a persistence error
    pub fn persistence(message: impl Into<String>) -> Self {
        Self::Persistence {
            message: message.into(),
        }
    }

    /// Create a configuration error
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// Create an I/O error with context
    pub fn io(message: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            message: message.into(),
            source,
        }
    }

    /// Create a YAML parse error for a config file
    pub fn yaml(path: impl Into<String>, source: serde_yaml::Error) -> Self {
        Self::Yaml {
            path: path.into(),
            source,
        }
    }

    /// Create a cancellation error
    pub fn cancelled(reason: impl Into<String>) -> Self {
        Self::Cancelled {
            reason: reason.into(),
        }
    }
}

// Automatic conversions from common error types
impl From<std::io::Error> for Error {
    fn from(error: std::io::Error) -> Self {
        Self::Io {
            message: "I/O operation failed".to_string(),
            source: error,
        }
    }
}

impl From<reqwest::Error> for Error {
    fn from(error: reqwest::Error) -> Self {
        let url = error
            .url()
            .map(|u| u.to_string())
            .unwrap_or_else(|| "unknown".to_string());
        Self::Transport {
            url,
            message: error.to_string(),
        }
    }
}
