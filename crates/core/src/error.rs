//! Error types for narrative segmentation and slide filling.

use thiserror::Error;

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while segmenting narratives or filling slides.
#[derive(Error, Debug)]
pub enum Error {
    /// A layout limit was zero. Every limit must be a positive integer.
    #[error("Invalid layout configuration: {field} must be positive (got {value})")]
    InvalidConfiguration {
        /// Name of the offending field.
        field: &'static str,
        /// The rejected value.
        value: usize,
    },

    /// Failed to read a configuration or narrative file.
    #[error("Failed to read file: {0}")]
    Io(#[from] std::io::Error),

    /// A layout limits document could not be parsed.
    #[error("Configuration parsing error: {0}")]
    ConfigParse(String),

    /// The remote presentation service refused the call because of rate limiting.
    #[error("Rate limited: {0}")]
    RateLimited(String),

    /// A renderer or provisioner call failed.
    #[error("Collaborator error: {0}")]
    Collaborator(String),

    /// A report could not be assembled from the client record and configuration.
    #[error("Report assembly error: {0}")]
    Report(String),

    /// A retried operation kept failing until its attempt budget ran out.
    #[error("Max retries reached for {label} after {attempts} attempts: {last}")]
    RetriesExhausted {
        /// Label of the retried task.
        label: String,
        /// Number of attempts made.
        attempts: usize,
        /// Message of the last failure.
        last: String,
    },
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Self::ConfigParse(err.to_string())
    }
}

impl Error {
    /// Whether the failure is a rate-limit refusal that is worth waiting out.
    pub fn is_rate_limited(&self) -> bool {
        matches!(self, Self::RateLimited(_))
    }
}
