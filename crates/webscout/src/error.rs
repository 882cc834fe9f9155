//! Error types for Webscout
//!
//! Only invalid-argument conditions abort a request. Network failures,
//! non-200 statuses and malformed HTML degrade to per-item markers and
//! never surface here.

use thiserror::Error;

/// Errors that can occur while validating a pipeline request
#[derive(Debug, Error)]
pub enum ScoutError {
    /// Search mode requires a non-empty query
    #[error("Missing required parameter: query")]
    MissingQuery,

    /// Docs mode requires a seed URL
    #[error("Missing required parameter: url")]
    MissingUrl,

    /// Unsupported mode value
    #[error("Invalid mode `{0}`: use \"search\" or \"docs\"")]
    InvalidMode(String),

    /// Out-of-range or otherwise unusable parameter value
    #[error("Invalid parameter {name}: {reason}")]
    InvalidParameter { name: String, reason: String },
}
