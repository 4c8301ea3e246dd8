//! Boundary error types
//!
//! Decoding itself never fails: every decoder is total over its input
//! domain. Errors exist only at the two true boundaries - capture
//! ingestion and knowledge-definition file loading.

use thiserror::Error;

/// Errors raised at the ingestion/loading boundary
#[derive(Debug, Error)]
pub enum CoreError {
    /// Payload is not valid hex after normalization
    #[error("invalid payload hex: {0}")]
    InvalidPayload(String),

    /// Payload has an odd number of hex digits
    #[error("odd-length payload hex ({0} digits)")]
    OddLengthPayload(usize),

    /// YAML parsing error in a knowledge definition file
    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// IO error reading a knowledge definition file
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for boundary operations
pub type CoreResult<T> = Result<T, CoreError>;
