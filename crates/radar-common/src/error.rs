//! Error types for nexrad-plot.

use thiserror::Error;

/// Result type alias using RadarError.
pub type RadarResult<T> = Result<T, RadarError>;

/// Primary error type for locating, decoding and rendering radar volumes.
#[derive(Debug, Error)]
pub enum RadarError {
    // === Configuration Errors ===
    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Invalid time specification: {0}")]
    InvalidTime(String),

    // === Archive Errors ===
    #[error("Malformed archive key '{key}': {reason}")]
    KeyParse { key: String, reason: String },

    #[error("No radar volumes found under prefix '{prefix}'")]
    NoCandidates { prefix: String },

    #[error("Storage error: {0}")]
    Storage(String),

    // === Data Errors ===
    #[error("Failed to decode radar volume: {0}")]
    Decode(String),

    #[error("Field not found in volume: {0}")]
    FieldNotFound(String),

    #[error("Sweep {index} not found (volume has {available} sweeps)")]
    SweepNotFound { index: usize, available: usize },

    // === Rendering Errors ===
    #[error("Projection error: {0}")]
    Projection(String),

    #[error("Rendering failed: {0}")]
    Render(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl RadarError {
    /// Create a KeyParse error for the given key.
    pub fn key_parse(key: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::KeyParse {
            key: key.into(),
            reason: reason.into(),
        }
    }

    /// Create a Decode error.
    pub fn decode(msg: impl Into<String>) -> Self {
        Self::Decode(msg.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_parse_message() {
        let err = RadarError::key_parse("2015/05/20/KHGX/bad_V06", "missing timestamp");
        assert_eq!(
            err.to_string(),
            "Malformed archive key '2015/05/20/KHGX/bad_V06': missing timestamp"
        );
    }

    #[test]
    fn test_io_conversion() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        let err: RadarError = io.into();
        assert!(matches!(err, RadarError::Io(_)));
    }
}
