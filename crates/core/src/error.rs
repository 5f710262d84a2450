//! Error types for batch file conversion.

use crate::config::ConversionStage;
use thiserror::Error;

/// Main error type for the concom library.
#[derive(Error, Debug)]
pub enum ConversionError {
    /// Incoming files do not share a kind with the files already in the batch.
    #[error(
        "Batch uploads must be of the same file type to apply settings correctly \
         (batch holds '{existing}', got '{incoming}')"
    )]
    BatchIncompatible { existing: String, incoming: String },

    /// A submitted file exceeds the per-file size limit.
    #[error("File '{name}' is {size} bytes, which exceeds the {limit} byte limit")]
    FileTooLarge { name: String, size: u64, limit: u64 },

    /// No implemented path for the requested pair.
    #[error("Conversion from {from} to {to} is not supported")]
    UnsupportedConversion { from: String, to: String },

    /// Source image data could not be decoded.
    #[error("Failed to load image: {0}")]
    DecodeFailure(String),

    /// The encoder rejected the image or its parameters.
    #[error("Image conversion to {format} failed: {message}")]
    EncodeFailure { format: String, message: String },

    /// A decoding or encoding surface could not be obtained.
    #[error("Conversion resources unavailable: {0}")]
    ResourceUnavailable(String),

    /// A lifecycle transition the item state machine does not allow.
    #[error("Invalid item transition from {from:?} to {to:?}")]
    InvalidTransition {
        from: ConversionStage,
        to: ConversionStage,
    },

    /// A run was requested before a target format was chosen.
    #[error("No target format selected")]
    TargetNotSelected,

    /// Unrecognized target format identifier.
    #[error("Unknown format: {0}")]
    UnknownFormat(String),

    /// Unrecognized compression level name.
    #[error("Unknown compression level: {0}. Expected LOW, MEDIUM or HIGH")]
    UnknownCompressionLevel(String),

    /// Invalid configuration.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Configuration file I/O failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration file could not be parsed or serialized.
    #[error("Configuration format error: {0}")]
    Config(#[from] serde_json::Error),
}

impl ConversionError {
    /// Whether this error rejects a whole submission rather than a single item.
    pub fn is_batch_level(&self) -> bool {
        matches!(
            self,
            ConversionError::BatchIncompatible { .. } | ConversionError::FileTooLarge { .. }
        )
    }
}

/// Result type alias for convenience.
pub type Result<T> = std::result::Result<T, ConversionError>;
