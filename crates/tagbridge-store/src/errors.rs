//! Error handling for tagbridge-store
//!
//! Wraps tagbridge-core ExError with store-specific helpers

use tagbridge_core::errors::{ExError, ExErrorKind, TagError};
use tagbridge_core::OwnerKind;

/// Result type alias using ExError
pub type Result<T> = std::result::Result<T, ExError>;

/// Create an IO error
pub fn io_error(operation: &str, err: std::io::Error) -> ExError {
    ExError::new(ExErrorKind::Io)
        .with_op(operation.to_string())
        .with_owner_kind(OwnerKind::File)
        .with_message(err.to_string())
}

/// Wrap a codec failure from the host
pub fn codec_error(operation: &str, err: TagError) -> ExError {
    let cause = ExError::from(err);
    ExError::new(ExErrorKind::Serialization)
        .with_op(operation.to_string())
        .with_owner_kind(OwnerKind::File)
        .with_message(cause.message().to_string())
        .with_source(cause)
}
