//! Error types for chime-core.

use thiserror::Error;

/// Main error type for the chime-core library.
///
/// Only the settings lifecycle returns errors; queue overflow and
/// webhook/audio failures are reported in-band (booleans and logs) because
/// their producers cannot act on them.
#[derive(Error, Debug)]
pub enum Error {
    #[error("Malformed settings payload for '{0}': {1}")]
    Malformed(String, String),

    #[error("Failed to read '{0}' from storage")]
    StorageRead(String),

    #[error("Failed to write '{0}' to storage")]
    StorageWrite(String),
}

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;
