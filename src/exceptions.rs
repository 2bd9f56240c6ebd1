//! Error types for pushpack

use std::fmt;
use std::path::PathBuf;

/// Main error type for pushpack operations
#[derive(Debug)]
pub enum PushPackError {
    /// A required input file is absent (template asset, manifest entry,
    /// key material)
    MissingInput(PathBuf),

    /// Filesystem operation failed
    IoError(std::io::Error),

    /// Signing or signature verification failed inside the crypto library
    CryptoError(String),

    /// Writing an entry into the archive failed
    ArchiveError(String),

    /// The archive could not be finalized after entries were added
    ArchiveFinalization(String),

    /// Package verification failed
    VerificationFailed(String),

    /// Build error
    BuildError(String),

    /// JSON parsing or serialization error
    JsonError(serde_json::Error),

    /// Generic error with message
    Generic(String),
}

impl fmt::Display for PushPackError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PushPackError::MissingInput(path) => {
                write!(f, "Required file does not exist: {}", path.display())
            }
            PushPackError::IoError(err) => write!(f, "IO error: {err}"),
            PushPackError::CryptoError(msg) => write!(f, "Crypto error: {msg}"),
            PushPackError::ArchiveError(msg) => write!(f, "Archive error: {msg}"),
            PushPackError::ArchiveFinalization(msg) => {
                write!(f, "Archive finalization failed: {msg}")
            }
            PushPackError::VerificationFailed(msg) => write!(f, "Verification failed: {msg}"),
            PushPackError::BuildError(msg) => write!(f, "Build error: {msg}"),
            PushPackError::JsonError(err) => write!(f, "JSON error: {err}"),
            PushPackError::Generic(msg) => write!(f, "{msg}"),
        }
    }
}

impl std::error::Error for PushPackError {}

impl From<std::io::Error> for PushPackError {
    fn from(err: std::io::Error) -> Self {
        PushPackError::IoError(err)
    }
}

impl From<serde_json::Error> for PushPackError {
    fn from(err: serde_json::Error) -> Self {
        PushPackError::JsonError(err)
    }
}

impl From<openssl::error::ErrorStack> for PushPackError {
    fn from(err: openssl::error::ErrorStack) -> Self {
        PushPackError::CryptoError(err.to_string())
    }
}

impl From<zip::result::ZipError> for PushPackError {
    fn from(err: zip::result::ZipError) -> Self {
        PushPackError::ArchiveError(err.to_string())
    }
}

impl From<anyhow::Error> for PushPackError {
    fn from(err: anyhow::Error) -> Self {
        PushPackError::Generic(err.to_string())
    }
}

/// Result type for pushpack operations
pub type Result<T> = std::result::Result<T, PushPackError>;
