//! Standard exit codes for the pushpack builder binary
//!
//! These exit codes distinguish the failure stages of the package
//! pipeline so calling scripts can react to specific conditions.

use crate::exceptions::PushPackError;

/// Successful execution
pub const EXIT_SUCCESS: i32 = 0;

/// Generic error (avoid using - be more specific)
pub const EXIT_ERROR: i32 = 1;

/// Panic or unrecoverable error
pub const EXIT_PANIC: i32 = 101;

/// Required input file missing (template asset, key material)
pub const EXIT_MISSING_INPUT: i32 = 102;

/// I/O error (file not found, permission denied, disk error)
pub const EXIT_IO_ERROR: i32 = 103;

/// Signing failed (invalid or mismatched key material)
pub const EXIT_CRYPTO_ERROR: i32 = 104;

/// Archive write or finalization failed
pub const EXIT_ARCHIVE_ERROR: i32 = 105;

/// Package verification failed after building
pub const EXIT_VERIFY_ERROR: i32 = 106;

/// Invalid command-line arguments
pub const EXIT_INVALID_ARGS: i32 = 107;

/// Map a pipeline error onto its exit code
pub fn exit_code_for(err: &PushPackError) -> i32 {
    match err {
        PushPackError::MissingInput(_) => EXIT_MISSING_INPUT,
        PushPackError::IoError(_) => EXIT_IO_ERROR,
        PushPackError::CryptoError(_) => EXIT_CRYPTO_ERROR,
        PushPackError::ArchiveError(_) | PushPackError::ArchiveFinalization(_) => {
            EXIT_ARCHIVE_ERROR
        }
        PushPackError::VerificationFailed(_) => EXIT_VERIFY_ERROR,
        PushPackError::BuildError(_)
        | PushPackError::JsonError(_)
        | PushPackError::Generic(_) => EXIT_ERROR,
    }
}
