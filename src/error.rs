//! Error kinds shared by every public operation in the crate.
//!
//! Every fallible path funnels into [`CryptoError`], so a caller never has to
//! match on more than one error type regardless of which operation they
//! invoked (CTR file encrypt/decrypt, SHA-512 digest, HMAC, or envelope
//! encrypt/decrypt).

use std::{io, path::PathBuf};

/// Errors produced by the cryptographic core.
///
/// Each variant corresponds to a distinct failure kind from the design: I/O
/// failures are split by the stage at which they occurred (open/read/write)
/// so that a caller can tell a missing input file apart from a full disk.
#[derive(Debug, thiserror::Error)]
pub enum CryptoError {
    /// A null/empty parameter, or a key of unsupported length, was supplied.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// Failed to open a file for reading or writing.
    #[error("failed to open {path}: {source}")]
    IoOpen {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Failed to read from an already-open file.
    #[error("failed to read {path}: {source}")]
    IoRead {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Failed to write to an already-open file.
    #[error("failed to write {path}: {source}")]
    IoWrite {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Failed to close, flush, rename, or remove a file.
    #[error("failed to close {path}: {source}")]
    IoClose {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// A heap allocation for a streaming buffer failed.
    #[error("allocation failure: {0}")]
    AllocationFailure(String),

    /// The file being decrypted as an envelope is shorter than the minimum
    /// legal size (16-byte IV + 64-byte tag = 80 bytes).
    #[error("envelope is {actual} bytes, shorter than the minimum of {minimum} bytes")]
    ShortEnvelope { actual: u64, minimum: u64 },

    /// The recomputed HMAC did not match the tag stored in the envelope.
    #[error("authentication failed: envelope tag does not match")]
    AuthenticationFailure,

    /// The OS CSPRNG could not supply entropy for IV generation.
    #[error("no cryptographically secure randomness source available: {0}")]
    EntropyUnavailable(String),
}

/// A distinct completion status, not an error: the caller's
/// `authenticated_callback` declined to proceed after a successful
/// authentication check in [`crate::envelope::decrypt_envelope`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CancelledAfterAuth;

pub type Result<T> = std::result::Result<T, CryptoError>;
