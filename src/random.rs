//! A cryptographically secure source of randomness for IV generation.
//!
//! The envelope encoder needs a fresh 16-byte IV per call. This wraps the
//! OS CSPRNG (`rand`'s [`OsRng`]) rather than rolling a PRNG of our own, and
//! surfaces a failure to read from it as [`CryptoError::EntropyUnavailable`]
//! instead of silently falling back to a weaker source.

use {
    crate::{cipher::block::BLOCK_SIZE, error::CryptoError},
    rand::{rngs::OsRng, RngCore},
};

/// Draw a fresh 16-byte IV from the OS CSPRNG.
pub fn random_iv() -> Result<[u8; BLOCK_SIZE], CryptoError> {
    let mut iv = [0u8; BLOCK_SIZE];
    OsRng
        .try_fill_bytes(&mut iv)
        .map_err(|e| CryptoError::EntropyUnavailable(e.to_string()))?;
    Ok(iv)
}
