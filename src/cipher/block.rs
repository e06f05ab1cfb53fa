//! The block-cipher interface and the two AES engines that implement it.
//!
//! [`BlockCipher`] is a small capability abstraction: any engine exposes
//! `init`, `encrypt_block`, `decrypt_block`, and `destroy`. [`AesEngine`] is a
//! handle over one of two interchangeable implementations —
//! [reference](aes) and [T-table](aes_ttable) — selected at construction time
//! by [`EngineKind`]. Both must agree bit-for-bit on every input; only their
//! internal memory/speed trade-off differs.

pub mod aes;
pub mod aes_ttable;
pub(crate) mod gf256;
mod modes;
pub(crate) mod sbox;

pub use modes::Ctr;

use crate::error::CryptoError;

/// Block size used by every engine in this crate: AES's 128-bit block.
pub const BLOCK_SIZE: usize = 16;

/// A block-cipher handle: `init` builds it from a key, `encrypt_block` and
/// `decrypt_block` transform one 16-byte block at a time, and `destroy`
/// releases it, zeroing any key material first.
///
/// An implementor owns its internal state exclusively once created; the
/// handle must be destroyed (or simply dropped — see [`AesEngine`]'s `Drop`
/// impl) before its memory is reused for anything else.
pub trait BlockCipher: Sized {
    /// Build a handle from a key of the implementation's required length.
    /// Implementations reject any other length with
    /// [`CryptoError::InvalidArgument`].
    fn init(key: &[u8]) -> Result<Self, CryptoError>;

    /// Encrypt one 16-byte block in place. Aliasing the same buffer for both
    /// plaintext and ciphertext is fine, since this always reads the whole
    /// block before writing any of it back.
    fn encrypt_block(&self, block: &mut [u8; BLOCK_SIZE]);

    /// Decrypt one 16-byte block in place.
    fn decrypt_block(&self, block: &mut [u8; BLOCK_SIZE]);

    /// Explicitly release this handle, zeroing key material and round keys
    /// first. Equivalent to dropping the handle — the implementation's
    /// `Drop` impl does the same zeroing — but spelled out for callers who
    /// want the release to be visible at the call site, mirroring the
    /// `*_free` functions of a C API.
    fn destroy(self) {
        drop(self)
    }
}

/// Selects which [`AesEngine`] implementation `init` builds.
///
/// Both engines must produce identical output for identical input; this
/// picks between the reference engine's smaller memory footprint and the
/// T-table engine's precomputed-table speed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineKind {
    /// On-the-fly key schedule, re-derived every round. Slower, smaller.
    Reference,
    /// Fully expanded key schedule and precomputed round tables. Faster,
    /// larger.
    TTable,
}

/// A handle over one of the two interchangeable AES implementations.
///
/// `AesEngine` itself implements [`BlockCipher`] by dispatching to whichever
/// variant was selected at construction, so callers (e.g. [`super::modes::Ctr`](crate::cipher::block::Ctr))
/// never need to know which one they got.
pub enum AesEngine {
    Reference(aes::AesRef),
    TTable(aes_ttable::AesTTable),
}

impl AesEngine {
    /// Build an engine of the given `kind` for `key`, which must be 16, 24,
    /// or 32 bytes (AES-128/192/256).
    pub fn init(kind: EngineKind, key: &[u8]) -> Result<Self, CryptoError> {
        Ok(match kind {
            EngineKind::Reference => AesEngine::Reference(aes::AesRef::init(key)?),
            EngineKind::TTable => AesEngine::TTable(aes_ttable::AesTTable::init(key)?),
        })
    }
}

impl BlockCipher for AesEngine {
    fn init(key: &[u8]) -> Result<Self, CryptoError> {
        AesEngine::init(EngineKind::TTable, key)
    }

    fn encrypt_block(&self, block: &mut [u8; BLOCK_SIZE]) {
        match self {
            AesEngine::Reference(e) => e.encrypt_block(block),
            AesEngine::TTable(e) => e.encrypt_block(block),
        }
    }

    fn decrypt_block(&self, block: &mut [u8; BLOCK_SIZE]) {
        match self {
            AesEngine::Reference(e) => e.decrypt_block(block),
            AesEngine::TTable(e) => e.decrypt_block(block),
        }
    }
}

/// Accepted AES key lengths, in bytes: 128-, 192-, and 256-bit.
pub(crate) const KEY_LENGTHS: [usize; 3] = [16, 24, 32];

pub(crate) fn check_key_len(key: &[u8]) -> Result<(), CryptoError> {
    if KEY_LENGTHS.contains(&key.len()) {
        Ok(())
    } else {
        Err(CryptoError::InvalidArgument(format!(
            "AES key must be 16, 24, or 32 bytes, got {}",
            key.len()
        )))
    }
}

/// Derive `(Nk, Nr)` — key length in words, and round count — from a key
/// length in bytes. Invariant: `Nr = Nk + 6`.
pub(crate) fn nk_nr(key_len: usize) -> (usize, usize) {
    let nk = key_len / 4;
    (nk, nk + 6)
}
