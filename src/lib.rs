//! Authenticated file encryption (AES-CTR + HMAC-SHA-512) and SHA-512 file
//! hashing.
//!
//! The core is a small stack of interchangeable primitives composed into a
//! streaming file pipeline:
//!
//! - [`cipher`]: two interchangeable AES engines ([reference](cipher::block::aes),
//!   [T-table](cipher::block::aes_ttable)) behind the [`BlockCipher`](cipher::BlockCipher)
//!   trait, plus [CTR mode](cipher::Ctr) built on top of either.
//! - [`hash`]: streaming SHA-512.
//! - [`mac`]: HMAC-SHA-512 over the same streaming SHA-512.
//! - [`stream`]: chunked file-I/O wrappers over all of the above.
//! - [`envelope`]: the authenticated `IV ‖ ciphertext ‖ tag` file format,
//!   combining CTR and HMAC via encrypt-then-MAC.
//! - [`random`]: OS-CSPRNG-backed IV generation for the envelope encoder.
//!
//! Engine selection, key material, and IVs are always supplied by the
//! caller; this crate manages no key storage or derivation of its own
//! (see [`error`] for the shared error type threaded through every
//! operation).

pub mod cipher;
pub mod envelope;
pub mod error;
pub mod hash;
pub mod mac;
pub mod random;
pub mod stream;
