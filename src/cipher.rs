//! Symmetric encryption: the AES block-cipher engines and the CTR stream
//! mode built on top of them.

pub mod block;

pub use block::{AesEngine, BlockCipher, Ctr, EngineKind, BLOCK_SIZE};
