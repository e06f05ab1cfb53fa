//! HMAC-SHA-512, specified by [FIPS
//! 198-1](https://nvlpubs.nist.gov/nistpubs/FIPS/NIST.FIPS.198-1.pdf).
//!
//! A hash-based message authentication code derives a keyed tag from a plain
//! [hash function](crate::hash::Sha512). The key is first padded (or hashed
//! and padded, if it's larger than the hash's block size) to exactly the
//! hash's block size, producing $K'$. The tag is then
//!
//! $$
//! H\Big((K' \oplus opad) \parallel H\big((K' \oplus ipad) \parallel m
//! \big) \Big)
//! $$
//!
//! where $m$ is the message, $opad$ is the byte $\mathrm{5C}_{16}$ repeated
//! to the hash's block size, and $ipad$ is $\mathrm{36}_{16}$ repeated the
//! same way. Concatenating the key on both sides of an independent hash call
//! (rather than, say, simply prepending it to the message) is what makes
//! HMAC resistant to length-extension attacks even over a hash function
//! that isn't.
//!
//! Like [`Sha512`], this streams: [`update`](HmacSha512::update) can be
//! called any number of times before [`finalize`](HmacSha512::finalize).

use {
    crate::hash::sha512::{Sha512, BLOCK_BYTES, DIGEST_BYTES},
    docext::docext,
};

const IPAD: u8 = 0x36;
const OPAD: u8 = 0x5C;

/// A streaming HMAC-SHA-512 context.
///
/// Holds a SHA-512 context already primed with `(K' ⊕ ipad)`, plus `(K' ⊕
/// opad)` retained for the outer hash computed at
/// [`finalize`](HmacSha512::finalize) time.
pub struct HmacSha512 {
    inner: Sha512,
    outer_pad: [u8; BLOCK_BYTES],
}

impl HmacSha512 {
    /// Derive `K'` from `key` and start the inner hash.
    ///
    /// If `key` is longer than [`BLOCK_BYTES`], `K' = SHA-512(key)` followed
    /// by zero bytes; otherwise `K' = key` zero-padded to `BLOCK_BYTES`.
    #[docext]
    pub fn new(key: &[u8]) -> Self {
        let mut k_prime = [0u8; BLOCK_BYTES];
        if key.len() > BLOCK_BYTES {
            let digest = Sha512::digest(key);
            k_prime[..DIGEST_BYTES].copy_from_slice(&digest);
        } else {
            k_prime[..key.len()].copy_from_slice(key);
        }

        let mut inner_pad = [0u8; BLOCK_BYTES];
        let mut outer_pad = [0u8; BLOCK_BYTES];
        for i in 0..BLOCK_BYTES {
            inner_pad[i] = k_prime[i] ^ IPAD;
            outer_pad[i] = k_prime[i] ^ OPAD;
        }

        let mut inner = Sha512::new();
        inner.update(&inner_pad);

        Self { inner, outer_pad }
    }

    /// Feed `data` into the inner hash.
    pub fn update(&mut self, data: &[u8]) {
        self.inner.update(data);
    }

    /// Finish the inner hash, then compute and return the outer hash as the
    /// 64-byte tag.
    pub fn finalize(self) -> [u8; DIGEST_BYTES] {
        let inner_digest = self.inner.finalize();
        let mut outer = Sha512::new();
        outer.update(&self.outer_pad);
        outer.update(&inner_digest);
        outer.finalize()
    }

    /// Convenience one-shot tag over a message and key already in memory.
    pub fn tag(key: &[u8], message: &[u8]) -> [u8; DIGEST_BYTES] {
        let mut ctx = Self::new(key);
        ctx.update(message);
        ctx.finalize()
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn hex(bytes: &[u8]) -> String {
        bytes.iter().map(|b| format!("{b:02x}")).collect()
    }

    /// RFC 4231 test case 1.
    #[test]
    fn rfc4231_case_1() {
        let key = [0x0bu8; 20];
        let data = b"Hi There";
        let tag = HmacSha512::tag(&key, data);
        assert_eq!(
            hex(&tag),
            "87aa7cdea5ef619d4ff0b4241a1d6cb02379f4e2ce4ec2787ad0b30545e17cdedaa833b7d6b8a702038b274eaea3f4e4be9d914eeb61f1702e696c203a126854"
        );
    }

    /// RFC 4231 test case 2: a key shorter than the block size.
    #[test]
    fn rfc4231_case_2() {
        let tag = HmacSha512::tag(b"Jefe", b"what do ya want for nothing?");
        assert_eq!(
            hex(&tag),
            "164b7a7bfcf819e2e395fbe73b56e0a387bd64222e831fd610270cd7ea2505549758bf75c05a994a6d034f65f8f0e6fdcaeab1a34d4a6b4b636e070a38bce737"
        );
    }

    /// RFC 4231 test case 6: a key longer than the block size, which forces
    /// the key-hashing branch of `K'` derivation.
    #[test]
    fn rfc4231_case_6_long_key() {
        let key = [0xaau8; 131];
        let data = b"Test Using Larger Than Block-Size Key - Hash Key First";
        let tag = HmacSha512::tag(&key, data);
        assert_eq!(
            hex(&tag),
            "80b24263c7c1a3ebb71493c1dd7be8b49b46d1f41b4aeec1121b013783f8f3526b56d037e05f2598bd0fd2215d6a1e5295e64f73f63f0aec8b915a985d786598"
        );
    }

    #[test]
    fn split_update_calls_match_single_call() {
        let key = b"some key";
        let message = b"a message split across several update calls for testing";
        let whole = HmacSha512::tag(key, message);

        let mut ctx = HmacSha512::new(key);
        for chunk in message.chunks(9) {
            ctx.update(chunk);
        }
        assert_eq!(ctx.finalize(), whole);
    }
}
