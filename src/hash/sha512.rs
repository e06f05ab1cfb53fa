//! SHA-512, specified by [FIPS
//! 180-4](https://nvlpubs.nist.gov/nistpubs/FIPS/NIST.FIPS.180-4.pdf).
//!
//! SHA-512 is a Merkle-Damgard hash over 128-byte blocks, with eight 64-bit
//! chaining values and an 80-round compression function. Rather than a
//! combinator over a whole in-memory buffer, this streams: a caller feeds it
//! bytes across any number of [`update`](Sha512::update) calls, in chunks of
//! any size, and [`finalize`](Sha512::finalize) pads and emits the digest.
//! This is what the envelope and file-hashing paths need, since a file is
//! read in fixed-size chunks rather than loaded whole into memory.

use docext::docext;

/// SHA-512's block size: 1024 bits.
pub const BLOCK_BYTES: usize = 128;

/// SHA-512's digest size: 512 bits.
pub const DIGEST_BYTES: usize = 64;

/// The SHA-512 initial chaining values, FIPS-180-4 Section 5.3.5.
const IV: [u64; 8] = [
    0x6a09e667f3bcc908,
    0xbb67ae8584caa73b,
    0x3c6ef372fe94f82b,
    0xa54ff53a5f1d36f1,
    0x510e527fade682d1,
    0x9b05688c2b3e6c1f,
    0x1f83d9abfb41bd6b,
    0x5be0cd19137e2179,
];

/// The round constants `K[0..79]`, FIPS-180-4 Section 4.2.3.
#[rustfmt::skip]
const K: [u64; 80] = [
    0x428a2f98d728ae22, 0x7137449123ef65cd, 0xb5c0fbcfec4d3b2f, 0xe9b5dba58189dbbc,
    0x3956c25bf348b538, 0x59f111f1b605d019, 0x923f82a4af194f9b, 0xab1c5ed5da6d8118,
    0xd807aa98a3030242, 0x12835b0145706fbe, 0x243185be4ee4b28c, 0x550c7dc3d5ffb4e2,
    0x72be5d74f27b896f, 0x80deb1fe3b1696b1, 0x9bdc06a725c71235, 0xc19bf174cf692694,
    0xe49b69c19ef14ad2, 0xefbe4786384f25e3, 0x0fc19dc68b8cd5b5, 0x240ca1cc77ac9c65,
    0x2de92c6f592b0275, 0x4a7484aa6ea6e483, 0x5cb0a9dcbd41fbd4, 0x76f988da831153b5,
    0x983e5152ee66dfab, 0xa831c66d2db43210, 0xb00327c898fb213f, 0xbf597fc7beef0ee4,
    0xc6e00bf33da88fc2, 0xd5a79147930aa725, 0x06ca6351e003826f, 0x142929670a0e6e70,
    0x27b70a8546d22ffc, 0x2e1b21385c26c926, 0x4d2c6dfc5ac42aed, 0x53380d139d95b3df,
    0x650a73548baf63de, 0x766a0abb3c77b2a8, 0x81c2c92e47edaee6, 0x92722c851482353b,
    0xa2bfe8a14cf10364, 0xa81a664bbc423001, 0xc24b8b70d0f89791, 0xc76c51a30654be30,
    0xd192e819d6ef5218, 0xd69906245565a910, 0xf40e35855771202a, 0x106aa07032bbd1b8,
    0x19a4c116b8d2d0c8, 0x1e376c085141ab53, 0x2748774cdf8eeb99, 0x34b0bcb5e19b48a8,
    0x391c0cb3c5c95a63, 0x4ed8aa4ae3418acb, 0x5b9cca4f7763e373, 0x682e6ff3d6b2b8a3,
    0x748f82ee5defb2fc, 0x78a5636f43172f60, 0x84c87814a1f0ab72, 0x8cc702081a6439ec,
    0x90befffa23631e28, 0xa4506cebde82bde9, 0xbef9a3f7b2c67915, 0xc67178f2e372532b,
    0xca273eceea26619c, 0xd186b8c721c0c207, 0xeada7dd6cde0eb1e, 0xf57d4f7fee6ed178,
    0x06f067aa72176fba, 0x0a637dc5a2c898a6, 0x113f9804bef90dae, 0x1b710b35131c471b,
    0x28db77f523047d84, 0x32caab7b40c72493, 0x3c9ebe0a15c9bebc, 0x431d67c49c100d4c,
    0x4cc5d4becb3e42b6, 0x597f299cfc657e2a, 0x5fcb6fab3ad6faec, 0x6c44198c4a475817,
];

/// A streaming SHA-512 context.
///
/// Holds the eight chaining words, a 128-bit message-bit-length counter
/// split into high and low 64-bit halves, a 128-byte partial-block buffer,
/// and the buffer's fill count. Message length never decreases across
/// [`update`](Sha512::update) calls, and the fill count is always less than
/// [`BLOCK_BYTES`] between calls.
#[derive(Clone)]
pub struct Sha512 {
    state: [u64; 8],
    len_hi: u64,
    len_lo: u64,
    buffer: [u8; BLOCK_BYTES],
    buffer_len: usize,
}

impl Default for Sha512 {
    fn default() -> Self {
        Self::new()
    }
}

impl Sha512 {
    /// A fresh context, chaining values set to the SHA-512 IV.
    pub fn new() -> Self {
        Self {
            state: IV,
            len_hi: 0,
            len_lo: 0,
            buffer: [0u8; BLOCK_BYTES],
            buffer_len: 0,
        }
    }

    /// Feed `input` into the hash. Any number of calls, of any chunk size,
    /// produce the same digest as one call over the concatenation — partial
    /// blocks are buffered across calls.
    pub fn update(&mut self, mut input: &[u8]) {
        self.count_bits(input.len());

        if self.buffer_len > 0 {
            let need = BLOCK_BYTES - self.buffer_len;
            let take = need.min(input.len());
            self.buffer[self.buffer_len..self.buffer_len + take].copy_from_slice(&input[..take]);
            self.buffer_len += take;
            input = &input[take..];
            if self.buffer_len == BLOCK_BYTES {
                let block = self.buffer;
                compress(&mut self.state, &block);
                self.buffer_len = 0;
            }
        }

        while input.len() >= BLOCK_BYTES {
            let block: [u8; BLOCK_BYTES] = input[..BLOCK_BYTES].try_into().unwrap();
            compress(&mut self.state, &block);
            input = &input[BLOCK_BYTES..];
        }

        if !input.is_empty() {
            self.buffer[..input.len()].copy_from_slice(input);
            self.buffer_len = input.len();
        }
    }

    fn count_bits(&mut self, bytes: usize) {
        let bits = (bytes as u64).wrapping_mul(8);
        let (lo, carry) = self.len_lo.overflowing_add(bits);
        self.len_lo = lo;
        if carry {
            self.len_hi = self.len_hi.wrapping_add(1);
        }
    }

    /// Pad the buffered tail, run the final compression(s), and emit the
    /// 64-byte digest.
    ///
    /// Padding appends a `0x80` byte, then zero bytes, until exactly 16
    /// bytes remain in the current block; those 16 bytes hold the 128-bit
    /// big-endian bit length. If the `0x80` byte and the length field don't
    /// both fit in what's left of the current block, padding spills into an
    /// additional block.
    #[docext]
    pub fn finalize(mut self) -> [u8; DIGEST_BYTES] {
        let mut tail = [0u8; 2 * BLOCK_BYTES];
        let mut len = self.buffer_len;
        tail[..len].copy_from_slice(&self.buffer[..len]);
        tail[len] = 0x80;
        len += 1;

        let total = if len <= BLOCK_BYTES - 16 {
            BLOCK_BYTES
        } else {
            2 * BLOCK_BYTES
        };
        tail[total - 16..total - 8].copy_from_slice(&self.len_hi.to_be_bytes());
        tail[total - 8..total].copy_from_slice(&self.len_lo.to_be_bytes());

        for block in tail[..total].chunks_exact(BLOCK_BYTES) {
            compress(&mut self.state, block.try_into().unwrap());
        }

        let mut digest = [0u8; DIGEST_BYTES];
        for (word, chunk) in self.state.iter().zip(digest.chunks_mut(8)) {
            chunk.copy_from_slice(&word.to_be_bytes());
        }
        digest
    }

    /// Convenience one-shot digest over a buffer already in memory.
    pub fn digest(input: &[u8]) -> [u8; DIGEST_BYTES] {
        let mut ctx = Self::new();
        ctx.update(input);
        ctx.finalize()
    }
}

/// The compression function, FIPS-180-4 Section 6.4.2: expand `block` into
/// an 80-word message schedule, then run 80 rounds of the eight working
/// variables through [`ch`], [`maj`], and the four sigma functions.
#[docext]
fn compress(state: &mut [u64; 8], block: &[u8; BLOCK_BYTES]) {
    let mut w = [0u64; 80];
    for (word, chunk) in w[..16].iter_mut().zip(block.chunks_exact(8)) {
        *word = u64::from_be_bytes(chunk.try_into().unwrap());
    }
    for t in 16..80 {
        w[t] = lowercase_sigma_1(w[t - 2])
            .wrapping_add(w[t - 7])
            .wrapping_add(lowercase_sigma_0(w[t - 15]))
            .wrapping_add(w[t - 16]);
    }

    let [mut a, mut b, mut c, mut d, mut e, mut f, mut g, mut h] = *state;

    for t in 0..80 {
        let t1 = h
            .wrapping_add(uppercase_sigma_1(e))
            .wrapping_add(ch(e, f, g))
            .wrapping_add(K[t])
            .wrapping_add(w[t]);
        let t2 = uppercase_sigma_0(a).wrapping_add(maj(a, b, c));
        h = g;
        g = f;
        f = e;
        e = d.wrapping_add(t1);
        d = c;
        c = b;
        b = a;
        a = t1.wrapping_add(t2);
    }

    state[0] = state[0].wrapping_add(a);
    state[1] = state[1].wrapping_add(b);
    state[2] = state[2].wrapping_add(c);
    state[3] = state[3].wrapping_add(d);
    state[4] = state[4].wrapping_add(e);
    state[5] = state[5].wrapping_add(f);
    state[6] = state[6].wrapping_add(g);
    state[7] = state[7].wrapping_add(h);
}

/// $Ch(x, y, z) = (x \land y) \oplus (\neg x \land z)$
#[docext]
fn ch(x: u64, y: u64, z: u64) -> u64 {
    (x & y) ^ (!x & z)
}

/// $Maj(x, y, z) = (x \land y) \oplus (x \land z) \oplus (y \land z)$
#[docext]
fn maj(x: u64, y: u64, z: u64) -> u64 {
    (x & y) ^ (x & z) ^ (y & z)
}

/// $\Sigma_0^{512}(x) = \mathrm{ROTR}^{28}(x) \oplus \mathrm{ROTR}^{34}(x)
/// \oplus \mathrm{ROTR}^{39}(x)$
#[docext]
fn uppercase_sigma_0(x: u64) -> u64 {
    x.rotate_right(28) ^ x.rotate_right(34) ^ x.rotate_right(39)
}

/// $\Sigma_1^{512}(x) = \mathrm{ROTR}^{14}(x) \oplus \mathrm{ROTR}^{18}(x)
/// \oplus \mathrm{ROTR}^{41}(x)$
#[docext]
fn uppercase_sigma_1(x: u64) -> u64 {
    x.rotate_right(14) ^ x.rotate_right(18) ^ x.rotate_right(41)
}

/// $\sigma_0^{512}(x) = \mathrm{ROTR}^1(x) \oplus \mathrm{ROTR}^8(x) \oplus
/// \mathrm{SHR}^7(x)$
#[docext]
fn lowercase_sigma_0(x: u64) -> u64 {
    x.rotate_right(1) ^ x.rotate_right(8) ^ (x >> 7)
}

/// $\sigma_1^{512}(x) = \mathrm{ROTR}^{19}(x) \oplus \mathrm{ROTR}^{61}(x)
/// \oplus \mathrm{SHR}^6(x)$
#[docext]
fn lowercase_sigma_1(x: u64) -> u64 {
    x.rotate_right(19) ^ x.rotate_right(61) ^ (x >> 6)
}

#[cfg(test)]
mod test {
    use super::*;

    fn hex(bytes: &[u8]) -> String {
        bytes.iter().map(|b| format!("{b:02x}")).collect()
    }

    #[test]
    fn empty_string() {
        let digest = Sha512::digest(b"");
        assert_eq!(
            hex(&digest),
            "cf83e1357eefb8bdf1542850d66d8007d620e4050b5715dc83f4a921d36ce9ce47d0d13c5d85f2b0ff8318d2877eec2f63b931bd47417a81a538327af927da3e"
        );
    }

    #[test]
    fn abc() {
        let digest = Sha512::digest(b"abc");
        assert_eq!(
            hex(&digest),
            "ddaf35a193617abacc417349ae20413112e6fa4e89a97ea20a9eeee64b55d39a2192992a274fc1a836ba3c23a3feebbd454d4423643ce80e2a9ac94fa54ca49f"
        );
    }

    #[test]
    fn one_million_a_streamed_in_small_chunks() {
        let mut ctx = Sha512::new();
        let chunk = [b'a'; 1000];
        for _ in 0..1000 {
            ctx.update(&chunk);
        }
        let digest = ctx.finalize();
        assert_eq!(
            hex(&digest),
            "e718483d0ce769644e2e42c7bc15b4638e1f98b13b2044285632a803afa973ebde0ff244877ea60a4cb0432ce577c31beb009c5c2c49aa2e4eadb217ad8cc09b"
        );
    }

    #[test]
    fn split_across_update_calls_matches_single_call() {
        let message = b"the quick brown fox jumps over the lazy dog, repeatedly, many times";
        let whole = Sha512::digest(message);

        let mut ctx = Sha512::new();
        for chunk in message.chunks(7) {
            ctx.update(chunk);
        }
        assert_eq!(ctx.finalize(), whole);
    }

    #[test]
    fn exactly_one_block_requires_a_second_block_of_padding() {
        let message = vec![0x61u8; BLOCK_BYTES];
        let digest = Sha512::digest(&message);
        assert_eq!(digest.len(), DIGEST_BYTES);
    }
}
