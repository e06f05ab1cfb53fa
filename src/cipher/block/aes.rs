//! The reference AES engine: standards-faithful, and deliberately small
//! rather than fast.
//!
//! AES works on 128-bit blocks and supports 128-, 192-, and 256-bit keys. It
//! applies a sequence of rounds, each substituting bytes through an
//! [S-box](super::sbox), permuting them, mixing columns together, and XORing
//! in a round key — see [`encrypt_block`](AesRef::encrypt_block) for the
//! exact sequence, specified in FIPS-197 Section 5.
//!
//! Unlike the [T-table engine](super::aes_ttable), this engine does not
//! expand and cache the full key schedule up front. Each round re-derives
//! only the four words of key schedule it needs, from scratch, discarding the
//! work afterward. This is a deliberate space-for-speed trade-off — the
//! engine exists to demonstrate the algorithm plainly, not to be fast — and
//! [`AesTTable`](super::aes_ttable::AesTTable) is what a caller should reach
//! for when speed matters. Both must produce bit-identical output.

use {
    crate::{
        cipher::block::{check_key_len, gf256::gf_mul, nk_nr, sbox::sbox, BlockCipher, BLOCK_SIZE},
        error::CryptoError,
    },
    docext::docext,
    zeroize::Zeroize,
};

/// AES word size in bytes.
const WORD_SIZE: usize = 4;

/// Block size in words (`Nb` in FIPS-197, always 4 for AES).
const NB: usize = 4;

/// The reference AES engine.
///
/// Holds `Nk` (key length in words), `Nr` (number of rounds, `Nk + 6`), and
/// the original key bytes — the key schedule is re-derived from these on
/// every round rather than cached.
pub struct AesRef {
    nk: usize,
    nr: usize,
    key: Vec<u8>,
}

impl Drop for AesRef {
    fn drop(&mut self) {
        self.key.zeroize();
    }
}

impl BlockCipher for AesRef {
    fn init(key: &[u8]) -> Result<Self, CryptoError> {
        check_key_len(key)?;
        let (nk, nr) = nk_nr(key.len());
        Ok(Self {
            nk,
            nr,
            key: key.to_vec(),
        })
    }

    /// AES encryption, FIPS-197 Section 5.1: an initial `AddRoundKey`, then
    /// `Nr - 1` rounds of `SubBytes → ShiftRows → MixColumns → AddRoundKey`,
    /// then a final round without `MixColumns`.
    fn encrypt_block(&self, block: &mut [u8; BLOCK_SIZE]) {
        add_round_key(block, &self.round_key(0));
        for round in 1..self.nr {
            sub_bytes(block);
            shift_rows(block);
            mix_columns(block);
            add_round_key(block, &self.round_key(round));
        }
        sub_bytes(block);
        shift_rows(block);
        add_round_key(block, &self.round_key(self.nr));
    }

    /// The equivalent inverse cipher, FIPS-197 Section 5.3: the same round
    /// keys in reverse order, with `InvShiftRows`, `InvSubBytes`, and
    /// `InvMixColumns` in place of their forward counterparts.
    fn decrypt_block(&self, block: &mut [u8; BLOCK_SIZE]) {
        add_round_key(block, &self.round_key(self.nr));
        for round in (1..self.nr).rev() {
            inv_shift_rows(block);
            inv_sub_bytes(block);
            add_round_key(block, &self.round_key(round));
            inv_mix_columns(block);
        }
        inv_shift_rows(block);
        inv_sub_bytes(block);
        add_round_key(block, &self.round_key(0));
    }
}

impl AesRef {
    /// Re-derive the key schedule from scratch up through `round`, and
    /// return only that round's 16-byte slice of it.
    fn round_key(&self, round: usize) -> [u8; BLOCK_SIZE] {
        let words = expand_key_words(&self.key, self.nk, self.nr, 4 * (round + 1));
        let mut rk = [0u8; BLOCK_SIZE];
        for (i, word) in words[4 * round..4 * round + 4].iter().enumerate() {
            rk[i * WORD_SIZE..(i + 1) * WORD_SIZE].copy_from_slice(word);
        }
        rk
    }
}

/// The `KeyExpansion` routine, FIPS-197 Section 5.2, computing only the
/// first `word_count` 32-bit words of the schedule.
///
/// Every `Nk`-th word is derived from the previous word by [`rot_word`],
/// [`sub_word`], and XOR with a round constant from [`rcon`]; for 256-bit
/// keys, words at `i % Nk == 4` are additionally run through `SubWord`
/// alone. Every other word is the XOR of the word `Nk` positions back and
/// the previous word.
fn expand_key_words(key: &[u8], nk: usize, nr: usize, word_count: usize) -> Vec<[u8; WORD_SIZE]> {
    let total = NB * (nr + 1);
    let word_count = word_count.min(total);
    let mut w: Vec<[u8; WORD_SIZE]> = Vec::with_capacity(word_count);
    for i in 0..word_count {
        if i < nk {
            let mut word = [0u8; WORD_SIZE];
            word.copy_from_slice(&key[i * WORD_SIZE..(i + 1) * WORD_SIZE]);
            w.push(word);
        } else {
            let mut temp = w[i - 1];
            if i % nk == 0 {
                temp = sub_word(rot_word(temp));
                temp[0] ^= rcon(i / nk);
            } else if nk > 6 && i % nk == 4 {
                temp = sub_word(temp);
            }
            let prev = w[i - nk];
            let mut next = [0u8; WORD_SIZE];
            for j in 0..WORD_SIZE {
                next[j] = prev[j] ^ temp[j];
            }
            w.push(next);
        }
    }
    w
}

/// `RotWord`: cyclic left rotation of a word by one byte.
fn rot_word(word: [u8; WORD_SIZE]) -> [u8; WORD_SIZE] {
    [word[1], word[2], word[3], word[0]]
}

/// `SubWord`: apply the forward S-box to each byte of a word.
fn sub_word(word: [u8; WORD_SIZE]) -> [u8; WORD_SIZE] {
    let (s, _) = sbox();
    word.map(|b| s[b as usize])
}

/// The `i`-th round constant, $\mathrm{RCON}[i] = x^{i - 1}$ in $GF(2^8)$,
/// computed by repeated doubling rather than stored as a table. `rcon(1) =
/// 1`; doubling past `0x80` wraps through the field's reduction polynomial
/// (`rcon(9) = 0x1B`, `rcon(10) = 0x36`, matching FIPS-197 Appendix A).
#[docext]
fn rcon(i: usize) -> u8 {
    let mut r = 1u8;
    for _ in 1..i {
        r = gf_mul(r, 0x02);
    }
    r
}

/// `AddRoundKey`: XOR the state with the round key.
fn add_round_key(state: &mut [u8; BLOCK_SIZE], round_key: &[u8; BLOCK_SIZE]) {
    for (s, k) in state.iter_mut().zip(round_key) {
        *s ^= k;
    }
}

/// `SubBytes`: replace each byte with its forward S-box entry.
fn sub_bytes(state: &mut [u8; BLOCK_SIZE]) {
    let (s, _) = sbox();
    for b in state.iter_mut() {
        *b = s[*b as usize];
    }
}

/// `InvSubBytes`: replace each byte with its inverse S-box entry.
fn inv_sub_bytes(state: &mut [u8; BLOCK_SIZE]) {
    let (_, inv) = sbox();
    for b in state.iter_mut() {
        *b = inv[*b as usize];
    }
}

/// `ShiftRows`: cyclically shift row `r` of the state (viewed as a
/// column-major 4x4 byte matrix, so row `r` lives at indices `r, r+4, r+8,
/// r+12`) left by `r` positions.
fn shift_rows(state: &mut [u8; BLOCK_SIZE]) {
    state.swap(1, 13);
    state.swap(5, 9);
    state.swap(1, 9);

    state.swap(2, 10);
    state.swap(6, 14);

    state.swap(3, 7);
    state.swap(11, 15);
    state.swap(3, 11);
}

/// `InvShiftRows`: the inverse of [`shift_rows`], shifting each row right
/// instead of left.
fn inv_shift_rows(state: &mut [u8; BLOCK_SIZE]) {
    state.swap(1, 13);
    state.swap(5, 9);
    state.swap(5, 13);

    state.swap(2, 10);
    state.swap(6, 14);

    state.swap(3, 15);
    state.swap(7, 11);
    state.swap(3, 11);
}

/// `MixColumns`: multiply each column of the state by a fixed $4 \times 4$
/// matrix over $GF(2^8)$, mixing the bytes of that column together.
fn mix_columns(state: &mut [u8; BLOCK_SIZE]) {
    let copy = *state;
    for (s, c) in state.chunks_mut(4).zip(copy.chunks(4)) {
        s[0] = gf_mul(c[0], 2) ^ gf_mul(c[1], 3) ^ c[2] ^ c[3];
        s[1] = c[0] ^ gf_mul(c[1], 2) ^ gf_mul(c[2], 3) ^ c[3];
        s[2] = c[0] ^ c[1] ^ gf_mul(c[2], 2) ^ gf_mul(c[3], 3);
        s[3] = gf_mul(c[0], 3) ^ c[1] ^ c[2] ^ gf_mul(c[3], 2);
    }
}

/// `InvMixColumns`: multiply each column by the inverse of the
/// [`MixColumns`](mix_columns) matrix.
fn inv_mix_columns(state: &mut [u8; BLOCK_SIZE]) {
    let copy = *state;
    for (s, c) in state.chunks_mut(4).zip(copy.chunks(4)) {
        s[0] = gf_mul(c[0], 0x0e) ^ gf_mul(c[1], 0x0b) ^ gf_mul(c[2], 0x0d) ^ gf_mul(c[3], 0x09);
        s[1] = gf_mul(c[0], 0x09) ^ gf_mul(c[1], 0x0e) ^ gf_mul(c[2], 0x0b) ^ gf_mul(c[3], 0x0d);
        s[2] = gf_mul(c[0], 0x0d) ^ gf_mul(c[1], 0x09) ^ gf_mul(c[2], 0x0e) ^ gf_mul(c[3], 0x0b);
        s[3] = gf_mul(c[0], 0x0b) ^ gf_mul(c[1], 0x0d) ^ gf_mul(c[2], 0x09) ^ gf_mul(c[3], 0x0e);
    }
}

#[cfg(test)]
mod test {
    use super::*;

    /// FIPS-197 Appendix B: one full AES-128 encryption, round by round.
    #[test]
    fn fips197_appendix_b_aes128() {
        let key = [
            0x00, 0x01, 0x02, 0x03, 0x04, 0x05, 0x06, 0x07, 0x08, 0x09, 0x0a, 0x0b, 0x0c, 0x0d,
            0x0e, 0x0f,
        ];
        let mut block = [
            0x00, 0x11, 0x22, 0x33, 0x44, 0x55, 0x66, 0x77, 0x88, 0x99, 0xaa, 0xbb, 0xcc, 0xdd,
            0xee, 0xff,
        ];
        let expected = [
            0x69, 0xc4, 0xe0, 0xd8, 0x6a, 0x7b, 0x04, 0x30, 0xd8, 0xcd, 0xb7, 0x80, 0x70, 0xb4,
            0xc5, 0x5a,
        ];
        let engine = AesRef::init(&key).unwrap();
        engine.encrypt_block(&mut block);
        assert_eq!(block, expected);
        engine.decrypt_block(&mut block);
        assert_eq!(
            block,
            [
                0x00, 0x11, 0x22, 0x33, 0x44, 0x55, 0x66, 0x77, 0x88, 0x99, 0xaa, 0xbb, 0xcc,
                0xdd, 0xee, 0xff,
            ]
        );
    }

    #[test]
    fn rcon_matches_fips_table() {
        assert_eq!(rcon(1), 0x01);
        assert_eq!(rcon(2), 0x02);
        assert_eq!(rcon(8), 0x80);
        assert_eq!(rcon(9), 0x1b);
        assert_eq!(rcon(10), 0x36);
    }

    #[test]
    fn shift_rows_is_its_own_inverse_pair() {
        let mut state: [u8; 16] = core::array::from_fn(|i| i as u8);
        let original = state;
        shift_rows(&mut state);
        assert_ne!(state, original);
        inv_shift_rows(&mut state);
        assert_eq!(state, original);
    }

    #[test]
    fn mix_columns_round_trips() {
        let mut state: [u8; 16] = core::array::from_fn(|i| (i * 17) as u8);
        let original = state;
        mix_columns(&mut state);
        inv_mix_columns(&mut state);
        assert_eq!(state, original);
    }

    #[test]
    fn rejects_bad_key_length() {
        assert!(AesRef::init(&[0u8; 15]).is_err());
    }
}
