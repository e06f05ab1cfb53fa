//! The T-table AES engine: the full key schedule expanded once at
//! construction, and `SubBytes`/`MixColumns` folded into lookup tables.
//!
//! Where [the reference engine](super::aes) re-derives a round's key words
//! from scratch every time they're needed, this engine expands the entire
//! schedule once in [`init`](AesTTable::init) and keeps it. And where the
//! reference engine walks `SubBytes`, `ShiftRows`, `MixColumns`, and
//! `AddRoundKey` as four separate passes over the state, this engine folds
//! the substitution and the column mix into four 256-entry tables — `T0`
//! through `T3` for encryption, `Td0` through `Td3` for decryption — each
//! built once and cached for the process's lifetime.
//!
//! `SubBytes` and `ShiftRows` commute: substitution only depends on a byte's
//! value, never its position, so permuting bytes first and substituting
//! second gives the same result as the other way around. That means
//! `ShiftRows` can be applied as a plain byte permutation, and the
//! substitution folded into the same table lookup that performs the
//! column mix, without changing the result.

use {
    crate::{
        cipher::block::{check_key_len, gf256::gf_mul, nk_nr, sbox::sbox, BlockCipher, BLOCK_SIZE},
        error::CryptoError,
    },
    std::sync::OnceLock,
    zeroize::Zeroize,
};

const WORD_SIZE: usize = 4;
const NB: usize = 4;

/// Four 256-entry tables folding `SubBytes` and one column of `MixColumns`
/// together: `ENC[k][x]` is the contribution of raw byte `x`, substituted
/// and scaled, when it sits at position `k` of the column being mixed.
static ENC_TABLES: OnceLock<[[[u8; 4]; 256]; 4]> = OnceLock::new();

/// The decryption equivalent, folding one column of `InvMixColumns` (applied
/// to a byte that has already passed through `InvSubBytes` and
/// `AddRoundKey`).
static DEC_TABLES: OnceLock<[[[u8; 4]; 256]; 4]> = OnceLock::new();

fn enc_tables() -> &'static [[[u8; 4]; 256]; 4] {
    ENC_TABLES.get_or_init(|| {
        let (s, _) = sbox();
        let mut t = [[[0u8; 4]; 256]; 4];
        for x in 0..256 {
            let sx = s[x];
            let m2 = gf_mul(sx, 2);
            let m3 = gf_mul(sx, 3);
            t[0][x] = [m2, sx, sx, m3];
            t[1][x] = [m3, m2, sx, sx];
            t[2][x] = [sx, m3, m2, sx];
            t[3][x] = [sx, sx, m3, m2];
        }
        t
    })
}

fn dec_tables() -> &'static [[[u8; 4]; 256]; 4] {
    DEC_TABLES.get_or_init(|| {
        let mut t = [[[0u8; 4]; 256]; 4];
        for x in 0..256 {
            let b = x as u8;
            let m9 = gf_mul(b, 0x09);
            let m11 = gf_mul(b, 0x0b);
            let m13 = gf_mul(b, 0x0d);
            let m14 = gf_mul(b, 0x0e);
            t[0][x] = [m14, m9, m13, m11];
            t[1][x] = [m11, m14, m9, m13];
            t[2][x] = [m13, m11, m14, m9];
            t[3][x] = [m9, m13, m11, m14];
        }
        t
    })
}

/// The T-table AES engine.
///
/// Holds the fully expanded key schedule (`Nr + 1` round keys of 16 bytes
/// each), computed once at construction.
pub struct AesTTable {
    nr: usize,
    round_keys: Vec<[u8; BLOCK_SIZE]>,
}

impl Drop for AesTTable {
    fn drop(&mut self) {
        self.round_keys.zeroize();
    }
}

impl BlockCipher for AesTTable {
    fn init(key: &[u8]) -> Result<Self, CryptoError> {
        check_key_len(key)?;
        let (nk, nr) = nk_nr(key.len());
        let words = expand_key_words(key, nk, nr, NB * (nr + 1));
        let mut round_keys = Vec::with_capacity(nr + 1);
        for round in 0..=nr {
            let mut rk = [0u8; BLOCK_SIZE];
            for (i, word) in words[4 * round..4 * round + 4].iter().enumerate() {
                rk[i * WORD_SIZE..(i + 1) * WORD_SIZE].copy_from_slice(word);
            }
            round_keys.push(rk);
        }
        Ok(Self { nr, round_keys })
    }

    fn encrypt_block(&self, block: &mut [u8; BLOCK_SIZE]) {
        let mut state = *block;
        add_round_key(&mut state, &self.round_keys[0]);
        for round in 1..self.nr {
            state = enc_round(&state, &self.round_keys[round]);
        }
        state = enc_final_round(&state, &self.round_keys[self.nr]);
        *block = state;
    }

    fn decrypt_block(&self, block: &mut [u8; BLOCK_SIZE]) {
        let mut state = *block;
        add_round_key(&mut state, &self.round_keys[self.nr]);
        for round in (1..self.nr).rev() {
            state = dec_round(&state, &self.round_keys[round]);
        }
        state = dec_final_round(&state, &self.round_keys[0]);
        *block = state;
    }
}

fn add_round_key(state: &mut [u8; BLOCK_SIZE], rk: &[u8; BLOCK_SIZE]) {
    for (s, k) in state.iter_mut().zip(rk) {
        *s ^= k;
    }
}

/// Cyclically shift row `r` of `state` left by `r` positions, writing the
/// result into a fresh array (the non-mutating twin of
/// [`shift_rows`](super::aes) for use as a pure lookup index permutation).
fn shift_rows_copy(state: &[u8; BLOCK_SIZE]) -> [u8; BLOCK_SIZE] {
    const IDX: [usize; 16] = [0, 5, 10, 15, 4, 9, 14, 3, 8, 13, 2, 7, 12, 1, 6, 11];
    let mut out = [0u8; BLOCK_SIZE];
    for (o, &i) in out.iter_mut().zip(IDX.iter()) {
        *o = state[i];
    }
    out
}

/// The inverse permutation of [`shift_rows_copy`].
fn inv_shift_rows_copy(state: &[u8; BLOCK_SIZE]) -> [u8; BLOCK_SIZE] {
    const IDX: [usize; 16] = [0, 13, 10, 7, 4, 1, 14, 11, 8, 5, 2, 15, 12, 9, 6, 3];
    let mut out = [0u8; BLOCK_SIZE];
    for (o, &i) in out.iter_mut().zip(IDX.iter()) {
        *o = state[i];
    }
    out
}

/// One regular encryption round: `SubBytes`, `ShiftRows`, `MixColumns`, and
/// `AddRoundKey` folded into table lookups over the permuted bytes.
fn enc_round(state: &[u8; BLOCK_SIZE], rk: &[u8; BLOCK_SIZE]) -> [u8; BLOCK_SIZE] {
    let shifted = shift_rows_copy(state);
    let t = enc_tables();
    let mut out = [0u8; BLOCK_SIZE];
    for col in 0..4 {
        let b = &shifted[col * 4..col * 4 + 4];
        let mut column = [0u8; 4];
        for k in 0..4 {
            let contribution = t[k][b[k] as usize];
            for i in 0..4 {
                column[i] ^= contribution[i];
            }
        }
        for i in 0..4 {
            out[col * 4 + i] = column[i] ^ rk[col * 4 + i];
        }
    }
    out
}

/// The final encryption round: `SubBytes`, `ShiftRows`, and `AddRoundKey`,
/// with no `MixColumns`.
fn enc_final_round(state: &[u8; BLOCK_SIZE], rk: &[u8; BLOCK_SIZE]) -> [u8; BLOCK_SIZE] {
    let shifted = shift_rows_copy(state);
    let (s, _) = sbox();
    let mut out = [0u8; BLOCK_SIZE];
    for i in 0..BLOCK_SIZE {
        out[i] = s[shifted[i] as usize] ^ rk[i];
    }
    out
}

/// One regular decryption round: `InvShiftRows` and `InvSubBytes` (which
/// commute, so applied as permutation-then-lookup), `AddRoundKey`, then
/// `InvMixColumns` folded into table lookups.
fn dec_round(state: &[u8; BLOCK_SIZE], rk: &[u8; BLOCK_SIZE]) -> [u8; BLOCK_SIZE] {
    let shifted = inv_shift_rows_copy(state);
    let (_, inv) = sbox();
    let mut mixed_input = [0u8; BLOCK_SIZE];
    for i in 0..BLOCK_SIZE {
        mixed_input[i] = inv[shifted[i] as usize] ^ rk[i];
    }
    let t = dec_tables();
    let mut out = [0u8; BLOCK_SIZE];
    for col in 0..4 {
        let b = &mixed_input[col * 4..col * 4 + 4];
        let mut column = [0u8; 4];
        for k in 0..4 {
            let contribution = t[k][b[k] as usize];
            for i in 0..4 {
                column[i] ^= contribution[i];
            }
        }
        out[col * 4..col * 4 + 4].copy_from_slice(&column);
    }
    out
}

/// The final decryption round: `InvShiftRows`, `InvSubBytes`, and
/// `AddRoundKey`, with no `InvMixColumns`.
fn dec_final_round(state: &[u8; BLOCK_SIZE], rk: &[u8; BLOCK_SIZE]) -> [u8; BLOCK_SIZE] {
    let shifted = inv_shift_rows_copy(state);
    let (_, inv) = sbox();
    let mut out = [0u8; BLOCK_SIZE];
    for i in 0..BLOCK_SIZE {
        out[i] = inv[shifted[i] as usize] ^ rk[i];
    }
    out
}

/// Same `KeyExpansion` routine as the reference engine, computing the whole
/// schedule at once since this engine caches it.
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

fn rot_word(word: [u8; WORD_SIZE]) -> [u8; WORD_SIZE] {
    [word[1], word[2], word[3], word[0]]
}

fn sub_word(word: [u8; WORD_SIZE]) -> [u8; WORD_SIZE] {
    let (s, _) = sbox();
    word.map(|b| s[b as usize])
}

fn rcon(i: usize) -> u8 {
    let mut r = 1u8;
    for _ in 1..i {
        r = gf_mul(r, 0x02);
    }
    r
}
