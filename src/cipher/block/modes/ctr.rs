//! Counter (CTR) mode: turns a [block cipher](crate::cipher::block::BlockCipher)
//! into a stream cipher.
//!
//! Instead of running the block cipher on the plaintext, CTR mode runs it on
//! a counter block to produce a keystream, then XORs the keystream with the
//! plaintext. Since XOR is its own inverse, encryption and decryption are the
//! same operation, and the plaintext never needs to be a multiple of the
//! block size — there's no padding to worry about.

use crate::cipher::block::{BlockCipher, BLOCK_SIZE};

/// A CTR-mode context: an exclusively-borrowed block-cipher handle, the
/// current 16-byte counter block, the most recently generated keystream
/// block, and how many of its bytes have already been consumed.
///
/// The counter is interpreted as a 128-bit big-endian integer. A fresh
/// keystream block is generated — and the counter advanced — only once the
/// previous block is fully consumed, so a message split across two
/// [`Ctr::update`] calls produces exactly the same output as one call over
/// the concatenated input, even when the split falls in the middle of a
/// 16-byte block.
///
/// Reusing a `Ctr` (i.e. the same key and IV) across two unrelated messages
/// breaks CTR's security guarantees; avoiding that is the caller's
/// responsibility (see [`crate::envelope`], which always draws a fresh IV).
pub struct Ctr<'engine, E> {
    engine: &'engine E,
    counter: [u8; BLOCK_SIZE],
    keystream: [u8; BLOCK_SIZE],
    used: usize,
}

impl<'engine, E: BlockCipher> Ctr<'engine, E> {
    /// Bind to an `engine` and initialize the counter from `iv`.
    pub fn new(engine: &'engine E, iv: [u8; BLOCK_SIZE]) -> Self {
        Self {
            engine,
            counter: iv,
            keystream: [0; BLOCK_SIZE],
            // Force a fresh keystream block to be generated on first use.
            used: BLOCK_SIZE,
        }
    }

    /// Process `input` into `output`. `input` and `output` may be the same
    /// buffer (in-place XOR). A zero-length call is a no-op. `output` always
    /// ends up exactly as long as `input`; no padding is applied.
    pub fn update(&mut self, input: &[u8], output: &mut [u8]) {
        assert_eq!(
            input.len(),
            output.len(),
            "CTR input/output length mismatch"
        );
        let mut offset = 0;
        while offset < input.len() {
            if self.used == BLOCK_SIZE {
                self.keystream = self.counter;
                self.engine.encrypt_block(&mut self.keystream);
                increment_counter(&mut self.counter);
                self.used = 0;
            }
            let available = BLOCK_SIZE - self.used;
            let n = available.min(input.len() - offset);
            for i in 0..n {
                output[offset + i] = input[offset + i] ^ self.keystream[self.used + i];
            }
            self.used += n;
            offset += n;
        }
    }
}

/// Increment a 16-byte big-endian counter by one, wrapping around on
/// overflow (all `0xFF` bytes followed by one increment becomes all-zero).
fn increment_counter(counter: &mut [u8; BLOCK_SIZE]) {
    for byte in counter.iter_mut().rev() {
        *byte = byte.wrapping_add(1);
        if *byte != 0 {
            break;
        }
    }
}

#[cfg(test)]
mod test {
    use {
        super::{increment_counter, Ctr},
        crate::cipher::block::{AesEngine, BlockCipher, EngineKind},
        rand::Rng,
    };

    fn unhex(s: &str) -> Vec<u8> {
        hex::decode(s).unwrap()
    }

    fn run_ctr(engine: &AesEngine, iv: [u8; 16], input: &[u8]) -> Vec<u8> {
        let mut ctr = Ctr::new(engine, iv);
        let mut out = vec![0u8; input.len()];
        ctr.update(input, &mut out);
        out
    }

    /// NIST SP 800-38A AES-CTR test vectors, for each supported key size and
    /// both AES engines.
    #[test]
    fn nist_sp800_38a_ctr_vectors() {
        let iv: [u8; 16] = unhex("f0f1f2f3f4f5f6f7f8f9fafbfcfdfeff").try_into().unwrap();
        let plaintext = unhex(
            "6bc1bee22e409f96e93d7e117393172a\
             ae2d8a571e03ac9c9eb76fac45af8e51\
             30c81c46a35ce411e5fbc1191a0a52ef\
             f69f2445df4f9b17ad2b417be66c3710",
        );

        let cases = [
            (
                "2b7e151628aed2a6abf7158809cf4f3c",
                "874d6191b620e3261bef6864990db6ce\
                 9806f66b7970fdff8617187bb9fffdff\
                 5ae4df3edbd5d35e5b4f09020db03eab\
                 1e031dda2fbe03d1792170a0f3009cee",
            ),
            (
                "8e73b0f7da0e6452c810f32b809079e562f8ead2522c6b7b",
                "1abc932417521ca24f2b0459fe7e6e0b\
                 090339ec0aa6faefd5ccc2c6f4ce8e94\
                 1e36b26bd1ebc670d1bd1d665620abf7\
                 4f78a7f6d29809585a97daec58c6b050",
            ),
            (
                "603deb1015ca71be2b73aef0857d77811f352c073b6108d72d9810a30914dff4",
                "601ec313775789a5b7a7f504bbf3d228\
                 f443e3ca4d62b59aca84e990cacaf5c5\
                 2b0930daa23de94ce87017ba2d84988d\
                 dfc9c58db67aada613c2dd08457941a6",
            ),
        ];

        for (key_hex, ct_hex) in cases {
            let key = unhex(key_hex);
            let expected_ct = unhex(ct_hex);

            for kind in [EngineKind::Reference, EngineKind::TTable] {
                let engine = AesEngine::init(kind, &key).unwrap();
                let ciphertext = run_ctr(&engine, iv, &plaintext);
                assert_eq!(ciphertext, expected_ct, "key length {}", key.len());

                let recovered = run_ctr(&engine, iv, &ciphertext);
                assert_eq!(recovered, plaintext, "key length {}", key.len());
            }
        }
    }

    #[test]
    fn two_update_calls_match_one_call_over_the_concatenation() {
        let key = [0x5Au8; 16];
        let iv = [0u8; 16];
        let engine = AesEngine::init(EngineKind::TTable, &key).unwrap();
        let input: Vec<u8> = (0..200).map(|i| i as u8).collect();

        let whole = run_ctr(&engine, iv, &input);

        let mut split = vec![0u8; input.len()];
        let mut ctr = Ctr::new(&engine, iv);
        ctr.update(&input[..9], &mut split[..9]);
        ctr.update(&input[9..], &mut split[9..]);

        assert_eq!(split, whole);
    }

    #[test]
    fn counter_wraps_from_all_ff_to_all_zero() {
        let mut counter = [0xFFu8; 16];
        increment_counter(&mut counter);
        assert_eq!(counter, [0u8; 16]);
    }

    #[test]
    fn counter_increments_last_byte_without_carry() {
        let mut counter = [0u8; 16];
        increment_counter(&mut counter);
        let mut expected = [0u8; 16];
        expected[15] = 1;
        assert_eq!(counter, expected);
    }

    /// `decrypt(encrypt(plaintext)) == plaintext` for a random key, IV, and
    /// plaintext, across both engines and a spread of key sizes.
    #[test]
    fn random_round_trip() {
        for key_len in [16usize, 24, 32] {
            for kind in [EngineKind::Reference, EngineKind::TTable] {
                let key: Vec<u8> = (0..key_len).map(|_| rand::thread_rng().gen()).collect();
                let iv: [u8; 16] = rand::thread_rng().gen();
                let plaintext: Vec<u8> =
                    (0..137).map(|_| rand::thread_rng().gen()).collect();

                let engine = AesEngine::init(kind, &key).unwrap();
                let ciphertext = run_ctr(&engine, iv, &plaintext);
                let recovered = run_ctr(&engine, iv, &ciphertext);

                assert_eq!(
                    recovered, plaintext,
                    "round trip failed for key length {key_len}"
                );
            }
        }
    }

    #[test]
    fn counter_carries_through_multiple_bytes() {
        let mut counter = [0u8; 16];
        counter[14] = 0xFF;
        counter[15] = 0xFF;
        increment_counter(&mut counter);
        let mut expected = [0u8; 16];
        expected[13] = 1;
        assert_eq!(counter, expected);
    }
}
