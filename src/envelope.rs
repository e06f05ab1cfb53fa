//! The authenticated envelope: `IV ‖ ciphertext ‖ tag`, combining AES-CTR
//! with HMAC-SHA-512 via encrypt-then-MAC.
//!
//! Encryption runs CTR to a temporary file first, then streams that file
//! through HMAC (prefixed by the IV) to produce the tag, then concatenates
//! `IV ‖ ciphertext ‖ tag` into the final output. Decryption authenticates
//! before it decrypts: the stored tag is recomputed and compared in full
//! before any plaintext byte is written, so a corrupted or forged envelope
//! never causes partial plaintext to reach the caller.

use {
    crate::{
        cipher::block::{AesEngine, BlockCipher, Ctr, BLOCK_SIZE},
        error::{CancelledAfterAuth, CryptoError, Result},
        mac::HmacSha512,
        random::random_iv,
    },
    std::{
        fs::{self, File},
        io::{Read, Seek, SeekFrom, Write},
        path::Path,
    },
    tempfile::NamedTempFile,
};

const TAG_SIZE: usize = 64;
const MIN_ENVELOPE_SIZE: u64 = BLOCK_SIZE as u64 + TAG_SIZE as u64;

/// Encrypt `in_path` into the envelope format at `out_path`.
///
/// `aes_key` drives the CTR pass; `hmac_key` drives the authentication tag.
/// The two should not be the same bytes — callers that need a single shared
/// secret should derive distinct subkeys from it before calling this.
pub fn encrypt_envelope(
    engine_kind: crate::cipher::block::EngineKind,
    in_path: &Path,
    out_path: &Path,
    aes_key: &[u8],
    hmac_key: &[u8],
) -> Result<()> {
    let iv = random_iv()?;
    let engine = AesEngine::init(engine_kind, aes_key)?;

    let temp = NamedTempFile::new().map_err(|source| CryptoError::IoOpen {
        path: out_path.to_path_buf(),
        source,
    })?;
    let temp_path = temp.path().to_path_buf();

    let result = encrypt_envelope_inner(&engine, in_path, out_path, &temp_path, iv, hmac_key);
    if result.is_err() {
        fs::remove_file(&temp_path).ok();
        fs::remove_file(out_path).ok();
    }
    result
}

fn encrypt_envelope_inner(
    engine: &AesEngine,
    in_path: &Path,
    out_path: &Path,
    temp_path: &Path,
    iv: [u8; BLOCK_SIZE],
    hmac_key: &[u8],
) -> Result<()> {
    crate::stream::process_ctr_file(engine, in_path, temp_path, iv)?;

    let mut mac = HmacSha512::new(hmac_key);
    mac.update(&iv);
    let mut temp_in = File::open(temp_path).map_err(|source| CryptoError::IoOpen {
        path: temp_path.to_path_buf(),
        source,
    })?;
    let mut buf = vec![0u8; crate::stream::STREAM_BUF_SIZE];
    let mut fout = File::create(out_path).map_err(|source| CryptoError::IoOpen {
        path: out_path.to_path_buf(),
        source,
    })?;
    fout.write_all(&iv).map_err(|source| CryptoError::IoWrite {
        path: out_path.to_path_buf(),
        source,
    })?;

    loop {
        let n = temp_in.read(&mut buf).map_err(|source| CryptoError::IoRead {
            path: temp_path.to_path_buf(),
            source,
        })?;
        if n == 0 {
            break;
        }
        mac.update(&buf[..n]);
        fout.write_all(&buf[..n]).map_err(|source| CryptoError::IoWrite {
            path: out_path.to_path_buf(),
            source,
        })?;
    }

    let tag = mac.finalize();
    fout.write_all(&tag).map_err(|source| CryptoError::IoWrite {
        path: out_path.to_path_buf(),
        source,
    })?;
    fout.flush().map_err(|source| CryptoError::IoWrite {
        path: out_path.to_path_buf(),
        source,
    })?;

    // out_path is fully written and flushed at this point, so a failure to
    // remove the scratch temp file must not be reported as an encryption
    // failure — the caller would otherwise delete a perfectly good
    // out_path over an unrelated cleanup hiccup. Best-effort only, as the
    // original C's bare `remove(tempFile)` is.
    fs::remove_file(temp_path).ok();

    tracing::debug!(path = %out_path.display(), "envelope written");
    Ok(())
}

/// Decrypt the envelope at `in_path` into the plaintext at `out_path`.
///
/// Authenticates the full envelope before writing any plaintext.
/// `authenticated_callback` is invoked once authentication succeeds; if it
/// returns `false`, decryption stops and no plaintext is written — this is
/// reported as `Ok(Err(CancelledAfterAuth))`, a distinct completion status
/// rather than a [`CryptoError`].
pub fn decrypt_envelope(
    engine_kind: crate::cipher::block::EngineKind,
    in_path: &Path,
    out_path: &Path,
    aes_key: &[u8],
    hmac_key: &[u8],
    authenticated_callback: impl FnOnce() -> bool,
) -> Result<std::result::Result<(), CancelledAfterAuth>> {
    let size = fs::metadata(in_path)
        .map_err(|source| CryptoError::IoOpen {
            path: in_path.to_path_buf(),
            source,
        })?
        .len();
    if size < MIN_ENVELOPE_SIZE {
        return Err(CryptoError::ShortEnvelope {
            actual: size,
            minimum: MIN_ENVELOPE_SIZE,
        });
    }

    let mut fin = File::open(in_path).map_err(|source| CryptoError::IoOpen {
        path: in_path.to_path_buf(),
        source,
    })?;

    let mut iv = [0u8; BLOCK_SIZE];
    fin.read_exact(&mut iv).map_err(|source| CryptoError::IoRead {
        path: in_path.to_path_buf(),
        source,
    })?;

    let mut stored_tag = [0u8; TAG_SIZE];
    fin.seek(SeekFrom::Start(size - TAG_SIZE as u64))
        .map_err(|source| CryptoError::IoRead {
            path: in_path.to_path_buf(),
            source,
        })?;
    fin.read_exact(&mut stored_tag).map_err(|source| CryptoError::IoRead {
        path: in_path.to_path_buf(),
        source,
    })?;

    let ciphertext_len = size - MIN_ENVELOPE_SIZE;
    fin.seek(SeekFrom::Start(BLOCK_SIZE as u64))
        .map_err(|source| CryptoError::IoRead {
            path: in_path.to_path_buf(),
            source,
        })?;

    let mut mac = HmacSha512::new(hmac_key);
    mac.update(&iv);
    let mut remaining = ciphertext_len;
    let mut buf = vec![0u8; crate::stream::STREAM_BUF_SIZE];
    while remaining > 0 {
        let want = remaining.min(buf.len() as u64) as usize;
        fin.read_exact(&mut buf[..want]).map_err(|source| CryptoError::IoRead {
            path: in_path.to_path_buf(),
            source,
        })?;
        mac.update(&buf[..want]);
        remaining -= want as u64;
    }
    let recomputed_tag = mac.finalize();

    if !tags_match(&recomputed_tag, &stored_tag) {
        return Err(CryptoError::AuthenticationFailure);
    }

    if !authenticated_callback() {
        return Ok(Err(CancelledAfterAuth));
    }

    let engine = AesEngine::init(engine_kind, aes_key)?;
    let mut ctr = Ctr::new(&engine, iv);
    let mut fout = File::create(out_path).map_err(|source| CryptoError::IoOpen {
        path: out_path.to_path_buf(),
        source,
    })?;

    fin.seek(SeekFrom::Start(BLOCK_SIZE as u64))
        .map_err(|source| CryptoError::IoRead {
            path: in_path.to_path_buf(),
            source,
        })?;
    let mut remaining = ciphertext_len;
    while remaining > 0 {
        let want = remaining.min(buf.len() as u64) as usize;
        fin.read_exact(&mut buf[..want]).map_err(|source| CryptoError::IoRead {
            path: in_path.to_path_buf(),
            source,
        })?;
        let mut out = vec![0u8; want];
        ctr.update(&buf[..want], &mut out);
        fout.write_all(&out).map_err(|source| CryptoError::IoWrite {
            path: out_path.to_path_buf(),
            source,
        })?;
        remaining -= want as u64;
    }
    fout.flush().map_err(|source| CryptoError::IoWrite {
        path: out_path.to_path_buf(),
        source,
    })?;

    tracing::debug!(path = %out_path.display(), "envelope authenticated and decrypted");
    Ok(Ok(()))
}

/// Compare two 64-byte tags over their entire length, never short-circuiting
/// on the first mismatching byte.
fn tags_match(a: &[u8; TAG_SIZE], b: &[u8; TAG_SIZE]) -> bool {
    let mut diff = 0u8;
    for i in 0..TAG_SIZE {
        diff |= a[i] ^ b[i];
    }
    diff == 0
}
