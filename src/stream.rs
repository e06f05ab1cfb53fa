//! Chunked file-I/O wrappers over the core primitives.
//!
//! Every operation here reads (and, for CTR, writes) a file in fixed-size
//! chunks through a heap-allocated buffer rather than mapping the whole file
//! or recursing into a stack buffer — some host environments hand the
//! calling thread a small stack, and large files should never depend on it.

use {
    crate::{
        cipher::block::{AesEngine, BlockCipher, Ctr, BLOCK_SIZE},
        error::{CryptoError, Result},
        hash::Sha512,
        mac::HmacSha512,
    },
    std::{
        fs::File,
        io::{Read, Write},
        path::Path,
    },
};

/// Size of the heap buffer used to stream file contents, in bytes (1 MiB).
pub const STREAM_BUF_SIZE: usize = 1 << 20;

fn open_read(path: &Path) -> Result<File> {
    File::open(path).map_err(|source| CryptoError::IoOpen {
        path: path.to_path_buf(),
        source,
    })
}

fn open_write(path: &Path) -> Result<File> {
    File::create(path).map_err(|source| CryptoError::IoOpen {
        path: path.to_path_buf(),
        source,
    })
}

fn read_chunk(file: &mut File, path: &Path, buf: &mut [u8]) -> Result<usize> {
    file.read(buf).map_err(|source| CryptoError::IoRead {
        path: path.to_path_buf(),
        source,
    })
}

fn write_chunk(file: &mut File, path: &Path, buf: &[u8]) -> Result<()> {
    file.write_all(buf).map_err(|source| CryptoError::IoWrite {
        path: path.to_path_buf(),
        source,
    })
}

/// Run `engine`/`key`/`iv` in CTR mode over `in_path`, writing the result to
/// `out_path`. Encryption and decryption are the same operation under CTR,
/// so this single function backs both directions.
pub fn process_ctr_file(
    engine: &AesEngine,
    in_path: &Path,
    out_path: &Path,
    iv: [u8; BLOCK_SIZE],
) -> Result<()> {
    let mut fin = open_read(in_path)?;
    let mut fout = open_write(out_path)?;
    let mut ctr = Ctr::new(engine, iv);

    let mut inbuf = vec![0u8; STREAM_BUF_SIZE];
    let mut outbuf = vec![0u8; STREAM_BUF_SIZE];
    let mut total = 0u64;

    loop {
        let n = read_chunk(&mut fin, in_path, &mut inbuf)?;
        if n == 0 {
            break;
        }
        ctr.update(&inbuf[..n], &mut outbuf[..n]);
        write_chunk(&mut fout, out_path, &outbuf[..n])?;
        total += n as u64;
        tracing::debug!(bytes_processed = total, path = %in_path.display(), "ctr chunk processed");
    }

    fout.flush().map_err(|source| CryptoError::IoWrite {
        path: out_path.to_path_buf(),
        source,
    })
}

/// Encrypt `in_path` into `out_path` under CTR mode. The IV is not embedded
/// in the output; the caller owns IV management for this plain-CTR path
/// (see [`crate::envelope`] for the authenticated format that does embed it).
pub fn encrypt_ctr_file(
    engine: &AesEngine,
    in_path: &Path,
    out_path: &Path,
    iv: [u8; BLOCK_SIZE],
) -> Result<()> {
    process_ctr_file(engine, in_path, out_path, iv)
}

/// Decrypt `in_path` into `out_path` under CTR mode, given the same key and
/// IV used to encrypt it.
pub fn decrypt_ctr_file(
    engine: &AesEngine,
    in_path: &Path,
    out_path: &Path,
    iv: [u8; BLOCK_SIZE],
) -> Result<()> {
    process_ctr_file(engine, in_path, out_path, iv)
}

/// Stream `in_path` through SHA-512 and return its 64-byte digest.
pub fn hash_sha512_file(in_path: &Path) -> Result<[u8; 64]> {
    let mut fin = open_read(in_path)?;
    let mut ctx = Sha512::new();
    let mut buf = vec![0u8; STREAM_BUF_SIZE];
    let mut total = 0u64;

    loop {
        let n = read_chunk(&mut fin, in_path, &mut buf)?;
        if n == 0 {
            break;
        }
        ctx.update(&buf[..n]);
        total += n as u64;
        tracing::debug!(bytes_processed = total, path = %in_path.display(), "hash chunk processed");
    }

    Ok(ctx.finalize())
}

/// Stream `in_path` through HMAC-SHA-512 keyed by `hmac_key` and return the
/// 64-byte tag.
pub fn hmac_sha512_file(in_path: &Path, hmac_key: &[u8]) -> Result<[u8; 64]> {
    let mut fin = open_read(in_path)?;
    let mut ctx = HmacSha512::new(hmac_key);
    let mut buf = vec![0u8; STREAM_BUF_SIZE];
    let mut total = 0u64;

    loop {
        let n = read_chunk(&mut fin, in_path, &mut buf)?;
        if n == 0 {
            break;
        }
        ctx.update(&buf[..n]);
        total += n as u64;
        tracing::debug!(bytes_processed = total, path = %in_path.display(), "hmac chunk processed");
    }

    Ok(ctx.finalize())
}
