//! Integration tests driving the public API against real temp-file
//! fixtures, the way `crypto_cli.c` plus its `tests/` fixtures exercised
//! the original C implementation end to end.

use {
    envault::{
        cipher::block::{AesEngine, EngineKind},
        envelope::{decrypt_envelope, encrypt_envelope},
        error::CryptoError,
        stream::{decrypt_ctr_file, encrypt_ctr_file, hash_sha512_file, hmac_sha512_file},
    },
    std::{fs, io::Write},
    tempfile::NamedTempFile,
};

fn write_fixture(contents: &[u8]) -> NamedTempFile {
    let mut f = NamedTempFile::new().unwrap();
    f.write_all(contents).unwrap();
    f.flush().unwrap();
    f
}

#[test]
fn envelope_round_trips_a_real_file_on_disk() {
    let aes_key = [0x7Au8; 32];
    let hmac_key = b"integration test hmac key".to_vec();
    let plaintext = b"a file that goes through the whole pipeline".to_vec();

    let pt_file = write_fixture(&plaintext);
    let env_path = pt_file.path().with_extension("envelope");
    let out_path = pt_file.path().with_extension("out");

    encrypt_envelope(EngineKind::TTable, pt_file.path(), &env_path, &aes_key, &hmac_key)
        .expect("encryption should succeed");

    let outcome = decrypt_envelope(
        EngineKind::TTable,
        &env_path,
        &out_path,
        &aes_key,
        &hmac_key,
        || true,
    )
    .expect("decryption should succeed");
    assert!(outcome.is_ok());

    assert_eq!(fs::read(&out_path).unwrap(), plaintext);

    fs::remove_file(&env_path).ok();
    fs::remove_file(&out_path).ok();
}

#[test]
fn tampered_envelope_on_disk_is_rejected_before_any_plaintext_is_written() {
    let aes_key = [0x7Bu8; 16];
    let hmac_key = b"another hmac key".to_vec();
    let plaintext = b"do not let this leak if the file is tampered with".to_vec();

    let pt_file = write_fixture(&plaintext);
    let env_path = pt_file.path().with_extension("envelope");
    let out_path = pt_file.path().with_extension("out");

    encrypt_envelope(EngineKind::Reference, pt_file.path(), &env_path, &aes_key, &hmac_key)
        .unwrap();

    let mut bytes = fs::read(&env_path).unwrap();
    let last = bytes.len() - 1;
    bytes[last] ^= 0xFF;
    fs::write(&env_path, &bytes).unwrap();

    let err = decrypt_envelope(
        EngineKind::Reference,
        &env_path,
        &out_path,
        &aes_key,
        &hmac_key,
        || true,
    )
    .unwrap_err();
    assert!(matches!(err, CryptoError::AuthenticationFailure));
    assert!(!out_path.exists());

    fs::remove_file(&env_path).ok();
}

#[test]
fn plain_ctr_file_round_trip() {
    let key = [0x11u8; 24];
    let iv = [0x22u8; 16];
    let engine = AesEngine::init(EngineKind::TTable, &key).unwrap();
    let plaintext: Vec<u8> = (0..5000).map(|i| (i % 251) as u8).collect();

    let pt_file = write_fixture(&plaintext);
    let ct_path = pt_file.path().with_extension("ct");
    let rt_path = pt_file.path().with_extension("rt");

    encrypt_ctr_file(&engine, pt_file.path(), &ct_path, iv).unwrap();
    decrypt_ctr_file(&engine, &ct_path, &rt_path, iv).unwrap();

    assert_eq!(fs::read(&rt_path).unwrap(), plaintext);

    fs::remove_file(&ct_path).ok();
    fs::remove_file(&rt_path).ok();
}

#[test]
fn hash_and_hmac_of_a_file_match_standalone_fixtures() {
    let data = b"hash and tag this file on disk";
    let key = b"fixture hmac key";
    let f = write_fixture(data);

    let digest = hash_sha512_file(f.path()).unwrap();
    assert_eq!(digest.len(), 64);

    let tag = hmac_sha512_file(f.path(), key).unwrap();
    assert_eq!(tag.len(), 64);
    assert_ne!(digest, tag);
}
