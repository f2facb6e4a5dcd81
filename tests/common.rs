//! tests/common.rs
//! Common constants and utilities shared across test files

use envelope_crypt::crypto::rng::RandomSource;
use envelope_crypt::envelope::Mode;
use envelope_crypt::{decrypt, encrypt, AesKeyWrap, CipherBuilder, EnvelopeCipher, EnvelopeError};
use std::io::Cursor;
use std::sync::atomic::{AtomicU8, Ordering};

/// Fast iteration count for password-derived wraps - performance testing is in benches/
#[allow(dead_code)] // Used across multiple test files
pub const TEST_ITERATIONS: u32 = 5;

#[allow(dead_code)]
pub const TEST_PASSWORD: &str = "Hello";

#[allow(dead_code)]
pub const TEST_SALT: &[u8] = b"envelope-test-salt";

/// Fixed master key for key-wrap tests.
#[allow(dead_code)]
pub const TEST_MASTER_KEY: [u8; 32] = [0x2B; 32];

#[allow(dead_code)]
pub const TEST_DATA: &[u8] = b"test data";

/// Plaintext sizes around block and buffer boundaries.
#[allow(dead_code)]
pub const TEST_SIZES: &[usize] = &[0, 1, 15, 16, 17, 4095, 4096, 4097, 100_000];

#[allow(dead_code)]
pub fn builder() -> CipherBuilder {
    CipherBuilder::new(AesKeyWrap::new(&TEST_MASTER_KEY))
}

/// Deterministic, non-repeating plaintext.
#[allow(dead_code)]
pub fn pattern(len: usize) -> Vec<u8> {
    (0..len).map(|i| (i * 31 % 251) as u8).collect()
}

#[allow(dead_code)]
pub fn seal(plain: &[u8], cipher: Box<dyn EnvelopeCipher>) -> Vec<u8> {
    let mut out = Vec::new();
    encrypt(Cursor::new(plain), &mut out, cipher).unwrap();
    out
}

#[allow(dead_code)]
pub fn open(sealed: &[u8], cipher: Box<dyn EnvelopeCipher>) -> Result<Vec<u8>, EnvelopeError> {
    let mut out = Vec::new();
    decrypt(Cursor::new(sealed), &mut out, cipher)?;
    Ok(out)
}

#[allow(dead_code)]
pub fn aes_roundtrip(plain: &[u8]) -> Vec<u8> {
    let b = builder();
    open(&seal(plain, b.aes(Mode::Encrypt)), b.aes(Mode::Decrypt)).unwrap()
}

/// Random source that fills every buffer with one repeating counter byte.
#[allow(dead_code)]
#[derive(Debug, Default)]
pub struct CountingRandom(pub AtomicU8);

impl RandomSource for CountingRandom {
    fn fill(&self, dest: &mut [u8]) -> Result<(), EnvelopeError> {
        let byte = self.0.fetch_add(1, Ordering::SeqCst);
        dest.fill(byte);
        Ok(())
    }
}
