//! src/envelope/family.rs
//! Cipher families: which primitive encrypts the content and how its key/IV look.
//!
//! A family is stateless and shared (`Arc<dyn CipherFamily>`); every stream
//! gets its own [`ContentCipher`] built from freshly generated or unwrapped
//! key material.

use crate::aliases::{Aes256Ctr, SecretBytes, Sm4Ctr};
use crate::consts::{AES_VERSION, SM4_VERSION};
use crate::crypto::rng::RandomSource;
use crate::envelope::Mode;
use crate::error::EnvelopeError;
use ctr::cipher::{KeyIvInit, StreamCipher};

/// Per-stream symmetric transform driven by a cipher session.
///
/// `update` may return fewer (or more) bytes than it was given; callers must
/// not assume 1:1 sizing. `finalize` returns trailing bytes such as padding.
pub trait ContentCipher: Send {
    fn update(&mut self, input: &[u8]) -> Result<Vec<u8>, EnvelopeError>;
    fn finalize(&mut self) -> Result<Vec<u8>, EnvelopeError>;
}

/// Description of a content-cipher family.
pub trait CipherFamily: Send + Sync {
    /// Short algorithm name, used in logs.
    fn name(&self) -> &'static str;

    /// Header version this family writes and, when checking, expects.
    fn version(&self) -> u32;

    /// Content key length in bytes.
    fn key_len(&self) -> usize;

    /// IV length in bytes.
    fn iv_len(&self) -> usize;

    /// Fresh IV for an encrypting stream.
    ///
    /// The default zeroes bytes 8..12 of the random IV. With a 128-bit
    /// big-endian counter this keeps 2^32 blocks of headroom before the
    /// random upper half is carried into.
    fn generate_iv(&self, rng: &dyn RandomSource) -> Result<SecretBytes, EnvelopeError> {
        let mut iv = SecretBytes::new(vec![0u8; self.iv_len()]);
        rng.fill(&mut iv)?;
        if iv.len() >= 12 {
            iv[8..12].fill(0);
        }
        Ok(iv)
    }

    /// Build the content cipher for one stream.
    fn content_cipher(
        &self,
        key: &[u8],
        iv: &[u8],
        mode: Mode,
    ) -> Result<Box<dyn ContentCipher>, EnvelopeError>;
}

/// Counter-mode content cipher. Encrypt and decrypt are the same keystream XOR.
pub struct CtrCipher<C> {
    inner: C,
}

impl<C> CtrCipher<C>
where
    C: KeyIvInit + StreamCipher + Send + 'static,
{
    pub fn new(key: &[u8], iv: &[u8]) -> Result<Self, EnvelopeError> {
        let inner = C::new_from_slices(key, iv)
            .map_err(|_| EnvelopeError::Crypto("invalid content key or IV length".into()))?;
        Ok(Self { inner })
    }
}

impl<C> ContentCipher for CtrCipher<C>
where
    C: StreamCipher + Send,
{
    #[inline]
    fn update(&mut self, input: &[u8]) -> Result<Vec<u8>, EnvelopeError> {
        let mut out = input.to_vec();
        self.inner
            .try_apply_keystream(&mut out)
            .map_err(|_| EnvelopeError::Crypto("counter-mode keystream exhausted".into()))?;
        Ok(out)
    }

    #[inline]
    fn finalize(&mut self) -> Result<Vec<u8>, EnvelopeError> {
        Ok(Vec::new())
    }
}

/// AES-256 in CTR mode, 16-byte IV. Registered as family 1, version 1.
#[derive(Debug, Clone, Copy, Default)]
pub struct AesCtrFamily;

impl CipherFamily for AesCtrFamily {
    fn name(&self) -> &'static str {
        "AES"
    }

    fn version(&self) -> u32 {
        AES_VERSION
    }

    fn key_len(&self) -> usize {
        32
    }

    fn iv_len(&self) -> usize {
        16
    }

    fn content_cipher(
        &self,
        key: &[u8],
        iv: &[u8],
        _mode: Mode,
    ) -> Result<Box<dyn ContentCipher>, EnvelopeError> {
        Ok(Box::new(CtrCipher::<Aes256Ctr>::new(key, iv)?))
    }
}

/// SM4 (128-bit key) in CTR mode, 16-byte IV. Registered as family 2, version 2.
#[derive(Debug, Clone, Copy, Default)]
pub struct Sm4CtrFamily;

impl CipherFamily for Sm4CtrFamily {
    fn name(&self) -> &'static str {
        "SM4"
    }

    fn version(&self) -> u32 {
        SM4_VERSION
    }

    fn key_len(&self) -> usize {
        16
    }

    fn iv_len(&self) -> usize {
        16
    }

    fn content_cipher(
        &self,
        key: &[u8],
        iv: &[u8],
        _mode: Mode,
    ) -> Result<Box<dyn ContentCipher>, EnvelopeError> {
        Ok(Box::new(CtrCipher::<Sm4Ctr>::new(key, iv)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::rng::OsRandom;

    #[test]
    fn ctr_is_its_own_inverse() {
        let family = AesCtrFamily;
        let key = [7u8; 32];
        let iv = [9u8; 16];
        let mut enc = family.content_cipher(&key, &iv, Mode::Encrypt).unwrap();
        let mut dec = family.content_cipher(&key, &iv, Mode::Decrypt).unwrap();

        let ct1 = enc.update(b"hello ").unwrap();
        let ct2 = enc.update(b"world").unwrap();
        assert!(enc.finalize().unwrap().is_empty());

        let mut pt = dec.update(&ct1).unwrap();
        pt.extend(dec.update(&ct2).unwrap());
        assert_eq!(pt, b"hello world");
    }

    #[test]
    fn generated_iv_has_counter_headroom() {
        let iv = Sm4CtrFamily.generate_iv(&OsRandom).unwrap();
        assert_eq!(iv.len(), 16);
        assert_eq!(&iv[8..12], &[0, 0, 0, 0]);
    }

    #[test]
    fn wrong_key_length_rejected() {
        let err = Sm4CtrFamily
            .content_cipher(&[0u8; 32], &[0u8; 16], Mode::Decrypt)
            .err()
            .unwrap();
        assert!(matches!(err, EnvelopeError::Crypto(_)));
    }
}
