//! src/crypto/wrap.rs
//! Outer key wrap: protects the per-stream IV and content key stored in the header.
//!
//! [`KeyWrap`] is the collaborator contract consumed by every cipher session;
//! any symmetric or asymmetric primitive can sit behind it.
//!
//! [`AesKeyWrap`] is the bundled implementation:
//!
//! ```text
//! wrap(m) = iv(16) | AES-256-CBC(enc_key, iv, PKCS7(m)) | HMAC-SHA256(mac_key, iv | ct)
//! ```
//!
//! `enc_key` and `mac_key` are derived from the 32-byte master key with
//! HMAC-SHA256 under fixed labels, so the same master never keys both AES and HMAC.

use crate::aliases::{Aes256Key32, Block16, HmacSha256};
use crate::consts::{AES_BLOCK_LEN, WRAP_TAG_LEN};
use crate::crypto::kdf::pbkdf2::derive_pbkdf2_key;
use crate::crypto::rng::{OsRandom, RandomSource};
use crate::error::EnvelopeError;
use crate::utils::{pkcs7_pad, pkcs7_unpad, xor_blocks};
use aes::cipher::{BlockDecrypt, BlockEncrypt, KeyInit};
use aes::{Aes256, Block as AesBlock};
use hmac::Mac;
use std::fmt;
use std::sync::Arc;
use zeroize::Zeroizing;

const ENC_LABEL: &[u8] = b"envelope-crypt/wrap/enc";
const MAC_LABEL: &[u8] = b"envelope-crypt/wrap/mac";

/// Outer wrapping primitive: `wrap(bytes) -> bytes` / `unwrap(bytes) -> bytes`.
pub trait KeyWrap: Send + Sync {
    /// Protect `plain` (an IV or a content key).
    fn wrap(&self, plain: &[u8]) -> Result<Vec<u8>, EnvelopeError>;

    /// Recover what [`wrap`](KeyWrap::wrap) protected.
    fn unwrap(&self, wrapped: &[u8]) -> Result<Zeroizing<Vec<u8>>, EnvelopeError>;
}

impl<T: KeyWrap + ?Sized> KeyWrap for Arc<T> {
    fn wrap(&self, plain: &[u8]) -> Result<Vec<u8>, EnvelopeError> {
        (**self).wrap(plain)
    }

    fn unwrap(&self, wrapped: &[u8]) -> Result<Zeroizing<Vec<u8>>, EnvelopeError> {
        (**self).unwrap(wrapped)
    }
}

/// AES-256-CBC + HMAC-SHA256 key wrap.
pub struct AesKeyWrap {
    cipher: Aes256,
    mac_key: Aes256Key32,
    rng: Arc<dyn RandomSource>,
}

impl fmt::Debug for AesKeyWrap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AesKeyWrap").finish_non_exhaustive()
    }
}

impl AesKeyWrap {
    /// Build a key wrap from a raw 32-byte master key.
    pub fn new(master_key: &[u8; 32]) -> Self {
        Self::with_random(master_key, Arc::new(OsRandom))
    }

    /// Same as [`new`](Self::new) with an explicit source for the per-wrap IVs.
    pub fn with_random(master_key: &[u8; 32], rng: Arc<dyn RandomSource>) -> Self {
        let enc_key = derive_sub_key(master_key, ENC_LABEL);
        let mac_key = derive_sub_key(master_key, MAC_LABEL);
        Self {
            cipher: Aes256::new((&*enc_key).into()),
            mac_key,
            rng,
        }
    }

    /// Build a key wrap from a password using PBKDF2-HMAC-SHA512.
    pub fn from_password(
        password: &str,
        salt: &[u8],
        iterations: u32,
    ) -> Result<Self, EnvelopeError> {
        let mut master = Zeroizing::new([0u8; 32]);
        derive_pbkdf2_key(password.as_bytes(), salt, iterations, &mut master)?;
        Ok(Self::new(&master))
    }

    fn tag(&self, iv: &[u8], ciphertext: &[u8]) -> HmacSha256 {
        let mut mac = <HmacSha256 as Mac>::new_from_slice(&self.mac_key[..])
            .expect("mac_key is 32 bytes, a valid HMAC key");
        mac.update(iv);
        mac.update(ciphertext);
        mac
    }
}

impl KeyWrap for AesKeyWrap {
    fn wrap(&self, plain: &[u8]) -> Result<Vec<u8>, EnvelopeError> {
        let mut iv: Block16 = [0u8; AES_BLOCK_LEN];
        self.rng.fill(&mut iv)?;

        let padded = Zeroizing::new(pkcs7_pad(plain));
        let mut out = Vec::with_capacity(AES_BLOCK_LEN + padded.len() + WRAP_TAG_LEN);
        out.extend_from_slice(&iv);

        // CBC: C_i = E(P_i ^ C_{i-1}), C_0 = IV
        let mut prev: Block16 = iv;
        let mut block: Block16 = [0u8; AES_BLOCK_LEN];
        for chunk in padded.chunks_exact(AES_BLOCK_LEN) {
            xor_blocks(chunk, &prev, &mut block);
            let mut aes_block = AesBlock::from(block);
            self.cipher.encrypt_block(&mut aes_block);
            prev.copy_from_slice(aes_block.as_slice());
            out.extend_from_slice(&prev);
        }
        block.fill(0);

        let tag = self.tag(&iv, &out[AES_BLOCK_LEN..]).finalize().into_bytes();
        out.extend_from_slice(tag.as_slice());
        Ok(out)
    }

    fn unwrap(&self, wrapped: &[u8]) -> Result<Zeroizing<Vec<u8>>, EnvelopeError> {
        let min_len = AES_BLOCK_LEN * 2 + WRAP_TAG_LEN;
        if wrapped.len() < min_len || (wrapped.len() - WRAP_TAG_LEN) % AES_BLOCK_LEN != 0 {
            return Err(EnvelopeError::Crypto(format!(
                "wrapped key material has invalid length {}",
                wrapped.len()
            )));
        }

        let (body, expected_tag) = wrapped.split_at(wrapped.len() - WRAP_TAG_LEN);
        let (iv, ciphertext) = body.split_at(AES_BLOCK_LEN);

        self.tag(iv, ciphertext)
            .verify_slice(expected_tag)
            .map_err(|_| {
                EnvelopeError::Crypto("wrapped key material corrupted or tampered (HMAC mismatch)".into())
            })?;

        let mut plain = Zeroizing::new(Vec::with_capacity(ciphertext.len()));
        let mut prev: Block16 = [0u8; AES_BLOCK_LEN];
        prev.copy_from_slice(iv);
        let mut block: Block16 = [0u8; AES_BLOCK_LEN];
        for chunk in ciphertext.chunks_exact(AES_BLOCK_LEN) {
            let mut aes_block = *AesBlock::from_slice(chunk);
            self.cipher.decrypt_block(&mut aes_block);
            xor_blocks(aes_block.as_slice(), &prev, &mut block);
            plain.extend_from_slice(&block);
            prev.copy_from_slice(chunk);
        }
        block.fill(0);

        let body_len = pkcs7_unpad(&plain)?.len();
        plain.truncate(body_len);
        Ok(plain)
    }
}

fn derive_sub_key(master: &[u8; 32], label: &[u8]) -> Aes256Key32 {
    let mut mac = <HmacSha256 as Mac>::new_from_slice(master)
        .expect("master key is 32 bytes, a valid HMAC key");
    mac.update(label);
    let mut out = Zeroizing::new([0u8; 32]);
    out.copy_from_slice(mac.finalize().into_bytes().as_slice());
    out
}
