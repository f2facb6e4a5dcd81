//! src/encryptor/session.rs
//! Per-stream key material for encrypting sessions.
//!
//! This module is the mirror of `decryptor/session.rs`: it generates the
//! content IV and key of one stream and seals both into the envelope header
//! with the outer key wrap.
//!
//! This is a pure crypto primitive, no I/O.

use crate::aliases::SecretBytes;
use crate::consts::KEY_GENERATION_ATTEMPTS;
use crate::crypto::rng::RandomSource;
use crate::crypto::wrap::KeyWrap;
use crate::envelope::{CipherFamily, ContentKeyMaterial};
use crate::error::EnvelopeError;
use crate::header::encode_header;
use tracing::trace;

/// Generate a fresh IV and content key for `family`.
///
/// With `reject_zero_leading` set, keys whose first byte is zero are thrown
/// away and regenerated, up to [`KEY_GENERATION_ATTEMPTS`] times in total.
#[inline]
pub fn generate_key_material(
    family: &dyn CipherFamily,
    rng: &dyn RandomSource,
    reject_zero_leading: bool,
) -> Result<ContentKeyMaterial, EnvelopeError> {
    let iv = family.generate_iv(rng)?;

    for attempt in 1..=KEY_GENERATION_ATTEMPTS {
        let mut key = SecretBytes::new(vec![0u8; family.key_len()]);
        rng.fill(&mut key)?;

        if reject_zero_leading && key.first() == Some(&0) {
            trace!(attempt, "content key with zero leading byte discarded");
            continue;
        }
        return Ok(ContentKeyMaterial { iv, key });
    }

    Err(EnvelopeError::KeyGenerationExhausted(
        KEY_GENERATION_ATTEMPTS,
    ))
}

/// Wrap IV and key and encode the resulting envelope header.
#[inline]
pub fn seal_header(
    material: &ContentKeyMaterial,
    wrap: &dyn KeyWrap,
    version: u32,
) -> Result<Vec<u8>, EnvelopeError> {
    let wrapped_iv = wrap.wrap(&material.iv)?;
    let wrapped_cek = wrap.wrap(&material.key)?;
    Ok(encode_header(version, &wrapped_iv, &wrapped_cek))
}
