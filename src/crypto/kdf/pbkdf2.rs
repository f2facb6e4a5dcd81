//! src/crypto/kdf/pbkdf2.rs

use crate::aliases::{Aes256Key32, HmacSha512};
use crate::consts::{PBKDF2_MAX_ITER, PBKDF2_MIN_ITER};
use crate::EnvelopeError;

use pbkdf2::pbkdf2;

/// Derive a 32-byte key with PBKDF2-HMAC-SHA512 directly into `out_key`.
///
/// The password bytes are used as-is (UTF-8 for `&str` callers).
#[inline]
pub fn derive_pbkdf2_key(
    password: &[u8],
    salt: &[u8],
    iterations: u32,
    out_key: &mut Aes256Key32,
) -> Result<(), EnvelopeError> {
    if password.is_empty() {
        return Err(EnvelopeError::Crypto("empty password".into()));
    }
    if !(PBKDF2_MIN_ITER..=PBKDF2_MAX_ITER).contains(&iterations) {
        return Err(EnvelopeError::Crypto(format!(
            "PBKDF2 iterations must be within {PBKDF2_MIN_ITER}..={PBKDF2_MAX_ITER}, got {iterations}"
        )));
    }

    pbkdf2::<HmacSha512>(password, salt, iterations, &mut out_key[..])
        .map_err(|e| EnvelopeError::Crypto(format!("PBKDF2 failed: {e}")))?;
    Ok(())
}
