//! src/decryptor/session.rs
//! Opening a decoded envelope header.
//!
//! Unwraps the per-stream IV and content key with the outer key wrap and
//! checks both against the lengths the family expects before anything is
//! keyed with them.

use crate::crypto::wrap::KeyWrap;
use crate::envelope::{CipherFamily, ContentKeyMaterial};
use crate::error::EnvelopeError;
use crate::header::EnvelopeHeader;

/// Recover the content key material from `header`.
#[inline]
pub fn open_header(
    header: &EnvelopeHeader,
    wrap: &dyn KeyWrap,
    family: &dyn CipherFamily,
) -> Result<ContentKeyMaterial, EnvelopeError> {
    let iv = wrap.unwrap(&header.wrapped_iv)?;
    if iv.len() != family.iv_len() {
        return Err(EnvelopeError::Header(format!(
            "{} expects a {}-byte IV, header carries {}",
            family.name(),
            family.iv_len(),
            iv.len()
        )));
    }

    let key = wrap.unwrap(&header.wrapped_cek)?;
    if key.len() != family.key_len() {
        return Err(EnvelopeError::Header(format!(
            "{} expects a {}-byte key, header carries {}",
            family.name(),
            family.key_len(),
            key.len()
        )));
    }

    Ok(ContentKeyMaterial { iv, key })
}
