//! Utility functions used across the library.

use crate::consts::AES_BLOCK_LEN;
use crate::error::EnvelopeError;

/// XORs two 16-byte blocks and writes the result to `output`.
///
/// Used by the CBC loop of [`AesKeyWrap`](crate::crypto::wrap::AesKeyWrap).
///
/// # Panics (by contract)
///
/// Panics if any of the three slices is shorter than 16 bytes. Callers pass
/// `chunks_exact(16)` slices and fixed `[u8; 16]` buffers only.
#[inline(always)]
pub const fn xor_blocks(block_a: &[u8], block_b: &[u8], output: &mut [u8]) {
    let mut i = 0;
    while i < 16 {
        output[i] = block_a[i] ^ block_b[i];
        i += 1;
    }
}

/// Appends PKCS#7 padding up to the next multiple of the AES block size.
///
/// A full padding block is added when `data` is already aligned.
pub fn pkcs7_pad(data: &[u8]) -> Vec<u8> {
    let pad = AES_BLOCK_LEN - (data.len() % AES_BLOCK_LEN);
    let mut out = Vec::with_capacity(data.len() + pad);
    out.extend_from_slice(data);
    out.resize(data.len() + pad, pad as u8);
    out
}

/// Strips PKCS#7 padding, validating every padding byte.
pub fn pkcs7_unpad(data: &[u8]) -> Result<&[u8], EnvelopeError> {
    if data.is_empty() || data.len() % AES_BLOCK_LEN != 0 {
        return Err(EnvelopeError::Crypto("invalid PKCS#7 block length".into()));
    }
    let pad = data[data.len() - 1];
    if pad == 0 || pad as usize > AES_BLOCK_LEN {
        return Err(EnvelopeError::Crypto("invalid PKCS#7 padding".into()));
    }
    let body_len = data.len() - pad as usize;
    let mismatch = data[body_len..]
        .iter()
        .fold(0u8, |acc, &b| acc | (b ^ pad));
    if mismatch != 0 {
        return Err(EnvelopeError::Crypto("corrupt PKCS#7 padding".into()));
    }
    Ok(&data[..body_len])
}
