//! # Header Codec
//!
//! Encoding and incremental decoding of the fixed binary envelope header.
//!
//! # Header Format
//!
//! All integers are big-endian:
//!
//! ```text
//! version:4 | wrappedIvLen:4 | wrappedCekLen:4 | wrappedIv | wrappedCek
//! ```
//!
//! Decoding is incremental: a decrypting session feeds whatever bytes have
//! arrived so far and gets [`Decoded::NeedMoreData`] until the whole header is
//! present. A version mismatch or a declared length above
//! [`MAX_WRAPPED_LEN`] is fatal.

use crate::consts::{FIXED_HEADER_LEN, MAX_WRAPPED_LEN};
use crate::error::EnvelopeError;
use std::io::Read;

/// A decoded (or about to be encoded) envelope header.
///
/// The declared lengths on the wire are always the lengths of the two byte
/// vectors, so they cannot disagree with the payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnvelopeHeader {
    pub version: u32,
    pub wrapped_iv: Vec<u8>,
    pub wrapped_cek: Vec<u8>,
}

/// Outcome of [`decode_header`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decoded {
    /// The header is complete; `consumed` bytes of the buffer belong to it.
    Complete {
        header: EnvelopeHeader,
        consumed: usize,
    },
    /// More bytes are needed. Not an error.
    NeedMoreData,
}

impl EnvelopeHeader {
    pub fn new(version: u32, wrapped_iv: Vec<u8>, wrapped_cek: Vec<u8>) -> Self {
        Self {
            version,
            wrapped_iv,
            wrapped_cek,
        }
    }

    #[inline]
    pub fn wrapped_iv_len(&self) -> u32 {
        self.wrapped_iv.len() as u32
    }

    #[inline]
    pub fn wrapped_cek_len(&self) -> u32 {
        self.wrapped_cek.len() as u32
    }

    /// Total encoded size in bytes.
    #[inline]
    pub fn encoded_len(&self) -> usize {
        FIXED_HEADER_LEN + self.wrapped_iv.len() + self.wrapped_cek.len()
    }

    pub fn encode(&self) -> Vec<u8> {
        encode_header(self.version, &self.wrapped_iv, &self.wrapped_cek)
    }
}

/// Encode `version | ivLen | cekLen | iv | cek` (big-endian).
pub fn encode_header(version: u32, wrapped_iv: &[u8], wrapped_cek: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(FIXED_HEADER_LEN + wrapped_iv.len() + wrapped_cek.len());
    out.extend_from_slice(&version.to_be_bytes());
    out.extend_from_slice(&(wrapped_iv.len() as u32).to_be_bytes());
    out.extend_from_slice(&(wrapped_cek.len() as u32).to_be_bytes());
    out.extend_from_slice(wrapped_iv);
    out.extend_from_slice(wrapped_cek);
    out
}

#[inline(always)]
fn be_u32_at(buf: &[u8], offset: usize) -> Option<u32> {
    let bytes: [u8; 4] = buf.get(offset..offset + 4)?.try_into().ok()?;
    Some(u32::from_be_bytes(bytes))
}

/// Try to decode a header from the start of `buf`.
///
/// `expected_version = None` skips the version check. With `Some(v)` a
/// mismatch is reported as soon as the first four bytes are present;
/// oversized lengths as soon as the fixed twelve are.
pub fn decode_header(
    buf: &[u8],
    expected_version: Option<u32>,
) -> Result<Decoded, EnvelopeError> {
    let Some(version) = be_u32_at(buf, 0) else {
        return Ok(Decoded::NeedMoreData);
    };
    if let Some(expected) = expected_version {
        if version != expected {
            return Err(EnvelopeError::UnsupportedVersion(version));
        }
    }

    let (Some(iv_len), Some(cek_len)) = (be_u32_at(buf, 4), be_u32_at(buf, 8)) else {
        return Ok(Decoded::NeedMoreData);
    };

    for (field, len) in [("wrappedIvLen", iv_len), ("wrappedCekLen", cek_len)] {
        if len as usize > MAX_WRAPPED_LEN {
            return Err(EnvelopeError::Header(format!(
                "{field} {len} exceeds the {MAX_WRAPPED_LEN}-byte limit"
            )));
        }
    }

    let iv_end = FIXED_HEADER_LEN.saturating_add(iv_len as usize);
    let cek_end = iv_end.saturating_add(cek_len as usize);
    if buf.len() < cek_end {
        return Ok(Decoded::NeedMoreData);
    }

    Ok(Decoded::Complete {
        header: EnvelopeHeader {
            version,
            wrapped_iv: buf[FIXED_HEADER_LEN..iv_end].to_vec(),
            wrapped_cek: buf[iv_end..cek_end].to_vec(),
        },
        consumed: cek_end,
    })
}

/// Read the 4-byte header version from the start of a stream.
///
/// Useful to tell which family wrote a plain (non-dispatched) envelope
/// without building a cipher session. Consumes exactly four bytes.
///
/// # Example
///
/// ```
/// use envelope_crypt::header::{encode_header, read_version};
/// use std::io::Cursor;
///
/// let bytes = encode_header(2, b"iv", b"cek");
/// assert_eq!(read_version(Cursor::new(bytes))?, 2);
/// # Ok::<(), envelope_crypt::EnvelopeError>(())
/// ```
pub fn read_version<R: Read>(mut reader: R) -> Result<u32, EnvelopeError> {
    let mut version = [0u8; 4];
    reader.read_exact(&mut version).map_err(|e| {
        if e.kind() == std::io::ErrorKind::UnexpectedEof {
            EnvelopeError::TruncatedHeader { buffered: 0 }
        } else {
            EnvelopeError::from(e)
        }
    })?;
    Ok(u32::from_be_bytes(version))
}
