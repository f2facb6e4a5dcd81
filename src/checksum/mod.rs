// src/checksum/mod.rs

//! # Checksums
//!
//! Incremental verification values over byte streams, independent of the
//! envelope machinery:
//!
//! - [`Crc64`]: CRC-64 (ECMA-182 polynomial, reflected) with [`Crc64::combine`]
//!   to merge checksums of consecutive ranges processed separately
//! - [`Crc32Checksum`]: CRC-32 (IEEE) via `crc32fast`
//! - [`DigestChecksum`]: hash digests selected by name
//! - [`MultiChecksum`]: fan-out over several checksums at once
//! - [`ChecksumReader`] / [`ChecksumWriter`]: pass-through streams feeding a
//!   checksum with every byte that flows through them

pub mod crc32;
pub mod crc64;
pub mod digest;
pub mod multi;
pub mod stream;

pub use crc32::Crc32Checksum;
pub use crc64::Crc64;
pub use digest::{DigestAlgorithm, DigestChecksum};
pub use multi::MultiChecksum;
pub use stream::{ChecksumReader, ChecksumWriter};

/// Result of a checksum.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChecksumValue {
    Crc64(u64),
    Crc32(u32),
    Digest(Vec<u8>),
    /// One value per child of a [`MultiChecksum`], in child order.
    Multi(Vec<ChecksumValue>),
}

impl ChecksumValue {
    /// Canonical byte form: CRCs big-endian, digests as produced, fan-out
    /// values concatenated.
    pub fn to_bytes(&self) -> Vec<u8> {
        match self {
            ChecksumValue::Crc64(v) => v.to_be_bytes().to_vec(),
            ChecksumValue::Crc32(v) => v.to_be_bytes().to_vec(),
            ChecksumValue::Digest(bytes) => bytes.clone(),
            ChecksumValue::Multi(values) => values.iter().flat_map(|v| v.to_bytes()).collect(),
        }
    }

    /// The numeric value of a CRC result.
    pub fn as_u64(&self) -> Option<u64> {
        match self {
            ChecksumValue::Crc64(v) => Some(*v),
            ChecksumValue::Crc32(v) => Some(u64::from(*v)),
            _ => None,
        }
    }
}

/// Incremental checksum contract.
pub trait Checksum: Send {
    /// Feed more bytes.
    fn update(&mut self, bytes: &[u8]);

    /// Feed a single byte.
    fn update_byte(&mut self, byte: u8) {
        self.update(&[byte]);
    }

    /// Current value.
    ///
    /// CRCs leave their state untouched. Digests finalize and start over,
    /// so a second call without new input returns the digest of nothing.
    fn value(&mut self) -> ChecksumValue;

    /// Back to the initial state.
    fn reset(&mut self);
}

impl<C: Checksum + ?Sized> Checksum for Box<C> {
    fn update(&mut self, bytes: &[u8]) {
        (**self).update(bytes);
    }

    fn update_byte(&mut self, byte: u8) {
        (**self).update_byte(byte);
    }

    fn value(&mut self) -> ChecksumValue {
        (**self).value()
    }

    fn reset(&mut self) {
        (**self).reset();
    }
}
