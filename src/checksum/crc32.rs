//! src/checksum/crc32.rs
//! CRC-32 (IEEE) adapted to the [`Checksum`] contract.

use crate::checksum::{Checksum, ChecksumValue};

#[derive(Debug, Clone, Default)]
pub struct Crc32Checksum {
    hasher: crc32fast::Hasher,
}

impl Crc32Checksum {
    pub fn new() -> Self {
        Self::default()
    }

    /// Non-destructive read of the current CRC.
    pub fn get(&self) -> u32 {
        self.hasher.clone().finalize()
    }
}

impl Checksum for Crc32Checksum {
    #[inline]
    fn update(&mut self, bytes: &[u8]) {
        self.hasher.update(bytes);
    }

    fn value(&mut self) -> ChecksumValue {
        ChecksumValue::Crc32(self.get())
    }

    fn reset(&mut self) {
        self.hasher.reset();
    }
}
