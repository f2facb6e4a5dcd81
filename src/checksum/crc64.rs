//! src/checksum/crc64.rs
//! Table-driven CRC-64 with GF(2) combine.
//!
//! Parameters match CRC-64/XZ: reflected ECMA-182 polynomial, complemented
//! on entry and exit, so `Crc64::checksum(b"123456789") == 0x995DC9BBDF1939FA`.

use crate::checksum::{Checksum, ChecksumValue};
use crate::consts::CRC64_POLY;
use crate::error::EnvelopeError;

const GF2_DIM: usize = 64;

const fn make_table() -> [u64; 256] {
    let mut table = [0u64; 256];
    let mut n = 0;
    while n < 256 {
        let mut crc = n as u64;
        let mut k = 0;
        while k < 8 {
            crc = if crc & 1 == 1 {
                (crc >> 1) ^ CRC64_POLY
            } else {
                crc >> 1
            };
            k += 1;
        }
        table[n] = crc;
        n += 1;
    }
    table
}

static TABLE: [u64; 256] = make_table();

/// Running CRC-64.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Crc64 {
    value: u64,
}

impl Crc64 {
    pub const fn new() -> Self {
        Self { value: 0 }
    }

    /// Continue from a previously computed CRC.
    pub const fn with_value(value: u64) -> Self {
        Self { value }
    }

    /// One-shot CRC of `data`.
    pub fn checksum(data: &[u8]) -> u64 {
        let mut crc = Self::new();
        crc.update(data);
        crc.value
    }

    /// Non-destructive read of the current CRC.
    #[inline]
    pub const fn get(&self) -> u64 {
        self.value
    }

    /// 8-byte big-endian form.
    #[inline]
    pub const fn to_bytes(&self) -> [u8; 8] {
        self.value.to_be_bytes()
    }

    /// Parse the 8-byte big-endian form.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, EnvelopeError> {
        let raw: [u8; 8] = bytes.try_into().map_err(|_| {
            EnvelopeError::InvalidState(format!("CRC-64 needs 8 bytes, got {}", bytes.len()))
        })?;
        Ok(Self::with_value(u64::from_be_bytes(raw)))
    }

    /// CRC of `A ‖ B` from `crc_a = CRC(A)`, `crc_b = CRC(B)` and `len_b = |B|`.
    ///
    /// Appending `len_b` zero bytes to `A` is a linear operator over GF(2);
    /// it is built by repeated squaring of the one-zero-bit operator, so the
    /// cost is logarithmic in `len_b`.
    pub fn combine(mut crc_a: u64, crc_b: u64, mut len_b: u64) -> u64 {
        if len_b == 0 {
            return crc_a;
        }

        let mut even = [0u64; GF2_DIM];
        let mut odd = [0u64; GF2_DIM];

        // operator for one zero bit
        odd[0] = CRC64_POLY;
        let mut row = 1u64;
        for slot in odd.iter_mut().skip(1) {
            *slot = row;
            row <<= 1;
        }

        // two zero bits, then four
        gf2_matrix_square(&mut even, &odd);
        gf2_matrix_square(&mut odd, &even);

        // first square below yields the one-zero-byte operator
        loop {
            gf2_matrix_square(&mut even, &odd);
            if len_b & 1 == 1 {
                crc_a = gf2_matrix_times(&even, crc_a);
            }
            len_b >>= 1;
            if len_b == 0 {
                break;
            }

            gf2_matrix_square(&mut odd, &even);
            if len_b & 1 == 1 {
                crc_a = gf2_matrix_times(&odd, crc_a);
            }
            len_b >>= 1;
            if len_b == 0 {
                break;
            }
        }

        crc_a ^ crc_b
    }
}

#[inline]
fn gf2_matrix_times(mat: &[u64; GF2_DIM], mut vec: u64) -> u64 {
    let mut sum = 0u64;
    let mut idx = 0;
    while vec != 0 {
        if vec & 1 == 1 {
            sum ^= mat[idx];
        }
        vec >>= 1;
        idx += 1;
    }
    sum
}

#[inline]
fn gf2_matrix_square(square: &mut [u64; GF2_DIM], mat: &[u64; GF2_DIM]) {
    for (dst, &row) in square.iter_mut().zip(mat.iter()) {
        *dst = gf2_matrix_times(mat, row);
    }
}

impl Checksum for Crc64 {
    fn update(&mut self, bytes: &[u8]) {
        let mut crc = !self.value;
        for &b in bytes {
            crc = TABLE[((crc ^ u64::from(b)) & 0xFF) as usize] ^ (crc >> 8);
        }
        self.value = !crc;
    }

    fn value(&mut self) -> ChecksumValue {
        ChecksumValue::Crc64(self.value)
    }

    fn reset(&mut self) {
        self.value = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn check_value() {
        assert_eq!(Crc64::checksum(b"123456789"), 0x995D_C9BB_DF19_39FA);
        assert_eq!(Crc64::checksum(b""), 0);
    }

    #[test]
    fn byte_and_slice_updates_agree() {
        let data = b"The quick brown fox jumps over the lazy dog";
        let mut bytewise = Crc64::new();
        for &b in data.iter() {
            bytewise.update_byte(b);
        }
        assert_eq!(bytewise.get(), Crc64::checksum(data));
    }

    #[test]
    fn combine_matches_concatenation() {
        let a = b"hello, ";
        let b = b"world";
        let whole = Crc64::checksum(b"hello, world");
        let merged = Crc64::combine(Crc64::checksum(a), Crc64::checksum(b), b.len() as u64);
        assert_eq!(merged, whole);
    }

    #[test]
    fn combine_with_empty_tail_is_identity() {
        let crc = Crc64::checksum(b"abc");
        assert_eq!(Crc64::combine(crc, 0x1234, 0), crc);
    }

    #[test]
    fn bytes_form_is_big_endian() {
        let crc = Crc64::with_value(0x0102_0304_0506_0708);
        assert_eq!(crc.to_bytes(), [1, 2, 3, 4, 5, 6, 7, 8]);
        assert_eq!(Crc64::from_bytes(&crc.to_bytes()).unwrap(), crc);
        assert!(Crc64::from_bytes(&[1, 2, 3, 4]).is_err());
    }

    #[test]
    fn reset_equals_fresh() {
        let mut crc = Crc64::new();
        crc.update(b"data");
        crc.reset();
        assert_eq!(crc, Crc64::new());
    }
}
