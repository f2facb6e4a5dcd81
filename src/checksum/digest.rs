//! src/checksum/digest.rs
//! Hash digests selected by algorithm name.

use crate::checksum::{Checksum, ChecksumValue};
use crate::error::EnvelopeError;
use sha2::{Digest as _, Sha256, Sha512};
use std::fmt;
use std::str::FromStr;

/// Supported digest algorithms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DigestAlgorithm {
    Md5,
    Sha256,
    Sha512,
    Sm3,
    Blake3,
}

impl DigestAlgorithm {
    pub const fn name(self) -> &'static str {
        match self {
            DigestAlgorithm::Md5 => "MD5",
            DigestAlgorithm::Sha256 => "SHA-256",
            DigestAlgorithm::Sha512 => "SHA-512",
            DigestAlgorithm::Sm3 => "SM3",
            DigestAlgorithm::Blake3 => "BLAKE3",
        }
    }

    /// Digest length in bytes.
    pub const fn output_len(self) -> usize {
        match self {
            DigestAlgorithm::Md5 => 16,
            DigestAlgorithm::Sha256 | DigestAlgorithm::Sm3 | DigestAlgorithm::Blake3 => 32,
            DigestAlgorithm::Sha512 => 64,
        }
    }
}

impl fmt::Display for DigestAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for DigestAlgorithm {
    type Err = EnvelopeError;

    /// Case-insensitive; the dash in `SHA-256` / `SHA-512` is optional.
    fn from_str(name: &str) -> Result<Self, Self::Err> {
        let normalized: String = name
            .chars()
            .filter(|c| *c != '-' && *c != '_')
            .map(|c| c.to_ascii_uppercase())
            .collect();
        match normalized.as_str() {
            "MD5" => Ok(DigestAlgorithm::Md5),
            "SHA256" => Ok(DigestAlgorithm::Sha256),
            "SHA512" => Ok(DigestAlgorithm::Sha512),
            "SM3" => Ok(DigestAlgorithm::Sm3),
            "BLAKE3" => Ok(DigestAlgorithm::Blake3),
            _ => Err(EnvelopeError::UnknownDigest(name.to_string())),
        }
    }
}

/// Internal hashing state.
enum DigestState {
    Md5(md5::Md5),
    Sha256(Sha256),
    Sha512(Sha512),
    Sm3(sm3::Sm3),
    Blake3(Box<blake3::Hasher>),
}

impl DigestState {
    fn new(algorithm: DigestAlgorithm) -> Self {
        match algorithm {
            DigestAlgorithm::Md5 => DigestState::Md5(md5::Md5::new()),
            DigestAlgorithm::Sha256 => DigestState::Sha256(Sha256::new()),
            DigestAlgorithm::Sha512 => DigestState::Sha512(Sha512::new()),
            DigestAlgorithm::Sm3 => DigestState::Sm3(sm3::Sm3::new()),
            DigestAlgorithm::Blake3 => DigestState::Blake3(Box::new(blake3::Hasher::new())),
        }
    }

    #[inline]
    fn update(&mut self, data: &[u8]) {
        match self {
            DigestState::Md5(h) => h.update(data),
            DigestState::Sha256(h) => h.update(data),
            DigestState::Sha512(h) => h.update(data),
            DigestState::Sm3(h) => h.update(data),
            DigestState::Blake3(h) => {
                h.update(data);
            }
        }
    }

    #[inline]
    fn finalize(self) -> Vec<u8> {
        match self {
            DigestState::Md5(h) => h.finalize().to_vec(),
            DigestState::Sha256(h) => h.finalize().to_vec(),
            DigestState::Sha512(h) => h.finalize().to_vec(),
            DigestState::Sm3(h) => h.finalize().to_vec(),
            DigestState::Blake3(h) => h.finalize().as_bytes().to_vec(),
        }
    }
}

/// Digest checksum. Reading the value finalizes the running digest and
/// starts a fresh one.
pub struct DigestChecksum {
    algorithm: DigestAlgorithm,
    state: DigestState,
}

impl fmt::Debug for DigestChecksum {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DigestChecksum")
            .field("algorithm", &self.algorithm)
            .finish_non_exhaustive()
    }
}

impl DigestChecksum {
    pub fn new(algorithm: DigestAlgorithm) -> Self {
        Self {
            algorithm,
            state: DigestState::new(algorithm),
        }
    }

    /// Look the algorithm up by name (`"MD5"`, `"SHA-256"`, `"SHA-512"`,
    /// `"SM3"`, `"BLAKE3"`).
    pub fn from_name(name: &str) -> Result<Self, EnvelopeError> {
        Ok(Self::new(name.parse()?))
    }

    pub fn algorithm(&self) -> DigestAlgorithm {
        self.algorithm
    }

    /// Finalize into raw digest bytes and start over.
    pub fn finalize_reset(&mut self) -> Vec<u8> {
        std::mem::replace(&mut self.state, DigestState::new(self.algorithm)).finalize()
    }
}

impl Checksum for DigestChecksum {
    #[inline]
    fn update(&mut self, bytes: &[u8]) {
        self.state.update(bytes);
    }

    fn value(&mut self) -> ChecksumValue {
        ChecksumValue::Digest(self.finalize_reset())
    }

    fn reset(&mut self) {
        self.state = DigestState::new(self.algorithm);
    }
}
