// src/crypto/rng.rs
//! Secure randomness for content keys, IVs and key-wrap IVs.
//!
//! [`RandomSource`] is the collaborator seam: the default [`OsRandom`] pulls
//! from the operating system, tests plug in deterministic sources.

use crate::error::EnvelopeError;
use rand::{rngs::OsRng, TryRngCore};

/// A cryptographically secure random byte source.
///
/// Implementations are shared between sessions behind an `Arc`, so filling
/// takes `&self`.
pub trait RandomSource: Send + Sync {
    /// Fill `dest` completely with random bytes.
    fn fill(&self, dest: &mut [u8]) -> Result<(), EnvelopeError>;
}

/// Operating-system randomness (`getrandom` via `rand::rngs::OsRng`).
#[derive(Debug, Clone, Copy, Default)]
pub struct OsRandom;

impl OsRandom {
    #[inline(always)]
    pub fn new() -> Self {
        Self
    }
}

impl RandomSource for OsRandom {
    #[inline]
    fn fill(&self, dest: &mut [u8]) -> Result<(), EnvelopeError> {
        OsRng
            .try_fill_bytes(dest)
            .map_err(|e| EnvelopeError::Crypto(format!("OS random source failed: {e}")))
    }
}
