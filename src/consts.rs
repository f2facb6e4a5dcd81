//! # Constants
//!
//! This module defines the wire-format constants, family identifiers and the
//! default tunables used by the stream adapters and key generation.

/// Length of the fixed part of the envelope header: `version | ivLen | cekLen`.
pub const FIXED_HEADER_LEN: usize = 12;

/// Upper bound on each declared wrapped-material length in a header.
///
/// Bundled wraps produce well under 200 bytes; larger declarations are
/// treated as corrupt instead of being buffered.
pub const MAX_WRAPPED_LEN: usize = 16 * 1024;

/// Length of the dynamic-dispatch discriminator written before the envelope header.
pub const DISCRIMINATOR_LEN: usize = 4;

/// Discriminator id of the AES-256-CTR family.
pub const FAMILY_AES: u32 = 1;

/// Discriminator id of the SM4-CTR family.
pub const FAMILY_SM4: u32 = 2;

/// Header version written by the AES-256-CTR family.
pub const AES_VERSION: u32 = 1;

/// Header version written by the SM4-CTR family.
pub const SM4_VERSION: u32 = 2;

/// Default size of one input block pulled from the source by [`CipherReader`](crate::stream::CipherReader).
pub const DEFAULT_BLOCK_SIZE: usize = 4096;

/// Maximum number of consecutive refills that may yield zero bytes before the
/// pull adapter gives up with an I/O error.
///
/// Some ciphers legitimately need several input blocks before producing output.
pub const MAX_EMPTY_REFILLS: usize = 1000;

/// Number of content keys generated before giving up when keys with a zero
/// leading byte are rejected.
pub const KEY_GENERATION_ATTEMPTS: usize = 9;

/// Minimum allowed PBKDF2 iteration count for password-derived key wraps.
pub const PBKDF2_MIN_ITER: u32 = 1;

/// Maximum allowed PBKDF2 iteration count.
///
/// Set to `5_000_000` to prevent excessive computation times while allowing
/// high-security configurations.
pub const PBKDF2_MAX_ITER: u32 = 5_000_000;

/// Size of the AES block, also the key-wrap IV length.
pub const AES_BLOCK_LEN: usize = 16;

/// Length of the HMAC-SHA256 tag appended by [`AesKeyWrap`](crate::crypto::wrap::AesKeyWrap).
pub const WRAP_TAG_LEN: usize = 32;

/// CRC-64 polynomial (ECMA-182, reflected form).
pub const CRC64_POLY: u64 = 0xC96C_5795_D787_0F42;
