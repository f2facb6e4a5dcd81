//! # Type Aliases
//!
//! Concrete primitive types used across the crate.
//!
//! ## Type Categories
//!
//! ### HMAC Primitives
//! - [`HmacSha256`] - key-wrap authentication and sub-key derivation
//! - [`HmacSha512`] - PBKDF2 password derivation
//!
//! ### Content ciphers
//! - [`Aes256Ctr`] - AES-256 in 128-bit big-endian counter mode
//! - [`Sm4Ctr`] - SM4 in 128-bit big-endian counter mode
//!
//! ### Secret buffers
//! - [`SecretBytes`] - heap buffer wiped on drop
//! - [`Aes256Key32`] - 32-byte AES-256 key wiped on drop

use hmac::Hmac;
use sha2::{Sha256, Sha512};
use zeroize::Zeroizing;

pub type HmacSha256 = Hmac<Sha256>;
pub type HmacSha512 = Hmac<Sha512>;

pub type Aes256Ctr = ctr::Ctr128BE<aes::Aes256>;
pub type Sm4Ctr = ctr::Ctr128BE<sm4::Sm4>;

/// Variable-length secret (content key, IV, unwrapped material).
pub type SecretBytes = Zeroizing<Vec<u8>>;

/// Fixed 32-byte key (key-wrap master key, derived sub-keys).
pub type Aes256Key32 = Zeroizing<[u8; 32]>;

/// One AES block.
pub type Block16 = [u8; 16];
