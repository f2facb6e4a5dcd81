// src/lib.rs

//! Streaming envelope encryption.
//!
//! Every stream gets a fresh content key and IV, protected by an outer
//! [`KeyWrap`](crypto::wrap::KeyWrap) and stored in a small big-endian header
//! in front of the ciphertext. Cipher families are pluggable, and a
//! [`DynamicCipher`](dispatch::DynamicCipher) can pick the family of an
//! incoming stream from a 4-byte discriminator.
//!
//! The [`checksum`] module is independent of the envelope machinery and
//! provides CRC-64 (with `combine`), CRC-32, digests and fan-out.

pub mod aliases;
#[cfg(feature = "batch-ops")]
pub mod batch_ops;
pub mod builders;
pub mod checksum;
pub mod consts;
pub mod crypto;
pub mod decryptor;
pub mod dispatch;
pub mod encryptor;
pub mod envelope;
pub mod error;
pub mod header;
pub mod stream;
pub mod utils;

// High-level API
pub use decryptor::decrypt;
pub use encryptor::encrypt;
pub use error::EnvelopeError;

pub use builders::{CipherBuilder, Family};
pub use checksum::{Checksum, ChecksumValue, Crc64};
pub use crypto::wrap::{AesKeyWrap, KeyWrap};
pub use envelope::{EnvelopeCipher, Mode};
pub use header::read_version;
pub use stream::{AbortToken, Abortable, CipherReader, CipherWriter};

// Password KDF, for custom key-wrap setups
pub use crypto::kdf::pbkdf2::derive_pbkdf2_key;

#[cfg(feature = "batch-ops")]
pub use batch_ops::{crc64_parallel, decrypt_batch, encrypt_batch};
