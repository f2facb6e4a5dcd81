//! # Key Derivation Functions (KDF)
//!
//! Password-to-key derivation used when an [`AesKeyWrap`](crate::crypto::wrap::AesKeyWrap)
//! is built from a password rather than a raw key.

pub mod pbkdf2;
