// src/crypto/mod.rs

//! Low-level crypto collaborators.
//!
//! - [`rng`]: secure random source used for content keys, IVs and wrap IVs
//! - [`kdf`]: password-based key derivation for the bundled key wrap
//! - [`wrap`]: the outer key-wrap contract and its AES-256-CBC/HMAC implementation
//!
//! HMAC types are defined in `aliases.rs`.

pub mod kdf;
pub mod rng;
pub mod wrap;
