// src/decryptor/mod.rs

//! High-level decryption facade.
//!
//! Core API: `decrypt(input, output, cipher)?` opens a whole stream.
//! Helper: `open_header` for custom flows that decode the header themselves.

pub(crate) mod decrypt;
pub(crate) mod session;

pub use decrypt::decrypt;
pub use session::open_header;
