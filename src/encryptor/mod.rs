// src/encryptor/mod.rs

//! High-level encryption facade.
//!
//! Core API: `encrypt(input, output, cipher)?` seals a whole stream.
//! Session helpers: key material generation and header sealing, used by
//! every encrypting [`FamilyCipher`](crate::envelope::FamilyCipher).

pub(crate) mod encrypt;
pub(crate) mod session;

pub use encrypt::encrypt;
pub use session::{generate_key_material, seal_header};
