//! # Builders
//!
//! This module provides the builder used to configure envelope sessions.
//!
//! ## Modules
//!
//! - [`cipher_builder`] - Builder for family sessions and dynamic dispatchers
//!
//! ## Usage
//!
//! A [`CipherBuilder`] holds the outer key wrap, the random source and the
//! session policies; each call to [`CipherBuilder::aes`],
//! [`CipherBuilder::sm4`] or [`CipherBuilder::dynamic`] yields a fresh,
//! independent session.

pub mod cipher_builder;

pub use cipher_builder::{CipherBuilder, Family};
