// src/stream/mod.rs

//! Stream adapters around [`EnvelopeCipher`](crate::envelope::EnvelopeCipher)
//! sessions.
//!
//! - [`CipherReader`] implements [`std::io::Read`] (pull).
//! - [`CipherWriter`] implements [`std::io::Write`] (push).
//! - [`AbortToken`], [`AbortableReader`] and [`AbortableWriter`] provide
//!   cooperative cancellation; [`Abortable`] carries an abort from the
//!   outermost adapter down to the innermost source or sink.
//!
//! Errors raised by a session surface from `read`/`write` as `io::Error`s
//! carrying the [`EnvelopeError`](crate::EnvelopeError); converting back
//! with `EnvelopeError::from` recovers the typed variant.

pub mod abort;
pub mod reader;
pub mod writer;

pub use abort::{AbortToken, Abortable, AbortableReader, AbortableWriter};
pub use reader::CipherReader;
pub use writer::CipherWriter;
