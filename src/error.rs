//! # Error Types
//!
//! This module defines the error type used throughout the library.
//! All fallible operations return [`Result<T, EnvelopeError>`](EnvelopeError).
//!
//! Stream adapters implement [`std::io::Read`] / [`std::io::Write`], so errors
//! cross an `io::Error` boundary there. The conversions below keep the typed
//! variant intact on both sides of that boundary.

use std::io;
use thiserror::Error;

/// The error type for all envelope and checksum operations.
#[derive(Error, Debug)]
pub enum EnvelopeError {
    /// I/O error raised by an underlying source or sink.
    #[error("I/O error: {0}")]
    Io(io::Error),

    /// The header carries a version that the selected cipher family does not accept.
    ///
    /// Only raised while version checking is active.
    #[error("Unsupported version: {0}")]
    UnsupportedVersion(u32),

    /// No registered family matches the stream discriminator and no default is configured.
    #[error("Unsupported algorithm: {0}")]
    UnsupportedAlgorithm(u32),

    /// The source ended before a complete envelope header was assembled.
    #[error("Truncated header: source ended after {buffered} header bytes")]
    TruncatedHeader {
        /// Number of bytes that had been buffered when the source ran dry.
        buffered: usize,
    },

    /// Every generated content key was rejected by the zero-leading-byte policy.
    #[error("Key generation exhausted after {0} attempts")]
    KeyGenerationExhausted(usize),

    /// The stream was cancelled through its [`AbortToken`](crate::stream::AbortToken).
    #[error("Stream aborted")]
    Aborted,

    /// Cryptographic operation failed.
    ///
    /// Used for:
    /// - key wrap authentication failures
    /// - invalid padding on unwrap
    /// - invalid key or IV lengths handed to a primitive
    /// - random source failures
    #[error("Crypto error: {0}")]
    Crypto(String),

    /// The header decoded but its content is unusable (e.g. unwrapped IV of the wrong size).
    #[error("Header error: {0}")]
    Header(String),

    /// A digest was requested by a name no primitive is registered for.
    #[error("Unknown digest algorithm: {0}")]
    UnknownDigest(String),

    /// An operation was issued in a state that does not allow it.
    #[error("Invalid state: {0}")]
    InvalidState(String),
}

impl EnvelopeError {
    /// `true` for [`EnvelopeError::Aborted`].
    #[inline]
    pub fn is_aborted(&self) -> bool {
        matches!(self, EnvelopeError::Aborted)
    }
}

/// `io::Error` is not `Clone`; a cloned `Io` keeps its kind and message.
impl Clone for EnvelopeError {
    fn clone(&self) -> Self {
        match self {
            EnvelopeError::Io(err) => EnvelopeError::Io(io::Error::new(err.kind(), err.to_string())),
            EnvelopeError::UnsupportedVersion(v) => EnvelopeError::UnsupportedVersion(*v),
            EnvelopeError::UnsupportedAlgorithm(id) => EnvelopeError::UnsupportedAlgorithm(*id),
            EnvelopeError::TruncatedHeader { buffered } => EnvelopeError::TruncatedHeader {
                buffered: *buffered,
            },
            EnvelopeError::KeyGenerationExhausted(n) => EnvelopeError::KeyGenerationExhausted(*n),
            EnvelopeError::Aborted => EnvelopeError::Aborted,
            EnvelopeError::Crypto(msg) => EnvelopeError::Crypto(msg.clone()),
            EnvelopeError::Header(msg) => EnvelopeError::Header(msg.clone()),
            EnvelopeError::UnknownDigest(name) => EnvelopeError::UnknownDigest(name.clone()),
            EnvelopeError::InvalidState(msg) => EnvelopeError::InvalidState(msg.clone()),
        }
    }
}

impl From<io::Error> for EnvelopeError {
    fn from(err: io::Error) -> Self {
        // An EnvelopeError that went through a Read/Write impl comes back out intact.
        if err
            .get_ref()
            .is_some_and(|inner| inner.is::<EnvelopeError>())
        {
            if let Some(inner) = err.into_inner() {
                if let Ok(envelope) = inner.downcast::<EnvelopeError>() {
                    return *envelope;
                }
            }
            return EnvelopeError::Io(io::Error::other("unrecoverable wrapped error"));
        }
        EnvelopeError::Io(err)
    }
}

impl From<EnvelopeError> for io::Error {
    fn from(err: EnvelopeError) -> Self {
        match err {
            EnvelopeError::Io(inner) => inner,
            other => io::Error::other(other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn typed_error_survives_io_roundtrip() {
        let io_err: io::Error = EnvelopeError::UnsupportedAlgorithm(7).into();
        let back = EnvelopeError::from(io_err);
        assert!(matches!(back, EnvelopeError::UnsupportedAlgorithm(7)));
    }

    #[test]
    fn plain_io_error_stays_io() {
        let io_err = io::Error::new(io::ErrorKind::UnexpectedEof, "eof");
        let back = EnvelopeError::from(io_err);
        match back {
            EnvelopeError::Io(e) => assert_eq!(e.kind(), io::ErrorKind::UnexpectedEof),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn clone_keeps_variant_and_io_kind() {
        let io = EnvelopeError::Io(io::Error::new(io::ErrorKind::BrokenPipe, "pipe"));
        match io.clone() {
            EnvelopeError::Io(e) => {
                assert_eq!(e.kind(), io::ErrorKind::BrokenPipe);
                assert_eq!(e.to_string(), "pipe");
            }
            other => panic!("unexpected {other:?}"),
        }
        assert!(matches!(
            EnvelopeError::TruncatedHeader { buffered: 3 }.clone(),
            EnvelopeError::TruncatedHeader { buffered: 3 }
        ));
    }

    #[test]
    fn display_messages() {
        assert_eq!(
            EnvelopeError::UnsupportedVersion(5).to_string(),
            "Unsupported version: 5"
        );
        assert_eq!(EnvelopeError::Aborted.to_string(), "Stream aborted");
        assert!(EnvelopeError::Aborted.is_aborted());
    }
}
