// src/envelope/mod.rs

//! Envelope cipher sessions.
//!
//! [`EnvelopeCipher`] is the capability contract every session implements and
//! the stream adapters drive: `start` (emit the header), `update`, `finalize`,
//! `restart` and version introspection.
//!
//! [`FamilyCipher`] implements it for one [`CipherFamily`] as an explicit
//! two-state machine:
//!
//! - `AwaitingHeader { buffered }`: encrypting sessions have not emitted their
//!   header yet; decrypting sessions accumulate input until it decodes.
//! - `Ready { cipher }`: the content cipher exists and every byte streams
//!   straight through it.

pub mod family;

pub use family::{AesCtrFamily, CipherFamily, ContentCipher, CtrCipher, Sm4CtrFamily};

use crate::aliases::SecretBytes;
use crate::crypto::rng::RandomSource;
use crate::crypto::wrap::KeyWrap;
use crate::decryptor::session::open_header;
use crate::encryptor::session::{generate_key_material, seal_header};
use crate::error::EnvelopeError;
use crate::header::{decode_header, Decoded};
use std::sync::Arc;
use tracing::debug;

/// Direction of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Encrypt,
    Decrypt,
}

/// Per-stream IV and content key.
///
/// Generated fresh for every encrypting session and unwrapped from the
/// header for every decrypting one; wiped on drop.
pub struct ContentKeyMaterial {
    pub iv: SecretBytes,
    pub key: SecretBytes,
}

impl std::fmt::Debug for ContentKeyMaterial {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ContentKeyMaterial")
            .field("iv_len", &self.iv.len())
            .field("key_len", &self.key.len())
            .finish()
    }
}

/// Capability contract driven by [`CipherReader`](crate::stream::CipherReader)
/// and [`CipherWriter`](crate::stream::CipherWriter).
pub trait EnvelopeCipher: Send {
    fn mode(&self) -> Mode;

    /// Header version of the selected family, if one is selected yet.
    fn version(&self) -> Option<u32>;

    /// Begin the stream.
    ///
    /// Encrypt: returns the header bytes (once; empty afterwards) without
    /// consuming any input. Decrypt: returns empty; the header is consumed by
    /// [`update`](EnvelopeCipher::update).
    fn start(&mut self) -> Result<Vec<u8>, EnvelopeError>;

    /// Process the next chunk. Output size is not tied to input size.
    fn update(&mut self, input: &[u8]) -> Result<Vec<u8>, EnvelopeError>;

    /// Trailing bytes of the content cipher; empty if none was ever created
    /// while encrypting. Decrypting sessions still waiting on their header fail
    /// with [`EnvelopeError::TruncatedHeader`].
    fn finalize(&mut self) -> Result<Vec<u8>, EnvelopeError>;

    /// `true` once the header has been emitted (encrypt) or consumed (decrypt).
    fn is_ready(&self) -> bool;

    /// A fresh session with the same configuration and no state.
    ///
    /// Stream-mode ciphers cannot rewind, so restarting a stream always builds
    /// a new session.
    fn restart(&self) -> Box<dyn EnvelopeCipher>;
}

/// Tunables of a [`FamilyCipher`].
#[derive(Debug, Clone, Copy)]
pub struct SessionOptions {
    /// Version written to / expected in the header.
    pub version: u32,
    /// Reject headers whose version differs from `version`.
    pub check_version: bool,
    /// Regenerate content keys whose first byte is zero (legacy wire compatibility).
    pub reject_zero_leading_key: bool,
}

impl SessionOptions {
    /// Defaults for `family`: its own version, checked, zero-leading keys rejected.
    pub fn for_family(family: &dyn CipherFamily) -> Self {
        Self {
            version: family.version(),
            check_version: true,
            reject_zero_leading_key: true,
        }
    }
}

enum SessionState {
    AwaitingHeader { buffered: Vec<u8> },
    Ready { cipher: Box<dyn ContentCipher> },
}

/// Envelope session over a single cipher family.
pub struct FamilyCipher {
    mode: Mode,
    family: Arc<dyn CipherFamily>,
    wrap: Arc<dyn KeyWrap>,
    rng: Arc<dyn RandomSource>,
    options: SessionOptions,
    state: SessionState,
}

impl FamilyCipher {
    pub fn new(
        mode: Mode,
        family: Arc<dyn CipherFamily>,
        wrap: Arc<dyn KeyWrap>,
        rng: Arc<dyn RandomSource>,
    ) -> Self {
        let options = SessionOptions::for_family(family.as_ref());
        Self::with_options(mode, family, wrap, rng, options)
    }

    pub fn with_options(
        mode: Mode,
        family: Arc<dyn CipherFamily>,
        wrap: Arc<dyn KeyWrap>,
        rng: Arc<dyn RandomSource>,
        options: SessionOptions,
    ) -> Self {
        Self {
            mode,
            family,
            wrap,
            rng,
            options,
            state: SessionState::AwaitingHeader {
                buffered: Vec::new(),
            },
        }
    }

    pub fn family(&self) -> &dyn CipherFamily {
        self.family.as_ref()
    }

    pub fn options(&self) -> SessionOptions {
        self.options
    }

    /// Encrypt path: generate material, build the content cipher, seal the header.
    fn begin_encrypt(&mut self) -> Result<Vec<u8>, EnvelopeError> {
        let material = generate_key_material(
            self.family.as_ref(),
            self.rng.as_ref(),
            self.options.reject_zero_leading_key,
        )?;
        let cipher = self
            .family
            .content_cipher(&material.key, &material.iv, Mode::Encrypt)?;
        let header = seal_header(&material, self.wrap.as_ref(), self.options.version)?;

        debug!(
            family = self.family.name(),
            version = self.options.version,
            header_len = header.len(),
            "envelope header sealed"
        );
        self.state = SessionState::Ready { cipher };
        Ok(header)
    }

    /// Decrypt path: buffer `input` and try to open the header.
    fn feed_header(&mut self, input: &[u8]) -> Result<Vec<u8>, EnvelopeError> {
        let SessionState::AwaitingHeader { buffered } = &mut self.state else {
            return Err(EnvelopeError::InvalidState(
                "header already consumed".into(),
            ));
        };
        buffered.extend_from_slice(input);

        let expected = self.options.check_version.then_some(self.options.version);
        let (header, consumed) = match decode_header(buffered, expected)? {
            Decoded::NeedMoreData => return Ok(Vec::new()),
            Decoded::Complete { header, consumed } => (header, consumed),
        };

        let material = open_header(&header, self.wrap.as_ref(), self.family.as_ref())?;
        let mut cipher = self
            .family
            .content_cipher(&material.key, &material.iv, Mode::Decrypt)?;

        debug!(
            family = self.family.name(),
            version = header.version,
            wrapped_iv_len = header.wrapped_iv_len(),
            wrapped_cek_len = header.wrapped_cek_len(),
            "envelope header opened"
        );

        let rest = buffered.split_off(consumed);
        let out = if rest.is_empty() {
            Vec::new()
        } else {
            cipher.update(&rest)?
        };
        self.state = SessionState::Ready { cipher };
        Ok(out)
    }
}

impl EnvelopeCipher for FamilyCipher {
    fn mode(&self) -> Mode {
        self.mode
    }

    fn version(&self) -> Option<u32> {
        Some(self.options.version)
    }

    fn start(&mut self) -> Result<Vec<u8>, EnvelopeError> {
        if self.mode == Mode::Encrypt && !self.is_ready() {
            self.begin_encrypt()
        } else {
            Ok(Vec::new())
        }
    }

    fn update(&mut self, input: &[u8]) -> Result<Vec<u8>, EnvelopeError> {
        match self.mode {
            Mode::Encrypt => {
                // A caller skipping start() still gets the header first.
                let mut out = self.start()?;
                if let SessionState::Ready { cipher } = &mut self.state {
                    if out.is_empty() {
                        out = cipher.update(input)?;
                    } else {
                        out.extend(cipher.update(input)?);
                    }
                }
                Ok(out)
            }
            Mode::Decrypt => {
                if let SessionState::Ready { cipher } = &mut self.state {
                    return cipher.update(input);
                }
                self.feed_header(input)
            }
        }
    }

    fn finalize(&mut self) -> Result<Vec<u8>, EnvelopeError> {
        match (&mut self.state, self.mode) {
            (SessionState::Ready { cipher }, _) => cipher.finalize(),
            (SessionState::AwaitingHeader { .. }, Mode::Encrypt) => Ok(Vec::new()),
            (SessionState::AwaitingHeader { buffered }, Mode::Decrypt) => {
                Err(EnvelopeError::TruncatedHeader {
                    buffered: buffered.len(),
                })
            }
        }
    }

    fn is_ready(&self) -> bool {
        matches!(self.state, SessionState::Ready { .. })
    }

    fn restart(&self) -> Box<dyn EnvelopeCipher> {
        Box::new(FamilyCipher::with_options(
            self.mode,
            Arc::clone(&self.family),
            Arc::clone(&self.wrap),
            Arc::clone(&self.rng),
            self.options,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::rng::OsRandom;
    use crate::crypto::wrap::AesKeyWrap;
    use crate::header::decode_header;

    fn session(mode: Mode) -> FamilyCipher {
        FamilyCipher::new(
            mode,
            Arc::new(AesCtrFamily),
            Arc::new(AesKeyWrap::new(&[0x5A; 32])),
            Arc::new(OsRandom),
        )
    }

    #[test]
    fn header_emitted_exactly_once() {
        let mut enc = session(Mode::Encrypt);
        assert!(!enc.is_ready());
        let header = enc.start().unwrap();
        assert!(enc.is_ready());
        assert!(enc.start().unwrap().is_empty());
        assert_eq!(enc.update(b"abc").unwrap().len(), 3);

        match decode_header(&header, Some(1)).unwrap() {
            Decoded::Complete { consumed, .. } => assert_eq!(consumed, header.len()),
            Decoded::NeedMoreData => panic!("sealed header must decode"),
        }
    }

    #[test]
    fn update_without_start_prefixes_header() {
        let mut enc = session(Mode::Encrypt);
        let out = enc.update(b"hello").unwrap();
        assert!(out.len() > 5);
        assert!(matches!(
            decode_header(&out, Some(1)).unwrap(),
            Decoded::Complete { consumed, .. } if consumed == out.len() - 5
        ));
    }

    #[test]
    fn finalize_before_any_use_is_empty() {
        let mut enc = session(Mode::Encrypt);
        assert!(enc.finalize().unwrap().is_empty());
    }

    #[test]
    fn decrypt_buffers_until_header_complete() {
        let mut enc = session(Mode::Encrypt);
        let mut wire = enc.start().unwrap();
        wire.extend(enc.update(b"payload").unwrap());

        let mut dec = session(Mode::Decrypt);
        let split = wire.len() - 10;
        assert!(dec.update(&wire[..split]).unwrap().is_empty());
        assert!(!dec.is_ready());
        // the header completes here and the 3 payload bytes buffered with it come out
        let first = dec.update(&wire[split..split + 6]).unwrap();
        assert!(dec.is_ready());
        let mut plain = first;
        plain.extend(dec.update(&wire[split + 6..]).unwrap());
        assert_eq!(plain, b"payload");
    }

    #[test]
    fn truncated_header_on_finalize() {
        let mut dec = session(Mode::Decrypt);
        dec.update(&[0, 0, 0, 1, 0]).unwrap();
        assert!(matches!(
            dec.finalize(),
            Err(EnvelopeError::TruncatedHeader { buffered: 5 })
        ));
    }

    #[test]
    fn restart_yields_fresh_session() {
        let mut enc = session(Mode::Encrypt);
        let first = enc.start().unwrap();
        let mut again = enc.restart();
        assert!(!again.is_ready());
        let second = again.start().unwrap();
        assert_ne!(first, second, "a restarted session must not reuse key material");
    }
}
