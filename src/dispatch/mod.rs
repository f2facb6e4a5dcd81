// src/dispatch/mod.rs

//! Dynamic family dispatch.
//!
//! A [`DynamicCipher`] prefixes every envelope it writes with a 4-byte
//! big-endian discriminator naming the family, and on the read side picks
//! the family from that discriminator:
//!
//! ```text
//! discriminator:4 | version:4 | wrappedIvLen:4 | wrappedCekLen:4 | wrappedIv | wrappedCek | ciphertext...
//! ```
//!
//! Once a family is selected the concrete session is kept for the lifetime
//! of the stream and every call is delegated to it.

pub mod registry;

pub use registry::{CipherFactory, DispatchRegistry, SessionContext};

use crate::consts::DISCRIMINATOR_LEN;
use crate::envelope::{EnvelopeCipher, Mode};
use crate::error::EnvelopeError;
use tracing::debug;

enum DispatchState {
    Selecting { buffered: Vec<u8> },
    Selected { id: u32, inner: Box<dyn EnvelopeCipher> },
}

/// Envelope session that selects its family at runtime.
pub struct DynamicCipher {
    context: SessionContext,
    registry: DispatchRegistry,
    encrypt_type: u32,
    default_decrypt_type: Option<u32>,
    state: DispatchState,
}

impl DynamicCipher {
    /// `encrypt_type` is the id written when encrypting. `default_decrypt_type`
    /// is used when a decrypted stream names an id the registry lacks.
    pub fn new(
        context: SessionContext,
        registry: DispatchRegistry,
        encrypt_type: u32,
        default_decrypt_type: Option<u32>,
    ) -> Self {
        Self {
            context,
            registry,
            encrypt_type,
            default_decrypt_type,
            state: DispatchState::Selecting {
                buffered: Vec::new(),
            },
        }
    }

    pub fn encrypt_type(&self) -> u32 {
        self.encrypt_type
    }

    pub fn default_decrypt_type(&self) -> Option<u32> {
        self.default_decrypt_type
    }

    pub fn registry(&self) -> &DispatchRegistry {
        &self.registry
    }

    /// Id of the selected family, once known.
    pub fn selected_id(&self) -> Option<u32> {
        match &self.state {
            DispatchState::Selected { id, .. } => Some(*id),
            DispatchState::Selecting { .. } => None,
        }
    }

    /// Resolve `id` to a fresh session, falling back to the default decrypt
    /// type when `allow_default` is set.
    fn select(&self, id: u32, allow_default: bool) -> Result<(u32, Box<dyn EnvelopeCipher>), EnvelopeError> {
        if let Some(factory) = self.registry.get(id) {
            return Ok((id, factory(&self.context)));
        }
        if allow_default {
            if let Some(fallback) = self.default_decrypt_type {
                if let Some(factory) = self.registry.get(fallback) {
                    debug!(id, fallback, "unknown discriminator, using default family");
                    return Ok((fallback, factory(&self.context)));
                }
            }
        }
        Err(EnvelopeError::UnsupportedAlgorithm(id))
    }

    /// Encrypt path: pick the configured family and emit `discriminator | header`.
    fn begin_encrypt(&mut self) -> Result<Vec<u8>, EnvelopeError> {
        let (id, mut inner) = self.select(self.encrypt_type, false)?;
        let mut out = Vec::with_capacity(DISCRIMINATOR_LEN + 64);
        out.extend_from_slice(&id.to_be_bytes());
        out.extend(inner.start()?);

        debug!(id, version = ?inner.version(), "dispatcher selected encrypt family");
        self.state = DispatchState::Selected { id, inner };
        Ok(out)
    }

    /// Decrypt path: buffer until the discriminator is complete, then hand
    /// everything after it to the selected session.
    fn feed_discriminator(&mut self, input: &[u8]) -> Result<Vec<u8>, EnvelopeError> {
        let DispatchState::Selecting { buffered } = &mut self.state else {
            return Err(EnvelopeError::InvalidState(
                "family already selected".into(),
            ));
        };
        buffered.extend_from_slice(input);
        if buffered.len() < DISCRIMINATOR_LEN {
            return Ok(Vec::new());
        }

        let mut id_bytes = [0u8; DISCRIMINATOR_LEN];
        id_bytes.copy_from_slice(&buffered[..DISCRIMINATOR_LEN]);
        let rest = buffered.split_off(DISCRIMINATOR_LEN);

        let requested = u32::from_be_bytes(id_bytes);
        let (id, mut inner) = self.select(requested, true)?;
        debug!(id, requested, "dispatcher selected decrypt family");

        let mut out = inner.start()?;
        if !rest.is_empty() {
            out.extend(inner.update(&rest)?);
        }
        self.state = DispatchState::Selected { id, inner };
        Ok(out)
    }
}

impl EnvelopeCipher for DynamicCipher {
    fn mode(&self) -> Mode {
        self.context.mode
    }

    /// Version of the selected family; `None` until one is selected.
    fn version(&self) -> Option<u32> {
        match &self.state {
            DispatchState::Selected { inner, .. } => inner.version(),
            DispatchState::Selecting { .. } => None,
        }
    }

    fn start(&mut self) -> Result<Vec<u8>, EnvelopeError> {
        if let DispatchState::Selected { inner, .. } = &mut self.state {
            return inner.start();
        }
        match self.context.mode {
            Mode::Encrypt => self.begin_encrypt(),
            Mode::Decrypt => Ok(Vec::new()),
        }
    }

    fn update(&mut self, input: &[u8]) -> Result<Vec<u8>, EnvelopeError> {
        if let DispatchState::Selected { inner, .. } = &mut self.state {
            return inner.update(input);
        }
        match self.context.mode {
            Mode::Encrypt => {
                let mut out = self.begin_encrypt()?;
                out.extend(self.update(input)?);
                Ok(out)
            }
            Mode::Decrypt => self.feed_discriminator(input),
        }
    }

    fn finalize(&mut self) -> Result<Vec<u8>, EnvelopeError> {
        match (&mut self.state, self.context.mode) {
            (DispatchState::Selected { inner, .. }, _) => inner.finalize(),
            (DispatchState::Selecting { .. }, Mode::Encrypt) => Ok(Vec::new()),
            (DispatchState::Selecting { buffered }, Mode::Decrypt) => {
                Err(EnvelopeError::TruncatedHeader {
                    buffered: buffered.len(),
                })
            }
        }
    }

    fn is_ready(&self) -> bool {
        match &self.state {
            DispatchState::Selected { inner, .. } => inner.is_ready(),
            DispatchState::Selecting { .. } => false,
        }
    }

    fn restart(&self) -> Box<dyn EnvelopeCipher> {
        Box::new(DynamicCipher::new(
            self.context.clone(),
            self.registry.clone(),
            self.encrypt_type,
            self.default_decrypt_type,
        ))
    }
}
