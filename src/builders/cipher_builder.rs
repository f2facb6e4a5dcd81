//! src/builders/cipher_builder.rs
//! One place to configure the outer key wrap and session policies, then
//! stamp out family sessions and dispatchers from it.

use crate::crypto::rng::{OsRandom, RandomSource};
use crate::crypto::wrap::{AesKeyWrap, KeyWrap};
use crate::consts::{FAMILY_AES, FAMILY_SM4};
use crate::dispatch::{DispatchRegistry, DynamicCipher, SessionContext};
use crate::envelope::{
    AesCtrFamily, CipherFamily, EnvelopeCipher, FamilyCipher, Mode, SessionOptions, Sm4CtrFamily,
};
use crate::error::EnvelopeError;
use std::fmt;
use std::sync::Arc;

/// Bundled cipher families.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Family {
    Aes,
    Sm4,
}

impl Family {
    /// Discriminator id the default registry uses for this family.
    pub const fn id(self) -> u32 {
        match self {
            Family::Aes => FAMILY_AES,
            Family::Sm4 => FAMILY_SM4,
        }
    }

    pub fn from_id(id: u32) -> Option<Self> {
        match id {
            FAMILY_AES => Some(Family::Aes),
            FAMILY_SM4 => Some(Family::Sm4),
            _ => None,
        }
    }

    fn instance(self) -> Arc<dyn CipherFamily> {
        match self {
            Family::Aes => Arc::new(AesCtrFamily),
            Family::Sm4 => Arc::new(Sm4CtrFamily),
        }
    }
}

/// Session factory.
///
/// Defaults: OS randomness, each family's own header version, version
/// checking on, zero-leading content keys regenerated.
///
/// # Thread Safety
///
/// `Clone + Send + Sync`; the wrap and random source are shared behind `Arc`s
/// and every produced session owns its own state.
#[derive(Clone)]
pub struct CipherBuilder {
    wrap: Arc<dyn KeyWrap>,
    rng: Arc<dyn RandomSource>,
    version: Option<u32>,
    check_version: bool,
    reject_zero_leading_key: bool,
}

impl fmt::Debug for CipherBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CipherBuilder")
            .field("version", &self.version)
            .field("check_version", &self.check_version)
            .field("reject_zero_leading_key", &self.reject_zero_leading_key)
            .finish_non_exhaustive()
    }
}

impl CipherBuilder {
    pub fn new(wrap: impl KeyWrap + 'static) -> Self {
        Self::from_arc(Arc::new(wrap))
    }

    pub fn from_arc(wrap: Arc<dyn KeyWrap>) -> Self {
        Self {
            wrap,
            rng: Arc::new(OsRandom),
            version: None,
            check_version: true,
            reject_zero_leading_key: true,
        }
    }

    /// Key wrap derived from a password (PBKDF2-HMAC-SHA512).
    pub fn from_password(password: &str, salt: &[u8], iterations: u32) -> Result<Self, EnvelopeError> {
        Ok(Self::new(AesKeyWrap::from_password(password, salt, iterations)?))
    }

    /// Source for content keys and IVs.
    #[must_use]
    pub fn with_random(mut self, rng: Arc<dyn RandomSource>) -> Self {
        self.rng = rng;
        self
    }

    /// Write and expect `version` instead of the family's own.
    /// Applies to [`family`](Self::family) sessions only.
    #[must_use]
    pub fn with_version(mut self, version: u32) -> Self {
        self.version = Some(version);
        self
    }

    /// Accept any header version when decrypting.
    #[must_use]
    pub fn skip_version_check(mut self) -> Self {
        self.check_version = false;
        self
    }

    /// Keep content keys whose first byte is zero instead of regenerating them.
    #[must_use]
    pub fn allow_zero_leading_keys(mut self) -> Self {
        self.reject_zero_leading_key = false;
        self
    }

    pub fn key_wrap(&self) -> &Arc<dyn KeyWrap> {
        &self.wrap
    }

    /// Factory context carrying this builder's wrap, randomness and policies.
    pub fn context(&self, mode: Mode) -> SessionContext {
        SessionContext {
            mode,
            wrap: Arc::clone(&self.wrap),
            rng: Arc::clone(&self.rng),
            check_version: self.check_version,
            reject_zero_leading_key: self.reject_zero_leading_key,
        }
    }

    /// Session over one of the bundled families.
    pub fn family(&self, family: Family, mode: Mode) -> Box<dyn EnvelopeCipher> {
        self.custom_family(family.instance(), mode)
    }

    /// Session over a caller-provided family.
    pub fn custom_family(&self, family: Arc<dyn CipherFamily>, mode: Mode) -> Box<dyn EnvelopeCipher> {
        let options = SessionOptions {
            version: self.version.unwrap_or_else(|| family.version()),
            check_version: self.check_version,
            reject_zero_leading_key: self.reject_zero_leading_key,
        };
        Box::new(FamilyCipher::with_options(
            mode,
            family,
            Arc::clone(&self.wrap),
            Arc::clone(&self.rng),
            options,
        ))
    }

    /// AES-256-CTR session.
    pub fn aes(&self, mode: Mode) -> Box<dyn EnvelopeCipher> {
        self.family(Family::Aes, mode)
    }

    /// SM4-CTR session.
    pub fn sm4(&self, mode: Mode) -> Box<dyn EnvelopeCipher> {
        self.family(Family::Sm4, mode)
    }

    /// Dispatcher over the default registry.
    pub fn dynamic(
        &self,
        mode: Mode,
        encrypt_type: u32,
        default_decrypt_type: Option<u32>,
    ) -> Box<dyn EnvelopeCipher> {
        self.registry(mode, DispatchRegistry::with_defaults(), encrypt_type, default_decrypt_type)
    }

    /// Dispatcher over a caller-supplied registry.
    pub fn registry(
        &self,
        mode: Mode,
        registry: DispatchRegistry,
        encrypt_type: u32,
        default_decrypt_type: Option<u32>,
    ) -> Box<dyn EnvelopeCipher> {
        Box::new(DynamicCipher::new(
            self.context(mode),
            registry,
            encrypt_type,
            default_decrypt_type,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn builder() -> CipherBuilder {
        CipherBuilder::new(AesKeyWrap::new(&[0x10; 32]))
    }

    #[test]
    fn family_ids_roundtrip() {
        for family in [Family::Aes, Family::Sm4] {
            assert_eq!(Family::from_id(family.id()), Some(family));
        }
        assert_eq!(Family::from_id(0), None);
    }

    #[test]
    fn sessions_report_family_versions() {
        let b = builder();
        assert_eq!(b.aes(Mode::Encrypt).version(), Some(1));
        assert_eq!(b.sm4(Mode::Decrypt).version(), Some(2));
        assert_eq!(b.dynamic(Mode::Decrypt, 1, None).version(), None);
    }

    #[test]
    fn version_override_applies_to_family_sessions() {
        let b = builder().with_version(42);
        let mut enc = b.aes(Mode::Encrypt);
        let header = enc.start().unwrap();
        assert_eq!(&header[..4], &42u32.to_be_bytes());
    }

    #[test]
    fn policies_flow_into_context() {
        let ctx = builder()
            .skip_version_check()
            .allow_zero_leading_keys()
            .context(Mode::Decrypt);
        assert!(!ctx.check_version);
        assert!(!ctx.reject_zero_leading_key);
        assert_eq!(ctx.mode, Mode::Decrypt);
    }
}
