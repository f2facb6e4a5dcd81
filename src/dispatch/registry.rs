//! src/dispatch/registry.rs
//! Tagged constructors for the families a dispatcher can select.

use crate::consts::{FAMILY_AES, FAMILY_SM4};
use crate::crypto::rng::RandomSource;
use crate::crypto::wrap::KeyWrap;
use crate::envelope::{
    AesCtrFamily, CipherFamily, EnvelopeCipher, FamilyCipher, Mode, SessionOptions, Sm4CtrFamily,
};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// Everything a factory needs to build a session.
#[derive(Clone)]
pub struct SessionContext {
    pub mode: Mode,
    pub wrap: Arc<dyn KeyWrap>,
    pub rng: Arc<dyn RandomSource>,
    pub check_version: bool,
    pub reject_zero_leading_key: bool,
}

impl SessionContext {
    pub fn new(mode: Mode, wrap: Arc<dyn KeyWrap>, rng: Arc<dyn RandomSource>) -> Self {
        Self {
            mode,
            wrap,
            rng,
            check_version: true,
            reject_zero_leading_key: true,
        }
    }

    /// Session over `family` at the family's own version, honouring the
    /// context's policies.
    pub fn family_cipher(&self, family: Arc<dyn CipherFamily>) -> Box<dyn EnvelopeCipher> {
        let options = SessionOptions {
            version: family.version(),
            check_version: self.check_version,
            reject_zero_leading_key: self.reject_zero_leading_key,
        };
        Box::new(FamilyCipher::with_options(
            self.mode,
            family,
            Arc::clone(&self.wrap),
            Arc::clone(&self.rng),
            options,
        ))
    }
}

impl fmt::Debug for SessionContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionContext")
            .field("mode", &self.mode)
            .field("check_version", &self.check_version)
            .field("reject_zero_leading_key", &self.reject_zero_leading_key)
            .finish_non_exhaustive()
    }
}

/// Builds a fresh session for one discriminator id.
pub type CipherFactory = Arc<dyn Fn(&SessionContext) -> Box<dyn EnvelopeCipher> + Send + Sync>;

/// Discriminator id → factory map owned by a dispatcher.
#[derive(Clone, Default)]
pub struct DispatchRegistry {
    factories: HashMap<u32, CipherFactory>,
}

impl DispatchRegistry {
    /// Empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with the bundled families: `1` → AES-256-CTR, `2` → SM4-CTR.
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register(FAMILY_AES, |ctx: &SessionContext| {
            ctx.family_cipher(Arc::new(AesCtrFamily))
        });
        registry.register(FAMILY_SM4, |ctx: &SessionContext| {
            ctx.family_cipher(Arc::new(Sm4CtrFamily))
        });
        registry
    }

    /// Add or replace the factory for `id`. Returns the one it replaced.
    pub fn register<F>(&mut self, id: u32, factory: F) -> Option<CipherFactory>
    where
        F: Fn(&SessionContext) -> Box<dyn EnvelopeCipher> + Send + Sync + 'static,
    {
        self.factories.insert(id, Arc::new(factory))
    }

    #[inline]
    pub fn get(&self, id: u32) -> Option<&CipherFactory> {
        self.factories.get(&id)
    }

    #[inline]
    pub fn contains(&self, id: u32) -> bool {
        self.factories.contains_key(&id)
    }

    /// Registered ids in ascending order.
    pub fn ids(&self) -> Vec<u32> {
        let mut ids: Vec<u32> = self.factories.keys().copied().collect();
        ids.sort_unstable();
        ids
    }
}

impl fmt::Debug for DispatchRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DispatchRegistry")
            .field("ids", &self.ids())
            .finish()
    }
}
