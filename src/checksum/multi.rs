//! src/checksum/multi.rs
//! Fan-out: one update stream feeding several checksums.

use crate::checksum::{Checksum, ChecksumValue};

/// Ordered list of checksums updated together.
#[derive(Default)]
pub struct MultiChecksum {
    children: Vec<Box<dyn Checksum>>,
}

impl MultiChecksum {
    pub fn new(children: Vec<Box<dyn Checksum>>) -> Self {
        Self { children }
    }

    /// Append a child; it sees only bytes fed from now on.
    #[must_use]
    pub fn with<C: Checksum + 'static>(mut self, child: C) -> Self {
        self.children.push(Box::new(child));
        self
    }

    pub fn push(&mut self, child: Box<dyn Checksum>) {
        self.children.push(child);
    }

    pub fn len(&self) -> usize {
        self.children.len()
    }

    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }

    pub fn children(&self) -> &[Box<dyn Checksum>] {
        &self.children
    }

    pub fn children_mut(&mut self) -> &mut [Box<dyn Checksum>] {
        &mut self.children
    }

    pub fn into_children(self) -> Vec<Box<dyn Checksum>> {
        self.children
    }
}

impl std::fmt::Debug for MultiChecksum {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MultiChecksum")
            .field("children", &self.children.len())
            .finish()
    }
}

impl Checksum for MultiChecksum {
    fn update(&mut self, bytes: &[u8]) {
        for child in &mut self.children {
            child.update(bytes);
        }
    }

    fn update_byte(&mut self, byte: u8) {
        for child in &mut self.children {
            child.update_byte(byte);
        }
    }

    fn value(&mut self) -> ChecksumValue {
        ChecksumValue::Multi(self.children.iter_mut().map(|c| c.value()).collect())
    }

    fn reset(&mut self) {
        for child in &mut self.children {
            child.reset();
        }
    }
}
