//! src/checksum/stream.rs
//! Pass-through streams that checksum everything flowing through them.

use crate::checksum::Checksum;
use crate::stream::Abortable;
use std::io::{self, Read, Write};

/// Reader that feeds every byte it returns into a checksum.
#[derive(Debug)]
pub struct ChecksumReader<R, C> {
    inner: R,
    checksum: C,
}

impl<R: Read, C: Checksum> ChecksumReader<R, C> {
    pub fn new(inner: R, checksum: C) -> Self {
        Self { inner, checksum }
    }

    pub fn checksum(&self) -> &C {
        &self.checksum
    }

    pub fn checksum_mut(&mut self) -> &mut C {
        &mut self.checksum
    }

    /// Skip `n` bytes by reading them, so they are still checksummed.
    /// Returns fewer than `n` only at end of stream.
    pub fn skip(&mut self, n: u64) -> io::Result<u64> {
        io::copy(&mut self.by_ref().take(n), &mut io::sink())
    }

    pub fn get_ref(&self) -> &R {
        &self.inner
    }

    pub fn into_parts(self) -> (R, C) {
        (self.inner, self.checksum)
    }
}

impl<R: Abortable, C> Abortable for ChecksumReader<R, C> {
    fn abort(&self) {
        self.inner.abort();
    }
}

impl<R: Read, C: Checksum> Read for ChecksumReader<R, C> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let n = self.inner.read(buf)?;
        self.checksum.update(&buf[..n]);
        Ok(n)
    }
}

/// Writer that feeds every byte the sink accepts into a checksum.
#[derive(Debug)]
pub struct ChecksumWriter<W, C> {
    inner: W,
    checksum: C,
}

impl<W: Write, C: Checksum> ChecksumWriter<W, C> {
    pub fn new(inner: W, checksum: C) -> Self {
        Self { inner, checksum }
    }

    pub fn checksum(&self) -> &C {
        &self.checksum
    }

    pub fn checksum_mut(&mut self) -> &mut C {
        &mut self.checksum
    }

    pub fn get_ref(&self) -> &W {
        &self.inner
    }

    pub fn into_parts(self) -> (W, C) {
        (self.inner, self.checksum)
    }
}

impl<W: Abortable, C> Abortable for ChecksumWriter<W, C> {
    fn abort(&self) {
        self.inner.abort();
    }
}

impl<W: Write, C: Checksum> Write for ChecksumWriter<W, C> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let n = self.inner.write(buf)?;
        self.checksum.update(&buf[..n]);
        Ok(n)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.inner.flush()
    }
}
