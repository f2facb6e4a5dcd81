//! src/stream/abort.rs
//! Cooperative cancellation shared between nested streams.

use crate::error::EnvelopeError;
use std::collections::VecDeque;
use std::fs::File;
use std::io::{self, BufReader, BufWriter, Cursor, Read, Write};
use std::net::TcpStream;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// A stream that can be cancelled together with everything it wraps.
///
/// Adapters forward `abort` to their inner stream, so aborting the outermost
/// layer reaches the innermost one. Plain sources and sinks have nothing to
/// cancel and implement it as a no-op.
pub trait Abortable {
    fn abort(&self);
}

impl<T: Abortable + ?Sized> Abortable for &T {
    fn abort(&self) {
        (**self).abort();
    }
}

impl<T: Abortable + ?Sized> Abortable for &mut T {
    fn abort(&self) {
        (**self).abort();
    }
}

impl<T: Abortable + ?Sized> Abortable for Box<T> {
    fn abort(&self) {
        (**self).abort();
    }
}

impl<R: Abortable> Abortable for BufReader<R> {
    fn abort(&self) {
        self.get_ref().abort();
    }
}

impl<W: Write + Abortable> Abortable for BufWriter<W> {
    fn abort(&self) {
        self.get_ref().abort();
    }
}

macro_rules! leaf_abortable {
    ($($ty:ty),* $(,)?) => {
        $(
            impl Abortable for $ty {
                #[inline]
                fn abort(&self) {}
            }
        )*
    };
}

leaf_abortable!(
    [u8],
    Vec<u8>,
    VecDeque<u8>,
    File,
    TcpStream,
    io::Empty,
    io::Sink,
    io::Repeat,
    io::Stdin,
    io::Stdout,
    io::Stderr,
);

impl<T> Abortable for Cursor<T> {
    #[inline]
    fn abort(&self) {}
}

/// Sticky cancellation flag.
///
/// Clones share one flag, so every stream built around the same token (an
/// adapter and the sources or sinks it wraps) is aborted together.
#[derive(Debug, Clone, Default)]
pub struct AbortToken(Arc<AtomicBool>);

impl AbortToken {
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation. Cannot be undone.
    #[inline]
    pub fn abort(&self) {
        self.0.store(true, Ordering::Release);
    }

    #[inline]
    pub fn is_aborted(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }

    /// `Err(Aborted)` once [`abort`](Self::abort) has been called.
    #[inline]
    pub fn check(&self) -> Result<(), EnvelopeError> {
        if self.is_aborted() {
            Err(EnvelopeError::Aborted)
        } else {
            Ok(())
        }
    }
}

/// Pass-through reader that fails with [`EnvelopeError::Aborted`] once its
/// token is aborted, checked before and after every underlying read.
///
/// Makes an arbitrary source abortable; the source itself is not told.
#[derive(Debug)]
pub struct AbortableReader<R> {
    inner: R,
    token: AbortToken,
}

impl<R: Read> AbortableReader<R> {
    pub fn new(inner: R, token: AbortToken) -> Self {
        Self { inner, token }
    }

    pub fn abort(&self) {
        self.token.abort();
    }

    pub fn abort_token(&self) -> &AbortToken {
        &self.token
    }

    pub fn get_ref(&self) -> &R {
        &self.inner
    }

    pub fn into_inner(self) -> R {
        self.inner
    }
}

impl<R> Abortable for AbortableReader<R> {
    fn abort(&self) {
        self.token.abort();
    }
}

impl<R: Read> Read for AbortableReader<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.token.check()?;
        let n = self.inner.read(buf)?;
        self.token.check()?;
        Ok(n)
    }
}

/// Pass-through writer that fails with [`EnvelopeError::Aborted`] once its
/// token is aborted. Makes an arbitrary sink abortable.
#[derive(Debug)]
pub struct AbortableWriter<W> {
    inner: W,
    token: AbortToken,
}

impl<W: Write> AbortableWriter<W> {
    pub fn new(inner: W, token: AbortToken) -> Self {
        Self { inner, token }
    }

    pub fn abort(&self) {
        self.token.abort();
    }

    pub fn abort_token(&self) -> &AbortToken {
        &self.token
    }

    pub fn get_ref(&self) -> &W {
        &self.inner
    }

    pub fn into_inner(self) -> W {
        self.inner
    }
}

impl<W> Abortable for AbortableWriter<W> {
    fn abort(&self) {
        self.token.abort();
    }
}

impl<W: Write> Write for AbortableWriter<W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.token.check()?;
        self.inner.write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.token.check()?;
        self.inner.flush()
    }
}
