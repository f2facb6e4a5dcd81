//! src/stream/writer.rs
//! Push-style adapter: bytes written to a [`CipherWriter`] reach the sink
//! encrypted or decrypted by an [`EnvelopeCipher`].

use crate::envelope::EnvelopeCipher;
use crate::error::EnvelopeError;
use crate::stream::{AbortToken, Abortable};
use std::fmt;
use std::io::{self, Write};
use tracing::warn;

pub struct CipherWriter<W: Write> {
    inner: Option<W>,
    cipher: Box<dyn EnvelopeCipher>,
    started: bool,
    closed: bool,
    abort: AbortToken,
}

impl<W: Write> fmt::Debug for CipherWriter<W> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CipherWriter")
            .field("mode", &self.cipher.mode())
            .field("started", &self.started)
            .field("closed", &self.closed)
            .finish_non_exhaustive()
    }
}

impl<W: Write> CipherWriter<W> {
    pub fn new(inner: W, cipher: Box<dyn EnvelopeCipher>) -> Self {
        Self {
            inner: Some(inner),
            cipher,
            started: false,
            closed: false,
            abort: AbortToken::new(),
        }
    }

    #[must_use]
    pub fn with_abort_token(mut self, token: AbortToken) -> Self {
        self.abort = token;
        self
    }

    pub fn abort_token(&self) -> &AbortToken {
        &self.abort
    }

    pub fn cipher(&self) -> &dyn EnvelopeCipher {
        self.cipher.as_ref()
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    /// Emit the header if still pending, finalize, flush and return the sink.
    /// A finalize failure is logged, not returned.
    pub fn close(mut self) -> Result<W, EnvelopeError> {
        self.shutdown(false)?;
        self.take_inner()
    }

    /// Like [`close`](Self::close), but a finalize failure is returned.
    pub fn finish(mut self) -> Result<W, EnvelopeError> {
        self.shutdown(true)?;
        self.take_inner()
    }

    fn take_inner(&mut self) -> Result<W, EnvelopeError> {
        self.inner
            .take()
            .ok_or_else(|| EnvelopeError::InvalidState("writer sink already taken".into()))
    }

    fn sink(&mut self) -> Result<&mut W, EnvelopeError> {
        self.inner
            .as_mut()
            .ok_or_else(|| EnvelopeError::InvalidState("writer sink already taken".into()))
    }

    /// Header goes out before the first ciphertext byte.
    fn ensure_started(&mut self) -> Result<(), EnvelopeError> {
        if !self.started {
            let header = self.cipher.start()?;
            self.sink()?.write_all(&header)?;
            self.started = true;
        }
        Ok(())
    }

    fn shutdown(&mut self, strict: bool) -> Result<(), EnvelopeError> {
        if self.closed {
            return Ok(());
        }
        self.closed = true;
        self.abort.check()?;

        // empty plaintexts still get a header so they decrypt
        self.ensure_started()?;
        match self.cipher.finalize() {
            Ok(tail) => self.sink()?.write_all(&tail)?,
            Err(err) if strict => return Err(err),
            Err(err) => warn!(error = %err, "cipher finalize failed while closing writer"),
        }
        self.sink()?.flush()?;
        self.abort.check()
    }
}

impl<W: Write> Write for CipherWriter<W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.abort.check()?;
        if self.closed {
            return Err(EnvelopeError::InvalidState("write after close".into()).into());
        }
        self.ensure_started()?;
        if buf.is_empty() {
            return Ok(0);
        }
        let out = self.cipher.update(buf)?;
        self.sink()?.write_all(&out)?;
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        self.abort.check()?;
        Ok(self.sink()?.flush()?)
    }
}

impl<W: Write + Abortable> CipherWriter<W> {
    /// Abort this writer, everything sharing its token, and the wrapped sink.
    pub fn abort(&self) {
        self.abort.abort();
        if let Some(inner) = &self.inner {
            inner.abort();
        }
    }
}

impl<W: Write + Abortable> Abortable for CipherWriter<W> {
    fn abort(&self) {
        CipherWriter::abort(self);
    }
}

impl<W: Write> Drop for CipherWriter<W> {
    fn drop(&mut self) {
        if self.closed || self.inner.is_none() {
            return;
        }
        if let Err(err) = self.shutdown(false) {
            if !err.is_aborted() {
                warn!(error = %err, "best-effort close of dropped writer failed");
            }
        }
    }
}
