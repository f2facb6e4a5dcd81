//! src/stream/reader.rs
//! Pull-style adapter: reading from a [`CipherReader`] yields the source's
//! bytes encrypted or decrypted by an [`EnvelopeCipher`].
//!
//! The source is consumed one block at a time. The first refill runs the
//! cipher's `start` hook: an encrypting session surfaces its header without
//! touching the source, a decrypting one pulls blocks until the header is
//! assembled. At source exhaustion `finalize` runs once and its trailing
//! bytes are surfaced before end-of-stream.
//!
//! A session failure (bad header, failed finalize) poisons the reader: every
//! later read returns the same error instead of end-of-stream.

use crate::consts::{DEFAULT_BLOCK_SIZE, MAX_EMPTY_REFILLS};
use crate::envelope::{EnvelopeCipher, Mode};
use crate::error::EnvelopeError;
use crate::stream::{AbortToken, Abortable};
use std::fmt;
use std::io::{self, Read, Seek, SeekFrom};
use tracing::{debug, warn};

enum Refill {
    Data,
    Empty,
    End,
}

pub struct CipherReader<R> {
    inner: R,
    cipher: Box<dyn EnvelopeCipher>,
    block: Vec<u8>,
    output: Vec<u8>,
    pos: usize,
    eof: bool,
    started: bool,
    accessed: bool,
    mark: Option<u64>,
    failed: Option<EnvelopeError>,
    abort: AbortToken,
}

impl<R> fmt::Debug for CipherReader<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CipherReader")
            .field("mode", &self.cipher.mode())
            .field("block_size", &self.block.len())
            .field("buffered", &(self.output.len() - self.pos))
            .field("eof", &self.eof)
            .finish_non_exhaustive()
    }
}

impl<R: Read> CipherReader<R> {
    pub fn new(inner: R, cipher: Box<dyn EnvelopeCipher>) -> Self {
        Self::with_block_size(inner, cipher, DEFAULT_BLOCK_SIZE)
    }

    /// `block_size` bytes are pulled from the source per refill (minimum 1).
    pub fn with_block_size(inner: R, cipher: Box<dyn EnvelopeCipher>, block_size: usize) -> Self {
        Self {
            inner,
            cipher,
            block: vec![0u8; block_size.max(1)],
            output: Vec::new(),
            pos: 0,
            eof: false,
            started: false,
            accessed: false,
            mark: None,
            failed: None,
            abort: AbortToken::new(),
        }
    }

    /// Share `token` with this reader, typically the one its source was built with.
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

    pub fn block_size(&self) -> usize {
        self.block.len()
    }

    /// Bytes already processed and waiting to be read.
    pub fn available(&self) -> Result<usize, EnvelopeError> {
        self.check_usable()?;
        Ok(self.output.len() - self.pos)
    }

    /// Skip up to `n` already buffered bytes. Never touches the source, so
    /// it may skip fewer than requested (possibly zero).
    pub fn skip(&mut self, n: u64) -> Result<u64, EnvelopeError> {
        self.check_usable()?;
        self.accessed = true;
        let available = (self.output.len() - self.pos) as u64;
        let skipped = n.min(available);
        self.pos += skipped as usize;
        Ok(skipped)
    }

    /// Finalize the cipher if the stream was not read to the end and hand
    /// back the source. A finalize failure is logged, not returned.
    pub fn close(mut self) -> Result<R, EnvelopeError> {
        if !self.eof && self.failed.is_none() {
            if let Err(err) = self.cipher.finalize() {
                warn!(error = %err, "cipher finalize failed while closing reader");
            }
        }
        self.output.clear();
        self.pos = 0;
        self.abort.check()?;
        Ok(self.inner)
    }

    pub fn get_ref(&self) -> &R {
        &self.inner
    }

    pub fn get_mut(&mut self) -> &mut R {
        &mut self.inner
    }

    /// Abort first, then a stored session failure.
    fn check_usable(&self) -> Result<(), EnvelopeError> {
        self.abort.check()?;
        match &self.failed {
            Some(err) => Err(err.clone()),
            None => Ok(()),
        }
    }

    /// Remember a session failure so it is reported again on every call.
    /// Source I/O errors stay retryable.
    fn poison(&mut self, err: EnvelopeError) -> EnvelopeError {
        if !matches!(err, EnvelopeError::Io(_)) {
            self.failed = Some(err.clone());
        }
        err
    }

    fn set_output(&mut self, bytes: Vec<u8>) -> Refill {
        self.output = bytes;
        self.pos = 0;
        if self.output.is_empty() {
            Refill::Empty
        } else {
            Refill::Data
        }
    }

    fn read_block(&mut self) -> Result<usize, EnvelopeError> {
        let n = self.inner.read(&mut self.block)?;
        self.abort.check()?;
        Ok(n)
    }

    /// Decrypt side of the start hook: pull blocks until the session has
    /// consumed its header. Bytes past the header come back as plaintext.
    fn assemble_header(&mut self) -> Result<Vec<u8>, EnvelopeError> {
        let mut out = Vec::new();
        while !self.cipher.is_ready() {
            self.abort.check()?;
            let n = self.read_block()?;
            if n == 0 {
                // a session still waiting on its header reports TruncatedHeader
                out.extend(self.cipher.finalize()?);
                self.eof = true;
                break;
            }
            out.extend(self.cipher.update(&self.block[..n])?);
        }
        Ok(out)
    }

    fn next_chunk(&mut self) -> Result<Refill, EnvelopeError> {
        self.abort.check()?;
        if self.eof {
            return Ok(Refill::End);
        }

        if !self.started {
            self.started = true;
            let header = self.cipher.start()?;
            if !header.is_empty() {
                return Ok(self.set_output(header));
            }
            if self.cipher.mode() == Mode::Decrypt {
                let plain = self.assemble_header()?;
                return Ok(match self.set_output(plain) {
                    Refill::Empty if self.eof => Refill::End,
                    other => other,
                });
            }
        }

        let n = self.read_block()?;
        if n == 0 {
            let tail = self.cipher.finalize()?;
            self.eof = true;
            return Ok(match self.set_output(tail) {
                Refill::Empty => Refill::End,
                other => other,
            });
        }

        let out = self.cipher.update(&self.block[..n])?;
        Ok(self.set_output(out))
    }

    /// Make sure unread output exists. `false` means end of stream.
    fn fill_output(&mut self) -> Result<bool, EnvelopeError> {
        if self.pos < self.output.len() {
            return Ok(true);
        }
        let mut empty_refills = 0;
        loop {
            match self.next_chunk()? {
                Refill::Data => return Ok(true),
                Refill::End => return Ok(false),
                Refill::Empty => {
                    empty_refills += 1;
                    if empty_refills > MAX_EMPTY_REFILLS {
                        return Err(EnvelopeError::Io(io::Error::other(
                            "exceeded maximum number of attempts to read next chunk of data",
                        )));
                    }
                }
            }
        }
    }
}

impl<R: Read + Seek> CipherReader<R> {
    /// Remember the current source position. Only allowed before the first
    /// read or skip.
    pub fn mark(&mut self) -> Result<(), EnvelopeError> {
        if self.accessed {
            return Err(EnvelopeError::InvalidState(
                "mark is only supported before the first read or skip".into(),
            ));
        }
        self.mark = Some(self.inner.stream_position()?);
        Ok(())
    }

    /// Seek the source back to the mark and start over with a fresh cipher
    /// session.
    pub fn reset(&mut self) -> Result<(), EnvelopeError> {
        self.abort.check()?;
        let Some(position) = self.mark else {
            return Err(EnvelopeError::InvalidState("reset without mark".into()));
        };
        self.inner.seek(SeekFrom::Start(position))?;

        self.output.clear();
        self.pos = 0;
        self.eof = false;
        self.started = false;
        self.accessed = false;
        self.failed = None;
        self.cipher = self.cipher.restart();
        debug!(position, "cipher reader reset, session restarted");
        Ok(())
    }
}

impl<R: Read> Read for CipherReader<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.check_usable()?;
        self.accessed = true;
        if buf.is_empty() {
            return Ok(0);
        }
        match self.fill_output() {
            Ok(true) => {}
            Ok(false) => return Ok(0),
            Err(err) => return Err(self.poison(err).into()),
        }
        let n = buf.len().min(self.output.len() - self.pos);
        buf[..n].copy_from_slice(&self.output[self.pos..self.pos + n]);
        self.pos += n;
        Ok(n)
    }
}

impl<R: Abortable> CipherReader<R> {
    /// Abort this reader, everything sharing its token, and the wrapped source.
    pub fn abort(&self) {
        self.abort.abort();
        self.inner.abort();
    }
}

impl<R: Abortable> Abortable for CipherReader<R> {
    fn abort(&self) {
        CipherReader::abort(self);
    }
}
