//! src/batch_ops.rs
//! Parallel helpers over independent streams and chunks (feature `batch-ops`).
//!
//! Every stream gets its own session from the [`CipherBuilder`]; nothing
//! mutable is shared between workers.

use crate::builders::{CipherBuilder, Family};
use crate::checksum::{Checksum, Crc64};
use crate::envelope::Mode;
use crate::{decrypt, encrypt, EnvelopeError};
use rayon::prelude::*;
use std::io::{Read, Write};

/// Encrypt every `(source, sink)` pair with `family`, in parallel.
pub fn encrypt_batch<R, W>(
    batch: &mut [(R, W)],
    builder: &CipherBuilder,
    family: Family,
) -> Result<(), EnvelopeError>
where
    R: Read + Send,
    W: Write + Send,
{
    batch.par_iter_mut().try_for_each(|(src, dst)| {
        encrypt(src, dst, builder.family(family, Mode::Encrypt)).map(|_| ())
    })
}

/// Decrypt every `(source, sink)` pair with `family`, in parallel.
pub fn decrypt_batch<R, W>(
    batch: &mut [(R, W)],
    builder: &CipherBuilder,
    family: Family,
) -> Result<(), EnvelopeError>
where
    R: Read + Send,
    W: Write + Send,
{
    batch.par_iter_mut().try_for_each(|(src, dst)| {
        decrypt(src, dst, builder.family(family, Mode::Decrypt)).map(|_| ())
    })
}

/// CRC-64 of `data`, computed over `chunk_size` pieces in parallel and
/// merged with [`Crc64::combine`].
pub fn crc64_parallel(data: &[u8], chunk_size: usize) -> u64 {
    let chunk_size = chunk_size.max(1);
    let (crc, _len) = data
        .par_chunks(chunk_size)
        .map(|chunk| {
            let mut crc = Crc64::new();
            crc.update(chunk);
            (crc.get(), chunk.len() as u64)
        })
        .reduce(
            || (0u64, 0u64),
            |(crc_a, len_a), (crc_b, len_b)| (Crc64::combine(crc_a, crc_b, len_b), len_a + len_b),
        );
    crc
}
