//! src/decryptor/decrypt.rs
//! Whole-stream decryption through a [`CipherReader`].

use crate::envelope::{EnvelopeCipher, Mode};
use crate::error::EnvelopeError;
use crate::stream::CipherReader;
use std::io::{self, Read, Write};

/// Decrypt everything `input` yields into `output`.
///
/// Returns the number of plaintext bytes written. A source that ends
/// before the envelope header is complete fails with
/// [`EnvelopeError::TruncatedHeader`].
pub fn decrypt<R, W>(
    input: R,
    mut output: W,
    cipher: Box<dyn EnvelopeCipher>,
) -> Result<u64, EnvelopeError>
where
    R: Read,
    W: Write,
{
    if cipher.mode() != Mode::Decrypt {
        return Err(EnvelopeError::InvalidState(
            "decrypt requires a decrypting session".into(),
        ));
    }

    let mut reader = CipherReader::new(input, cipher);
    let written = io::copy(&mut reader, &mut output)?;
    output.flush()?;
    Ok(written)
}
