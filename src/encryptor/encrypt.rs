//! src/encryptor/encrypt.rs
//! Whole-stream encryption through a [`CipherWriter`].

use crate::envelope::{EnvelopeCipher, Mode};
use crate::error::EnvelopeError;
use crate::stream::CipherWriter;
use std::io::{self, Read, Write};

/// Encrypt everything `input` yields into `output`.
///
/// Returns the number of plaintext bytes consumed. The envelope header is
/// written even for an empty input, so the result always decrypts.
///
/// # Example
///
/// ```
/// use envelope_crypt::builders::CipherBuilder;
/// use envelope_crypt::crypto::wrap::AesKeyWrap;
/// use envelope_crypt::envelope::Mode;
/// use envelope_crypt::{decrypt, encrypt};
/// use std::io::Cursor;
///
/// let builder = CipherBuilder::new(AesKeyWrap::new(&[7u8; 32]));
///
/// let mut sealed = Vec::new();
/// encrypt(Cursor::new(b"hello"), &mut sealed, builder.aes(Mode::Encrypt))?;
///
/// let mut opened = Vec::new();
/// decrypt(Cursor::new(sealed), &mut opened, builder.aes(Mode::Decrypt))?;
/// assert_eq!(opened, b"hello");
/// # Ok::<(), envelope_crypt::EnvelopeError>(())
/// ```
pub fn encrypt<R, W>(
    mut input: R,
    output: W,
    cipher: Box<dyn EnvelopeCipher>,
) -> Result<u64, EnvelopeError>
where
    R: Read,
    W: Write,
{
    if cipher.mode() != Mode::Encrypt {
        return Err(EnvelopeError::InvalidState(
            "encrypt requires an encrypting session".into(),
        ));
    }

    let mut writer = CipherWriter::new(output, cipher);
    let copied = io::copy(&mut input, &mut writer)?;
    writer.finish()?;
    Ok(copied)
}
