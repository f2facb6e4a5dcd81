//! tests/checksum_tests.rs
//! Checksum contract across CRCs, digests, fan-out and checked streams.

use envelope_crypt::checksum::{
    ChecksumReader, ChecksumWriter, Crc32Checksum, DigestAlgorithm, DigestChecksum, MultiChecksum,
};
use envelope_crypt::{Checksum, ChecksumValue, Crc64, EnvelopeError};
use std::io::{Cursor, Read, Write};

const LONG_TEXT: &[u8] = b"The quick brown fox jumps over the lazy dog";

fn digest_hex(name: &str, data: &[u8]) -> String {
    let mut digest = DigestChecksum::from_name(name).unwrap();
    digest.update(data);
    hex::encode(digest.value().to_bytes())
}

#[test]
fn digest_vectors() {
    assert_eq!(digest_hex("MD5", b""), "d41d8cd98f00b204e9800998ecf8427e");
    assert_eq!(
        digest_hex("SHA-256", LONG_TEXT),
        "d7a8fbb307d7809469ca9abcb0082e4f8d5651e46d3cdb762d02d0bf37c9e592"
    );
    assert_eq!(
        digest_hex("SHA-512", b"abc"),
        "ddaf35a193617abacc417349ae20413112e6fa4e89a97ea20a9eeee64b55d39a\
         2192992a274fc1a836ba3c23a3feebbd454d4423643ce80e2a9ac94fa54ca49f"
    );
    assert_eq!(
        digest_hex("BLAKE3", b""),
        "af1349b9f5f9a1a6a0404dea36dcc9499bcb25c9adc112b7cc9a93cae41f3262"
    );
}

#[test]
fn single_byte_updates_match_slices() {
    for alg in [DigestAlgorithm::Md5, DigestAlgorithm::Sm3, DigestAlgorithm::Blake3] {
        let mut bytewise = DigestChecksum::new(alg);
        for &b in LONG_TEXT {
            bytewise.update_byte(b);
        }
        let mut whole = DigestChecksum::new(alg);
        whole.update(LONG_TEXT);
        assert_eq!(bytewise.value(), whole.value(), "{alg}");
    }
}

#[test]
fn digest_reset_discards_input() {
    let mut digest = DigestChecksum::new(DigestAlgorithm::Sha256);
    digest.update(b"discarded");
    digest.reset();
    digest.update(LONG_TEXT);
    assert_eq!(
        hex::encode(digest.value().to_bytes()),
        digest_hex("sha-256", LONG_TEXT)
    );
}

#[test]
fn unknown_digest_name() {
    let err = DigestChecksum::from_name("SHA-1").unwrap_err();
    assert!(matches!(err, EnvelopeError::UnknownDigest(ref n) if n == "SHA-1"));
}

#[test]
fn fan_out_equals_independent_runs() {
    let mut multi = MultiChecksum::new(vec![
        Box::new(Crc64::new()),
        Box::new(DigestChecksum::new(DigestAlgorithm::Sha256)),
        Box::new(Crc32Checksum::new()),
    ]);
    for chunk in LONG_TEXT.chunks(5) {
        multi.update(chunk);
    }

    let mut crc32 = Crc32Checksum::new();
    crc32.update(LONG_TEXT);
    let expected = ChecksumValue::Multi(vec![
        ChecksumValue::Crc64(Crc64::checksum(LONG_TEXT)),
        ChecksumValue::Digest(hex::decode(digest_hex("SHA-256", LONG_TEXT)).unwrap()),
        crc32.value(),
    ]);
    assert_eq!(multi.value(), expected);
    assert_eq!(multi.children().len(), 3);
}

#[test]
fn multi_value_bytes_concatenate_children() {
    let mut multi = MultiChecksum::default().with(Crc64::new()).with(Crc32Checksum::new());
    multi.update(b"123456789");
    let bytes = multi.value().to_bytes();
    assert_eq!(hex::encode(bytes), "995dc9bbdf1939facbf43926");
}

#[test]
fn checked_reader_and_writer_agree() {
    let data: Vec<u8> = (0..10_000u32).map(|i| (i % 253) as u8).collect();

    let mut reader = ChecksumReader::new(
        Cursor::new(data.clone()),
        MultiChecksum::default()
            .with(Crc64::new())
            .with(DigestChecksum::new(DigestAlgorithm::Md5)),
    );
    let mut copied = Vec::new();
    reader.read_to_end(&mut copied).unwrap();

    let mut writer = ChecksumWriter::new(
        Vec::new(),
        MultiChecksum::default()
            .with(Crc64::new())
            .with(DigestChecksum::new(DigestAlgorithm::Md5)),
    );
    writer.write_all(&copied).unwrap();
    let (sink, mut write_side) = writer.into_parts();

    assert_eq!(sink, data);
    assert_eq!(reader.checksum_mut().value(), write_side.value());
}

#[test]
fn boxed_checksum_in_checked_stream() {
    let boxed: Box<dyn Checksum> = Box::new(Crc64::new());
    let mut reader = ChecksumReader::new(Cursor::new(b"123456789".to_vec()), boxed);
    std::io::copy(&mut reader, &mut std::io::sink()).unwrap();
    let (_, mut crc) = reader.into_parts();
    assert_eq!(crc.value().as_u64(), Some(0x995D_C9BB_DF19_39FA));
}
