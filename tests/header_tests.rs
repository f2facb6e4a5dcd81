//! tests/header_tests.rs
//! Header codec: layout, incremental decoding and the version probe.

mod common;

use envelope_crypt::consts::MAX_WRAPPED_LEN;
use envelope_crypt::envelope::Mode;
use envelope_crypt::header::{decode_header, encode_header, read_version, Decoded, EnvelopeHeader};
use envelope_crypt::EnvelopeError;
use proptest::prelude::*;
use std::io::Cursor;

#[test]
fn header_layout_vector() {
    let header = EnvelopeHeader::new(2, vec![0x01, 0x02, 0x03], vec![0xFF; 2]);
    assert_eq!(header.encoded_len(), 17);
    assert_eq!(
        hex::encode(header.encode()),
        "000000020000000300000002010203ffff"
    );
}

#[test]
fn empty_payloads_decode() {
    let bytes = encode_header(1, &[], &[]);
    assert_eq!(bytes.len(), 12);
    assert_eq!(
        decode_header(&bytes, Some(1)).unwrap(),
        Decoded::Complete {
            header: EnvelopeHeader::new(1, Vec::new(), Vec::new()),
            consumed: 12,
        }
    );
}

#[test]
fn oversized_declared_length_rejected() {
    let mut bytes = Vec::new();
    bytes.extend_from_slice(&1u32.to_be_bytes());
    bytes.extend_from_slice(&u32::MAX.to_be_bytes());
    bytes.extend_from_slice(&u32::MAX.to_be_bytes());
    assert!(matches!(
        decode_header(&bytes, Some(1)),
        Err(EnvelopeError::Header(_))
    ));

    let mut cek_only = Vec::new();
    cek_only.extend_from_slice(&1u32.to_be_bytes());
    cek_only.extend_from_slice(&16u32.to_be_bytes());
    cek_only.extend_from_slice(&((MAX_WRAPPED_LEN + 1) as u32).to_be_bytes());
    assert!(matches!(
        decode_header(&cek_only, Some(1)),
        Err(EnvelopeError::Header(_))
    ));
}

#[test]
fn length_at_limit_just_waits() {
    let mut bytes = Vec::new();
    bytes.extend_from_slice(&1u32.to_be_bytes());
    bytes.extend_from_slice(&(MAX_WRAPPED_LEN as u32).to_be_bytes());
    bytes.extend_from_slice(&(MAX_WRAPPED_LEN as u32).to_be_bytes());
    bytes.extend_from_slice(&[0u8; 64]);
    assert_eq!(decode_header(&bytes, Some(1)).unwrap(), Decoded::NeedMoreData);
}

#[test]
fn decrypting_reader_stops_at_oversized_header() {
    let mut wire = Vec::new();
    wire.extend_from_slice(&1u32.to_be_bytes());
    wire.extend_from_slice(&u32::MAX.to_be_bytes());
    wire.extend_from_slice(&u32::MAX.to_be_bytes());
    wire.extend(std::iter::repeat(0u8).take(100_000));

    let b = common::builder();
    let err = common::open(&wire, b.aes(Mode::Decrypt)).unwrap_err();
    assert!(matches!(err, EnvelopeError::Header(_)));
}

#[test]
fn version_mismatch_reported() {
    let bytes = encode_header(3, b"iv", b"cek");
    assert!(matches!(
        decode_header(&bytes, Some(1)),
        Err(EnvelopeError::UnsupportedVersion(3))
    ));
}

#[test]
fn read_version_consumes_four_bytes() {
    let mut cursor = Cursor::new(encode_header(7, b"a", b"b"));
    assert_eq!(read_version(&mut cursor).unwrap(), 7);
    assert_eq!(cursor.position(), 4);
}

proptest! {
    #[test]
    fn encode_decode_roundtrip(
        version in any::<u32>(),
        iv in proptest::collection::vec(any::<u8>(), 0..64),
        cek in proptest::collection::vec(any::<u8>(), 0..96),
        trailing in proptest::collection::vec(any::<u8>(), 0..32),
    ) {
        let header = EnvelopeHeader::new(version, iv, cek);
        let mut bytes = header.encode();
        let header_len = bytes.len();
        bytes.extend_from_slice(&trailing);

        prop_assert_eq!(
            decode_header(&bytes, Some(version)).unwrap(),
            Decoded::Complete { header, consumed: header_len }
        );
    }

    #[test]
    fn prefixes_never_fail(
        iv in proptest::collection::vec(any::<u8>(), 0..48),
        cek in proptest::collection::vec(any::<u8>(), 0..48),
    ) {
        let bytes = encode_header(1, &iv, &cek);
        for cut in 0..bytes.len() {
            prop_assert_eq!(decode_header(&bytes[..cut], Some(1)).unwrap(), Decoded::NeedMoreData);
        }
    }

    #[test]
    fn bytewise_and_whole_decoding_agree(
        iv in proptest::collection::vec(any::<u8>(), 0..48),
        cek in proptest::collection::vec(any::<u8>(), 0..48),
    ) {
        let bytes = encode_header(5, &iv, &cek);
        let whole = decode_header(&bytes, None).unwrap();

        let mut buffer = Vec::new();
        let mut incremental = Decoded::NeedMoreData;
        for &b in &bytes {
            buffer.push(b);
            incremental = decode_header(&buffer, None).unwrap();
            if matches!(incremental, Decoded::Complete { .. }) {
                break;
            }
        }
        prop_assert_eq!(incremental, whole);
    }
}
