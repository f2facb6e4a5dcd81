//! tests/utils_tests.rs

use envelope_crypt::utils::{pkcs7_pad, pkcs7_unpad, xor_blocks};

#[test]
fn xor_blocks_basic() {
    let a = [0xFFu8; 16];
    let b: [u8; 16] = core::array::from_fn(|i| i as u8);
    let mut out = [0u8; 16];
    xor_blocks(&a, &b, &mut out);
    assert_eq!(out, core::array::from_fn::<u8, 16, _>(|i| 0xFF ^ i as u8));

    let mut back = [0u8; 16];
    xor_blocks(&out, &b, &mut back);
    assert_eq!(back, a);
}

#[test]
fn xor_blocks_reads_only_first_sixteen() {
    let a = [1u8; 20];
    let b = [2u8; 20];
    let mut out = [0u8; 20];
    xor_blocks(&a, &b, &mut out);
    assert_eq!(&out[..16], &[3u8; 16]);
    assert_eq!(&out[16..], &[0u8; 4]);
}

#[test]
fn pkcs7_lengths() {
    for len in 0..=33 {
        let data = vec![0x5Au8; len];
        let padded = pkcs7_pad(&data);
        assert_eq!(padded.len() % 16, 0);
        assert!(padded.len() > len);
        assert_eq!(pkcs7_unpad(&padded).unwrap(), &data[..]);
    }
}

#[test]
fn pkcs7_unpad_rejects_bad_input() {
    assert!(pkcs7_unpad(&[]).is_err());
    assert!(pkcs7_unpad(&[16u8; 15]).is_err());

    let mut zero_pad = [0u8; 16];
    assert!(pkcs7_unpad(&zero_pad).is_err());
    zero_pad[15] = 17;
    assert!(pkcs7_unpad(&zero_pad).is_err());
}
