mod common;

use std::borrow::Cow;

use ucan_inspector::ucan::codec::encoding::{
    self, base64_to_bytes, base64url_to_bytes, bytes_to_base64url, latin1_to_bytes, text_to_bytes,
};
use ucan_inspector::{Limits, TokenFormat, TokenInput};

fn delegation_bytes() -> Vec<u8> {
    base64_to_bytes(common::DELEGATION_TOKEN).expect("fixture is base64")
}

#[test]
fn detects_standard_base64() {
    let (bytes, format) = text_to_bytes(common::DELEGATION_TOKEN, &Limits::default());
    assert_eq!(format, TokenFormat::Base64);
    assert_eq!(bytes.len(), 408);
    assert_eq!(bytes[0], 0x82, "envelope is a two-element array");
}

#[test]
fn detects_hex_in_either_case() {
    let expected = delegation_bytes();
    for text in [hex::encode(&expected), hex::encode_upper(&expected)] {
        let (bytes, format) = text_to_bytes(&text, &Limits::default());
        assert_eq!(format, TokenFormat::Hex);
        assert_eq!(bytes, expected);
    }
}

#[test]
fn hex_shaped_text_that_is_not_cbor_falls_through() {
    // DE is a reserved initial byte, so this is read as base64.
    let (bytes, format) = text_to_bytes("deadbeef", &Limits::default());
    assert_eq!(format, TokenFormat::Base64);
    assert_eq!(bytes, base64_to_bytes("deadbeef").expect("valid base64"));

    let (bytes, format) = text_to_bytes("820102", &Limits::default());
    assert_eq!(format, TokenFormat::Hex);
    assert_eq!(bytes, vec![0x82, 0x01, 0x02]);
}

#[test]
fn detects_base64url() {
    let expected = delegation_bytes();
    let text = bytes_to_base64url(&expected);
    assert!(text.contains('-') || text.contains('_'));

    let (bytes, format) = text_to_bytes(&text, &Limits::default());
    assert_eq!(format, TokenFormat::Base64Url);
    assert_eq!(bytes, expected);
}

#[test]
fn base64url_restores_padding() {
    assert_eq!(base64url_to_bytes("-_8"), Some(vec![0xFB, 0xFF]));
    assert_eq!(base64url_to_bytes("-_-_"), Some(vec![0xFB, 0xFF, 0xBF]));
    assert_eq!(base64url_to_bytes("-_-_-"), None, "remainder of 1 is impossible");
}

#[test]
fn impossible_base64url_falls_back_to_text() {
    let (bytes, format) = text_to_bytes("ab-_c", &Limits::default());
    assert_eq!(format, TokenFormat::Raw);
    assert_eq!(bytes, b"ab-_c".to_vec());
}

#[test]
fn base64_tolerates_missing_padding() {
    assert_eq!(base64_to_bytes("AQI="), Some(vec![0x01, 0x02]));
    assert_eq!(base64_to_bytes("AQI"), Some(vec![0x01, 0x02]));
    assert_eq!(base64_to_bytes("A*QI"), None);
}

#[test]
fn per_byte_text_keeps_low_eight_bits() {
    let (bytes, format) = text_to_bytes("\u{e9}!", &Limits::default());
    assert_eq!(format, TokenFormat::Raw);
    assert_eq!(bytes, vec![0xE9, 0x21]);

    assert_eq!(latin1_to_bytes("\u{100}\u{1ff}"), vec![0x00, 0xFF]);
    assert_eq!(encoding::bytes_to_latin1(&[0x82, 0x40]), "\u{82}@");
}

#[test]
fn byte_input_passes_through() {
    let raw = delegation_bytes();
    let normalized = encoding::normalize(TokenInput::from(&raw), &Limits::default());
    assert_eq!(normalized.format, TokenFormat::Bytes);
    assert!(matches!(normalized.bytes, Cow::Borrowed(_)));
    assert_eq!(normalized.bytes.as_ref(), raw.as_slice());
}

#[test]
fn detection_is_deterministic() {
    for text in [common::DELEGATION_TOKEN, common::INVOCATION_TOKEN, "", "plain words"] {
        let first = text_to_bytes(text, &Limits::default());
        let second = text_to_bytes(text, &Limits::default());
        assert_eq!(first, second, "{:?}", text);
    }
}

#[test]
fn hex_with_half_float_is_still_hex() {
    // {"x": 1.5} with the float in its two-byte form.
    let (bytes, format) = text_to_bytes("a16178f93e00", &Limits::default());
    assert_eq!(format, TokenFormat::Hex);
    assert_eq!(bytes, vec![0xA1, 0x61, 0x78, 0xF9, 0x3E, 0x00]);
}
