//! Token text encodings and input normalization.
//!
//! A token string may arrive as hex, base64url, padded base64 or as text whose
//! characters each stand for one byte. [`normalize`] turns any token into
//! canonical bytes plus the detected [`TokenFormat`].
//!
//! Detection order:
//! 1. Hex, committed only if the bytes parse as structured binary
//! 2. Base64url, only when the text contains `-` or `_`
//! 3. Standard base64
//! 4. Per-byte text (never fails)

use std::borrow::Cow;

use base64::alphabet;
use base64::engine::general_purpose::{GeneralPurpose, GeneralPurposeConfig, STANDARD, URL_SAFE_NO_PAD};
use base64::engine::DecodePaddingMode;
use base64::Engine;
use log::trace;

use super::cbor;
use crate::ucan::types::models::{Limits, TokenFormat, TokenInput};

/// Standard-alphabet decoder that, like browser `atob`, accepts missing
/// padding and non-zero trailing bits.
const FORGIVING: GeneralPurpose = GeneralPurpose::new(
    &alphabet::STANDARD,
    GeneralPurposeConfig::new()
        .with_decode_allow_trailing_bits(true)
        .with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

/// Canonical bytes of a token and the encoding they were recovered from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Normalized<'a> {
    pub bytes: Cow<'a, [u8]>,
    pub format: TokenFormat,
}

/// Normalizes any token input into bytes. Byte input passes through untouched.
pub fn normalize<'a>(input: TokenInput<'a>, limits: &Limits) -> Normalized<'a> {
    match input {
        TokenInput::Bytes(bytes) => Normalized {
            bytes: Cow::Borrowed(bytes),
            format: TokenFormat::Bytes,
        },
        TokenInput::Text(text) => {
            let (bytes, format) = text_to_bytes(text, limits);
            Normalized {
                bytes: Cow::Owned(bytes),
                format,
            }
        }
    }
}

/// Detects the encoding of a token string and decodes it.
///
/// Total and deterministic: the per-byte text fallback accepts every string.
pub fn text_to_bytes(token: &str, limits: &Limits) -> (Vec<u8>, TokenFormat) {
    if looks_like_hex(token) {
        if let Ok(bytes) = hex::decode(token) {
            // Plenty of hex strings are also valid base64, so only commit when
            // the bytes really are structured binary.
            if cbor::decode_with_limits(&bytes, limits).is_ok() {
                trace!("Token detected as hex ({} bytes)", bytes.len());
                return (bytes, TokenFormat::Hex);
            }
            trace!("Hex-shaped token is not valid CBOR, trying base64");
        }
    }

    if token.contains(|c: char| c == '-' || c == '_') {
        if let Some(bytes) = base64url_to_bytes(token) {
            trace!("Token detected as base64url ({} bytes)", bytes.len());
            return (bytes, TokenFormat::Base64Url);
        }
    }

    if let Some(bytes) = base64_to_bytes(token) {
        trace!("Token detected as base64 ({} bytes)", bytes.len());
        return (bytes, TokenFormat::Base64);
    }

    trace!("Token treated as per-byte text ({} chars)", token.chars().count());
    (latin1_to_bytes(token), TokenFormat::Raw)
}

fn looks_like_hex(token: &str) -> bool {
    token.len() >= 4 && token.len() % 2 == 0 && token.bytes().all(|b| b.is_ascii_hexdigit())
}

/// Reads every character as one byte (character codes above 0xFF keep their low 8 bits).
pub fn latin1_to_bytes(text: &str) -> Vec<u8> {
    if encoding_rs::mem::is_str_latin1(text) {
        return encoding_rs::mem::encode_latin1_lossy(text).into_owned();
    }
    text.chars().map(|c| (c as u32 & 0xFF) as u8).collect()
}

/// The inverse of [`latin1_to_bytes`]: one character per byte.
pub fn bytes_to_latin1(bytes: &[u8]) -> String {
    encoding_rs::mem::decode_latin1(bytes).into_owned()
}

/// Decodes standard base64, tolerating missing padding.
pub fn base64_to_bytes(text: &str) -> Option<Vec<u8>> {
    FORGIVING.decode(text).ok()
}

/// Decodes unpadded base64url by translating it to the standard alphabet and
/// restoring the padding from the length remainder.
///
/// A remainder of 1 can never be produced by an encoder and is rejected.
pub fn base64url_to_bytes(text: &str) -> Option<Vec<u8>> {
    let mut standard: String = text
        .chars()
        .map(|c| match c {
            '-' => '+',
            '_' => '/',
            other => other,
        })
        .collect();
    match standard.len() % 4 {
        0 => {}
        2 => standard.push_str("=="),
        3 => standard.push('='),
        _ => return None,
    }
    base64_to_bytes(&standard)
}

/// Encodes bytes as padded standard base64.
pub fn bytes_to_base64(bytes: &[u8]) -> String {
    STANDARD.encode(bytes)
}

/// Encodes bytes as unpadded base64url.
pub fn bytes_to_base64url(bytes: &[u8]) -> String {
    URL_SAFE_NO_PAD.encode(bytes)
}
