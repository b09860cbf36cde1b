//! # Token Containers
//!
//! A container packs several tokens into one header value. The first
//! character selects how the rest of the string is encoded and whether it is
//! gzip-compressed:
//!
//! | byte | text encoding         | compression |
//! |------|-----------------------|-------------|
//! | `@`  | per-byte text         | none        |
//! | `B`  | base64 (padded)       | none        |
//! | `C`  | base64url (unpadded)  | none        |
//! | `M`  | per-byte text         | gzip        |
//! | `O`  | base64 (padded)       | gzip        |
//! | `P`  | base64url (unpadded)  | gzip        |
//!
//! The decoded body is a CBOR map whose `ctn-v1` entry lists the token bytes.

use log::{debug, trace};

use crate::ucan::codec::{cbor, compression, encoding};
use crate::ucan::types::error::ContainerError;
use crate::ucan::types::models::Limits;
use crate::ucan::types::value::Value;

/// Body key holding the token list.
pub const CONTAINER_KEY: &str = "ctn-v1";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextEncoding {
    /// Every character is one byte.
    Raw,
    /// Standard base64 with padding.
    Base64,
    /// URL-safe base64 without padding.
    Base64Url,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContainerCompression {
    None,
    Gzip,
}

/// A recognized container header byte and what it selects.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContainerHeader {
    pub byte: u8,
    pub encoding: TextEncoding,
    pub compression: ContainerCompression,
}

impl ContainerHeader {
    const fn new(byte: u8, encoding: TextEncoding, compression: ContainerCompression) -> Self {
        Self {
            byte,
            encoding,
            compression,
        }
    }

    /// Every header row, in table order.
    pub const ALL: [ContainerHeader; 6] = [
        Self::new(0x40, TextEncoding::Raw, ContainerCompression::None),
        Self::new(0x42, TextEncoding::Base64, ContainerCompression::None),
        Self::new(0x43, TextEncoding::Base64Url, ContainerCompression::None),
        Self::new(0x4D, TextEncoding::Raw, ContainerCompression::Gzip),
        Self::new(0x4F, TextEncoding::Base64, ContainerCompression::Gzip),
        Self::new(0x50, TextEncoding::Base64Url, ContainerCompression::Gzip),
    ];

    /// Looks up the row for a header character code.
    pub fn from_code(code: u32) -> Option<Self> {
        Self::ALL.into_iter().find(|h| u32::from(h.byte) == code)
    }

    /// Looks up the row selecting the given encoding and compression.
    pub fn for_options(encoding: TextEncoding, compression: ContainerCompression) -> Self {
        Self::ALL
            .into_iter()
            .find(|h| h.encoding == encoding && h.compression == compression)
            .unwrap_or(Self::ALL[0])
    }
}

impl TryFrom<u8> for ContainerHeader {
    type Error = ContainerError;
    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::from_code(u32::from(value)).ok_or(ContainerError::UnknownHeader(u32::from(value)))
    }
}

/// Returns the header row selected by the first character, if any.
pub fn header_of(input: &str) -> Option<ContainerHeader> {
    input.chars().next().and_then(|c| ContainerHeader::from_code(c as u32))
}

/// Whether the first character is one of the six container header bytes.
pub fn is_container(input: &str) -> bool {
    header_of(input).is_some()
}

/// Unwraps a container string into its token strings.
///
/// Byte entries (or arrays of byte values) are re-encoded as unpadded
/// base64url; text entries pass through. When the container yields no usable
/// entries the original input is returned as the only token.
///
/// # Errors
/// Returns an error if the header is unknown, the payload does not decode or
/// decompress, or the body is not a map with an array under `ctn-v1`.
pub fn unwrap(input: &str, limits: &Limits) -> Result<Vec<String>, ContainerError> {
    let first = input.chars().next().ok_or(ContainerError::UnknownHeader(0))?;
    let header = ContainerHeader::from_code(first as u32)
        .ok_or(ContainerError::UnknownHeader(first as u32))?;
    let payload = &input[first.len_utf8()..];

    trace!(
        "Unwrapping container: header={:#04x}, encoding={:?}, compression={:?}, {} payload chars",
        header.byte, header.encoding, header.compression, payload.len()
    );

    let raw = match header.encoding {
        TextEncoding::Raw => encoding::latin1_to_bytes(payload),
        TextEncoding::Base64 => encoding::base64_to_bytes(payload)
            .ok_or(ContainerError::InvalidPayload("base64"))?,
        TextEncoding::Base64Url => encoding::base64url_to_bytes(payload)
            .ok_or(ContainerError::InvalidPayload("base64url"))?,
    };

    let body = match header.compression {
        ContainerCompression::None => raw,
        ContainerCompression::Gzip => compression::gunzip(&raw, limits.max_decompressed_len)?,
    };

    let value = cbor::decode_with_limits(&body, limits)?;
    if value.as_map().is_none() {
        return Err(ContainerError::NotAMap);
    }

    let tokens: Vec<String> = match value.get(CONTAINER_KEY) {
        None => Vec::new(),
        Some(Value::Array(entries)) => entries.iter().filter_map(entry_to_token).collect(),
        Some(_) => return Err(ContainerError::EntriesNotArray(CONTAINER_KEY)),
    };

    if tokens.is_empty() {
        debug!("Container held no usable tokens, keeping the input as a single token");
        return Ok(vec![input.to_owned()]);
    }

    trace!("Container yielded {} tokens", tokens.len());
    Ok(tokens)
}

fn entry_to_token(entry: &Value) -> Option<String> {
    match entry {
        Value::Bytes(bytes) => Some(encoding::bytes_to_base64url(bytes)),
        // Some producers write token bytes as an array of integers.
        Value::Array(items) => items
            .iter()
            .map(|item| match item {
                Value::Integer(n) => u8::try_from(*n).ok(),
                _ => None,
            })
            .collect::<Option<Vec<u8>>>()
            .map(|bytes| encoding::bytes_to_base64url(&bytes)),
        Value::Text(text) => Some(text.clone()),
        _ => None,
    }
}

/// Packs raw token bytes into a container string using the given header row.
pub fn wrap<T: AsRef<[u8]>>(tokens: &[T], header: ContainerHeader) -> Result<String, ContainerError> {
    let body = Value::Map(vec![(
        CONTAINER_KEY.to_owned(),
        Value::Array(
            tokens
                .iter()
                .map(|token| Value::Bytes(token.as_ref().to_vec()))
                .collect(),
        ),
    )]);

    let mut bytes = cbor::encode(&body)?;
    if header.compression == ContainerCompression::Gzip {
        bytes = compression::gzip(&bytes)?;
    }

    let text = match header.encoding {
        TextEncoding::Raw => encoding::bytes_to_latin1(&bytes),
        TextEncoding::Base64 => encoding::bytes_to_base64(&bytes),
        TextEncoding::Base64Url => encoding::bytes_to_base64url(&bytes),
    };

    let mut out = String::with_capacity(text.len() + 1);
    out.push(char::from(header.byte));
    out.push_str(&text);
    Ok(out)
}
