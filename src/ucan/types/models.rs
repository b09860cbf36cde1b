//! Core data structures shared across the decode pipeline.
//!
//! This module defines:
//! - The borrowed token input accepted by every entry point
//! - The detected source encoding of a token
//! - Classification results
//! - Defensive decoding limits

use std::fmt;

use serde::Serialize;

/// An opaque token as it arrives from the capture side.
///
/// Lives for exactly one decode call; nothing in the crate keeps a reference to it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenInput<'a> {
    /// Text, e.g. a header value (base64, base64url, hex or per-byte text).
    Text(&'a str),
    /// Raw bytes, taken as already canonical.
    Bytes(&'a [u8]),
}

impl<'a> From<&'a str> for TokenInput<'a> {
    fn from(value: &'a str) -> Self {
        TokenInput::Text(value)
    }
}

impl<'a> From<&'a String> for TokenInput<'a> {
    fn from(value: &'a String) -> Self {
        TokenInput::Text(value.as_str())
    }
}

impl<'a> From<&'a [u8]> for TokenInput<'a> {
    fn from(value: &'a [u8]) -> Self {
        TokenInput::Bytes(value)
    }
}

impl<'a, const N: usize> From<&'a [u8; N]> for TokenInput<'a> {
    fn from(value: &'a [u8; N]) -> Self {
        TokenInput::Bytes(value.as_slice())
    }
}

impl<'a> From<&'a Vec<u8>> for TokenInput<'a> {
    fn from(value: &'a Vec<u8>) -> Self {
        TokenInput::Bytes(value.as_slice())
    }
}

/// The encoding a token was detected to arrive in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenFormat {
    Base64,
    Base64Url,
    Hex,
    Raw,
    Bytes,
}

impl TokenFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            TokenFormat::Base64 => "base64",
            TokenFormat::Base64Url => "base64url",
            TokenFormat::Hex => "hex",
            TokenFormat::Raw => "raw",
            TokenFormat::Bytes => "bytes",
        }
    }
}

impl fmt::Display for TokenFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The closed set of payload kinds a token can be classified as.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenType {
    Delegation,
    Invocation,
    Unknown,
}

impl TokenType {
    /// Maps a type-tag abbreviation (`dlg`, `inv`) to its kind, ignoring case.
    pub fn from_abbrev(abbrev: &str) -> Self {
        if abbrev.eq_ignore_ascii_case("dlg") {
            TokenType::Delegation
        } else if abbrev.eq_ignore_ascii_case("inv") {
            TokenType::Invocation
        } else {
            TokenType::Unknown
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TokenType::Delegation => "delegation",
            TokenType::Invocation => "invocation",
            TokenType::Unknown => "unknown",
        }
    }
}

impl fmt::Display for TokenType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Classification result: payload kind plus the protocol version from the type tag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TokenTypeInfo {
    #[serde(rename = "type")]
    pub token_type: TokenType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
}

impl TokenTypeInfo {
    pub fn unknown() -> Self {
        Self {
            token_type: TokenType::Unknown,
            version: None,
        }
    }

    pub fn new(token_type: TokenType, version: impl Into<String>) -> Self {
        Self {
            token_type,
            version: Some(version.into()),
        }
    }

    pub fn is_unknown(&self) -> bool {
        self.token_type == TokenType::Unknown
    }
}

/// Defensive bounds applied while decoding untrusted input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Limits {
    /// Maximum nesting of arrays, maps and tags.
    pub max_depth: usize,
    /// Maximum declared element count of a single array or map.
    pub max_collection_len: u64,
    /// Maximum size of a decompressed container body.
    pub max_decompressed_len: usize,
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            max_depth: 64,
            max_collection_len: 65_536,
            max_decompressed_len: 16 * 1024 * 1024,
        }
    }
}
