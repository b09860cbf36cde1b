//! Custom error types for the ucan-inspector crate.

use std::convert::Infallible;

use thiserror::Error;

use super::models::TokenFormat;

/// Errors raised while parsing DAG-CBOR bytes into a [`Value`](super::value::Value).
#[derive(Debug, Error)]
pub enum DecodeError {
    /// Truncated input, an invalid length prefix or any other low-level CBOR fault.
    #[error("cbor decode: {0}")]
    Cbor(#[from] minicbor::decode::Error),

    /// Indefinite-length strings, arrays and maps are not valid DAG-CBOR.
    #[error("indefinite-length CBOR not allowed")]
    IndefiniteLength,

    /// A tag other than 42 (link) or 258 (set).
    #[error("unsupported CBOR tag: {0}")]
    UnsupportedTag(u64),

    /// A tag whose content has the wrong major type.
    #[error("invalid content for tag {tag}: expected {expected}")]
    InvalidTagContent { tag: u64, expected: &'static str },

    /// A CBOR type with no counterpart in the value model (simple values, undefined bytes).
    #[error("unsupported CBOR type: {0}")]
    UnsupportedType(String),

    /// Map keys must be text strings.
    #[error("non-text map key at byte offset {0}")]
    NonTextKey(usize),

    /// One complete item was read but input remains.
    #[error("trailing bytes after CBOR item ({0} bytes)")]
    TrailingBytes(usize),

    /// A configured [`Limits`](super::models::Limits) bound was exceeded.
    #[error("decode limit exceeded: {0}")]
    DecodeLimit(&'static str),
}

/// Errors raised while serializing a [`Value`](super::value::Value) to CBOR.
#[derive(Debug, Error)]
pub enum EncodeError {
    #[error("cbor encode: {0}")]
    Cbor(#[from] minicbor::encode::Error<Infallible>),

    /// CBOR integers span `-2^64 ..= 2^64 - 1`.
    #[error("integer {0} is outside the CBOR integer range")]
    IntegerOutOfRange(i128),
}

/// Errors raised by the container unwrapper once a header byte was recognized.
#[derive(Debug, Error)]
pub enum ContainerError {
    #[error("unknown container header byte {0:#04x}")]
    UnknownHeader(u32),

    #[error("container payload is not valid {0}")]
    InvalidPayload(&'static str),

    #[error("gzip decompression failed: {0}")]
    Decompression(#[from] std::io::Error),

    #[error("decompressed container exceeds {0} bytes")]
    DecompressedTooLarge(usize),

    #[error("malformed container body: {0}")]
    Body(#[from] DecodeError),

    #[error("container body is not a map")]
    NotAMap,

    #[error("container entry `{0}` is not an array")]
    EntriesNotArray(&'static str),

    #[error("failed to encode container body: {0}")]
    Encode(#[from] EncodeError),
}

/// The primary error type for all token operations in this crate.
#[derive(Debug, Error)]
pub enum UcanError {
    /// The normalized bytes are not valid structured binary.
    #[error("Failed to decode UCAN token (detected format: {format})")]
    StructuredDecode {
        format: TokenFormat,
        #[source]
        source: DecodeError,
    },

    /// A recognized container could not be unwrapped.
    #[error("Failed to decode token container: {0}")]
    ContainerDecode(#[from] ContainerError),
}

impl UcanError {
    /// The input format detected before the failure, when one was determined.
    pub fn detected_format(&self) -> Option<TokenFormat> {
        match self {
            UcanError::StructuredDecode { format, .. } => Some(*format),
            _ => None,
        }
    }
}

/// A convenience `Result` type alias using the crate's `UcanError` type.
pub type Result<T> = std::result::Result<T, UcanError>;
