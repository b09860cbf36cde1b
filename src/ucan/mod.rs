//! Core UCAN token inspection pipeline.
//!
//! ```text
//! header value
//!     │
//!     ▼
//! chain ─────── container::unwrap()    (header byte, base64, gzip, ctn-v1)
//!     │
//!     ▼ token strings
//! decoder ───── encoding::normalize()  (hex / base64url / base64 / per-byte)
//!     │         cbor::decode()         (tags 42 and 258)
//!     │         cache
//!     ▼
//! classify ──── envelope → type tag → payload shape
//! ```

pub mod cache;
pub mod capture;
pub mod chain;
pub mod classify;
pub mod codec;
pub mod decoder;
pub mod format;
pub mod types;

pub use cache::DecodeCache;
pub use capture::{Capture, ObservedRequest, SourceHeader, TokenItem, WrapFormat};
pub use chain::{ContainerDecoder, DecoderChain, RawTokenDecoder, TokenDecoder};
pub use decoder::{DecodeResult, SafeDecode, UcanDecoder};
pub use types::error::{ContainerError, DecodeError, EncodeError, Result, UcanError};
pub use types::models::{Limits, TokenFormat, TokenInput, TokenType, TokenTypeInfo};
pub use types::value::{Link, Value};
