//! # ucan-inspector
//!
//! Detects, unwraps, decodes and classifies UCAN tokens captured from HTTP
//! traffic. Tokens may arrive as hex, base64, base64url or per-byte text,
//! optionally packed into a (possibly gzip-compressed) container.
//!
//! **Note:** Signatures are not verified and no authorization policy is
//! evaluated; classification is purely structural.
pub mod ucan;

// Re-export the main types for convenience
pub use ucan::{
    Capture,
    DecoderChain,
    ObservedRequest,
    TokenItem,
    UcanDecoder,
    UcanError,
    Result,
    types::{
        models::{Limits, TokenFormat, TokenInput, TokenType, TokenTypeInfo},
        value::{Link, Value},
    },
};
