//! Codec layer: pure byte-level transformations.
//!
//! # Submodules
//!
//! - [`encoding`]: Token text encodings (hex, base64, base64url, per-byte text) and input normalization
//! - [`cbor`]: DAG-CBOR decoding and encoding with the link and set tags
//! - [`compression`]: Gzip for compressed containers

pub mod cbor;
pub mod compression;
pub mod encoding;
