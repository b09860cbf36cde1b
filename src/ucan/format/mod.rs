//! Wire formats layered above the codec.
//!
//! - [`container`]: The header-byte-directed multi-token container

pub mod container;
