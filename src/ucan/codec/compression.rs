//! Gzip support for compressed token containers.

use std::io::{Read, Write};

use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use flate2::Compression;
use log::trace;

use crate::ucan::types::error::ContainerError;

/// Inflates a gzip stream, refusing output larger than `max_len` bytes.
///
/// # Errors
/// Returns an error if the stream is corrupt or inflates past `max_len`.
pub fn gunzip(payload: &[u8], max_len: usize) -> Result<Vec<u8>, ContainerError> {
    trace!("Decompressing with gzip: {} bytes in", payload.len());

    let mut output = Vec::new();
    // Read one byte past the limit so an oversized stream is detectable.
    let mut decoder = GzDecoder::new(payload).take((max_len as u64).saturating_add(1));
    decoder.read_to_end(&mut output)?;

    if output.len() > max_len {
        return Err(ContainerError::DecompressedTooLarge(max_len));
    }

    trace!("Gzip produced {} bytes", output.len());
    Ok(output)
}

/// Compresses bytes into a gzip stream.
pub fn gzip(data: &[u8]) -> Result<Vec<u8>, ContainerError> {
    let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(data)?;
    Ok(encoder.finish()?)
}
