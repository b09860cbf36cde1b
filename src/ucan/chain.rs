//! Ordered fallback over token decoders.
//!
//! Each [`TokenDecoder`] first probes whether it applies to an input. The
//! chain invokes the first applicable decoder; an error or an empty result
//! moves on to the next one, and if nothing produces tokens the input itself
//! is the single result.

use log::debug;

use super::format::container;
use super::types::error::Result;
use super::types::models::Limits;

/// One step of a [`DecoderChain`].
pub trait TokenDecoder: Send + Sync {
    /// Short name used in logs.
    fn name(&self) -> &'static str;

    /// Cheap check whether this decoder applies to `input`.
    fn probe(&self, input: &str) -> bool;

    /// Splits `input` into token strings.
    fn decode(&self, input: &str) -> Result<Vec<String>>;
}

/// Unwraps header-byte containers.
#[derive(Debug, Default, Clone)]
pub struct ContainerDecoder {
    limits: Limits,
}

impl ContainerDecoder {
    pub fn new(limits: Limits) -> Self {
        Self { limits }
    }
}

impl TokenDecoder for ContainerDecoder {
    fn name(&self) -> &'static str {
        "container"
    }

    fn probe(&self, input: &str) -> bool {
        container::is_container(input)
    }

    fn decode(&self, input: &str) -> Result<Vec<String>> {
        Ok(container::unwrap(input, &self.limits)?)
    }
}

/// Treats the input as one standalone token.
#[derive(Debug, Default, Clone, Copy)]
pub struct RawTokenDecoder;

impl TokenDecoder for RawTokenDecoder {
    fn name(&self) -> &'static str {
        "raw"
    }

    // Anything with a container header is left to the container decoder.
    fn probe(&self, input: &str) -> bool {
        !container::is_container(input)
    }

    fn decode(&self, input: &str) -> Result<Vec<String>> {
        if input.is_empty() {
            return Ok(Vec::new());
        }
        Ok(vec![input.to_owned()])
    }
}

/// A fixed-order list of decoders tried in sequence.
pub struct DecoderChain {
    decoders: Vec<Box<dyn TokenDecoder>>,
}

impl DecoderChain {
    pub fn new(decoders: Vec<Box<dyn TokenDecoder>>) -> Self {
        Self { decoders }
    }

    /// Container decoder first, then the raw passthrough.
    pub fn standard() -> Self {
        Self::with_limits(Limits::default())
    }

    pub fn with_limits(limits: Limits) -> Self {
        Self::new(vec![
            Box::new(ContainerDecoder::new(limits)),
            Box::new(RawTokenDecoder),
        ])
    }

    /// Returns the tokens carried by `input`. Never fails.
    pub fn decode(&self, input: &str) -> Vec<String> {
        for decoder in &self.decoders {
            if !decoder.probe(input) {
                continue;
            }
            match decoder.decode(input) {
                Ok(tokens) if !tokens.is_empty() => return tokens,
                Ok(_) => debug!("Decoder '{}' produced no tokens", decoder.name()),
                Err(e) => debug!("Decoder '{}' failed, trying next: {}", decoder.name(), e),
            }
        }
        vec![input.to_owned()]
    }
}

impl Default for DecoderChain {
    fn default() -> Self {
        Self::standard()
    }
}
