//! The decoding service: normalization, structured decoding and caching.

use std::sync::Arc;

use log::{debug, trace};

use super::cache::DecodeCache;
use super::classify;
use super::codec::cbor;
use super::codec::encoding::{self, Normalized};
use super::types::error::{Result, UcanError};
use super::types::models::{Limits, TokenFormat, TokenInput, TokenTypeInfo};
use super::types::value::Value;

/// A decoded value with details about how it was recovered.
#[derive(Debug, Clone)]
pub struct DecodeResult {
    pub value: Arc<Value>,
    pub format: TokenFormat,
    /// Length of the normalized byte form.
    pub size: usize,
}

/// Outcome of [`UcanDecoder::safe_decode`], which never fails.
#[derive(Debug, Clone)]
pub enum SafeDecode {
    Success(Arc<Value>),
    Failure {
        error: String,
        format: Option<TokenFormat>,
    },
}

impl SafeDecode {
    pub fn is_success(&self) -> bool {
        matches!(self, SafeDecode::Success(_))
    }
}

/// Decodes tokens into [`Value`] trees and classifies them.
///
/// Owns its [`DecodeCache`]; the cache lives exactly as long as the decoder.
/// Safe to share between threads.
#[derive(Debug, Default)]
pub struct UcanDecoder {
    cache: DecodeCache,
    limits: Limits,
}

impl UcanDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a decoder that enforces custom decoding limits.
    pub fn with_limits(limits: Limits) -> Self {
        Self {
            cache: DecodeCache::new(),
            limits,
        }
    }

    pub fn limits(&self) -> &Limits {
        &self.limits
    }

    /// Decodes a token, consulting and filling the cache.
    ///
    /// # Errors
    /// Returns [`UcanError::StructuredDecode`] carrying the detected input
    /// format if the normalized bytes are not valid structured binary.
    pub fn decode<'a>(&self, token: impl Into<TokenInput<'a>>) -> Result<Arc<Value>> {
        self.decode_with(token, true)
    }

    /// Decodes a token; `use_cache = false` bypasses the cache entirely.
    ///
    /// Cache hits return the very same `Arc` as the first decode.
    pub fn decode_with<'a>(&self, token: impl Into<TokenInput<'a>>, use_cache: bool) -> Result<Arc<Value>> {
        let input = token.into();
        if use_cache {
            if let Some(hit) = self.cache.get(&DecodeCache::key_for(&input)) {
                trace!("Decode cache hit");
                return Ok(hit);
            }
        }

        let normalized = encoding::normalize(input, &self.limits);
        self.decode_normalized(&input, &normalized, use_cache)
    }

    /// Like [`decode_with`](Self::decode_with) but also reports the detected
    /// format and the normalized size.
    pub fn decode_with_meta<'a>(&self, token: impl Into<TokenInput<'a>>, use_cache: bool) -> Result<DecodeResult> {
        let input = token.into();
        let normalized = encoding::normalize(input, &self.limits);

        let cached = if use_cache {
            self.cache.get(&DecodeCache::key_for(&input))
        } else {
            None
        };
        let value = match cached {
            Some(hit) => hit,
            None => self.decode_normalized(&input, &normalized, use_cache)?,
        };

        Ok(DecodeResult {
            value,
            format: normalized.format,
            size: normalized.bytes.len(),
        })
    }

    /// Decodes without ever failing: errors become [`SafeDecode::Failure`].
    pub fn safe_decode<'a>(&self, token: impl Into<TokenInput<'a>>, use_cache: bool) -> SafeDecode {
        match self.decode_with(token, use_cache) {
            Ok(value) => SafeDecode::Success(value),
            Err(e) => SafeDecode::Failure {
                format: e.detected_format(),
                error: e.to_string(),
            },
        }
    }

    /// Classifies a token as delegation, invocation or unknown.
    ///
    /// Falls back to a textual type-tag search when the token cannot be decoded.
    pub fn classify<'a>(&self, token: impl Into<TokenInput<'a>>) -> TokenTypeInfo {
        self.classify_with(token, true)
    }

    /// Like [`classify`](Self::classify); `use_cache = false` bypasses the cache.
    pub fn classify_with<'a>(&self, token: impl Into<TokenInput<'a>>, use_cache: bool) -> TokenTypeInfo {
        let input = token.into();
        match self.decode_with(input, use_cache) {
            Ok(value) => classify::classify_value(&value),
            Err(e) => {
                debug!("Structured decode failed, searching token text instead: {}", e);
                match input {
                    TokenInput::Text(text) => classify::classify_text(text),
                    TokenInput::Bytes(bytes) => {
                        classify::extract_type_from_tag(&encoding::bytes_to_latin1(bytes))
                    }
                }
            }
        }
    }

    /// Classifies a batch of tokens, one result per token.
    pub fn classify_all<'a, I>(&self, tokens: I) -> Vec<TokenTypeInfo>
    where
        I: IntoIterator,
        I::Item: Into<TokenInput<'a>>,
    {
        tokens.into_iter().map(|token| self.classify(token)).collect()
    }

    pub fn clear_cache(&self) {
        self.cache.clear();
    }

    pub fn cache_len(&self) -> usize {
        self.cache.len()
    }

    fn decode_normalized(
        &self,
        input: &TokenInput<'_>,
        normalized: &Normalized<'_>,
        use_cache: bool,
    ) -> Result<Arc<Value>> {
        let value = cbor::decode_with_limits(&normalized.bytes, &self.limits).map_err(|source| {
            UcanError::StructuredDecode {
                format: normalized.format,
                source,
            }
        })?;
        let value = Arc::new(value);

        if use_cache {
            return Ok(self.cache.insert(DecodeCache::key_for(input).into_owned(), value));
        }
        Ok(value)
    }
}
