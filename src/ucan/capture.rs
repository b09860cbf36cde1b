//! Token extraction from observed HTTP requests.
//!
//! The request observer hands over header name/value pairs. Tokens are taken
//! from an `Authorization: Bearer <token>` header and from the comma-separated
//! `ucans` header, expanded through the [`DecoderChain`] and classified. Every
//! token produces a [`TokenItem`], recognized or not.

use log::{debug, info};
use serde::Serialize;

use super::chain::DecoderChain;
use super::decoder::UcanDecoder;
use super::types::models::{Limits, TokenTypeInfo};

pub const AUTHORIZATION_HEADER: &str = "authorization";
pub const UCANS_HEADER: &str = "ucans";
const BEARER_PREFIX: &str = "Bearer ";

/// One request as reported by the observer.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ObservedRequest {
    pub url: String,
    pub headers: Vec<(String, String)>,
    /// Observation time in milliseconds since the Unix epoch.
    pub observed_at: u64,
}

/// The header a token was taken from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SourceHeader {
    #[serde(rename = "Authorization")]
    Authorization,
    #[serde(rename = "ucans")]
    Ucans,
}

/// Whether a token came out of a container or stood alone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum WrapFormat {
    Container,
    Raw,
}

/// A captured token, ready for presentation or storage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenItem {
    pub token: String,
    pub url: String,
    pub header: SourceHeader,
    pub captured_at: u64,
    pub format: WrapFormat,
    pub token_type: TokenTypeInfo,
}

/// Extracts and classifies tokens from observed requests.
pub struct Capture {
    chain: DecoderChain,
    decoder: UcanDecoder,
    use_cache: bool,
}

impl Default for Capture {
    fn default() -> Self {
        Self::new(DecoderChain::default(), UcanDecoder::default())
    }
}

impl Capture {
    pub fn new(chain: DecoderChain, decoder: UcanDecoder) -> Self {
        Self {
            chain,
            decoder,
            use_cache: true,
        }
    }

    /// Enables or disables the decode cache for classification (enabled by default).
    pub fn with_cache(mut self, enabled: bool) -> Self {
        self.use_cache = enabled;
        self
    }

    /// Builds the standard chain and a decoder sharing the same limits.
    pub fn with_limits(limits: Limits) -> Self {
        Self::new(DecoderChain::with_limits(limits), UcanDecoder::with_limits(limits))
    }

    pub fn decoder(&self) -> &UcanDecoder {
        &self.decoder
    }

    /// Returns one item per token found in the request's headers, in header order.
    pub fn capture_from_request(&self, request: &ObservedRequest) -> Vec<TokenItem> {
        let mut items = Vec::new();

        for (name, value) in &request.headers {
            if name.eq_ignore_ascii_case(AUTHORIZATION_HEADER) {
                if let Some(token) = bearer_token(value) {
                    self.capture_token(token, SourceHeader::Authorization, request, &mut items);
                }
            } else if name.eq_ignore_ascii_case(UCANS_HEADER) {
                for token in parse_ucans_header(value) {
                    self.capture_token(token, SourceHeader::Ucans, request, &mut items);
                }
            }
        }

        if !items.is_empty() {
            info!("Captured {} tokens from {}", items.len(), request.url);
        }
        items
    }

    fn capture_token(
        &self,
        raw: &str,
        header: SourceHeader,
        request: &ObservedRequest,
        items: &mut Vec<TokenItem>,
    ) {
        for token in self.chain.decode(raw) {
            let format = if token != raw {
                WrapFormat::Container
            } else {
                WrapFormat::Raw
            };
            let token_type = self.decoder.classify_with(token.as_str(), self.use_cache);
            debug!("{:?} token from {:?}: {}", format, header, token_type.token_type);
            items.push(TokenItem {
                token,
                url: request.url.clone(),
                header,
                captured_at: request.observed_at,
                format,
                token_type,
            });
        }
    }
}

/// Returns the credential of a `Bearer <token>` header value.
pub fn bearer_token(value: &str) -> Option<&str> {
    value.strip_prefix(BEARER_PREFIX)
}

/// Splits a `ucans` header value on commas, trimming and dropping empty parts.
pub fn parse_ucans_header(value: &str) -> Vec<&str> {
    value
        .split(',')
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .collect()
}
