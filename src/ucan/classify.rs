//! Payload classification.
//!
//! A decoded token is classified in three steps:
//! 1. Envelope shape: `[signature bytes, {"h": bytes, <type tag>: payload, ...}]`
//! 2. Type tag discovery: the first key shaped like `ucan/dlg@<version>` or
//!    `ucan/inv@<version>` in wire order
//! 3. Shape validation of the payload stored under that key
//!
//! A tag without a valid payload classifies as unknown. When a token cannot
//! be decoded at all, [`classify_text`] searches its text for a type tag
//! instead, without any shape validation.

use std::sync::OnceLock;

use log::{debug, trace};
use regex::Regex;

use crate::ucan::codec::encoding::{base64_to_bytes, bytes_to_latin1};
use crate::ucan::types::models::{TokenType, TokenTypeInfo};
use crate::ucan::types::value::Value;

/// Envelope key holding the varsig header bytes.
pub const HEADER_KEY: &str = "h";

const TAG_PATTERN: &str = r"(?i:ucan/(dlg|inv))@([0-9A-Za-z.\-]+)";

static TYPE_TAG_KEY: OnceLock<Regex> = OnceLock::new();
static TYPE_TAG_TEXT: OnceLock<Regex> = OnceLock::new();
static STANDARD_BASE64: OnceLock<Regex> = OnceLock::new();

/// Matches a whole map key.
fn type_tag_key_regex() -> &'static Regex {
    TYPE_TAG_KEY.get_or_init(|| {
        Regex::new(&format!("^{}$", TAG_PATTERN)).expect("Invalid type tag key pattern")
    })
}

/// Matches a type tag anywhere in a text.
fn type_tag_text_regex() -> &'static Regex {
    TYPE_TAG_TEXT.get_or_init(|| Regex::new(TAG_PATTERN).expect("Invalid type tag pattern"))
}

fn standard_base64_regex() -> &'static Regex {
    STANDARD_BASE64
        .get_or_init(|| Regex::new(r"^[A-Za-z0-9+/]+={0,2}$").expect("Invalid base64 pattern"))
}

/// A type tag key split into its parts, borrowing from the key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TypeTag<'a> {
    pub key: &'a str,
    pub token_type: TokenType,
    pub version: &'a str,
}

impl TypeTag<'_> {
    pub fn info(&self) -> TokenTypeInfo {
        TokenTypeInfo::new(self.token_type, self.version)
    }
}

/// Parses a map key of the exact form `ucan/{dlg|inv}@{version}`.
pub fn parse_type_tag(key: &str) -> Option<TypeTag<'_>> {
    let caps = type_tag_key_regex().captures(key)?;
    let abbrev = caps.get(1)?.as_str();
    let version = caps.get(2)?.as_str();
    Some(TypeTag {
        key,
        token_type: TokenType::from_abbrev(abbrev),
        version,
    })
}

/// Finds the first type tag anywhere in `text` and maps it to `{type, version}`.
pub fn extract_type_from_tag(text: &str) -> TokenTypeInfo {
    type_tag_text_regex()
        .captures(text)
        .map(|caps| TokenTypeInfo::new(TokenType::from_abbrev(&caps[1]), &caps[2]))
        .unwrap_or_else(TokenTypeInfo::unknown)
}

/// Returns the payload map of a `[signature, payload]` envelope.
fn envelope_map(value: &Value) -> Option<&[(String, Value)]> {
    let items = value.as_array()?;
    if items.len() != 2 || items[0].as_bytes().is_none() {
        return None;
    }
    let payload = &items[1];
    payload.get(HEADER_KEY)?.as_bytes()?;
    payload.as_map()
}

/// Whether the value has the `[signature bytes, {"h": bytes, ...}]` envelope shape.
pub fn is_envelope(value: &Value) -> bool {
    envelope_map(value).is_some()
}

/// Returns the first type tag in map order together with the value stored under it.
///
/// Later tags are ignored even if the first one carries an invalid payload.
pub fn find_type_tag(entries: &[(String, Value)]) -> Option<(TypeTag<'_>, &Value)> {
    entries
        .iter()
        .find_map(|(key, value)| parse_type_tag(key).map(|tag| (tag, value)))
}

/// Extracts the validated type tag and payload from a decoded envelope.
pub fn payload_from_envelope(value: &Value) -> Option<(TypeTag<'_>, &Value)> {
    let (tag, payload) = find_type_tag(envelope_map(value)?)?;
    let valid = match tag.token_type {
        TokenType::Delegation => is_delegation_payload(payload),
        TokenType::Invocation => is_invocation_payload(payload),
        TokenType::Unknown => false,
    };
    if !valid {
        debug!("Type tag {} present but payload shape does not match", tag.key);
        return None;
    }
    Some((tag, payload))
}

/// Classifies a decoded token. Never fails; anything unrecognized is unknown.
pub fn classify_value(value: &Value) -> TokenTypeInfo {
    if !is_envelope(value) {
        trace!("Value is not a [signature, payload] envelope");
        return TokenTypeInfo::unknown();
    }
    match payload_from_envelope(value) {
        Some((tag, _)) => tag.info(),
        None => TokenTypeInfo::unknown(),
    }
}

/// Degraded classification for tokens that could not be decoded.
///
/// Searches the token text for a type tag, then, if the token looks like
/// standard base64, the decoded bytes read as per-byte text.
pub fn classify_text(token: &str) -> TokenTypeInfo {
    let direct = extract_type_from_tag(token);
    if !direct.is_unknown() {
        return direct;
    }

    if standard_base64_regex().is_match(token) {
        if let Some(bytes) = base64_to_bytes(token) {
            return extract_type_from_tag(&bytes_to_latin1(&bytes));
        }
    }

    TokenTypeInfo::unknown()
}

/// Checks the field set of a delegation payload.
///
/// Required: `iss`, `aud`, `cmd` (text), `sub` (text or null), `nonce`
/// (bytes), `exp` (number or null), `pol` (any). Optional: `nbf` (number),
/// `meta` (map).
pub fn is_delegation_payload(payload: &Value) -> bool {
    payload.as_map().is_some()
        && has_text(payload, "iss")
        && has_text(payload, "aud")
        && matches!(payload.get("sub"), Some(v) if v.as_text().is_some() || v.is_null())
        && has_text(payload, "cmd")
        && has_bytes(payload, "nonce")
        && has_number_or_null(payload, "exp")
        && payload.get("pol").is_some()
        && optional(payload, "nbf", Value::is_number)
        && optional(payload, "meta", |v| v.as_map().is_some())
}

/// Checks the field set of an invocation payload.
///
/// Required: `iss`, `sub`, `cmd` (text), `args` (map), `prf` (array of
/// links), `nonce` (bytes), `exp` (number or null). Optional: `aud` (text),
/// `iat` and `nbf` (number), `cause` (link), `meta` (map).
pub fn is_invocation_payload(payload: &Value) -> bool {
    payload.as_map().is_some()
        && has_text(payload, "iss")
        && has_text(payload, "sub")
        && has_text(payload, "cmd")
        && matches!(payload.get("args"), Some(v) if v.as_map().is_some())
        && matches!(payload.get("prf"), Some(Value::Array(proofs)) if proofs.iter().all(is_link_like))
        && has_bytes(payload, "nonce")
        && has_number_or_null(payload, "exp")
        && optional(payload, "aud", |v| v.as_text().is_some())
        && optional(payload, "iat", Value::is_number)
        && optional(payload, "nbf", Value::is_number)
        && optional(payload, "cause", is_link_like)
        && optional(payload, "meta", |v| v.as_map().is_some())
}

/// A tag-42 link, or its DAG-JSON form `{"/": <text or bytes>}`.
pub fn is_link_like(value: &Value) -> bool {
    match value {
        Value::Link(_) => true,
        Value::Map(entries) => {
            entries.len() == 1
                && entries[0].0 == "/"
                && matches!(entries[0].1, Value::Text(_) | Value::Bytes(_))
        }
        _ => false,
    }
}

fn has_text(payload: &Value, key: &str) -> bool {
    payload.get(key).and_then(Value::as_text).is_some()
}

fn has_bytes(payload: &Value, key: &str) -> bool {
    payload.get(key).and_then(Value::as_bytes).is_some()
}

fn has_number_or_null(payload: &Value, key: &str) -> bool {
    matches!(payload.get(key), Some(v) if v.is_number() || v.is_null())
}

fn optional(payload: &Value, key: &str, check: impl Fn(&Value) -> bool) -> bool {
    payload.get(key).map_or(true, check)
}
