//! The decoded value tree.
//!
//! A [`Value`] is produced once by the structured decoder and treated as
//! read-only afterwards; the service shares it behind an `Arc`.

use serde_json::json;

use crate::ucan::codec::cbor::parse_cid;
use crate::ucan::codec::encoding::bytes_to_base64;

/// A content-address link read from CBOR tag 42.
///
/// Keeps the raw identifier bytes as they appeared in the token. `cid` is the
/// canonical printable form when the bytes parse as a CID.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Link {
    bytes: Vec<u8>,
    cid: Option<String>,
}

impl Link {
    /// Builds a link from tag-42 payload bytes, rendering the CID when they parse as one.
    pub fn from_bytes(bytes: Vec<u8>) -> Self {
        let cid = parse_cid(&bytes);
        Self { bytes, cid }
    }

    /// The identifier bytes, including any multibase prefix byte.
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// The canonical CID string, e.g. `bafyrei...`.
    pub fn cid(&self) -> Option<&str> {
        self.cid.as_deref()
    }
}

/// A node of a decoded DAG-CBOR document.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// Text-keyed map in wire order.
    Map(Vec<(String, Value)>),
    Array(Vec<Value>),
    Text(String),
    Bytes(Vec<u8>),
    Integer(i128),
    Float(f64),
    Bool(bool),
    Null,
    Link(Link),
    /// Tag 258 content with duplicates removed.
    Set(Vec<Value>),
}

impl Value {
    pub fn kind(&self) -> &'static str {
        match self {
            Value::Map(_) => "map",
            Value::Array(_) => "array",
            Value::Text(_) => "text",
            Value::Bytes(_) => "bytes",
            Value::Integer(_) => "integer",
            Value::Float(_) => "float",
            Value::Bool(_) => "bool",
            Value::Null => "null",
            Value::Link(_) => "link",
            Value::Set(_) => "set",
        }
    }

    pub fn as_map(&self) -> Option<&[(String, Value)]> {
        match self {
            Value::Map(entries) => Some(entries),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&[Value]> {
        match self {
            Value::Array(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Value::Text(text) => Some(text),
            _ => None,
        }
    }

    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Value::Bytes(bytes) => Some(bytes),
            _ => None,
        }
    }

    pub fn as_link(&self) -> Option<&Link> {
        match self {
            Value::Link(link) => Some(link),
            _ => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn is_number(&self) -> bool {
        matches!(self, Value::Integer(_) | Value::Float(_))
    }

    /// Looks up a map entry by key. Returns `None` for non-maps.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.as_map()?
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v)
    }

    /// Renders the value as DAG-JSON-style JSON for display.
    ///
    /// Byte strings become `{"/": {"bytes": <base64>}}`, links `{"/": <cid>}`
    /// (or the bytes form when the link did not parse), sets become arrays.
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            Value::Map(entries) => serde_json::Value::Object(
                entries
                    .iter()
                    .map(|(k, v)| (k.clone(), v.to_json()))
                    .collect(),
            ),
            Value::Array(items) | Value::Set(items) => {
                serde_json::Value::Array(items.iter().map(Value::to_json).collect())
            }
            Value::Text(text) => json!(text),
            Value::Bytes(bytes) => json!({ "/": { "bytes": bytes_to_base64(bytes) } }),
            Value::Integer(n) => match i64::try_from(*n) {
                Ok(small) => json!(small),
                Err(_) => match u64::try_from(*n) {
                    Ok(large) => json!(large),
                    Err(_) => json!(n.to_string()),
                },
            },
            Value::Float(f) => json!(f),
            Value::Bool(b) => json!(b),
            Value::Null => serde_json::Value::Null,
            Value::Link(link) => match link.cid() {
                Some(cid) => json!({ "/": cid }),
                None => json!({ "/": { "bytes": bytes_to_base64(link.bytes()) } }),
            },
        }
    }
}
