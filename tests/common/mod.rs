//! Shared fixtures for the integration tests.
#![allow(dead_code)]

use ucan_inspector::ucan::codec::cbor;
use ucan_inspector::{Link, Value};

/// A real delegation: `[sig, {"h": ..., "ucan/dlg@1.0.0-rc.1": {...}}]`, standard base64.
pub const DELEGATION_TOKEN: &str = "glhAl+su1rDv0DwO2TDa4Rd7rY2gV5dT1UPSYpYFXps0GuG2ofyOlsE1fX9Oa9lEtSRWoRYOUNEtw8KsDEuPSKOAB6JhaEg0Ae0B7QETcXN1Y2FuL2RsZ0AxLjAuMC1yYy4xqWNhdWR4OGRpZDprZXk6ejZNa2ZzN0JlcUV4dnIzVmhINko5eUQzY1NQeWY1VWcxRk5lbzVaV04xYk5HTG5RY2NtZGsvZGVidWcvZWNob2NleHAaaUwlLGNpc3N4OGRpZDprZXk6ejZNa3dDb2l5SDJZSnkzNlNuSkpFc0cyalpzeGduVmpaWjdUeFhVTXhYNDhuYTh2Y25iZhppTCKYY3BvbIBjc3VieDhkaWQ6a2V5Ono2TWtmczdCZXFFeHZyM1ZoSDZKOXlEM2NTUHlmNVVnMUZOZW81WldOMWJOR0xuUWRtZXRhoWRub3RleDNNb2NrIGRlbGVnYXRpb24gZ2VuZXJhdGVkIGxvY2FsbHkgYnkgVUNBTiBJbnNwZWN0b3Jlbm9uY2VMAB+tTd0GE06W7VSy";

/// A real invocation whose `prf` holds one tag-42 link.
pub const INVOCATION_TOKEN: &str = "glhAP52kjaBWs/tYnylDmmxc/8xPf5Oc/23+syoM9s/nFQx7wEZtmsJgwG3O8val9HXWLgIHL2cx7qTpzvic6aAiBaJhaEg0Ae0B7QETcXN1Y2FuL2ludkAxLjAuMC1yYy4xqmNhdWR4OGRpZDprZXk6ejZNa3JDYnJCQkdZdGhxQmhRdk5ieVhaMlU2d3RXeVJXdXJ2bTh4Q1czQXh2TUFwY2NtZGsvZGVidWcvZWNob2NleHAaaUwk72Npc3N4OGRpZDprZXk6ejZNa3RjUGNRbm5MQnhCY3g5d21LSEY5SkVicFRiZFRFQkdzMndRYXFtRnVUZ0ZrY25iZhppTCOlY3ByZoHYKlglAAFxEiBwVHJmFIXtrlRUv1HYlHSzBojvlEJx4GW6w+05xYf11GNzdWJ4OGRpZDprZXk6ejZNa3RjUGNRbm5MQnhCY3g5d21LSEY5SkVicFRiZFRFQkdzMndRYXFtRnVUZ0ZrZGFyZ3OiZ21lc3NhZ2V4GUhlbGxvIGZyb20gVUNBTiBJbnNwZWN0b3JpcmVxdWVzdElkam1vY2stZGVidWdkbWV0YaFndHJhY2VJZG9tb2NrLWludm9jYXRpb25lbm9uY2VQAQIDBAUGBwgJCgsMDQ4PEA==";

/// The CID referenced by the invocation's single proof.
pub const INVOCATION_PROOF_CID: &str = "bafyreidqkrzgmfef5wxfivf7khmji5fta2eo7fccohqglowd5u44lb7v2q";

pub const ISSUER: &str = "did:key:z6MkwCoiyH2YJy36SnJJEsG2jZsxgnVjZZ7TxXUMxX48na8v";
pub const AUDIENCE: &str = "did:key:z6Mkfs7BeqExvr3VhH6J9yD3cSPyf5Ug1FNeo5ZWN1bNGLnQ";

pub fn text(s: &str) -> Value {
    Value::Text(s.to_string())
}

pub fn map(entries: &[(&str, Value)]) -> Value {
    Value::Map(
        entries
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect(),
    )
}

/// Removes `key` from a map value.
pub fn without(value: &Value, key: &str) -> Value {
    match value {
        Value::Map(entries) => Value::Map(
            entries
                .iter()
                .filter(|(k, _)| k != key)
                .cloned()
                .collect(),
        ),
        other => other.clone(),
    }
}

/// Replaces (or appends) `key` in a map value.
pub fn with(value: &Value, key: &str, item: Value) -> Value {
    let mut entries = value.as_map().map(<[_]>::to_vec).unwrap_or_default();
    match entries.iter_mut().find(|(k, _)| k == key) {
        Some(slot) => slot.1 = item,
        None => entries.push((key.to_string(), item)),
    }
    Value::Map(entries)
}

pub fn proof_link() -> Value {
    let mut bytes = vec![0x00, 0x01, 0x71, 0x12, 0x20];
    bytes.extend((0u8..32).collect::<Vec<_>>());
    Value::Link(Link::from_bytes(bytes))
}

pub fn delegation_payload() -> Value {
    map(&[
        ("iss", text(ISSUER)),
        ("aud", text(AUDIENCE)),
        ("sub", text(AUDIENCE)),
        ("cmd", text("/debug/echo")),
        ("pol", Value::Array(Vec::new())),
        ("nonce", Value::Bytes(vec![7; 12])),
        ("exp", Value::Integer(1_765_549_356)),
        ("nbf", Value::Integer(1_765_548_696)),
        ("meta", map(&[("note", text("fixture"))])),
    ])
}

pub fn invocation_payload() -> Value {
    map(&[
        ("iss", text(ISSUER)),
        ("sub", text(ISSUER)),
        ("cmd", text("/debug/echo")),
        ("args", map(&[("message", text("hello"))])),
        ("prf", Value::Array(vec![proof_link()])),
        ("nonce", Value::Bytes((1u8..=16).collect())),
        ("exp", Value::Null),
    ])
}

/// Wraps a payload map as `[signature, {"h": header, <tag>: payload}]`.
pub fn envelope(tag: &str, payload: Value) -> Value {
    envelope_with_entries(vec![(tag.to_string(), payload)])
}

pub fn envelope_with_entries(mut entries: Vec<(String, Value)>) -> Value {
    entries.insert(0, ("h".to_string(), Value::Bytes(vec![0x34, 0x01, 0xed, 0x01, 0xed, 0x01, 0x13, 0x71])));
    Value::Array(vec![Value::Bytes(vec![0xAB; 64]), Value::Map(entries)])
}

pub fn encode(value: &Value) -> Vec<u8> {
    cbor::encode(value).expect("encode fixture")
}
