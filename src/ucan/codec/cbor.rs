//! DAG-CBOR decoding into [`Value`] trees, and the matching encoder.
//!
//! Besides the plain CBOR data model two IPLD tags are understood:
//! - Tag 42: content-address link. The payload byte string is rendered as a
//!   CID string when possible and kept as raw bytes otherwise. Any other
//!   payload is kept as `{"/": <payload>}`; this tag never fails on its own.
//! - Tag 258: set. The payload array is deduplicated by value equality, with
//!   all NaNs counted as one value.
//!
//! Exactly one item must span the whole input. Indefinite-length items,
//! other tags, non-text map keys and anything beyond [`Limits`] are rejected.

use std::collections::HashMap;

use cid::Cid;
use log::trace;
use minicbor::data::{Int, Tag, Type};
use minicbor::{Decoder, Encoder};

use crate::ucan::types::error::{DecodeError, EncodeError};
use crate::ucan::types::models::Limits;
use crate::ucan::types::value::{Link, Value};

/// CBOR tag for IPLD links (CIDs).
pub const TAG_LINK: u64 = 42;
/// CBOR tag for finite sets.
pub const TAG_SET: u64 = 258;

/// DAG-CBOR prefixes link bytes with the multibase "identity" code.
const MULTIBASE_IDENTITY: u8 = 0x00;

/// Decodes one CBOR item using the default [`Limits`].
pub fn decode(bytes: &[u8]) -> Result<Value, DecodeError> {
    decode_with_limits(bytes, &Limits::default())
}

/// Decodes one CBOR item spanning all of `bytes`.
///
/// # Errors
/// Returns an error on truncated input, bad length prefixes, unsupported tags
/// or types, trailing bytes, or when a limit is exceeded.
pub fn decode_with_limits(bytes: &[u8], limits: &Limits) -> Result<Value, DecodeError> {
    let mut dec = Decoder::new(bytes);
    let value = decode_value(&mut dec, limits, 0)?;

    let trailing = bytes.len().saturating_sub(dec.position());
    if trailing > 0 {
        return Err(DecodeError::TrailingBytes(trailing));
    }

    trace!("Decoded {} CBOR bytes into a {}", bytes.len(), value.kind());
    Ok(value)
}

fn decode_value(dec: &mut Decoder<'_>, limits: &Limits, depth: usize) -> Result<Value, DecodeError> {
    if depth > limits.max_depth {
        return Err(DecodeError::DecodeLimit("max_depth"));
    }

    match dec.datatype()? {
        Type::Bool => Ok(Value::Bool(dec.bool()?)),
        Type::Null => {
            dec.null()?;
            Ok(Value::Null)
        }
        Type::Undefined => {
            dec.undefined()?;
            Ok(Value::Null)
        }
        Type::U8
        | Type::U16
        | Type::U32
        | Type::U64
        | Type::I8
        | Type::I16
        | Type::I32
        | Type::I64
        | Type::Int => Ok(Value::Integer(i128::from(dec.int()?))),
        Type::F16 => Ok(Value::Float(f64::from(dec.f16()?))),
        Type::F32 => Ok(Value::Float(f64::from(dec.f32()?))),
        Type::F64 => Ok(Value::Float(dec.f64()?)),
        Type::Bytes => Ok(Value::Bytes(dec.bytes()?.to_vec())),
        Type::String => Ok(Value::Text(dec.str()?.to_owned())),
        Type::Array => Ok(Value::Array(decode_array(dec, limits, depth)?)),
        Type::Map => decode_map(dec, limits, depth),
        Type::Tag => decode_tagged(dec, limits, depth),
        Type::BytesIndef | Type::StringIndef | Type::ArrayIndef | Type::MapIndef | Type::Break => {
            Err(DecodeError::IndefiniteLength)
        }
        other => Err(DecodeError::UnsupportedType(other.to_string())),
    }
}

fn decode_array(dec: &mut Decoder<'_>, limits: &Limits, depth: usize) -> Result<Vec<Value>, DecodeError> {
    let len = declared_len(dec.array()?, limits)?;
    let mut items = Vec::with_capacity(bounded_capacity(len, dec));
    for _ in 0..len {
        items.push(decode_value(dec, limits, depth + 1)?);
    }
    Ok(items)
}

fn decode_map(dec: &mut Decoder<'_>, limits: &Limits, depth: usize) -> Result<Value, DecodeError> {
    let len = declared_len(dec.map()?, limits)?;
    let mut entries: Vec<(String, Value)> = Vec::with_capacity(bounded_capacity(len, dec));
    let mut positions: HashMap<String, usize> = HashMap::new();

    for _ in 0..len {
        let key_offset = dec.position();
        if !matches!(dec.datatype()?, Type::String) {
            return Err(DecodeError::NonTextKey(key_offset));
        }
        let key = dec.str()?.to_owned();
        let value = decode_value(dec, limits, depth + 1)?;

        // A repeated key keeps its first position and takes the last value.
        match positions.get(&key) {
            Some(&index) => entries[index].1 = value,
            None => {
                positions.insert(key.clone(), entries.len());
                entries.push((key, value));
            }
        }
    }

    Ok(Value::Map(entries))
}

fn decode_tagged(dec: &mut Decoder<'_>, limits: &Limits, depth: usize) -> Result<Value, DecodeError> {
    let tag = dec.tag()?.as_u64();
    match tag {
        TAG_LINK => {
            if matches!(dec.datatype()?, Type::Bytes) {
                return Ok(Value::Link(Link::from_bytes(dec.bytes()?.to_vec())));
            }
            // Not a byte string: keep the content unparsed in DAG-JSON link form.
            let content = decode_value(dec, limits, depth + 1)?;
            trace!("Link tag over a {}, keeping it unparsed", content.kind());
            Ok(Value::Map(vec![("/".to_owned(), content)]))
        }
        TAG_SET => {
            if !matches!(dec.datatype()?, Type::Array) {
                return Err(DecodeError::InvalidTagContent {
                    tag,
                    expected: "array",
                });
            }
            let items = decode_array(dec, limits, depth + 1)?;
            Ok(Value::Set(dedup(items)))
        }
        other => Err(DecodeError::UnsupportedTag(other)),
    }
}

/// Renders link bytes as a canonical CID string, or `None` if they do not parse.
pub fn parse_cid(bytes: &[u8]) -> Option<String> {
    let body = bytes.strip_prefix(&[MULTIBASE_IDENTITY]).unwrap_or(bytes);
    match Cid::try_from(body) {
        Ok(cid) => Some(cid.to_string()),
        Err(e) => {
            trace!("Link bytes are not a CID, keeping raw bytes: {}", e);
            None
        }
    }
}

fn dedup(items: Vec<Value>) -> Vec<Value> {
    let mut unique: Vec<Value> = Vec::with_capacity(items.len());
    for item in items {
        if !unique.iter().any(|seen| same_value(seen, &item)) {
            unique.push(item);
        }
    }
    unique
}

/// Value equality where every NaN equals every other NaN.
fn same_value(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Float(x), Value::Float(y)) => x == y || (x.is_nan() && y.is_nan()),
        (Value::Array(xs), Value::Array(ys)) | (Value::Set(xs), Value::Set(ys)) => {
            xs.len() == ys.len() && xs.iter().zip(ys).all(|(x, y)| same_value(x, y))
        }
        (Value::Map(xs), Value::Map(ys)) => {
            xs.len() == ys.len()
                && xs
                    .iter()
                    .zip(ys)
                    .all(|((kx, x), (ky, y))| kx == ky && same_value(x, y))
        }
        _ => a == b,
    }
}

fn declared_len(len: Option<u64>, limits: &Limits) -> Result<u64, DecodeError> {
    let len = len.ok_or(DecodeError::IndefiniteLength)?;
    if len > limits.max_collection_len {
        return Err(DecodeError::DecodeLimit("max_collection_len"));
    }
    Ok(len)
}

/// Every element takes at least one byte, so never reserve more than what is left.
fn bounded_capacity(len: u64, dec: &Decoder<'_>) -> usize {
    let remaining = dec.input().len().saturating_sub(dec.position());
    usize::try_from(len).unwrap_or(usize::MAX).min(remaining)
}

/// Serializes a value to CBOR. Links are written as tag 42, sets as tag 258.
///
/// Map entries are written in their stored order.
pub fn encode(value: &Value) -> Result<Vec<u8>, EncodeError> {
    let mut buf = Vec::new();
    let mut enc = Encoder::new(&mut buf);
    encode_value(&mut enc, value)?;
    Ok(buf)
}

fn encode_value(enc: &mut Encoder<&mut Vec<u8>>, value: &Value) -> Result<(), EncodeError> {
    match value {
        Value::Map(entries) => {
            enc.map(entries.len() as u64)?;
            for (key, item) in entries {
                enc.str(key)?;
                encode_value(enc, item)?;
            }
        }
        Value::Array(items) => encode_items(enc, items)?,
        Value::Text(text) => {
            enc.str(text)?;
        }
        Value::Bytes(bytes) => {
            enc.bytes(bytes)?;
        }
        Value::Integer(n) => {
            let int = Int::try_from(*n).map_err(|_| EncodeError::IntegerOutOfRange(*n))?;
            enc.int(int)?;
        }
        Value::Float(f) => {
            enc.f64(*f)?;
        }
        Value::Bool(b) => {
            enc.bool(*b)?;
        }
        Value::Null => {
            enc.null()?;
        }
        Value::Link(link) => {
            enc.tag(Tag::new(TAG_LINK))?.bytes(link.bytes())?;
        }
        Value::Set(items) => {
            enc.tag(Tag::new(TAG_SET))?;
            encode_items(enc, items)?;
        }
    }
    Ok(())
}

fn encode_items(enc: &mut Encoder<&mut Vec<u8>>, items: &[Value]) -> Result<(), EncodeError> {
    enc.array(items.len() as u64)?;
    for item in items {
        encode_value(enc, item)?;
    }
    Ok(())
}
