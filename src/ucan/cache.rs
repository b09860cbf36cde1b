//! Memoization of structured decode results.

use std::borrow::Cow;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::ucan::codec::encoding::bytes_to_base64;
use crate::ucan::types::models::TokenInput;
use crate::ucan::types::value::Value;

/// Maps a canonical token key to its decoded value.
///
/// Entries are never mutated after insertion and are only removed by
/// [`clear`](Self::clear). Hits hand out the same `Arc`, so callers can rely
/// on pointer identity.
#[derive(Debug, Default)]
pub struct DecodeCache {
    entries: Mutex<HashMap<String, Arc<Value>>>,
}

impl DecodeCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Canonical key of an input: the string itself, or standard base64 of bytes.
    pub fn key_for<'a>(input: &TokenInput<'a>) -> Cow<'a, str> {
        match *input {
            TokenInput::Text(text) => Cow::Borrowed(text),
            TokenInput::Bytes(bytes) => Cow::Owned(bytes_to_base64(bytes)),
        }
    }

    pub fn get(&self, key: &str) -> Option<Arc<Value>> {
        self.lock().get(key).cloned()
    }

    /// Stores a value unless the key is already present, returning the cached instance.
    pub fn insert(&self, key: String, value: Arc<Value>) -> Arc<Value> {
        self.lock().entry(key).or_insert(value).clone()
    }

    pub fn clear(&self) {
        self.lock().clear();
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    // Entries are immutable, so a panic elsewhere cannot leave the map half-updated.
    fn lock(&self) -> MutexGuard<'_, HashMap<String, Arc<Value>>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
