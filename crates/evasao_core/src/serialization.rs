//! Canonical artifact encoding
//!
//! Both artifacts are hashed byte-for-byte, so they are written with object
//! keys in lexicographic order and a fixed two-space layout. Arrays keep
//! their order; tree node lists and encoder categories depend on it.

use serde::Serialize;
use serde_json::{Map, Value};

/// Rebuild `value` with every nested object's keys in sorted order.
fn sort_keys(value: Value) -> Value {
    match value {
        Value::Object(map) => {
            let mut keys: Vec<_> = map.into_iter().collect();
            keys.sort_unstable_by(|(a, _), (b, _)| a.cmp(b));
            Value::Object(
                keys.into_iter()
                    .map(|(k, v)| (k, sort_keys(v)))
                    .collect::<Map<String, Value>>(),
            )
        }
        Value::Array(items) => Value::Array(items.into_iter().map(sort_keys).collect()),
        scalar => scalar,
    }
}

/// Canonical JSON text of `value`
pub fn canonical_json_string<T: Serialize>(value: &T) -> Result<String, serde_json::Error> {
    let sorted = sort_keys(serde_json::to_value(value)?);
    serde_json::to_string_pretty(&sorted)
}

/// BLAKE3 digest of raw bytes as lowercase hex
pub fn hash_hex(bytes: &[u8]) -> String {
    hex::encode(blake3::hash(bytes).as_bytes())
}
