use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeMap;

/// Rebuild every object with its keys in byte order.
///
/// `serde_json::Map` keeps insertion order as soon as any crate in the
/// graph enables `preserve_order`, so the order is forced here.
fn sort_keys(value: Value) -> Value {
    match value {
        Value::Object(map) => {
            let sorted: BTreeMap<String, Value> =
                map.into_iter().map(|(k, v)| (k, sort_keys(v))).collect();
            Value::Object(sorted.into_iter().collect())
        }
        Value::Array(items) => Value::Array(items.into_iter().map(sort_keys).collect()),
        other => other,
    }
}

/// Serialize a value to compact JSON bytes with sorted keys.
///
/// Two equal values always produce the same bytes, which is what signatures
/// over a transaction body are computed on.
pub fn canonical_bytes<T: Serialize>(value: &T) -> Result<Vec<u8>, serde_json::Error> {
    serde_json::to_vec(&sort_keys(serde_json::to_value(value)?))
}
