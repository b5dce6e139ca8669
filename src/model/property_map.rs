//! AttributeMap: the open key-value bag on assets.

use std::collections::BTreeMap;
use super::Value;

/// A map of attribute names to values. Ordered so serialized output is stable.
pub type AttributeMap = BTreeMap<String, Value>;

/// Build an AttributeMap from (key, value) pairs.
pub fn attributes<K, V>(pairs: impl IntoIterator<Item = (K, V)>) -> AttributeMap
where
    K: Into<String>,
    V: Into<Value>,
{
    pairs.into_iter().map(|(k, v)| (k.into(), v.into())).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_attributes_sorted_by_key() {
        let map = attributes([("venue", Value::from("NYSE")), ("lot", Value::from(100i64))]);
        let keys: Vec<&str> = map.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["lot", "venue"]);
    }
}
