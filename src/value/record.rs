//! The flat record: one denormalized row of key-value data.
//!
//! Keys are stored lowercased so every lookup is case-insensitive. Nesting is encoded in the
//! keys themselves with underscores (`Orders_OrderDetails_Quantity`), and [`FlatRecord::nested`]
//! peels off one level at a time.

use std::collections::{BTreeMap, HashMap};

use crate::{Error, Result, Value};

/// A case-insensitive map from key to [`Value`].
///
/// # Examples
///
/// ```rust
/// use rowgraph::{FlatRecord, Value};
///
/// let record: FlatRecord = [
///     ("CustomerId", Value::from(1)),
///     ("Orders_OrderId", Value::from(10)),
///     ("Orders_OrderDetails_Quantity", Value::from(3)),
/// ]
/// .into_iter()
/// .collect();
///
/// assert_eq!(record.get("customerid"), Some(&Value::from(1)));
///
/// let orders = record.nested("Orders");
/// assert_eq!(orders.len(), 2);
/// assert_eq!(orders.get("OrderDetails_Quantity"), Some(&Value::from(3)));
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FlatRecord {
    entries: HashMap<String, Value>,
}

impl FlatRecord {
    /// Create an empty record
    #[must_use]
    pub fn new() -> Self {
        FlatRecord::default()
    }

    /// Insert a value, replacing any value stored under the same key ignoring case
    pub fn insert(&mut self, key: impl AsRef<str>, value: impl Into<Value>) -> Option<Value> {
        self.entries
            .insert(key.as_ref().to_lowercase(), value.into())
    }

    /// Look up a value ignoring key case
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Value> {
        if key.chars().any(char::is_uppercase) {
            self.entries.get(&key.to_lowercase())
        } else {
            self.entries.get(key)
        }
    }

    /// Returns true if the record holds `key`, ignoring case
    #[must_use]
    pub fn contains_key(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    /// The sub-record of all keys starting with `{prefix}_`, with that prefix stripped once.
    ///
    /// Keys equal to the prefix itself are not part of the sub-record.
    #[must_use]
    pub fn nested(&self, prefix: &str) -> FlatRecord {
        let lead = format!("{}_", prefix.to_lowercase());
        let entries = self
            .entries
            .iter()
            .filter_map(|(key, value)| {
                key.strip_prefix(&lead)
                    .map(|rest| (rest.to_string(), value.clone()))
            })
            .collect();

        FlatRecord { entries }
    }

    /// Returns true if every value is `Null` (also true for an empty record)
    #[must_use]
    pub fn all_null(&self) -> bool {
        self.entries.values().all(Value::is_null)
    }

    /// Number of entries
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if the record has no entries
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate over `(lowercased key, value)` pairs in unspecified order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.entries.iter().map(|(key, value)| (key.as_str(), value))
    }

    /// View a JSON object as a flat record.
    ///
    /// Numbers become `I8`, `U8` or `R8` depending on their representation.
    ///
    /// # Errors
    /// Returns [`Error::InvalidArgument`] if `json` is not an object, or if one of its values is
    /// itself an array or object.
    pub fn from_json(json: &serde_json::Value) -> Result<Self> {
        let serde_json::Value::Object(map) = json else {
            return Err(Error::InvalidArgument(format!(
                "Expected a flat JSON object but found {}",
                json_kind(json)
            )));
        };

        let mut record = FlatRecord::new();
        for (key, value) in map {
            let value = match value {
                serde_json::Value::Null => Value::Null,
                serde_json::Value::Bool(flag) => Value::Boolean(*flag),
                serde_json::Value::Number(number) => {
                    if let Some(signed) = number.as_i64() {
                        Value::I8(signed)
                    } else if let Some(unsigned) = number.as_u64() {
                        Value::U8(unsigned)
                    } else {
                        number.as_f64().map_or(Value::Null, Value::R8)
                    }
                }
                serde_json::Value::String(text) => Value::String(text.clone()),
                nested => {
                    return Err(Error::InvalidArgument(format!(
                        "Key '{key}' holds {} - records must be flat",
                        json_kind(nested)
                    )))
                }
            };
            record.insert(key, value);
        }

        Ok(record)
    }
}

pub(crate) fn json_kind(json: &serde_json::Value) -> &'static str {
    match json {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "a boolean",
        serde_json::Value::Number(_) => "a number",
        serde_json::Value::String(_) => "a string",
        serde_json::Value::Array(_) => "an array",
        serde_json::Value::Object(_) => "an object",
    }
}

impl<K: AsRef<str>, V: Into<Value>> FromIterator<(K, V)> for FlatRecord {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut record = FlatRecord::new();
        for (key, value) in iter {
            record.insert(key, value);
        }
        record
    }
}

impl<K: AsRef<str>, V: Into<Value>> Extend<(K, V)> for FlatRecord {
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        for (key, value) in iter {
            self.insert(key, value);
        }
    }
}

impl<K: AsRef<str>, V: Into<Value>> From<HashMap<K, V>> for FlatRecord {
    fn from(map: HashMap<K, V>) -> Self {
        map.into_iter().collect()
    }
}

impl<K: AsRef<str>, V: Into<Value>> From<BTreeMap<K, V>> for FlatRecord {
    fn from(map: BTreeMap<K, V>) -> Self {
        map.into_iter().collect()
    }
}

impl<K: AsRef<str>, V: Into<Value>> From<Vec<(K, V)>> for FlatRecord {
    fn from(pairs: Vec<(K, V)>) -> Self {
        pairs.into_iter().collect()
    }
}

impl<K: AsRef<str>, V: Into<Value>, const N: usize> From<[(K, V); N]> for FlatRecord {
    fn from(pairs: [(K, V); N]) -> Self {
        pairs.into_iter().collect()
    }
}

impl TryFrom<&serde_json::Value> for FlatRecord {
    type Error = Error;

    fn try_from(json: &serde_json::Value) -> Result<Self> {
        FlatRecord::from_json(json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_case_insensitive_access() {
        let mut record = FlatRecord::new();
        record.insert("FirstName", "Bob");
        assert_eq!(record.get("firstname"), Some(&Value::from("Bob")));
        assert_eq!(record.get("FIRSTNAME"), Some(&Value::from("Bob")));
        assert!(record.contains_key("FirstName"));

        record.insert("FIRSTNAME", "Alice");
        assert_eq!(record.len(), 1);
        assert_eq!(record.get("FirstName"), Some(&Value::from("Alice")));
    }

    #[test]
    fn test_nested_strips_prefix_once() {
        let record: FlatRecord = [
            ("Id", Value::from(1)),
            ("Orders", Value::Null),
            ("Orders_Id", Value::from(2)),
            ("Orders_Orders_Id", Value::from(3)),
            ("OrdersArchive_Id", Value::from(4)),
        ]
        .into_iter()
        .collect();

        let nested = record.nested("orders");
        assert_eq!(nested.len(), 2);
        assert_eq!(nested.get("Id"), Some(&Value::from(2)));
        assert_eq!(nested.get("Orders_Id"), Some(&Value::from(3)));
        assert!(record.nested("Missing").is_empty());
    }

    #[test]
    fn test_all_null() {
        let record: FlatRecord = [("A", Value::Null), ("B", Value::Null)].into_iter().collect();
        assert!(record.all_null());
        assert!(FlatRecord::new().all_null());

        let record: FlatRecord = [("A", Value::Null), ("B", Value::from(0))].into_iter().collect();
        assert!(!record.all_null());
    }

    #[test]
    fn test_from_pairs() {
        let record = FlatRecord::from([("Id", 1), ("Total", 2)]);
        assert_eq!(record.get("total"), Some(&Value::from(2)));

        let record = FlatRecord::from(vec![("Name", Value::from("x")), ("Missing", Value::Null)]);
        assert_eq!(record.len(), 2);
    }

    #[test]
    fn test_from_maps() {
        let mut map = HashMap::new();
        map.insert("Id", 1i32);
        assert_eq!(FlatRecord::from(map).get("id"), Some(&Value::from(1i32)));

        let mut map = BTreeMap::new();
        map.insert("Name".to_string(), Some("x"));
        map.insert("Other".to_string(), None);
        let record = FlatRecord::from(map);
        assert_eq!(record.get("other"), Some(&Value::Null));
    }

    #[test]
    fn test_from_json() {
        let record = FlatRecord::from_json(&json!({
            "Id": 1,
            "Big": u64::MAX,
            "Ratio": 0.5,
            "Name": "Bob",
            "Active": true,
            "Missing": null,
        }))
        .unwrap();

        assert_eq!(record.get("id"), Some(&Value::I8(1)));
        assert_eq!(record.get("big"), Some(&Value::U8(u64::MAX)));
        assert_eq!(record.get("ratio"), Some(&Value::R8(0.5)));
        assert_eq!(record.get("name"), Some(&Value::from("Bob")));
        assert_eq!(record.get("active"), Some(&Value::Boolean(true)));
        assert_eq!(record.get("missing"), Some(&Value::Null));
    }

    #[test]
    fn test_from_json_rejects_non_flat_input() {
        assert!(matches!(
            FlatRecord::from_json(&json!([1, 2])),
            Err(Error::InvalidArgument(_))
        ));
        assert!(matches!(
            FlatRecord::from_json(&json!("text")),
            Err(Error::InvalidArgument(_))
        ));
        assert!(matches!(
            FlatRecord::from_json(&json!({ "Orders": [1] })),
            Err(Error::InvalidArgument(_))
        ));
    }
}
