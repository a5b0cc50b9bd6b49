//! Category to display-attribute lookups

use crate::error::{Attribute, Error, Result};
use crate::join::JoinedRecord;
use std::collections::HashMap;

/// Ordered key -> value mapping.
///
/// Inserting an existing key overwrites its value but keeps the key's
/// original slot, so iteration follows first insertion while values
/// follow the last write.
#[derive(Debug, Clone, PartialEq)]
pub struct AestheticLookup<V> {
    entries: Vec<(String, V)>,
    index: HashMap<String, usize>,
}

impl<V> Default for AestheticLookup<V> {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
            index: HashMap::new(),
        }
    }
}

impl<V> AestheticLookup<V> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the previous value for `key`, if any
    pub fn insert(&mut self, key: impl Into<String>, value: V) -> Option<V> {
        let key = key.into();
        if let Some(&slot) = self.index.get(&key) {
            return Some(std::mem::replace(&mut self.entries[slot].1, value));
        }
        self.index.insert(key.clone(), self.entries.len());
        self.entries.push((key, value));
        None
    }

    pub fn get(&self, key: &str) -> Option<&V> {
        self.index.get(key).map(|&slot| &self.entries[slot].1)
    }

    /// Lookup for rendering; a missing key is a configuration error
    pub fn require(&self, key: &str, attribute: Attribute) -> Result<&V> {
        self.get(key).ok_or_else(|| Error::MissingAesthetic {
            category: key.to_string(),
            attribute,
        })
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.index.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &V)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }
}

/// Build a lookup by sequential insertion; the last occurrence of a key wins.
/// Records with no value are skipped.
pub fn build_lookup<R, V>(
    records: impl IntoIterator<Item = R>,
    key: impl Fn(&R) -> &str,
    value: impl Fn(&R) -> Option<V>,
) -> AestheticLookup<V> {
    let mut lookup = AestheticLookup::new();
    for record in records {
        if let Some(v) = value(&record) {
            lookup.insert(key(&record), v);
        }
    }
    lookup
}

pub fn color_lookup<'a>(records: impl IntoIterator<Item = &'a JoinedRecord>) -> AestheticLookup<String> {
    build_lookup(records, |r| r.category(), |r| r.color.clone())
}

pub fn shape_lookup<'a>(records: impl IntoIterator<Item = &'a JoinedRecord>) -> AestheticLookup<u8> {
    build_lookup(records, |r| r.category(), |r| r.shape)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::Observation;

    fn record(pop: &str, color: Option<&str>, shape: Option<u8>) -> JoinedRecord {
        JoinedRecord {
            observation: Observation {
                individual: "i".to_string(),
                coords: vec![0.0, 0.0],
                population: pop.to_string(),
            },
            color: color.map(str::to_string),
            shape,
        }
    }

    #[test]
    fn test_last_write_wins() {
        let records = vec![
            record("X", Some("red"), Some(1)),
            record("X", Some("blue"), Some(2)),
            record("Y", Some("green"), Some(3)),
        ];
        let colors = color_lookup(&records);
        assert_eq!(colors.get("X").map(String::as_str), Some("blue"));
        assert_eq!(colors.get("Y").map(String::as_str), Some("green"));

        let keys: Vec<&str> = colors.iter().map(|(k, _)| k).collect();
        assert_eq!(keys, vec!["X", "Y"]);
    }

    #[test]
    fn test_insert_returns_previous() {
        let mut lookup = AestheticLookup::new();
        assert_eq!(lookup.insert("A", 1u8), None);
        assert_eq!(lookup.insert("A", 4u8), Some(1));
        assert_eq!(lookup.len(), 1);
    }

    #[test]
    fn test_build_is_idempotent() {
        let records = vec![
            record("X", Some("red"), Some(1)),
            record("Y", Some("green"), Some(3)),
            record("X", Some("blue"), Some(2)),
        ];
        assert_eq!(shape_lookup(&records), shape_lookup(&records));
        assert_eq!(color_lookup(&records), color_lookup(&records));
    }

    #[test]
    fn test_unmatched_categories_absent() {
        let records = vec![record("X", Some("red"), Some(1)), record("Z", None, None)];
        let shapes = shape_lookup(&records);
        assert!(shapes.contains_key("X"));
        assert!(!shapes.contains_key("Z"));

        let err = shapes.require("Z", Attribute::Shape).unwrap_err();
        assert!(matches!(
            err,
            Error::MissingAesthetic { ref category, attribute: Attribute::Shape } if category == "Z"
        ));
    }
}
