//! # Parameter upload
//!
//! A params record is a YAML document (JSON documents load too). Loading one
//! flattens it into `/`-separated keys and uploads every leaf to a
//! `ParamStore`:
//!
//! ```text
//! arm:
//!   speed: 2
//!   joints: [1, 2]
//!   => /arm/speed  = 2
//!      /arm/joints = [1, 2]
//! ```
//!
//! A document whose top level is not an object is uploaded under `/`.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::RwLock;

use serde_json::Value;

use crate::store::{LibrarianError, LibrarianResult};

/// Destination for loaded parameters
pub trait ParamStore: Send + Sync + fmt::Debug {
    fn set_param(&self, key: &str, value: Value);

    fn get_param(&self, key: &str) -> Option<Value>;
}

/// Parameter store kept in process memory
#[derive(Debug, Default)]
pub struct MemoryParamStore {
    params: RwLock<BTreeMap<String, Value>>,
}

impl MemoryParamStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// All parameters in key order
    pub fn snapshot(&self) -> BTreeMap<String, Value> {
        self.params
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }
}

impl ParamStore for MemoryParamStore {
    fn set_param(&self, key: &str, value: Value) {
        self.params
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .insert(key.to_string(), value);
    }

    fn get_param(&self, key: &str) -> Option<Value> {
        self.params
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .get(key)
            .cloned()
    }
}

/// Parse a params document into `(key, value)` leaves
pub fn parse_params(contents: &[u8]) -> LibrarianResult<Vec<(String, Value)>> {
    let document: Value = serde_yaml::from_slice(contents)
        .map_err(|e| LibrarianError::InvalidParams(e.to_string()))?;

    let mut leaves = Vec::new();
    match document {
        Value::Object(map) if !map.is_empty() => flatten("", Value::Object(map), &mut leaves),
        other => leaves.push(("/".to_string(), other)),
    }
    Ok(leaves)
}

fn flatten(prefix: &str, value: Value, out: &mut Vec<(String, Value)>) {
    match value {
        Value::Object(map) if !map.is_empty() => {
            for (key, child) in map {
                flatten(&format!("{}/{}", prefix, key), child, out);
            }
        }
        leaf => out.push((prefix.to_string(), leaf)),
    }
}

/// Parse `contents` and upload every leaf; returns the number uploaded
pub fn upload_params(store: &dyn ParamStore, contents: &[u8]) -> LibrarianResult<usize> {
    let leaves = parse_params(contents)?;
    let count = leaves.len();
    for (key, value) in leaves {
        store.set_param(&key, value);
    }
    Ok(count)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_flatten_nested() {
        let leaves = parse_params(br#"{"arm": {"speed": 2, "joints": [1, 2]}, "name": "ur5"}"#)
            .unwrap();
        let map: BTreeMap<_, _> = leaves.into_iter().collect();

        assert_eq!(map.len(), 3);
        assert_eq!(map["/arm/speed"], json!(2));
        assert_eq!(map["/arm/joints"], json!([1, 2]));
        assert_eq!(map["/name"], json!("ur5"));
    }

    #[test]
    fn test_scalar_document_goes_to_root() {
        let leaves = parse_params(b"42").unwrap();
        assert_eq!(leaves, vec![("/".to_string(), json!(42))]);
    }

    #[test]
    fn test_empty_object_leaf() {
        let leaves = parse_params(br#"{"gripper": {}}"#).unwrap();
        assert_eq!(leaves, vec![("/gripper".to_string(), json!({}))]);
    }

    #[test]
    fn test_yaml_document() {
        let contents = b"arm:\n  speed: 2\n  joints: [1, 2]\nname: ur5\n";
        let map: BTreeMap<_, _> = parse_params(contents).unwrap().into_iter().collect();

        assert_eq!(map.len(), 3);
        assert_eq!(map["/arm/speed"], json!(2));
        assert_eq!(map["/arm/joints"], json!([1, 2]));
        assert_eq!(map["/name"], json!("ur5"));
    }

    #[test]
    fn test_invalid_document() {
        let err = parse_params(b"arm: [1, 2").unwrap_err();
        assert!(matches!(err, LibrarianError::InvalidParams(_)));

        let err = parse_params(b"a: b: c").unwrap_err();
        assert!(matches!(err, LibrarianError::InvalidParams(_)));
    }

    #[test]
    fn test_upload() {
        let store = MemoryParamStore::new();
        let count = upload_params(&store, br#"{"a": 1, "b": {"c": true}}"#).unwrap();

        assert_eq!(count, 2);
        assert_eq!(store.get_param("/a"), Some(json!(1)));
        assert_eq!(store.get_param("/b/c"), Some(json!(true)));
        assert_eq!(store.get_param("/b"), None);
        assert_eq!(store.snapshot().len(), 2);
    }
}
