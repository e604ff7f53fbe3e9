//! A2UI Data Model
//!
//! The DataModel is the per-surface store bound attributes read from and
//! two-way bound inputs write to. Values are addressed by validated slash
//! paths (see [`super::path`]).

use serde_json::{Map, Value};

use super::error::DataModelError;
use super::path::{self, validate_path};

/// Default limit on the number of entries a single data model may hold.
pub const DEFAULT_MAX_ENTRIES: usize = 10_000;

/// A data model that stores values accessible via slash paths.
///
/// The data model supports:
/// - Getting and setting values by path
/// - Deleting a key by writing `null`
/// - Replacing the whole tree with a root (`/`) write
///
/// # Path Format
///
/// - `/` - root
/// - `/foo` - property "foo"
/// - `/foo/bar` - nested property
/// - `/items/0` - list element at index 0
/// - `/items/0/name` - property of list element
///
/// # Example
///
/// ```rust
/// use a2ui_kit::a2ui::DataModel;
/// use serde_json::json;
///
/// let mut model = DataModel::new();
/// model.update("/user/name", json!("Alice")).unwrap();
/// model.update("/items", json!([{"id": 1}, {"id": 2}])).unwrap();
///
/// assert_eq!(model.get_string("/user/name"), Some("Alice"));
/// assert_eq!(model.get_number("/items/1/id"), Some(2.0));
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct DataModel {
    /// The root data value, always an object
    data: Value,

    /// Number of keys and list elements in `data`, recursively
    entries: usize,

    /// Entry limit enforced on writes
    max_entries: usize,

    /// Version counter for change detection
    version: u64,
}

impl Default for DataModel {
    fn default() -> Self {
        Self::new()
    }
}

impl DataModel {
    /// Create a new empty data model
    pub fn new() -> Self {
        Self::with_max_entries(DEFAULT_MAX_ENTRIES)
    }

    /// Create an empty data model with a custom entry limit
    pub fn with_max_entries(max_entries: usize) -> Self {
        DataModel {
            data: Value::Object(Map::new()),
            entries: 0,
            max_entries,
            version: 0,
        }
    }

    /// Get the current version number
    pub fn version(&self) -> u64 {
        self.version
    }

    /// Number of entries currently stored
    pub fn entry_count(&self) -> usize {
        self.entries
    }

    /// Get a value at the given path.
    ///
    /// Invalid paths and paths that walk through a scalar yield `None`.
    pub fn get(&self, path: &str) -> Option<&Value> {
        if validate_path(path).is_err() {
            return None;
        }

        let mut current = &self.data;
        for segment in path::segments(path) {
            current = match current {
                Value::Object(map) => map.get(segment)?,
                Value::Array(arr) => arr.get(segment.parse::<usize>().ok()?)?,
                _ => return None,
            };
        }
        Some(current)
    }

    /// Get a string value at the given path
    pub fn get_string(&self, path: &str) -> Option<&str> {
        self.get(path).and_then(|v| v.as_str())
    }

    /// Get a number value at the given path
    pub fn get_number(&self, path: &str) -> Option<f64> {
        self.get(path).and_then(|v| v.as_f64())
    }

    /// Get a boolean value at the given path
    pub fn get_bool(&self, path: &str) -> Option<bool> {
        self.get(path).and_then(|v| v.as_bool())
    }

    /// Get an array value at the given path
    pub fn get_array(&self, path: &str) -> Option<&Vec<Value>> {
        self.get(path).and_then(|v| v.as_array())
    }

    /// Write a value at the given path.
    ///
    /// - `/` replaces the whole tree with an object value (keys that are not
    ///   valid path segments are dropped); `null` clears it.
    /// - Any other path upserts the leaf, creating intermediate objects.
    /// - Writing `null` to a non-root path removes the key.
    ///
    /// A write that would leave more entries than the limit is rejected and
    /// leaves the model unchanged. Deletes are never limited.
    pub fn update(&mut self, path: &str, value: Value) -> Result<(), DataModelError> {
        validate_path(path)?;

        let segments = path::segments(path);
        if segments.is_empty() {
            return self.replace_root(value);
        }

        if value.is_null() {
            if self.delete(&segments) {
                self.entries = count_entries(&self.data);
                self.version += 1;
            }
            return Ok(());
        }

        let mut candidate = self.data.clone();
        set_at(&mut candidate, &segments, value, path)?;
        let entries = count_entries(&candidate);
        if entries > self.max_entries {
            return Err(DataModelError::CapacityExceeded {
                max: self.max_entries,
            });
        }

        self.data = candidate;
        self.entries = entries;
        self.version += 1;
        Ok(())
    }

    /// Get a copy of the entire data tree
    pub fn snapshot(&self) -> Value {
        self.data.clone()
    }

    /// Borrow the entire data tree
    pub fn as_value(&self) -> &Value {
        &self.data
    }

    /// Remove every value
    pub fn clear(&mut self) {
        self.data = Value::Object(Map::new());
        self.entries = 0;
        self.version += 1;
    }

    // ========================================================================
    // Private helpers
    // ========================================================================

    fn replace_root(&mut self, value: Value) -> Result<(), DataModelError> {
        let incoming = match value {
            Value::Null => Map::new(),
            Value::Object(map) => map,
            _ => return Err(DataModelError::RootNotObject),
        };

        let mut root = Map::new();
        for (key, value) in incoming {
            if path::is_valid_path(&format!("/{}", key)) {
                root.insert(key, value);
            } else {
                log::warn!("[A2UI] Dropping invalid top-level key {:?}", key);
            }
        }

        let root = Value::Object(root);
        let entries = count_entries(&root);
        if entries > self.max_entries {
            return Err(DataModelError::CapacityExceeded {
                max: self.max_entries,
            });
        }

        self.data = root;
        self.entries = entries;
        self.version += 1;
        Ok(())
    }

    /// Remove the value at `segments`, returning whether anything changed.
    fn delete(&mut self, segments: &[&str]) -> bool {
        let Some((last, parents)) = segments.split_last() else {
            return false;
        };

        let mut current = &mut self.data;
        for segment in parents {
            current = match current {
                Value::Object(map) => match map.get_mut(*segment) {
                    Some(v) => v,
                    None => return false,
                },
                Value::Array(arr) => match segment.parse::<usize>().ok().and_then(|i| arr.get_mut(i)) {
                    Some(v) => v,
                    None => return false,
                },
                _ => return false,
            };
        }

        match current {
            Value::Object(map) => map.remove(*last).is_some(),
            Value::Array(arr) => match last.parse::<usize>() {
                Ok(index) if index < arr.len() => {
                    arr.remove(index);
                    true
                }
                _ => false,
            },
            _ => false,
        }
    }
}

/// Set a value, creating intermediate objects as needed.
///
/// Lists are only walked by existing index; a leaf may append at `len`.
/// Scalars met on the way are replaced with objects.
fn set_at(root: &mut Value, segments: &[&str], value: Value, path: &str) -> Result<(), DataModelError> {
    let Some((last, parents)) = segments.split_last() else {
        *root = value;
        return Ok(());
    };

    let mut current = root;
    for segment in parents {
        if !current.is_object() && !current.is_array() {
            *current = Value::Object(Map::new());
        }
        current = match current {
            Value::Array(arr) => match segment.parse::<usize>().ok().and_then(|i| arr.get_mut(i)) {
                Some(v) => v,
                None => {
                    return Err(DataModelError::IndexOutOfBounds {
                        path: path.to_string(),
                    });
                }
            },
            Value::Object(map) => map
                .entry(segment.to_string())
                .or_insert_with(|| Value::Object(Map::new())),
            _ => unreachable!("scalars replaced above"),
        };
    }

    if !current.is_object() && !current.is_array() {
        *current = Value::Object(Map::new());
    }
    match current {
        Value::Array(arr) => match last.parse::<usize>() {
            Ok(index) if index < arr.len() => arr[index] = value,
            Ok(index) if index == arr.len() => arr.push(value),
            _ => {
                return Err(DataModelError::IndexOutOfBounds {
                    path: path.to_string(),
                });
            }
        },
        Value::Object(map) => {
            map.insert(last.to_string(), value);
        }
        _ => unreachable!("scalars replaced above"),
    }
    Ok(())
}

/// Count object keys and list elements, recursively.
fn count_entries(value: &Value) -> usize {
    match value {
        Value::Object(map) => map.values().map(|v| 1 + count_entries(v)).sum(),
        Value::Array(arr) => arr.iter().map(|v| 1 + count_entries(v)).sum(),
        _ => 0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_get_set_basic() {
        let mut model = DataModel::new();

        model.update("/name", json!("Alice")).unwrap();
        assert_eq!(model.get_string("/name"), Some("Alice"));

        model.update("/count", json!(42)).unwrap();
        assert_eq!(model.get_number("/count"), Some(42.0));

        model.update("/enabled", json!(true)).unwrap();
        assert_eq!(model.get_bool("/enabled"), Some(true));
    }

    #[test]
    fn test_nested_paths() {
        let mut model = DataModel::new();

        model.update("/user/name", json!("Alice")).unwrap();
        model.update("/user/email", json!("alice@example.com")).unwrap();

        assert_eq!(model.get_string("/user/name"), Some("Alice"));
        assert_eq!(model.get_string("/user/email"), Some("alice@example.com"));
        assert_eq!(model.entry_count(), 3);
    }

    #[test]
    fn test_array_access() {
        let mut model = DataModel::new();

        model.update("/items", json!([{"id": 1}, {"id": 2}, {"id": 3}])).unwrap();

        assert_eq!(model.get_number("/items/0/id"), Some(1.0));
        assert_eq!(model.get_number("/items/2/id"), Some(3.0));
        assert_eq!(model.get("/items/3/id"), None);

        model.update("/items/1/id", json!(20)).unwrap();
        assert_eq!(model.get_number("/items/1/id"), Some(20.0));

        model.update("/items/3", json!({"id": 4})).unwrap();
        assert_eq!(model.get_array("/items").map(Vec::len), Some(4));

        assert_eq!(
            model.update("/items/9", json!({"id": 10})),
            Err(DataModelError::IndexOutOfBounds {
                path: "/items/9".to_string()
            })
        );
    }

    #[test]
    fn test_null_deletes_and_keeps_siblings() {
        let mut model = DataModel::new();

        model.update("/user/name", json!("Ada")).unwrap();
        model.update("/user/email", json!("ada@example.com")).unwrap();
        model.update("/user/name", Value::Null).unwrap();

        assert_eq!(model.get("/user/name"), None);
        assert_eq!(model.get_string("/user/email"), Some("ada@example.com"));
        assert!(model.get("/user").is_some_and(Value::is_object));

        // Deleting something absent is fine.
        model.update("/nothing/here", Value::Null).unwrap();
    }

    #[test]
    fn test_root_replace() {
        let mut model = DataModel::new();
        model.update("/old", json!(1)).unwrap();

        model
            .update("/", json!({"fresh": true, "bad key": 1, "__proto__": {}}))
            .unwrap();
        assert_eq!(model.get("/old"), None);
        assert_eq!(model.get_bool("/fresh"), Some(true));
        assert_eq!(model.snapshot(), json!({"fresh": true}));

        assert_eq!(model.update("/", json!([1, 2])), Err(DataModelError::RootNotObject));

        model.update("/", Value::Null).unwrap();
        assert_eq!(model.snapshot(), json!({}));
    }

    #[test]
    fn test_invalid_paths() {
        let mut model = DataModel::new();
        assert!(matches!(
            model.update("/../etc", json!(1)),
            Err(DataModelError::InvalidPath(_))
        ));
        assert_eq!(model.get("no-slash"), None);
        assert_eq!(model.get("/a//b"), None);
    }

    #[test]
    fn test_scalar_intermediate_short_circuits() {
        let mut model = DataModel::new();
        model.update("/title", json!("hello")).unwrap();
        assert_eq!(model.get("/title/length"), None);

        // Writing through a scalar turns it into an object.
        model.update("/title/text", json!("hi")).unwrap();
        assert_eq!(model.get_string("/title/text"), Some("hi"));
    }

    #[test]
    fn test_entry_cap() {
        let mut model = DataModel::with_max_entries(3);
        model.update("/a", json!(1)).unwrap();
        model.update("/b", json!({"x": 1})).unwrap();
        assert_eq!(model.entry_count(), 3);

        assert_eq!(
            model.update("/c", json!(1)),
            Err(DataModelError::CapacityExceeded { max: 3 })
        );
        // Overwrites that keep the count are fine; growth below a key is not.
        model.update("/a", json!(2)).unwrap();
        model.update("/b/x", json!("two")).unwrap();
        assert_eq!(
            model.update("/b/y", json!(2)),
            Err(DataModelError::CapacityExceeded { max: 3 })
        );
        assert_eq!(model.snapshot(), json!({"a": 2, "b": {"x": "two"}}));
        assert_eq!(model.entry_count(), 3);

        let mut model = DataModel::with_max_entries(2);
        assert_eq!(
            model.update("/", json!({"a": 1, "b": 2, "c": 3})),
            Err(DataModelError::CapacityExceeded { max: 2 })
        );
        assert_eq!(model.snapshot(), json!({}));
    }

    #[test]
    fn test_single_write_over_cap_rejected() {
        let mut model = DataModel::with_max_entries(3);
        assert_eq!(
            model.update("/a", json!([1, 2, 3, 4, 5])),
            Err(DataModelError::CapacityExceeded { max: 3 })
        );
        assert_eq!(model.snapshot(), json!({}));
        assert_eq!(model.entry_count(), 0);
        assert_eq!(model.version(), 0);
    }

    #[test]
    fn test_delete_at_cap() {
        let mut model = DataModel::with_max_entries(2);
        model.update("/a", json!(1)).unwrap();
        model.update("/b", json!(2)).unwrap();

        model.update("/absent", Value::Null).unwrap();
        model.update("/a/deeper", Value::Null).unwrap();
        assert_eq!(model.snapshot(), json!({"a": 1, "b": 2}));

        model.update("/a", Value::Null).unwrap();
        assert_eq!(model.entry_count(), 1);
        model.update("/c", json!(3)).unwrap();
    }

    #[test]
    fn test_failed_write_leaves_model_untouched() {
        let mut model = DataModel::new();
        model.update("/list", json!([1])).unwrap();
        assert_eq!(
            model.update("/list/7/name", json!("x")),
            Err(DataModelError::IndexOutOfBounds {
                path: "/list/7/name".to_string()
            })
        );
        assert_eq!(model.get("/list"), Some(&json!([1])));
    }

    #[test]
    fn test_version() {
        let mut model = DataModel::new();

        let v0 = model.version();
        model.update("/name", json!("Alice")).unwrap();
        let v1 = model.version();
        assert!(v1 > v0);

        model.clear();
        assert!(model.version() > v1);
        assert_eq!(model.entry_count(), 0);
    }
}
