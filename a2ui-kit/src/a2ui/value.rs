//! A2UI Value Types
//!
//! Bound attributes are [`DynamicValue`]s: a literal, a path into the data
//! model, or a call into the function library. Every wire shape the agents
//! produce is normalized here, so the rest of the crate only sees the enum.

use serde::de::{self, Deserializer};
use serde::ser::{SerializeMap, Serializer};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A function call expression.
///
/// # Examples
///
/// ```json
/// {"call": "formatCurrency", "args": {"value": {"path": "/total"}, "currency": "USD"}}
/// ```
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FunctionCall {
    /// Function name
    pub call: String,

    /// Named arguments; each may itself be a dynamic value
    #[serde(default)]
    pub args: Map<String, Value>,

    /// Declared return type, informational only
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub return_type: Option<String>,
}

impl FunctionCall {
    pub fn new(call: impl Into<String>, args: Map<String, Value>) -> Self {
        FunctionCall {
            call: call.into(),
            args,
            return_type: None,
        }
    }
}

/// A value that is either given inline, bound to the data model, or computed.
///
/// Accepted wire shapes:
///
/// ```json
/// "Hello"
/// {"literal": "Hello"}
/// {"literalString": "Hello"}
/// {"path": "/user/name"}
/// {"functionCall": {"call": "required", "args": {"value": {"path": "/email"}}}}
/// {"call": "required", "args": {"value": {"path": "/email"}}}
/// ```
#[derive(Debug, Clone, PartialEq)]
pub enum DynamicValue {
    /// A literal value
    Literal(Value),
    /// A path reference to the data model
    Path(String),
    /// A function library call
    FunctionCall(FunctionCall),
}

const LEGACY_LITERAL_KEYS: &[&str] = &[
    "literalString",
    "literalNumber",
    "literalBoolean",
    "literalArray",
];

impl DynamicValue {
    /// Create a new literal value
    pub fn literal(value: impl Into<Value>) -> Self {
        DynamicValue::Literal(value.into())
    }

    /// Create a new path reference
    pub fn path(p: impl Into<String>) -> Self {
        DynamicValue::Path(p.into())
    }

    /// Create a new function call
    pub fn call(name: impl Into<String>, args: Map<String, Value>) -> Self {
        DynamicValue::FunctionCall(FunctionCall::new(name, args))
    }

    /// Check if this is a literal value
    pub fn is_literal(&self) -> bool {
        matches!(self, DynamicValue::Literal(_))
    }

    /// Check if this is a path reference
    pub fn is_path(&self) -> bool {
        matches!(self, DynamicValue::Path(_))
    }

    /// Get the path if this is a path reference
    pub fn as_path(&self) -> Option<&str> {
        match self {
            DynamicValue::Path(path) => Some(path),
            _ => None,
        }
    }

    /// Get the literal if this is a literal value
    pub fn as_literal(&self) -> Option<&Value> {
        match self {
            DynamicValue::Literal(value) => Some(value),
            _ => None,
        }
    }

    /// Canonical JSON form, the same shape [`Serialize`] produces.
    pub fn to_json(&self) -> Value {
        let mut map = Map::new();
        match self {
            DynamicValue::Literal(value) => {
                map.insert("literal".to_string(), value.clone());
            }
            DynamicValue::Path(path) => {
                map.insert("path".to_string(), Value::String(path.clone()));
            }
            DynamicValue::FunctionCall(call) => {
                let mut body = Map::new();
                body.insert("call".to_string(), Value::String(call.call.clone()));
                body.insert("args".to_string(), Value::Object(call.args.clone()));
                if let Some(return_type) = &call.return_type {
                    body.insert("returnType".to_string(), Value::String(return_type.clone()));
                }
                map.insert("functionCall".to_string(), Value::Object(body));
            }
        }
        Value::Object(map)
    }

    /// Check if a raw JSON value uses one of the dynamic value object shapes.
    pub fn is_dynamic_shape(value: &Value) -> bool {
        value.as_object().is_some_and(|map| {
            map.contains_key("path")
                || map.contains_key("literal")
                || map.contains_key("functionCall")
                || map.get("call").is_some_and(Value::is_string)
                || LEGACY_LITERAL_KEYS.iter().any(|k| map.contains_key(*k))
        })
    }

    /// Normalize any accepted wire shape.
    ///
    /// Objects that match none of the dynamic shapes are literal objects.
    pub fn from_json(value: Value) -> Self {
        let Value::Object(mut map) = value else {
            return DynamicValue::Literal(value);
        };

        if let Some(Value::String(path)) = map.get("path") {
            return DynamicValue::Path(path.clone());
        }
        if let Some(literal) = map.remove("literal") {
            return DynamicValue::Literal(literal);
        }
        for key in LEGACY_LITERAL_KEYS {
            if let Some(literal) = map.remove(*key) {
                return DynamicValue::Literal(literal);
            }
        }
        if let Some(call) = map.remove("functionCall") {
            if let Ok(call) = serde_json::from_value::<FunctionCall>(call) {
                return DynamicValue::FunctionCall(call);
            }
            return DynamicValue::Literal(Value::Null);
        }
        if map.get("call").is_some_and(Value::is_string) {
            if let Ok(call) = serde_json::from_value::<FunctionCall>(Value::Object(map.clone())) {
                return DynamicValue::FunctionCall(call);
            }
        }
        DynamicValue::Literal(Value::Object(map))
    }
}

impl Default for DynamicValue {
    fn default() -> Self {
        DynamicValue::Literal(Value::Null)
    }
}

impl From<&str> for DynamicValue {
    fn from(s: &str) -> Self {
        DynamicValue::Literal(Value::String(s.to_string()))
    }
}

impl<'de> Deserialize<'de> for DynamicValue {
    fn deserialize<D: Deserializer<'de>>(d: D) -> Result<Self, D::Error> {
        Value::deserialize(d).map(DynamicValue::from_json)
    }
}

impl Serialize for DynamicValue {
    fn serialize<S: Serializer>(&self, s: S) -> Result<S::Ok, S::Error> {
        let mut map = s.serialize_map(Some(1))?;
        match self {
            DynamicValue::Literal(value) => map.serialize_entry("literal", value)?,
            DynamicValue::Path(path) => map.serialize_entry("path", path)?,
            DynamicValue::FunctionCall(call) => map.serialize_entry("functionCall", call)?,
        }
        map.end()
    }
}

/// Children of a container component.
///
/// Accepted wire shapes:
///
/// ```json
/// ["header", "body"]
/// {"array": ["header", "body"]}
/// {"explicitList": ["header", "body"]}
/// {"path": "/items", "componentId": "row"}
/// {"dataBinding": "/items", "componentId": "row"}
/// ```
#[derive(Debug, Clone, PartialEq)]
pub enum ChildList {
    /// Explicit ordered list of child component IDs
    Explicit(Vec<String>),

    /// One `component_id` instance per item of the list at `path`
    Template { path: String, component_id: String },
}

impl Default for ChildList {
    fn default() -> Self {
        ChildList::Explicit(vec![])
    }
}

impl ChildList {
    fn from_json(value: Value) -> Result<Self, String> {
        match value {
            Value::Array(_) => ids(value).map(ChildList::Explicit),
            Value::Object(mut map) => {
                if let Some(list) = map.remove("array").or_else(|| map.remove("explicitList")) {
                    return ids(list).map(ChildList::Explicit);
                }
                if let Some(Value::Object(template)) = map.remove("template") {
                    return ChildList::from_json(Value::Object(template));
                }
                let path = map
                    .remove("path")
                    .or_else(|| map.remove("dataBinding"))
                    .and_then(|v| v.as_str().map(str::to_string));
                let component_id = map
                    .remove("componentId")
                    .and_then(|v| v.as_str().map(str::to_string));
                match (path, component_id) {
                    (Some(path), Some(component_id)) => Ok(ChildList::Template { path, component_id }),
                    _ => Err("children template needs 'path' and 'componentId'".to_string()),
                }
            }
            other => Err(format!("unsupported children value: {}", other)),
        }
    }
}

fn ids(value: Value) -> Result<Vec<String>, String> {
    serde_json::from_value::<Vec<String>>(value).map_err(|e| format!("children ids: {}", e))
}

impl<'de> Deserialize<'de> for ChildList {
    fn deserialize<D: Deserializer<'de>>(d: D) -> Result<Self, D::Error> {
        ChildList::from_json(Value::deserialize(d)?).map_err(de::Error::custom)
    }
}

impl Serialize for ChildList {
    fn serialize<S: Serializer>(&self, s: S) -> Result<S::Ok, S::Error> {
        match self {
            ChildList::Explicit(ids) => ids.serialize(s),
            ChildList::Template { path, component_id } => {
                let mut map = s.serialize_map(Some(2))?;
                map.serialize_entry("path", path)?;
                map.serialize_entry("componentId", component_id)?;
                map.end()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_bare_primitive_is_literal() {
        let value: DynamicValue = serde_json::from_str(r#""Hello""#).unwrap();
        assert_eq!(value.as_literal(), Some(&json!("Hello")));

        let value: DynamicValue = serde_json::from_str("42").unwrap();
        assert_eq!(value, DynamicValue::literal(42));
    }

    #[test]
    fn test_literal_shapes() {
        let value: DynamicValue = serde_json::from_str(r#"{"literal": true}"#).unwrap();
        assert_eq!(value, DynamicValue::literal(true));

        let value: DynamicValue = serde_json::from_str(r#"{"literalString": "Hello"}"#).unwrap();
        assert!(value.is_literal());
        assert_eq!(value.as_literal(), Some(&json!("Hello")));

        let value: DynamicValue = serde_json::from_str(r#"{"literalNumber": 42}"#).unwrap();
        assert_eq!(value.as_literal(), Some(&json!(42)));
    }

    #[test]
    fn test_path() {
        let value: DynamicValue = serde_json::from_str(r#"{"path": "/user/name"}"#).unwrap();
        assert!(value.is_path());
        assert_eq!(value.as_path(), Some("/user/name"));
    }

    #[test]
    fn test_function_call_shapes() {
        let wrapped: DynamicValue = serde_json::from_value(json!({
            "functionCall": {"call": "required", "args": {"value": {"path": "/email"}}}
        }))
        .unwrap();
        let inline: DynamicValue = serde_json::from_value(json!({
            "call": "required", "args": {"value": {"path": "/email"}}
        }))
        .unwrap();
        assert_eq!(wrapped, inline);
        match wrapped {
            DynamicValue::FunctionCall(call) => {
                assert_eq!(call.call, "required");
                assert_eq!(call.args["value"], json!({"path": "/email"}));
            }
            other => panic!("Expected FunctionCall, got {:?}", other),
        }
    }

    #[test]
    fn test_plain_object_is_literal() {
        let value = DynamicValue::from_json(json!({"street": "Main", "no": 1}));
        assert_eq!(value, DynamicValue::literal(json!({"street": "Main", "no": 1})));
        assert!(!DynamicValue::is_dynamic_shape(&json!({"street": "Main"})));
        assert!(DynamicValue::is_dynamic_shape(&json!({"path": "/x"})));
    }

    #[test]
    fn test_canonical_serialization() {
        let value = DynamicValue::path("/a");
        assert_eq!(serde_json::to_value(&value).unwrap(), json!({"path": "/a"}));

        let call = DynamicValue::call("required", Map::new());
        assert_eq!(serde_json::to_value(&call).unwrap(), call.to_json());

        let value = DynamicValue::literal(json!({"path": "not a binding"}));
        let json = serde_json::to_value(&value).unwrap();
        let back: DynamicValue = serde_json::from_value(json).unwrap();
        assert_eq!(back, value);
    }

    #[test]
    fn test_children_shapes() {
        let bare: ChildList = serde_json::from_value(json!(["a", "b"])).unwrap();
        let array: ChildList = serde_json::from_value(json!({"array": ["a", "b"]})).unwrap();
        let legacy: ChildList = serde_json::from_value(json!({"explicitList": ["a", "b"]})).unwrap();
        assert_eq!(bare, ChildList::Explicit(vec!["a".into(), "b".into()]));
        assert_eq!(bare, array);
        assert_eq!(bare, legacy);

        let template: ChildList =
            serde_json::from_value(json!({"path": "/items", "componentId": "row"})).unwrap();
        let legacy: ChildList = serde_json::from_value(json!({
            "template": {"dataBinding": "/items", "componentId": "row"}
        }))
        .unwrap();
        assert_eq!(
            template,
            ChildList::Template {
                path: "/items".into(),
                component_id: "row".into()
            }
        );
        assert_eq!(template, legacy);

        assert!(serde_json::from_value::<ChildList>(json!({"path": "/items"})).is_err());
        assert!(serde_json::from_value::<ChildList>(json!(7)).is_err());
    }
}
