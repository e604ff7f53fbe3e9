//! A2UI Component Records
//!
//! Components are stored as flat, id-keyed records. The core does not know
//! how to draw a component; it keeps the type tag and the normalized
//! attributes, and renderers resolve the bound values they need.

use indexmap::IndexMap;
use serde::de::{self, Deserializer};
use serde::ser::{SerializeMap, Serializer};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::value::{ChildList, DynamicValue, FunctionCall};

/// Deserialize an optional number, accepting numeric strings and ignoring
/// anything else instead of failing the whole record.
fn lenient_f64<'de, D: Deserializer<'de>>(d: D) -> Result<Option<f64>, D::Error> {
    let val = Option::<Value>::deserialize(d)?.and_then(|v| match v {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    });
    Ok(val)
}

/// A single node of a surface's component table.
///
/// # Example JSON
///
/// ```text
/// {
///   "id": "email",
///   "component": "TextField",
///   "label": "Email",
///   "value": {"path": "/form/email"},
///   "variant": "shortText",
///   "checks": [{"call": "email", "message": "Enter a valid email"}]
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComponentRecord {
    /// Unique identifier within the surface
    pub id: String,

    /// Component type tag (e.g. "Text", "Button")
    pub component: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<DynamicValue>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<DynamicValue>,

    /// Current value of an input (path-bound for two-way binding)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<DynamicValue>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<DynamicValue>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub placeholder: Option<DynamicValue>,

    /// Single child component ID
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub child: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub children: Option<ChildList>,

    /// Presentation hint, e.g. "h1", "primary", "obscured"
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub variant: Option<String>,

    #[serde(default, deserialize_with = "lenient_f64", skip_serializing_if = "Option::is_none")]
    pub min: Option<f64>,

    #[serde(default, deserialize_with = "lenient_f64", skip_serializing_if = "Option::is_none")]
    pub max: Option<f64>,

    #[serde(default, deserialize_with = "lenient_f64", skip_serializing_if = "Option::is_none")]
    pub step: Option<f64>,

    /// Flex weight inside a Row or Column
    #[serde(default, deserialize_with = "lenient_f64", skip_serializing_if = "Option::is_none")]
    pub weight: Option<f64>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<ChoiceOption>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub checks: Vec<CheckRule>,

    /// Main-axis distribution
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub justify: Option<String>,

    /// Cross-axis alignment
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub align: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub action: Option<ActionDefinition>,

    /// Pattern the input value must fully match
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub validation_regexp: Option<String>,

    /// Attributes the core does not interpret, kept for renderers
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ComponentRecord {
    pub fn new(id: impl Into<String>, component: impl Into<String>) -> Self {
        ComponentRecord {
            id: id.into(),
            component: component.into(),
            ..Default::default()
        }
    }

    /// Move older attribute names onto their current fields.
    ///
    /// Current names win when both are present; the legacy entries are
    /// removed either way.
    pub(crate) fn normalize_legacy(&mut self) {
        let usage_hint = take_string(&mut self.extra, "usageHint");
        let text_field_type = take_string(&mut self.extra, "textFieldType");
        if self.variant.is_none() {
            self.variant = usage_hint.or(text_field_type);
        }

        let distribution = take_string(&mut self.extra, "distribution");
        if self.justify.is_none() {
            self.justify = distribution;
        }

        let alignment = take_string(&mut self.extra, "alignment");
        if self.align.is_none() {
            self.align = alignment;
        }
    }

    /// Bound attribute by name, looking at the typed fields first.
    pub fn attribute(&self, name: &str) -> Option<DynamicValue> {
        let typed = match name {
            "text" => self.text.as_ref(),
            "label" => self.label.as_ref(),
            "value" => self.value.as_ref(),
            "url" => self.url.as_ref(),
            "placeholder" => self.placeholder.as_ref(),
            _ => None,
        };
        match typed {
            Some(value) => Some(value.clone()),
            None => self.extra.get(name).cloned().map(DynamicValue::from_json),
        }
    }

    /// The binding an input writes back to, if its value is path-bound.
    pub fn bound_path(&self) -> Option<&str> {
        self.value
            .as_ref()
            .or(self.text.as_ref())
            .and_then(DynamicValue::as_path)
    }
}

fn take_string(extra: &mut Map<String, Value>, key: &str) -> Option<String> {
    match extra.remove(key)? {
        Value::String(s) => Some(s),
        _ => None,
    }
}

/// One selectable option of a ChoicePicker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChoiceOption {
    pub label: DynamicValue,
    pub value: String,
}

/// A validation rule attached to an input component.
///
/// `call`/`args` name a Function Library validation function; `message` is
/// shown when it does not return `true`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckRule {
    pub call: String,

    #[serde(default)]
    pub args: Map<String, Value>,

    #[serde(default)]
    pub message: String,
}

/// What a component does when activated.
///
/// Accepted wire shapes:
///
/// ```text
/// {"event": {"name": "submit", "context": {"email": {"path": "/email"}}}}
/// {"functionCall": {"call": "openUrl", "args": {"url": "https://example.com"}}}
/// {"name": "submit", "context": [{"key": "email", "value": {"path": "/email"}}]}
/// ```
#[derive(Debug, Clone, PartialEq)]
pub enum ActionDefinition {
    /// Forwarded to the agent with its context resolved
    Event {
        name: String,
        context: IndexMap<String, DynamicValue>,
    },

    /// Local effect
    FunctionCall(FunctionCall),
}

impl ActionDefinition {
    pub fn event(name: impl Into<String>) -> Self {
        ActionDefinition::Event {
            name: name.into(),
            context: IndexMap::new(),
        }
    }

    pub fn name(&self) -> &str {
        match self {
            ActionDefinition::Event { name, .. } => name,
            ActionDefinition::FunctionCall(call) => &call.call,
        }
    }

    fn from_json(value: Value) -> Result<Self, String> {
        let Value::Object(mut map) = value else {
            return Err("action must be an object".to_string());
        };

        if let Some(Value::Object(mut event)) = map.remove("event") {
            let name = match event.remove("name") {
                Some(Value::String(name)) => name,
                _ => return Err("action event needs a 'name'".to_string()),
            };
            let context = parse_context(event.remove("context").unwrap_or(Value::Null));
            return Ok(ActionDefinition::Event { name, context });
        }

        if let Some(call) = map.remove("functionCall") {
            return serde_json::from_value::<FunctionCall>(call)
                .map(ActionDefinition::FunctionCall)
                .map_err(|e| format!("action functionCall: {}", e));
        }

        if map.get("call").is_some_and(Value::is_string) {
            return serde_json::from_value::<FunctionCall>(Value::Object(map))
                .map(ActionDefinition::FunctionCall)
                .map_err(|e| format!("action call: {}", e));
        }

        match map.remove("name") {
            Some(Value::String(name)) => {
                let context = parse_context(map.remove("context").unwrap_or(Value::Null));
                Ok(ActionDefinition::Event { name, context })
            }
            _ => Err("action needs 'event', 'functionCall' or 'name'".to_string()),
        }
    }
}

/// Context as a mapping, or the older list of `{key, value}` items.
///
/// LLMs sometimes emit list items without a key; those are dropped.
fn parse_context(value: Value) -> IndexMap<String, DynamicValue> {
    match value {
        Value::Object(map) => map
            .into_iter()
            .map(|(key, value)| (key, DynamicValue::from_json(value)))
            .collect(),
        Value::Array(items) => items
            .into_iter()
            .filter_map(|item| {
                let Value::Object(mut item) = item else {
                    return None;
                };
                let key = match item.remove("key") {
                    Some(Value::String(key)) if !key.is_empty() => key,
                    _ => {
                        log::debug!("[A2UI] Dropping action context item without a key");
                        return None;
                    }
                };
                let value = item.remove("value").unwrap_or(Value::Null);
                Some((key, DynamicValue::from_json(value)))
            })
            .collect(),
        _ => IndexMap::new(),
    }
}

impl<'de> Deserialize<'de> for ActionDefinition {
    fn deserialize<D: Deserializer<'de>>(d: D) -> Result<Self, D::Error> {
        ActionDefinition::from_json(Value::deserialize(d)?).map_err(de::Error::custom)
    }
}

impl Serialize for ActionDefinition {
    fn serialize<S: Serializer>(&self, s: S) -> Result<S::Ok, S::Error> {
        #[derive(Serialize)]
        struct Event<'a> {
            name: &'a str,
            context: &'a IndexMap<String, DynamicValue>,
        }

        let mut map = s.serialize_map(Some(1))?;
        match self {
            ActionDefinition::Event { name, context } => {
                map.serialize_entry("event", &Event { name, context })?
            }
            ActionDefinition::FunctionCall(call) => map.serialize_entry("functionCall", call)?,
        }
        map.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_text_component() {
        let record: ComponentRecord = serde_json::from_value(json!({
            "id": "title",
            "component": "Text",
            "text": "Welcome",
            "variant": "h1"
        }))
        .unwrap();
        assert_eq!(record.id, "title");
        assert_eq!(record.component, "Text");
        assert_eq!(record.text, Some(DynamicValue::literal("Welcome")));
        assert_eq!(record.variant.as_deref(), Some("h1"));
        assert!(record.extra.is_empty());
    }

    #[test]
    fn test_unknown_attributes_kept() {
        let record: ComponentRecord = serde_json::from_value(json!({
            "id": "icon",
            "component": "Icon",
            "name": {"path": "/icon"},
            "visible": true
        }))
        .unwrap();
        assert_eq!(record.extra["visible"], json!(true));
        assert_eq!(record.attribute("name"), Some(DynamicValue::path("/icon")));
        assert_eq!(record.attribute("text"), None);
    }

    #[test]
    fn test_legacy_aliases() {
        let mut record: ComponentRecord = serde_json::from_value(json!({
            "id": "f",
            "component": "TextField",
            "textFieldType": "obscured",
            "distribution": "spaceBetween",
            "alignment": "center"
        }))
        .unwrap();
        record.normalize_legacy();
        assert_eq!(record.variant.as_deref(), Some("obscured"));
        assert_eq!(record.justify.as_deref(), Some("spaceBetween"));
        assert_eq!(record.align.as_deref(), Some("center"));
        assert!(record.extra.is_empty());

        let mut record: ComponentRecord = serde_json::from_value(json!({
            "id": "t",
            "component": "Text",
            "variant": "h2",
            "usageHint": "h1"
        }))
        .unwrap();
        record.normalize_legacy();
        assert_eq!(record.variant.as_deref(), Some("h2"));

        let mut record: ComponentRecord = serde_json::from_value(json!({
            "id": "t",
            "component": "Text",
            "usageHint": "caption",
            "textFieldType": "number"
        }))
        .unwrap();
        record.normalize_legacy();
        assert_eq!(record.variant.as_deref(), Some("caption"));
    }

    #[test]
    fn test_lenient_numbers() {
        let record: ComponentRecord = serde_json::from_value(json!({
            "id": "s",
            "component": "Slider",
            "min": "0",
            "max": 100,
            "step": "fast",
            "weight": null
        }))
        .unwrap();
        assert_eq!(record.min, Some(0.0));
        assert_eq!(record.max, Some(100.0));
        assert_eq!(record.step, None);
        assert_eq!(record.weight, None);
    }

    #[test]
    fn test_missing_required_fields() {
        assert!(serde_json::from_value::<ComponentRecord>(json!({"id": "x"})).is_err());
        assert!(serde_json::from_value::<ComponentRecord>(json!({"component": "Text"})).is_err());
    }

    #[test]
    fn test_action_shapes() {
        let current: ActionDefinition = serde_json::from_value(json!({
            "event": {"name": "submit", "context": {"email": {"path": "/email"}, "source": "form"}}
        }))
        .unwrap();
        let legacy: ActionDefinition = serde_json::from_value(json!({
            "name": "submit",
            "context": [
                {"key": "email", "value": {"path": "/email"}},
                {"key": "source", "value": {"literalString": "form"}},
                {"path": "/malformed"}
            ]
        }))
        .unwrap();
        assert_eq!(current, legacy);
        match &current {
            ActionDefinition::Event { name, context } => {
                assert_eq!(name, "submit");
                assert_eq!(context["email"], DynamicValue::path("/email"));
                assert_eq!(context["source"], DynamicValue::literal("form"));
            }
            other => panic!("Expected Event, got {:?}", other),
        }

        let call: ActionDefinition = serde_json::from_value(json!({
            "functionCall": {"call": "openUrl", "args": {"url": "https://example.com"}}
        }))
        .unwrap();
        assert_eq!(call.name(), "openUrl");

        assert!(serde_json::from_value::<ActionDefinition>(json!({"context": {}})).is_err());
    }

    #[test]
    fn test_action_serializes_canonically() {
        let action = ActionDefinition::event("refresh");
        assert_eq!(
            serde_json::to_value(&action).unwrap(),
            json!({"event": {"name": "refresh", "context": {}}})
        );
        let back: ActionDefinition = serde_json::from_value(serde_json::to_value(&action).unwrap()).unwrap();
        assert_eq!(back, action);
    }

    #[test]
    fn test_bound_path() {
        let record: ComponentRecord = serde_json::from_value(json!({
            "id": "f", "component": "TextField", "value": {"path": "/form/name"}
        }))
        .unwrap();
        assert_eq!(record.bound_path(), Some("/form/name"));
        assert_eq!(ComponentRecord::new("t", "Text").bound_path(), None);
    }
}
