//! A2UI Protocol Messages
//!
//! Decodes the four server-to-client envelopes and defines the outbound
//! [`UserAction`]. Decoding tolerates unknown fields and normalizes the
//! older point-release vocabulary, so the processor never branches on the
//! protocol version.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::component::ComponentRecord;
use super::error::DecodeError;

/// Hard cap on the size of a single raw message, in bytes.
pub const MAX_MESSAGE_BYTES: usize = 1024 * 1024;

/// Protocol versions whose vocabulary is known.
pub const KNOWN_VERSIONS: &[&str] = &["v0.8", "v0.9"];

const OPERATION_KEYS: &[&str] = &["createSurface", "updateComponents", "updateDataModel", "deleteSurface"];

/// A decoded server-to-client message.
#[derive(Debug, Clone, PartialEq)]
pub enum A2uiMessage {
    /// Initialize a new UI surface
    CreateSurface(CreateSurface),

    /// Add or replace components
    UpdateComponents(UpdateComponents),

    /// Write into the data model
    UpdateDataModel(UpdateDataModel),

    /// Delete a surface
    DeleteSurface(DeleteSurface),
}

impl A2uiMessage {
    /// Get the surface ID this message applies to
    pub fn surface_id(&self) -> &str {
        match self {
            A2uiMessage::CreateSurface(m) => &m.surface_id,
            A2uiMessage::UpdateComponents(m) => &m.surface_id,
            A2uiMessage::UpdateDataModel(m) => &m.surface_id,
            A2uiMessage::DeleteSurface(m) => &m.surface_id,
        }
    }

    /// Envelope key of this message
    pub fn kind(&self) -> &'static str {
        match self {
            A2uiMessage::CreateSurface(_) => "createSurface",
            A2uiMessage::UpdateComponents(_) => "updateComponents",
            A2uiMessage::UpdateDataModel(_) => "updateDataModel",
            A2uiMessage::DeleteSurface(_) => "deleteSurface",
        }
    }
}

/// A message together with the envelope's advisory version.
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedMessage {
    pub version: Option<String>,
    pub message: A2uiMessage,
}

/// Initialize a new UI surface.
///
/// # Example JSON
///
/// ```text
/// {
///   "version": "v0.9",
///   "createSurface": {
///     "surfaceId": "main",
///     "catalogId": "standard",
///     "theme": {"primaryColor": "#00BFFF"},
///     "sendDataModel": true
///   }
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateSurface {
    pub surface_id: String,

    /// Component catalog the surface renders with
    pub catalog_id: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub theme: Option<Value>,

    /// Attach a data model snapshot to outgoing actions
    #[serde(default)]
    pub send_data_model: bool,
}

/// Add or replace components on a surface.
///
/// Records that fail to decode are listed in `rejected` instead of failing
/// the whole message.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct UpdateComponents {
    pub surface_id: String,
    pub components: Vec<ComponentRecord>,
    pub rejected: Vec<RejectedComponent>,
}

/// A component record that could not be decoded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RejectedComponent {
    /// Position in the incoming `components` array
    pub index: usize,
    pub id: Option<String>,
    pub reason: String,
}

/// How an [`UpdateDataModel`] applies its value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UpdateMode {
    /// Set (or delete, for `null`) the value at `path`
    #[default]
    Replace,

    /// Set each key of the value object under `path`
    MergeKeys,
}

/// Write into a surface's data model.
///
/// # Example JSON
///
/// ```text
/// {"updateDataModel": {"surfaceId": "main", "path": "/user/name", "value": "Ada"}}
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct UpdateDataModel {
    pub surface_id: String,
    pub path: String,
    pub value: Value,
    pub mode: UpdateMode,
}

impl UpdateDataModel {
    pub fn new(surface_id: impl Into<String>, path: impl Into<String>, value: Value) -> Self {
        UpdateDataModel {
            surface_id: surface_id.into(),
            path: path.into(),
            value,
            mode: UpdateMode::Replace,
        }
    }
}

/// Delete a surface.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteSurface {
    pub surface_id: String,
}

/// Outbound message sent when the user triggers an event action.
///
/// # Example JSON
///
/// ```text
/// {
///   "surfaceId": "main",
///   "actionName": "submit",
///   "context": {"email": "ada@example.com"},
///   "dataModel": {"form": {"email": "ada@example.com"}}
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserAction {
    pub surface_id: String,
    pub action_name: String,

    #[serde(default)]
    pub context: Map<String, Value>,

    /// Full data model, when the surface was created with `sendDataModel`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_model: Option<Value>,
}

// ============================================================================
// Decoding
// ============================================================================

/// Decode one raw message.
///
/// Size and emptiness are checked before anything is parsed.
pub fn decode_message(raw: &str, max_bytes: usize) -> Result<DecodedMessage, DecodeError> {
    if raw.len() > max_bytes {
        return Err(DecodeError::TooLarge {
            len: raw.len(),
            max: max_bytes,
        });
    }
    if raw.trim().is_empty() {
        return Err(DecodeError::Empty);
    }
    let value: Value = serde_json::from_str(raw).map_err(|e| DecodeError::Json(e.to_string()))?;
    decode_value(value)
}

/// Split a batch of envelopes into its elements.
///
/// A JSON array yields its elements; a single object is a batch of one.
/// The size cap applies to the whole batch.
pub fn decode_batch(raw: &str, max_bytes: usize) -> Result<Vec<Value>, DecodeError> {
    if raw.len() > max_bytes {
        return Err(DecodeError::TooLarge {
            len: raw.len(),
            max: max_bytes,
        });
    }
    if raw.trim().is_empty() {
        return Err(DecodeError::Empty);
    }
    match serde_json::from_str::<Value>(raw).map_err(|e| DecodeError::Json(e.to_string()))? {
        Value::Array(items) => Ok(items),
        object @ Value::Object(_) => Ok(vec![object]),
        _ => Err(DecodeError::NotAnObject),
    }
}

/// Decode an already parsed envelope.
pub fn decode_value(value: Value) -> Result<DecodedMessage, DecodeError> {
    let Value::Object(mut envelope) = value else {
        return Err(DecodeError::NotAnObject);
    };

    let present: Vec<&'static str> = OPERATION_KEYS
        .iter()
        .copied()
        .filter(|key| envelope.contains_key(*key))
        .collect();
    let kind = match present.as_slice() {
        [] => return Err(DecodeError::UnknownMessage),
        [kind] => *kind,
        _ => return Err(DecodeError::AmbiguousMessage(present)),
    };

    let version = envelope
        .get("version")
        .and_then(Value::as_str)
        .map(str::to_string);
    if let Some(version) = &version {
        if !KNOWN_VERSIONS.contains(&version.as_str()) {
            log::debug!(
                "[A2UI] Unrecognized protocol version '{}', decoding with all known aliases",
                version
            );
        }
    }

    let payload = match envelope.remove(kind) {
        Some(Value::Object(payload)) => payload,
        _ => {
            return Err(DecodeError::InvalidPayload {
                kind,
                reason: "payload must be an object".to_string(),
            });
        }
    };

    let message = match kind {
        "createSurface" => A2uiMessage::CreateSurface(decode_create_surface(payload)?),
        "updateComponents" => A2uiMessage::UpdateComponents(decode_update_components(payload)?),
        "updateDataModel" => A2uiMessage::UpdateDataModel(decode_update_data_model(payload)?),
        _ => A2uiMessage::DeleteSurface(typed(kind, payload)?),
    };

    Ok(DecodedMessage { version, message })
}

fn typed<T: serde::de::DeserializeOwned>(kind: &'static str, payload: Map<String, Value>) -> Result<T, DecodeError> {
    serde_json::from_value(Value::Object(payload)).map_err(|e| DecodeError::InvalidPayload {
        kind,
        reason: e.to_string(),
    })
}

fn surface_id(kind: &'static str, payload: &Map<String, Value>) -> Result<String, DecodeError> {
    match payload.get("surfaceId") {
        Some(Value::String(id)) => Ok(id.clone()),
        _ => Err(DecodeError::InvalidPayload {
            kind,
            reason: "missing string field `surfaceId`".to_string(),
        }),
    }
}

fn decode_create_surface(mut payload: Map<String, Value>) -> Result<CreateSurface, DecodeError> {
    if !payload.contains_key("theme") {
        if let Some(styles) = payload.remove("styles") {
            payload.insert("theme".to_string(), styles);
        }
    }
    typed("createSurface", payload)
}

fn decode_update_components(mut payload: Map<String, Value>) -> Result<UpdateComponents, DecodeError> {
    const KIND: &str = "updateComponents";
    let surface_id = surface_id(KIND, &payload)?;
    let raw = match payload.remove("components") {
        Some(Value::Array(raw)) => raw,
        _ => {
            return Err(DecodeError::InvalidPayload {
                kind: KIND,
                reason: "missing array field `components`".to_string(),
            });
        }
    };

    let mut components = Vec::with_capacity(raw.len());
    let mut rejected = Vec::new();
    for (index, value) in raw.into_iter().enumerate() {
        let value = flatten_nested_component(value);
        let id = value.get("id").and_then(Value::as_str).map(str::to_string);
        match serde_json::from_value::<ComponentRecord>(value) {
            Ok(mut record) => {
                record.normalize_legacy();
                components.push(record);
            }
            Err(e) => rejected.push(RejectedComponent {
                index,
                id,
                reason: e.to_string(),
            }),
        }
    }

    Ok(UpdateComponents {
        surface_id,
        components,
        rejected,
    })
}

/// `{"id": "t", "component": {"Text": {...}}}` becomes
/// `{"id": "t", "component": "Text", ...}`; outer properties win.
fn flatten_nested_component(value: Value) -> Value {
    let Value::Object(mut record) = value else {
        return value;
    };
    let nested = match record.get_mut("component") {
        Some(Value::Object(nested)) if nested.len() == 1 => std::mem::take(nested),
        _ => return Value::Object(record),
    };

    if let Some((tag, props)) = nested.into_iter().next() {
        record.insert("component".to_string(), Value::String(tag));
        if let Value::Object(props) = props {
            for (key, prop) in props {
                record.entry(key).or_insert(prop);
            }
        }
    }
    Value::Object(record)
}

fn decode_update_data_model(mut payload: Map<String, Value>) -> Result<UpdateDataModel, DecodeError> {
    const KIND: &str = "updateDataModel";
    let surface_id = surface_id(KIND, &payload)?;
    let path = match payload.remove("path") {
        None | Some(Value::Null) => "/".to_string(),
        Some(Value::String(path)) => path,
        Some(_) => {
            return Err(DecodeError::InvalidPayload {
                kind: KIND,
                reason: "`path` must be a string".to_string(),
            });
        }
    };

    if !payload.contains_key("value") {
        if let Some(Value::Array(contents)) = payload.remove("contents") {
            return Ok(UpdateDataModel {
                surface_id,
                path,
                value: Value::Object(legacy_contents(&contents)),
                mode: UpdateMode::MergeKeys,
            });
        }
    }

    Ok(UpdateDataModel {
        surface_id,
        path,
        value: payload.remove("value").unwrap_or(Value::Null),
        mode: UpdateMode::Replace,
    })
}

/// Older `contents` lists: `[{"key": "name", "valueString": "Ada"}, ...]`.
fn legacy_contents(items: &[Value]) -> Map<String, Value> {
    items
        .iter()
        .filter_map(|item| {
            let entry = item.as_object()?;
            let key = entry.get("key")?.as_str()?;
            Some((key.to_string(), legacy_value(entry)))
        })
        .collect()
}

fn legacy_value(entry: &Map<String, Value>) -> Value {
    for key in ["valueString", "valueNumber", "valueBoolean"] {
        if let Some(value) = entry.get(key) {
            return value.clone();
        }
    }
    if let Some(Value::Array(items)) = entry.get("valueMap") {
        return Value::Object(legacy_contents(items));
    }
    if let Some(Value::Array(items)) = entry.get("valueArray") {
        return Value::Array(
            items
                .iter()
                .map(|item| item.as_object().map(legacy_value).unwrap_or(Value::Null))
                .collect(),
        );
    }
    Value::Null
}
