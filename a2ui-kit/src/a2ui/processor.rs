//! A2UI Message Processor
//!
//! Owns every surface, its component table and its data model, and applies
//! incoming messages to them. Each message is applied to a private copy of
//! the state and published with a single pointer swap, so readers holding
//! an [`Arc<Surface>`] always see a consistent view.

use std::any::Any;
use std::collections::HashMap;
use std::panic::{self, AssertUnwindSafe};
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, RwLock};

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::action::{Action, ActionDispatcher, ActionHandler, DispatchOutcome, DropReason};
use super::component::{ActionDefinition, ComponentRecord};
use super::config::ProcessorConfig;
use super::data_model::DataModel;
use super::error::{A2uiError, DataModelError, ErrorRecord, IdKind};
use super::functions::FunctionLibrary;
use super::message::{
    A2uiMessage, CreateSurface, DeleteSurface, UpdateComponents, UpdateDataModel, UpdateMode, decode_batch,
    decode_message, decode_value,
};
use super::path::is_valid_id;
use super::registry::A2uiComponentType;
use super::resolver::{Resolver, TemplateItem};
use super::safe_regex::SafeRegex;
use super::value::{ChildList, DynamicValue, FunctionCall};

/// Surface-level configuration set by `createSurface`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SurfaceContext {
    pub surface_id: String,
    pub catalog_id: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub theme: Option<Value>,

    #[serde(default)]
    pub send_data_model: bool,
}

impl From<CreateSurface> for SurfaceContext {
    fn from(msg: CreateSurface) -> Self {
        SurfaceContext {
            surface_id: msg.surface_id,
            catalog_id: msg.catalog_id,
            theme: msg.theme,
            send_data_model: msg.send_data_model,
        }
    }
}

/// Represents a UI surface with its component table and data model.
#[derive(Debug, Clone)]
pub struct Surface {
    pub context: SurfaceContext,

    /// Component records by ID, in first-seen order
    pub components: IndexMap<String, ComponentRecord>,

    pub data_model: DataModel,

    /// Bumped once per committed message touching this surface
    pub version: u64,
}

impl Surface {
    pub fn new(context: SurfaceContext, max_data_model_entries: usize) -> Self {
        Surface {
            context,
            components: IndexMap::new(),
            data_model: DataModel::with_max_entries(max_data_model_entries),
            version: 1,
        }
    }

    pub fn id(&self) -> &str {
        &self.context.surface_id
    }

    /// Get a component by ID
    pub fn get_component(&self, id: &str) -> Option<&ComponentRecord> {
        self.components.get(id)
    }

    /// Get all component IDs
    pub fn component_ids(&self) -> impl Iterator<Item = &String> {
        self.components.keys()
    }

    /// The conventional entry point of the tree
    pub fn root(&self) -> Option<&ComponentRecord> {
        self.components.get("root")
    }
}

/// Outcome of the last message applied to a surface. Advisory only.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SurfaceStatus {
    Idle,
    Error(String),
}

/// Event emitted when a surface is created (or its context replaced)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SurfaceCreatedEvent {
    pub surface_id: String,
    pub version: u64,
    pub replaced: bool,
}

/// Event emitted when components are upserted
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SurfaceUpdatedEvent {
    pub surface_id: String,
    pub version: u64,
    pub updated_components: Vec<String>,
}

/// Event emitted when a surface is deleted
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SurfaceDeletedEvent {
    pub surface_id: String,
}

/// Event emitted when data model is updated
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataModelUpdatedEvent {
    pub surface_id: String,
    pub version: u64,
    pub updated_paths: Vec<String>,
}

/// Event emitted after a snapshot was restored
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StateRestoredEvent {
    pub surface_ids: Vec<String>,
}

/// Events that can be emitted by the processor
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProcessorEvent {
    SurfaceCreated(SurfaceCreatedEvent),
    SurfaceUpdated(SurfaceUpdatedEvent),
    SurfaceDeleted(SurfaceDeletedEvent),
    DataModelUpdated(DataModelUpdatedEvent),
    StateRestored(StateRestoredEvent),
}

impl ProcessorEvent {
    /// Surface the event concerns; `None` for whole-state events
    pub fn surface_id(&self) -> Option<&str> {
        match self {
            ProcessorEvent::SurfaceCreated(e) => Some(&e.surface_id),
            ProcessorEvent::SurfaceUpdated(e) => Some(&e.surface_id),
            ProcessorEvent::SurfaceDeleted(e) => Some(&e.surface_id),
            ProcessorEvent::DataModelUpdated(e) => Some(&e.surface_id),
            ProcessorEvent::StateRestored(_) => None,
        }
    }
}

/// Surfaces by ID, in creation order.
pub type SurfaceMap = IndexMap<String, Arc<Surface>>;

pub(crate) type Applied = Result<Vec<ProcessorEvent>, A2uiError>;

/// The A2UI message processor.
///
/// Manages surfaces, component tables, and data models. Mutations are
/// serialized; reads never block on a mutation in progress.
///
/// # Example
///
/// ```rust
/// use a2ui_kit::a2ui::{A2uiMessageProcessor, DynamicValue};
///
/// let processor = A2uiMessageProcessor::new();
/// processor
///     .process_message(r#"{"createSurface": {"surfaceId": "main", "catalogId": "standard"}}"#)
///     .unwrap();
/// processor
///     .process_message(r#"{"updateComponents": {"surfaceId": "main", "components": [
///         {"id": "root", "component": "Text", "text": {"path": "/greeting"}}
///     ]}}"#)
///     .unwrap();
/// processor
///     .process_message(r#"{"updateDataModel": {"surfaceId": "main", "path": "/greeting", "value": "Hi"}}"#)
///     .unwrap();
///
/// let root = processor.get_component("main", "root").unwrap();
/// let text = processor.resolve_value("main", root.text.as_ref().unwrap(), None);
/// assert_eq!(text, "Hi");
/// ```
pub struct A2uiMessageProcessor {
    pub(crate) config: ProcessorConfig,
    functions: FunctionLibrary,
    regex: SafeRegex,
    dispatcher: ActionDispatcher,

    /// Last committed state
    committed: RwLock<Arc<SurfaceMap>>,

    /// Serializes writers
    write_gate: Mutex<()>,

    statuses: Mutex<HashMap<String, SurfaceStatus>>,
    subscribers: Mutex<Vec<Sender<ProcessorEvent>>>,
    last_error: Mutex<Option<ErrorRecord>>,
}

impl std::fmt::Debug for A2uiMessageProcessor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("A2uiMessageProcessor")
            .field("config", &self.config)
            .field("surfaces", &self.surface_ids())
            .finish_non_exhaustive()
    }
}

impl Default for A2uiMessageProcessor {
    fn default() -> Self {
        Self::new()
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    payload
        .downcast_ref::<&str>()
        .map(|s| s.to_string())
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "panic while applying message".to_string())
}

impl A2uiMessageProcessor {
    /// Create a new processor with the default configuration
    pub fn new() -> Self {
        Self::build(ProcessorConfig::default())
    }

    /// Create a new processor after validating `config`
    pub fn with_config(config: ProcessorConfig) -> Result<Self, A2uiError> {
        config.validate()?;
        Ok(Self::build(config))
    }

    fn build(config: ProcessorConfig) -> Self {
        A2uiMessageProcessor {
            functions: FunctionLibrary::standard(),
            regex: SafeRegex::new(config.regex_timeout()),
            dispatcher: ActionDispatcher::new(config.allowed_url_schemes.clone()),
            committed: RwLock::new(Arc::new(SurfaceMap::new())),
            write_gate: Mutex::new(()),
            statuses: Mutex::new(HashMap::new()),
            subscribers: Mutex::new(Vec::new()),
            last_error: Mutex::new(None),
            config,
        }
    }

    pub fn config(&self) -> &ProcessorConfig {
        &self.config
    }

    /// Get the function library used for `functionCall` values
    pub fn functions(&self) -> &FunctionLibrary {
        &self.functions
    }

    // ========================================================================
    // Message processing
    // ========================================================================

    /// Decode and apply one raw message.
    ///
    /// A failed message leaves the committed state untouched and is kept as
    /// the [`last_error`](Self::last_error).
    pub fn process_message(&self, raw: &str) -> Applied {
        match decode_message(raw, self.config.max_message_bytes) {
            Ok(decoded) => self.apply_message(decoded.message),
            Err(e) => self.fail(e.into()),
        }
    }

    /// Decode a JSON array of envelopes and apply each as its own message.
    ///
    /// The outer error covers a batch that cannot be split at all.
    pub fn process_batch(&self, raw: &str) -> Result<Vec<Applied>, A2uiError> {
        let items = match decode_batch(raw, self.config.max_message_bytes) {
            Ok(items) => items,
            Err(e) => return self.fail(e.into()).map(|_| Vec::new()),
        };

        Ok(items
            .into_iter()
            .enumerate()
            .map(|(index, item)| match decode_value(item) {
                Ok(decoded) => self.apply_message(decoded.message),
                Err(e) => {
                    log::error!("[A2UI] Batch element {} could not be decoded", index);
                    self.fail(e.into())
                }
            })
            .collect())
    }

    /// Apply an already decoded message
    pub fn apply_message(&self, message: A2uiMessage) -> Applied {
        let surface_id = message.surface_id().to_string();
        let kind = message.kind();
        let result = self.transact(Some(&surface_id), |surfaces, config| {
            apply_to(surfaces, config, message)
        });
        if result.is_ok() {
            log::debug!("[A2UI] Applied {} on '{}'", kind, surface_id);
        }
        result
    }

    /// Write a value from the UI (two-way binding).
    ///
    /// Goes through the same validation as agent updates.
    pub fn update_data_model(&self, surface_id: &str, path: &str, value: Value) -> Applied {
        self.apply_message(A2uiMessage::UpdateDataModel(UpdateDataModel::new(
            surface_id, path, value,
        )))
    }

    /// Run `f` against a private copy of the state and publish it on success.
    ///
    /// Nothing is published when `f` fails, panics, or reports no events.
    pub(crate) fn transact<F>(&self, status_for: Option<&str>, f: F) -> Applied
    where
        F: FnOnce(&mut SurfaceMap, &ProcessorConfig) -> Applied,
    {
        let _gate = lock(&self.write_gate);
        let mut next = SurfaceMap::clone(&self.surfaces());

        let result = panic::catch_unwind(AssertUnwindSafe(|| f(&mut next, &self.config)))
            .unwrap_or_else(|payload| Err(A2uiError::Internal(panic_message(payload.as_ref()))));

        match result {
            Ok(events) => {
                if !events.is_empty() {
                    *self.committed.write().unwrap_or_else(PoisonError::into_inner) = Arc::new(next);
                }
                if let Some(surface_id) = status_for {
                    self.set_status(surface_id, SurfaceStatus::Idle);
                }
                self.notify(&events);
                Ok(events)
            }
            Err(error) => {
                if let Some(surface_id) = status_for {
                    self.set_status(surface_id, SurfaceStatus::Error(error.to_string()));
                }
                self.fail(error)
            }
        }
    }

    fn fail(&self, error: A2uiError) -> Applied {
        log::error!("[A2UI] Message failed: {}", error);
        *lock(&self.last_error) = Some(ErrorRecord::new(error.clone()));
        Err(error)
    }

    fn set_status(&self, surface_id: &str, status: SurfaceStatus) {
        let exists = self.surfaces().contains_key(surface_id);
        let mut statuses = lock(&self.statuses);
        if exists {
            statuses.insert(surface_id.to_string(), status);
        } else {
            statuses.remove(surface_id);
        }
    }

    pub(crate) fn clear_statuses(&self) {
        lock(&self.statuses).clear();
    }

    fn notify(&self, events: &[ProcessorEvent]) {
        if events.is_empty() {
            return;
        }
        lock(&self.subscribers).retain(|tx| events.iter().all(|event| tx.send(event.clone()).is_ok()));
    }

    /// Receive every event from now on, in commit order.
    ///
    /// Dropping the receiver unsubscribes.
    pub fn subscribe(&self) -> Receiver<ProcessorEvent> {
        let (tx, rx) = mpsc::channel();
        lock(&self.subscribers).push(tx);
        rx
    }

    /// Delete every surface. Calling it again is a no-op.
    pub fn dispose(&self) {
        let result = self.transact(None, |surfaces, _| {
            let events = surfaces
                .keys()
                .map(|id| {
                    ProcessorEvent::SurfaceDeleted(SurfaceDeletedEvent {
                        surface_id: id.clone(),
                    })
                })
                .collect();
            surfaces.clear();
            Ok(events)
        });
        self.clear_statuses();
        if let Ok(events) = result {
            if !events.is_empty() {
                log::info!("[A2UI] Disposed {} surfaces", events.len());
            }
        }
    }

    // ========================================================================
    // Reads
    // ========================================================================

    /// The last committed state
    pub fn surfaces(&self) -> Arc<SurfaceMap> {
        self.committed
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Get a surface by ID
    pub fn get_surface(&self, surface_id: &str) -> Option<Arc<Surface>> {
        self.surfaces().get(surface_id).cloned()
    }

    /// Get all surface IDs
    pub fn surface_ids(&self) -> Vec<String> {
        self.surfaces().keys().cloned().collect()
    }

    pub fn get_component(&self, surface_id: &str, component_id: &str) -> Option<ComponentRecord> {
        self.get_surface(surface_id)?.get_component(component_id).cloned()
    }

    pub fn get_surface_context(&self, surface_id: &str) -> Option<SurfaceContext> {
        self.get_surface(surface_id).map(|s| s.context.clone())
    }

    /// Copy of a surface's whole data model
    pub fn get_data_model(&self, surface_id: &str) -> Option<Value> {
        self.get_surface(surface_id).map(|s| s.data_model.snapshot())
    }

    /// Value at `path`, or `null`
    pub fn get_value(&self, surface_id: &str, path: &str) -> Value {
        self.get_surface(surface_id)
            .and_then(|s| s.data_model.get(path).cloned())
            .unwrap_or(Value::Null)
    }

    pub fn surface_status(&self, surface_id: &str) -> Option<SurfaceStatus> {
        lock(&self.statuses).get(surface_id).cloned()
    }

    /// The most recent failure, if any
    pub fn last_error(&self) -> Option<ErrorRecord> {
        lock(&self.last_error).clone()
    }

    // ========================================================================
    // Resolution
    // ========================================================================

    /// Resolver over one surface view, for resolving many values at once
    pub fn resolver<'a>(&'a self, surface: &'a Surface) -> Resolver<'a> {
        Resolver::new(&surface.data_model, &self.functions, &self.regex)
    }

    /// Resolve a bound value; `null` when the surface does not exist
    pub fn resolve_value(&self, surface_id: &str, value: &DynamicValue, scope: Option<&str>) -> Value {
        match self.get_surface(surface_id) {
            Some(surface) => self.resolver(&surface).resolve(value, scope),
            None => Value::Null,
        }
    }

    /// Expand a child list into `(component, scope)` instances
    pub fn template_items(&self, surface_id: &str, children: &ChildList, scope: Option<&str>) -> Vec<TemplateItem> {
        match self.get_surface(surface_id) {
            Some(surface) => self.resolver(&surface).expand_children(children, scope),
            None => Vec::new(),
        }
    }

    /// Run a component's checks and return the messages of failing ones.
    ///
    /// Checks without a `value` argument are evaluated against the
    /// component's own bound value.
    pub fn evaluate_checks(&self, surface_id: &str, component_id: &str, scope: Option<&str>) -> Vec<String> {
        let Some(surface) = self.get_surface(surface_id) else {
            return Vec::new();
        };
        let Some(record) = surface.get_component(component_id) else {
            return Vec::new();
        };
        let resolver = self.resolver(&surface);
        let bound = record.value.as_ref().or(record.text.as_ref());
        let mut failures = Vec::new();

        for check in &record.checks {
            let mut args = check.args.clone();
            if let Some(bound) = bound {
                args.entry("value").or_insert_with(|| bound.to_json());
            }
            let call = DynamicValue::FunctionCall(FunctionCall::new(check.call.clone(), args));
            if !resolver.resolve_bool(&call, scope) {
                failures.push(if check.message.is_empty() {
                    format!("{} check failed", check.call)
                } else {
                    check.message.clone()
                });
            }
        }

        if let Some(pattern) = &record.validation_regexp {
            let input = bound
                .map(|b| resolver.resolve_string(b, scope))
                .unwrap_or_default();
            if !self.regex.full_match(pattern, &input).is_match() {
                failures.push("Value does not match the required format".to_string());
            }
        }

        failures
    }

    // ========================================================================
    // Actions
    // ========================================================================

    /// Resolve an action definition under a template scope
    pub fn resolve_action(&self, surface_id: &str, definition: &ActionDefinition, scope: Option<&str>) -> Option<Action> {
        let surface = self.get_surface(surface_id)?;
        let resolver = self.resolver(&surface);
        let action = match definition {
            ActionDefinition::Event { name, context } => Action::Event {
                name: name.clone(),
                context: context
                    .iter()
                    .map(|(key, value)| (key.clone(), resolver.resolve(value, scope)))
                    .collect(),
            },
            ActionDefinition::FunctionCall(call) => Action::FunctionCall(FunctionCall {
                call: call.call.clone(),
                args: resolver.resolve_args(&call.args, scope),
                return_type: call.return_type.clone(),
            }),
        };
        Some(action)
    }

    /// Resolve the action attached to a component
    pub fn component_action(&self, surface_id: &str, component_id: &str, scope: Option<&str>) -> Option<Action> {
        let record = self.get_component(surface_id, component_id)?;
        self.resolve_action(surface_id, record.action.as_ref()?, scope)
    }

    /// Dispatch a resolved action raised on a surface
    pub fn handle_action(&self, surface_id: &str, action: &Action) -> DispatchOutcome {
        let Some(surface) = self.get_surface(surface_id) else {
            log::warn!("[A2UI] Action '{}' for unknown surface '{}'", action.name(), surface_id);
            return DispatchOutcome::Dropped(DropReason::SurfaceNotFound);
        };
        let data_model = surface
            .context
            .send_data_model
            .then(|| surface.data_model.snapshot());
        self.dispatcher.dispatch(surface_id, action, data_model)
    }

    /// Install the host's action handler
    pub fn set_action_handler(&self, handler: Arc<dyn ActionHandler>) {
        self.dispatcher.set_handler(handler);
    }

    pub fn dispatcher(&self) -> &ActionDispatcher {
        &self.dispatcher
    }
}

// ============================================================================
// State transitions
// ============================================================================

pub(crate) fn apply_to(surfaces: &mut SurfaceMap, config: &ProcessorConfig, message: A2uiMessage) -> Applied {
    match message {
        A2uiMessage::CreateSurface(msg) => create_surface(surfaces, config, msg),
        A2uiMessage::UpdateComponents(msg) => update_components(surfaces, config, msg),
        A2uiMessage::UpdateDataModel(msg) => update_data_model(surfaces, msg),
        A2uiMessage::DeleteSurface(msg) => delete_surface(surfaces, msg),
    }
}

fn create_surface(surfaces: &mut SurfaceMap, config: &ProcessorConfig, msg: CreateSurface) -> Applied {
    if !is_valid_id(&msg.surface_id) {
        return Err(A2uiError::InvalidId {
            kind: IdKind::Surface,
            id: msg.surface_id,
        });
    }

    if let Some(existing) = surfaces.get_mut(&msg.surface_id) {
        log::warn!(
            "[A2UI] Surface '{}' already exists, replacing its context",
            msg.surface_id
        );
        let surface = Arc::make_mut(existing);
        surface.context = SurfaceContext::from(msg);
        surface.version += 1;
        return Ok(vec![ProcessorEvent::SurfaceCreated(SurfaceCreatedEvent {
            surface_id: surface.context.surface_id.clone(),
            version: surface.version,
            replaced: true,
        })]);
    }

    if surfaces.len() >= config.max_surfaces {
        return Err(A2uiError::SurfaceCapExceeded {
            surface_id: msg.surface_id,
            max: config.max_surfaces,
        });
    }

    let surface_id = msg.surface_id.clone();
    let surface = Surface::new(SurfaceContext::from(msg), config.max_data_model_entries);
    let version = surface.version;
    surfaces.insert(surface_id.clone(), Arc::new(surface));

    Ok(vec![ProcessorEvent::SurfaceCreated(SurfaceCreatedEvent {
        surface_id,
        version,
        replaced: false,
    })])
}

fn update_components(surfaces: &mut SurfaceMap, config: &ProcessorConfig, msg: UpdateComponents) -> Applied {
    let Some(entry) = surfaces.get_mut(&msg.surface_id) else {
        log::warn!(
            "[A2UI] updateComponents for unknown surface '{}', ignoring",
            msg.surface_id
        );
        return Ok(vec![]);
    };

    for rejected in &msg.rejected {
        log::warn!(
            "[A2UI] Skipping component #{} ({}) on '{}': {}",
            rejected.index,
            rejected.id.as_deref().unwrap_or("no id"),
            msg.surface_id,
            rejected.reason
        );
    }

    // Later duplicates of an id win, like successive upserts.
    let mut accepted: IndexMap<String, ComponentRecord> = IndexMap::new();
    for record in msg.components {
        if !is_valid_id(&record.id) {
            log::warn!(
                "[A2UI] Skipping component with invalid id {:?} on '{}'",
                record.id,
                msg.surface_id
            );
            continue;
        }
        if A2uiComponentType::from_tag(&record.component).is_none() {
            log::debug!(
                "[A2UI] Component '{}' uses non-standard type '{}'",
                record.id,
                record.component
            );
        }
        accepted.insert(record.id.clone(), record);
    }

    let existing = entry.components.len();
    let incoming = accepted
        .keys()
        .filter(|id| !entry.components.contains_key(id.as_str()))
        .count();
    if existing + incoming > config.max_components_per_surface {
        return Err(A2uiError::ComponentCapExceeded {
            surface_id: msg.surface_id,
            existing,
            incoming,
            max: config.max_components_per_surface,
        });
    }

    if accepted.is_empty() {
        return Ok(vec![]);
    }

    let surface = Arc::make_mut(entry);
    let updated_components: Vec<String> = accepted.keys().cloned().collect();
    surface.components.extend(accepted);
    surface.version += 1;

    Ok(vec![ProcessorEvent::SurfaceUpdated(SurfaceUpdatedEvent {
        surface_id: msg.surface_id,
        version: surface.version,
        updated_components,
    })])
}

fn update_data_model(surfaces: &mut SurfaceMap, msg: UpdateDataModel) -> Applied {
    let Some(entry) = surfaces.get_mut(&msg.surface_id) else {
        log::warn!(
            "[A2UI] updateDataModel for unknown surface '{}', ignoring",
            msg.surface_id
        );
        return Ok(vec![]);
    };

    let surface = Arc::make_mut(entry);
    let written = match msg.mode {
        UpdateMode::Replace => surface
            .data_model
            .update(&msg.path, msg.value)
            .map(|()| vec![msg.path.clone()]),
        UpdateMode::MergeKeys => merge_keys(&mut surface.data_model, &msg.path, msg.value),
    };
    let updated_paths = written.map_err(|source| A2uiError::DataModel {
        surface_id: msg.surface_id.clone(),
        source,
    })?;
    surface.version += 1;

    Ok(vec![ProcessorEvent::DataModelUpdated(DataModelUpdatedEvent {
        surface_id: msg.surface_id,
        version: surface.version,
        updated_paths,
    })])
}

fn merge_keys(model: &mut DataModel, base: &str, value: Value) -> Result<Vec<String>, DataModelError> {
    let Value::Object(entries) = value else {
        model.update(base, value)?;
        return Ok(vec![base.to_string()]);
    };

    let mut paths = Vec::with_capacity(entries.len());
    for (key, value) in entries {
        let path = if base == "/" {
            format!("/{}", key)
        } else {
            format!("{}/{}", base, key)
        };
        model.update(&path, value)?;
        paths.push(path);
    }
    Ok(paths)
}

fn delete_surface(surfaces: &mut SurfaceMap, msg: DeleteSurface) -> Applied {
    if surfaces.shift_remove(&msg.surface_id).is_none() {
        log::debug!(
            "[A2UI] deleteSurface for unknown surface '{}', ignoring",
            msg.surface_id
        );
        return Ok(vec![]);
    }

    Ok(vec![ProcessorEvent::SurfaceDeleted(SurfaceDeletedEvent {
        surface_id: msg.surface_id,
    })])
}
