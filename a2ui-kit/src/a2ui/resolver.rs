//! Dynamic Value Resolution
//!
//! Turns [`DynamicValue`]s into concrete JSON against one surface's data
//! model. Resolution is read-only and total: absent paths, invalid paths
//! and unknown functions all come back as `null`.

use serde_json::{Map, Value};

use super::data_model::DataModel;
use super::functions::{FunctionContext, FunctionLibrary, as_number, display_string};
use super::path::is_valid_path;
use super::safe_regex::SafeRegex;
use super::value::{ChildList, DynamicValue};

/// Nesting limit for function calls inside function arguments.
pub const MAX_CALL_DEPTH: usize = 16;

/// Apply template scope to a path.
///
/// Relative paths are joined onto `scope`; absolute paths and paths without
/// a scope are returned unchanged.
///
/// ```
/// use a2ui_kit::a2ui::resolve_path;
///
/// assert_eq!(resolve_path("name", Some("/items/2")), "/items/2/name");
/// assert_eq!(resolve_path("/title", Some("/items/2")), "/title");
/// assert_eq!(resolve_path("name", None), "name");
/// ```
pub fn resolve_path(path: &str, scope: Option<&str>) -> String {
    match scope {
        Some(scope) if !path.starts_with('/') => {
            format!("{}/{}", scope.trim_end_matches('/'), path)
        }
        _ => path.to_string(),
    }
}

/// One rendered instance of a child component.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemplateItem {
    pub component_id: String,
    /// Scope relative paths inside this instance resolve against
    pub scope: Option<String>,
}

/// Read-only evaluator bound to a single data model.
#[derive(Debug, Clone, Copy)]
pub struct Resolver<'a> {
    data_model: &'a DataModel,
    functions: &'a FunctionLibrary,
    regex: &'a SafeRegex,
}

impl<'a> Resolver<'a> {
    pub fn new(data_model: &'a DataModel, functions: &'a FunctionLibrary, regex: &'a SafeRegex) -> Self {
        Resolver {
            data_model,
            functions,
            regex,
        }
    }

    /// Resolve a value under an optional template scope
    pub fn resolve(&self, value: &DynamicValue, scope: Option<&str>) -> Value {
        self.resolve_at(value, scope, 0)
    }

    /// Resolve and render as text
    pub fn resolve_string(&self, value: &DynamicValue, scope: Option<&str>) -> String {
        display_string(&self.resolve(value, scope))
    }

    /// Resolve as a number; numeric strings count
    pub fn resolve_number(&self, value: &DynamicValue, scope: Option<&str>) -> Option<f64> {
        as_number(&self.resolve(value, scope))
    }

    /// Resolve as a boolean; anything but `true` is false
    pub fn resolve_bool(&self, value: &DynamicValue, scope: Option<&str>) -> bool {
        self.resolve(value, scope).as_bool().unwrap_or(false)
    }

    /// Read a data model path under a scope
    pub fn get(&self, path: &str, scope: Option<&str>) -> Value {
        self.data_model
            .get(&resolve_path(path, scope))
            .cloned()
            .unwrap_or(Value::Null)
    }

    /// Resolve every argument of a call, recursing into nested dynamic values
    pub fn resolve_args(&self, args: &Map<String, Value>, scope: Option<&str>) -> Map<String, Value> {
        self.resolve_args_at(args, scope, 0)
    }

    fn resolve_at(&self, value: &DynamicValue, scope: Option<&str>, depth: usize) -> Value {
        match value {
            DynamicValue::Literal(v) => v.clone(),
            DynamicValue::Path(path) => self.get(path, scope),
            DynamicValue::FunctionCall(call) => {
                if depth >= MAX_CALL_DEPTH {
                    log::warn!(
                        "[A2UI] Function call '{}' nested deeper than {}, resolving to null",
                        call.call,
                        MAX_CALL_DEPTH
                    );
                    return Value::Null;
                }
                let args = self.resolve_args_at(&call.args, scope, depth + 1);
                let ctx = FunctionContext {
                    data_model: Some(self.data_model),
                    regex: self.regex,
                };
                self.functions.call(&call.call, &args, &ctx)
            }
        }
    }

    fn resolve_args_at(&self, args: &Map<String, Value>, scope: Option<&str>, depth: usize) -> Map<String, Value> {
        args.iter()
            .map(|(name, raw)| (name.clone(), self.resolve_arg(raw, scope, depth)))
            .collect()
    }

    fn resolve_arg(&self, raw: &Value, scope: Option<&str>, depth: usize) -> Value {
        if DynamicValue::is_dynamic_shape(raw) {
            return self.resolve_at(&DynamicValue::from_json(raw.clone()), scope, depth);
        }
        match raw {
            Value::Array(items) => Value::Array(
                items
                    .iter()
                    .map(|item| self.resolve_arg(item, scope, depth))
                    .collect(),
            ),
            other => other.clone(),
        }
    }

    /// Expand a child list into concrete instances.
    ///
    /// Explicit children inherit `scope`. A template yields one instance per
    /// list element or mapping key found at its (scoped) path.
    pub fn expand_children(&self, children: &ChildList, scope: Option<&str>) -> Vec<TemplateItem> {
        match children {
            ChildList::Explicit(ids) => ids
                .iter()
                .map(|id| TemplateItem {
                    component_id: id.clone(),
                    scope: scope.map(str::to_string),
                })
                .collect(),
            ChildList::Template { path, component_id } => {
                let full = resolve_path(path, scope);
                let base = full.trim_end_matches('/');
                let item = |key: String| TemplateItem {
                    component_id: component_id.clone(),
                    scope: Some(format!("{}/{}", base, key)),
                };

                match self.data_model.get(&full) {
                    Some(Value::Array(items)) => (0..items.len()).map(|i| item(i.to_string())).collect(),
                    Some(Value::Object(map)) => map
                        .keys()
                        .filter(|key| is_valid_path(&format!("/{}", key)))
                        .map(|key| item(key.clone()))
                        .collect(),
                    _ => Vec::new(),
                }
            }
        }
    }
}
