//! A2UI Function Library
//!
//! The fixed set of functions a `functionCall` value may name. Functions are
//! looked up by name in a table, receive their arguments already resolved to
//! concrete JSON values, and never fail: missing or mistyped arguments yield
//! `null` or `false`.
//!
//! | Validation | Formatting |
//! |------------|------------|
//! | `required`, `email`, `url`, `phone`, `regex` | `formatString` |
//! | `numeric`, `length`, `min`, `max` | `formatNumber`, `formatCurrency` |
//! | `and`, `or`, `not` | `formatDate`, `pluralize` |

use std::collections::HashMap;

use serde_json::{Map, Value};

use super::data_model::DataModel;
use super::safe_regex::SafeRegex;

mod format;
mod validation;

pub use format::format_decimal;

/// Everything a function may consult besides its arguments.
#[derive(Debug, Clone, Copy)]
pub struct FunctionContext<'a> {
    /// Data model of the surface the call is evaluated on
    pub data_model: Option<&'a DataModel>,

    /// Guard used for agent-supplied patterns
    pub regex: &'a SafeRegex,
}

/// Signature shared by every library function.
pub type FunctionImpl = fn(&Map<String, Value>, &FunctionContext<'_>) -> Value;

/// Name-to-implementation table.
#[derive(Clone)]
pub struct FunctionLibrary {
    functions: HashMap<String, FunctionImpl>,
}

impl std::fmt::Debug for FunctionLibrary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut names: Vec<&str> = self.names().collect();
        names.sort_unstable();
        f.debug_struct("FunctionLibrary").field("functions", &names).finish()
    }
}

impl Default for FunctionLibrary {
    fn default() -> Self {
        Self::standard()
    }
}

impl FunctionLibrary {
    /// Create an empty library
    pub fn new() -> Self {
        FunctionLibrary {
            functions: HashMap::new(),
        }
    }

    /// Create a library with every standard function registered
    pub fn standard() -> Self {
        let mut library = Self::new();

        library.register("required", validation::required);
        library.register("email", validation::email);
        library.register("url", validation::url);
        library.register("phone", validation::phone);
        library.register("regex", validation::regex);
        library.register("numeric", validation::numeric);
        library.register("length", validation::length);
        library.register("min", validation::min);
        library.register("max", validation::max);
        library.register("and", validation::and);
        library.register("or", validation::or);
        library.register("not", validation::not);

        library.register("formatString", format::format_string);
        library.register("formatNumber", format::format_number);
        library.register("formatCurrency", format::format_currency);
        library.register("formatDate", format::format_date);
        library.register("pluralize", format::pluralize);

        library
    }

    /// Register (or replace) a function
    pub fn register(&mut self, name: impl Into<String>, function: FunctionImpl) {
        self.functions.insert(name.into(), function);
    }

    /// Check if a function is registered
    pub fn contains(&self, name: &str) -> bool {
        self.functions.contains_key(name)
    }

    /// Names of all registered functions
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.functions.keys().map(String::as_str)
    }

    /// Call a function by name. Unknown names resolve to `null`.
    pub fn call(&self, name: &str, args: &Map<String, Value>, ctx: &FunctionContext<'_>) -> Value {
        match self.functions.get(name) {
            Some(function) => function(args, ctx),
            None => {
                log::debug!("[A2UI] Unknown function '{}', resolving to null", name);
                Value::Null
            }
        }
    }
}

// ============================================================================
// Argument helpers
// ============================================================================

/// Argument by name; explicit `null` counts as missing.
pub(crate) fn arg<'a>(args: &'a Map<String, Value>, name: &str) -> Option<&'a Value> {
    args.get(name).filter(|v| !v.is_null())
}

/// Numbers, and strings that parse as numbers.
pub(crate) fn as_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok().filter(|n| n.is_finite()),
        _ => None,
    }
}

pub(crate) fn number_arg(args: &Map<String, Value>, name: &str) -> Option<f64> {
    arg(args, name).and_then(as_number)
}

pub(crate) fn string_arg<'a>(args: &'a Map<String, Value>, name: &str) -> Option<&'a str> {
    arg(args, name).and_then(Value::as_str)
}

/// Only a literal `true` is truthy.
pub(crate) fn is_true(value: &Value) -> bool {
    value.as_bool() == Some(true)
}

/// Text shown for a value when it is interpolated or rendered.
///
/// Integral numbers print without a fraction, `null` prints as nothing and
/// containers print as compact JSON.
pub fn display_string(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => match n.as_f64() {
            Some(f) if n.is_f64() && f.fract() == 0.0 && f.abs() < 1e15 => format!("{}", f as i64),
            _ => n.to_string(),
        },
        other => other.to_string(),
    }
}
