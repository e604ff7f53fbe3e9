//! Validation functions. Each returns a JSON boolean, except `not` which
//! returns `null` when its operand is not a boolean.

use std::sync::OnceLock;

use regex::Regex;
use serde_json::{Map, Value};

use super::{FunctionContext, arg, as_number, is_true, number_arg, string_arg};

fn email_pattern() -> &'static Regex {
    static EMAIL: OnceLock<Regex> = OnceLock::new();
    EMAIL.get_or_init(|| {
        Regex::new(r"^[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}$")
            .expect("static pattern compiles")
    })
}

fn url_pattern() -> &'static Regex {
    static URL: OnceLock<Regex> = OnceLock::new();
    URL.get_or_init(|| {
        Regex::new(r"^(?:[A-Za-z][A-Za-z0-9+.-]*://)?[A-Za-z0-9-]+(?:\.[A-Za-z0-9-]+)+(?::\d{1,5})?(?:[/?#]\S*)?$")
            .expect("static pattern compiles")
    })
}

fn phone_pattern() -> &'static Regex {
    static PHONE: OnceLock<Regex> = OnceLock::new();
    PHONE.get_or_init(|| Regex::new(r"^\+?\d{10,15}$").expect("static pattern compiles"))
}

fn matches_string(args: &Map<String, Value>, pattern: &Regex) -> Value {
    let matched = string_arg(args, "value").is_some_and(|s| pattern.is_match(s.trim()));
    Value::Bool(matched)
}

pub(super) fn required(args: &Map<String, Value>, _ctx: &FunctionContext<'_>) -> Value {
    let present = match args.get("value") {
        None | Some(Value::Null) | Some(Value::Bool(false)) => false,
        Some(Value::String(s)) => !s.is_empty(),
        Some(_) => true,
    };
    Value::Bool(present)
}

pub(super) fn email(args: &Map<String, Value>, _ctx: &FunctionContext<'_>) -> Value {
    matches_string(args, email_pattern())
}

pub(super) fn url(args: &Map<String, Value>, _ctx: &FunctionContext<'_>) -> Value {
    matches_string(args, url_pattern())
}

pub(super) fn phone(args: &Map<String, Value>, _ctx: &FunctionContext<'_>) -> Value {
    let matched = string_arg(args, "value").is_some_and(|s| {
        let stripped: String = s
            .chars()
            .filter(|c| !c.is_whitespace() && !matches!(c, '-' | '(' | ')'))
            .collect();
        phone_pattern().is_match(&stripped)
    });
    Value::Bool(matched)
}

/// Fail closed: an unsafe or timed out pattern never validates.
pub(super) fn regex(args: &Map<String, Value>, ctx: &FunctionContext<'_>) -> Value {
    let (Some(value), Some(pattern)) = (string_arg(args, "value"), string_arg(args, "pattern"))
    else {
        return Value::Bool(false);
    };
    Value::Bool(ctx.regex.full_match(pattern, value).is_match())
}

fn in_range(n: f64, args: &Map<String, Value>) -> bool {
    number_arg(args, "min").is_none_or(|min| n >= min)
        && number_arg(args, "max").is_none_or(|max| n <= max)
}

pub(super) fn numeric(args: &Map<String, Value>, _ctx: &FunctionContext<'_>) -> Value {
    let ok = arg(args, "value")
        .and_then(as_number)
        .is_some_and(|n| in_range(n, args));
    Value::Bool(ok)
}

pub(super) fn length(args: &Map<String, Value>, _ctx: &FunctionContext<'_>) -> Value {
    let len = match arg(args, "value") {
        Some(Value::String(s)) => Some(s.chars().count()),
        Some(Value::Array(items)) => Some(items.len()),
        Some(Value::Object(map)) => Some(map.len()),
        _ => None,
    };
    Value::Bool(len.is_some_and(|len| in_range(len as f64, args)))
}

pub(super) fn min(args: &Map<String, Value>, _ctx: &FunctionContext<'_>) -> Value {
    let ok = arg(args, "value")
        .and_then(as_number)
        .is_some_and(|n| number_arg(args, "min").is_none_or(|min| n >= min));
    Value::Bool(ok)
}

pub(super) fn max(args: &Map<String, Value>, _ctx: &FunctionContext<'_>) -> Value {
    let ok = arg(args, "value")
        .and_then(as_number)
        .is_some_and(|n| number_arg(args, "max").is_none_or(|max| n <= max));
    Value::Bool(ok)
}

pub(super) fn and(args: &Map<String, Value>, _ctx: &FunctionContext<'_>) -> Value {
    let all = match arg(args, "values") {
        None => true,
        Some(Value::Array(values)) => values.iter().all(is_true),
        Some(_) => false,
    };
    Value::Bool(all)
}

pub(super) fn or(args: &Map<String, Value>, _ctx: &FunctionContext<'_>) -> Value {
    let any = match arg(args, "values") {
        Some(Value::Array(values)) => values.iter().any(is_true),
        _ => false,
    };
    Value::Bool(any)
}

pub(super) fn not(args: &Map<String, Value>, _ctx: &FunctionContext<'_>) -> Value {
    match args.get("value") {
        Some(Value::Bool(b)) => Value::Bool(!b),
        _ => Value::Null,
    }
}

#[cfg(test)]
mod tests {
    use super::super::FunctionLibrary;
    use super::*;
    use crate::a2ui::safe_regex::SafeRegex;
    use serde_json::json;

    fn call(name: &str, args: Value) -> Value {
        let regex = SafeRegex::default();
        let ctx = FunctionContext {
            data_model: None,
            regex: &regex,
        };
        let args = args.as_object().cloned().unwrap_or_default();
        FunctionLibrary::standard().call(name, &args, &ctx)
    }

    #[test]
    fn test_required() {
        assert_eq!(call("required", json!({"value": "x"})), json!(true));
        assert_eq!(call("required", json!({"value": 0})), json!(true));
        assert_eq!(call("required", json!({"value": true})), json!(true));
        assert_eq!(call("required", json!({"value": ""})), json!(false));
        assert_eq!(call("required", json!({"value": false})), json!(false));
        assert_eq!(call("required", json!({"value": null})), json!(false));
        assert_eq!(call("required", json!({})), json!(false));
    }

    #[test]
    fn test_email_and_url() {
        assert_eq!(call("email", json!({"value": "ada@example.com"})), json!(true));
        assert_eq!(call("email", json!({"value": "ada@example"})), json!(false));
        assert_eq!(call("email", json!({"value": 12})), json!(false));

        assert_eq!(call("url", json!({"value": "https://example.com/a?b=c"})), json!(true));
        assert_eq!(call("url", json!({"value": "example.com"})), json!(true));
        assert_eq!(call("url", json!({"value": "not a url"})), json!(false));
    }

    #[test]
    fn test_phone() {
        assert_eq!(call("phone", json!({"value": "+1 (555) 123-4567"})), json!(true));
        assert_eq!(call("phone", json!({"value": "555-1234"})), json!(false));
        assert_eq!(call("phone", json!({"value": "+12345678901234567"})), json!(false));
    }

    #[test]
    fn test_regex_fails_closed() {
        assert_eq!(
            call("regex", json!({"value": "ABC-123", "pattern": "[A-Z]{3}-\\d{3}"})),
            json!(true)
        );
        assert_eq!(
            call("regex", json!({"value": "xABC-123", "pattern": "[A-Z]{3}-\\d{3}"})),
            json!(false)
        );
        assert_eq!(call("regex", json!({"value": "aaaa", "pattern": "(a+)+"})), json!(false));
        assert_eq!(call("regex", json!({"value": "a"})), json!(false));
    }

    #[test]
    fn test_ranges() {
        assert_eq!(call("numeric", json!({"value": 5, "min": 1, "max": 10})), json!(true));
        assert_eq!(call("numeric", json!({"value": "5"})), json!(true));
        assert_eq!(call("numeric", json!({"value": 11, "max": 10})), json!(false));
        assert_eq!(call("numeric", json!({"value": "abc"})), json!(false));

        assert_eq!(call("length", json!({"value": "abc", "min": 3})), json!(true));
        assert_eq!(call("length", json!({"value": "abc", "max": 2})), json!(false));
        assert_eq!(call("length", json!({"value": [1, 2], "min": 1, "max": 2})), json!(true));
        assert_eq!(call("length", json!({"value": null, "min": 0})), json!(false));

        assert_eq!(call("min", json!({"value": 3, "min": 3})), json!(true));
        assert_eq!(call("min", json!({"value": 2, "min": 3})), json!(false));
        assert_eq!(call("max", json!({"value": 3, "max": 3})), json!(true));
        assert_eq!(call("max", json!({"value": 4, "max": 3})), json!(false));
    }

    #[test]
    fn test_combinators() {
        assert_eq!(call("and", json!({})), json!(true));
        assert_eq!(call("and", json!({"values": []})), json!(true));
        assert_eq!(call("and", json!({"values": [true, true]})), json!(true));
        assert_eq!(call("and", json!({"values": [true, "yes"]})), json!(false));

        assert_eq!(call("or", json!({})), json!(false));
        assert_eq!(call("or", json!({"values": []})), json!(false));
        assert_eq!(call("or", json!({"values": [false, true]})), json!(true));

        assert_eq!(call("not", json!({"value": true})), json!(false));
        assert_eq!(call("not", json!({"value": false})), json!(true));
        assert_eq!(call("not", json!({"value": "x"})), Value::Null);
    }
}
