//! Formatting functions. Output is always a JSON string, or `null` when the
//! input cannot be formatted at all.

use std::fmt::Write;

use chrono::format::{Item, StrftimeItems};
use chrono::{DateTime, Local, NaiveDate, NaiveDateTime, Utc};
use serde_json::{Map, Value};

use super::{FunctionContext, arg, as_number, display_string, number_arg, string_arg};

const MAX_DATE_FORMAT_LENGTH: usize = 64;
const DEFAULT_DATE_FORMAT: &str = "yyyy-MM-dd";
const MAX_DECIMALS: f64 = 20.0;

/// Tried in order after RFC 3339.
const NAIVE_DATE_TIME_PATTERNS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
];

// ============================================================================
// formatString
// ============================================================================

pub(super) fn format_string(args: &Map<String, Value>, ctx: &FunctionContext<'_>) -> Value {
    match string_arg(args, "value").or_else(|| string_arg(args, "template")) {
        Some(template) => Value::String(interpolate(template, ctx)),
        None => Value::Null,
    }
}

fn interpolate(template: &str, ctx: &FunctionContext<'_>) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(start) = rest.find("${") {
        out.push_str(&rest[..start]);
        let after = &rest[start + 2..];
        let Some(end) = after.find('}') else {
            out.push_str(&rest[start..]);
            return out;
        };
        out.push_str(&expand_placeholder(after[..end].trim(), ctx));
        rest = &after[end + 1..];
    }

    out.push_str(rest);
    out
}

fn expand_placeholder(inner: &str, ctx: &FunctionContext<'_>) -> String {
    if inner.starts_with('/') {
        return lookup(inner, ctx);
    }
    call_helper(inner, ctx).unwrap_or_else(|| inner.to_string())
}

fn lookup(path: &str, ctx: &FunctionContext<'_>) -> String {
    ctx.data_model
        .and_then(|model| model.get(path))
        .map(display_string)
        .unwrap_or_default()
}

/// `name(arg)` where `arg` is a data path, a quoted string, or bare text.
fn call_helper(expr: &str, ctx: &FunctionContext<'_>) -> Option<String> {
    let open = expr.find('(')?;
    let body = expr.strip_suffix(')')?;
    let name = expr[..open].trim();
    let raw = body[open + 1..].trim();

    let arg = if raw.starts_with('/') {
        lookup(raw, ctx)
    } else {
        unquote(raw).to_string()
    };

    let result = match name {
        "now" => Local::now().format("%Y-%m-%d %H:%M:%S").to_string(),
        "upper" => arg.to_uppercase(),
        "lower" => arg.to_lowercase(),
        "capitalize" => {
            let mut chars = arg.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect(),
                None => String::new(),
            }
        }
        "trim" => arg.trim().to_string(),
        "length" => arg.chars().count().to_string(),
        "isEmpty" => arg.is_empty().to_string(),
        "isNotEmpty" => (!arg.is_empty()).to_string(),
        _ => return None,
    };
    Some(result)
}

fn unquote(raw: &str) -> &str {
    for quote in ['\'', '"'] {
        if let Some(inner) = raw.strip_prefix(quote).and_then(|r| r.strip_suffix(quote)) {
            return inner;
        }
    }
    raw
}

// ============================================================================
// formatNumber / formatCurrency
// ============================================================================

/// Format a number in en-US style.
///
/// With `decimals` unset, integers print without a fraction and other
/// values keep up to three fraction digits.
///
/// ```
/// use a2ui_kit::a2ui::functions::format_decimal;
///
/// assert_eq!(format_decimal(1234567.891, Some(2), true), "1,234,567.89");
/// assert_eq!(format_decimal(-0.5, None, true), "-0.5");
/// assert_eq!(format_decimal(1234.0, None, false), "1234");
/// ```
pub fn format_decimal(n: f64, decimals: Option<usize>, grouping: bool) -> String {
    let digits = match decimals {
        Some(decimals) => format!("{:.*}", decimals, n.abs()),
        None => {
            let fixed = format!("{:.3}", n.abs());
            fixed.trim_end_matches('0').trim_end_matches('.').to_string()
        }
    };

    let (int_part, frac_part) = match digits.split_once('.') {
        Some((int_part, frac_part)) => (int_part, Some(frac_part)),
        None => (digits.as_str(), None),
    };

    let mut out = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    let is_zero = digits.chars().all(|c| c == '0' || c == '.');
    if n.is_sign_negative() && !is_zero {
        out.push('-');
    }
    if grouping {
        out.push_str(&group_thousands(int_part));
    } else {
        out.push_str(int_part);
    }
    if let Some(frac_part) = frac_part {
        out.push('.');
        out.push_str(frac_part);
    }
    out
}

fn group_thousands(digits: &str) -> String {
    let len = digits.len();
    let mut out = String::with_capacity(len + len / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (len - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

fn decimals_arg(args: &Map<String, Value>) -> Option<usize> {
    number_arg(args, "decimals").map(|d| d.clamp(0.0, MAX_DECIMALS) as usize)
}

fn grouping_arg(args: &Map<String, Value>) -> bool {
    arg(args, "grouping").and_then(Value::as_bool).unwrap_or(true)
}

fn finite_value(args: &Map<String, Value>) -> Option<f64> {
    arg(args, "value").and_then(as_number).filter(|n| n.is_finite())
}

pub(super) fn format_number(args: &Map<String, Value>, _ctx: &FunctionContext<'_>) -> Value {
    match finite_value(args) {
        Some(n) => Value::String(format_decimal(n, decimals_arg(args), grouping_arg(args))),
        None => Value::Null,
    }
}

fn currency_symbol(code: &str) -> Option<&'static str> {
    let symbol = match code {
        "USD" => "$",
        "EUR" => "€",
        "GBP" => "£",
        "JPY" => "¥",
        "CNY" => "CN¥",
        "INR" => "₹",
        "KRW" => "₩",
        "CAD" => "CA$",
        "AUD" => "A$",
        "BRL" => "R$",
        "MXN" => "MX$",
        _ => return None,
    };
    Some(symbol)
}

pub(super) fn format_currency(args: &Map<String, Value>, _ctx: &FunctionContext<'_>) -> Value {
    let (Some(n), Some(code)) = (
        finite_value(args),
        string_arg(args, "currency").or_else(|| string_arg(args, "currencyCode")),
    ) else {
        return Value::Null;
    };

    let code = code.trim().to_uppercase();
    let formatted = format_decimal(n, Some(decimals_arg(args).unwrap_or(2)), grouping_arg(args));

    let text = match currency_symbol(&code) {
        Some(symbol) => match formatted.strip_prefix('-') {
            Some(magnitude) => format!("-{}{}", symbol, magnitude),
            None => format!("{}{}", symbol, formatted),
        },
        None => format!("{} {}", code, formatted),
    };
    Value::String(text)
}

// ============================================================================
// formatDate
// ============================================================================

fn is_safe_date_format(format: &str) -> bool {
    !format.is_empty()
        && format.len() <= MAX_DATE_FORMAT_LENGTH
        && format
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, ' ' | ',' | '.' | ':' | '/' | '-' | '_'))
}

/// Translate a `yyyy-MM-dd HH:mm` style pattern into strftime items.
fn translate_date_format(pattern: &str) -> String {
    let chars: Vec<char> = pattern.chars().collect();
    let mut out = String::with_capacity(pattern.len() * 2);
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];
        let mut run = 1;
        while i + run < chars.len() && chars[i + run] == c {
            run += 1;
        }
        i += run;

        let token = match (c, run) {
            ('y', 2) => "%y",
            ('y', _) => "%Y",
            ('M', 1) => "%-m",
            ('M', 2) => "%m",
            ('M', 3) => "%b",
            ('M', _) => "%B",
            ('d', 1) => "%-d",
            ('d', _) => "%d",
            ('E', 1..=3) => "%a",
            ('E', _) => "%A",
            ('H', 1) => "%-H",
            ('H', _) => "%H",
            ('h', 1) => "%-I",
            ('h', _) => "%I",
            ('m', 1) => "%-M",
            ('m', _) => "%M",
            ('s', 1) => "%-S",
            ('s', _) => "%S",
            ('S', _) => "%3f",
            ('a', _) => "%p",
            _ => {
                out.extend(std::iter::repeat_n(c, run));
                continue;
            }
        };
        out.push_str(token);
    }
    out
}

fn from_epoch_millis(ms: i64) -> Option<NaiveDateTime> {
    DateTime::<Utc>::from_timestamp_millis(ms).map(|dt| dt.naive_utc())
}

fn parse_date(value: &Value) -> Option<NaiveDateTime> {
    match value {
        Value::String(s) => {
            let s = s.trim();
            if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
                return Some(dt.naive_local());
            }
            for pattern in NAIVE_DATE_TIME_PATTERNS {
                if let Ok(dt) = NaiveDateTime::parse_from_str(s, pattern) {
                    return Some(dt);
                }
            }
            if let Ok(date) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
                return date.and_hms_opt(0, 0, 0);
            }
            s.parse::<i64>().ok().and_then(from_epoch_millis)
        }
        Value::Number(n) => n.as_i64().and_then(from_epoch_millis),
        _ => None,
    }
}

pub(super) fn format_date(args: &Map<String, Value>, _ctx: &FunctionContext<'_>) -> Value {
    let Some(value) = arg(args, "value").filter(|v| v.is_string() || v.is_number()) else {
        return Value::Null;
    };
    let original = Value::String(display_string(value));

    let format = string_arg(args, "format").unwrap_or(DEFAULT_DATE_FORMAT);
    if !is_safe_date_format(format) {
        log::warn!("[A2UI] Refusing date format {:?}", format);
        return original;
    }
    let Some(date) = parse_date(value) else {
        return original;
    };

    let strftime = translate_date_format(format);
    let items: Vec<Item<'_>> = StrftimeItems::new(&strftime).collect();
    if items.iter().any(|item| matches!(item, Item::Error)) {
        return original;
    }

    let mut out = String::new();
    if write!(out, "{}", date.format_with_items(items.into_iter())).is_err() {
        return original;
    }
    Value::String(out)
}

// ============================================================================
// pluralize
// ============================================================================

pub(super) fn pluralize(args: &Map<String, Value>, _ctx: &FunctionContext<'_>) -> Value {
    let Some(n) = finite_value(args) else {
        return Value::Null;
    };

    let bucket = if n == 0.0 {
        "zero"
    } else if n == 1.0 {
        "one"
    } else if n == 2.0 {
        "two"
    } else if n.fract() == 0.0 && (3.0..=10.0).contains(&n) {
        "few"
    } else if n > 10.0 {
        "many"
    } else {
        "other"
    };

    arg(args, bucket)
        .or_else(|| arg(args, "other"))
        .map(|v| Value::String(display_string(v)))
        .unwrap_or(Value::Null)
}

#[cfg(test)]
mod tests {
    use super::super::FunctionLibrary;
    use super::*;
    use crate::a2ui::data_model::DataModel;
    use crate::a2ui::safe_regex::SafeRegex;
    use serde_json::json;

    fn call_with(model: Option<&DataModel>, name: &str, args: Value) -> Value {
        let regex = SafeRegex::default();
        let ctx = FunctionContext {
            data_model: model,
            regex: &regex,
        };
        let args = args.as_object().cloned().unwrap_or_default();
        FunctionLibrary::standard().call(name, &args, &ctx)
    }

    fn call(name: &str, args: Value) -> Value {
        call_with(None, name, args)
    }

    #[test]
    fn test_format_string_placeholders() {
        let mut model = DataModel::new();
        model.update("/user/name", json!("ada")).unwrap();
        model.update("/count", json!(3)).unwrap();

        let result = call_with(
            Some(&model),
            "formatString",
            json!({"value": "Hi ${/user/name}, you have ${/count} items"}),
        );
        assert_eq!(result, json!("Hi ada, you have 3 items"));

        let result = call_with(
            Some(&model),
            "formatString",
            json!({"template": "${upper(/user/name)} ${capitalize('bob')} ${length(abc)}"}),
        );
        assert_eq!(result, json!("ADA Bob 3"));

        let result = call_with(Some(&model), "formatString", json!({"value": "${isEmpty(/missing)}"}));
        assert_eq!(result, json!("true"));
    }

    #[test]
    fn test_format_string_leaves_unknown_text() {
        assert_eq!(
            call("formatString", json!({"value": "${name} and ${shout(x)}"})),
            json!("name and shout(x)")
        );
        assert_eq!(call("formatString", json!({"value": "open ${/a"})), json!("open ${/a"));
        assert_eq!(call("formatString", json!({"value": "${/missing}!"})), json!("!"));
        assert_eq!(call("formatString", json!({"value": 3})), Value::Null);
    }

    #[test]
    fn test_format_number() {
        assert_eq!(call("formatNumber", json!({"value": 1234567.891})), json!("1,234,567.891"));
        assert_eq!(call("formatNumber", json!({"value": 1234.5, "decimals": 2})), json!("1,234.50"));
        assert_eq!(
            call("formatNumber", json!({"value": 1234.5, "grouping": false})),
            json!("1234.5")
        );
        assert_eq!(call("formatNumber", json!({"value": -1000})), json!("-1,000"));
        assert_eq!(call("formatNumber", json!({"value": -0.0001})), json!("0"));
        assert_eq!(call("formatNumber", json!({"value": "abc"})), Value::Null);
    }

    #[test]
    fn test_format_currency() {
        assert_eq!(
            call("formatCurrency", json!({"value": 1234.5, "currency": "USD"})),
            json!("$1,234.50")
        );
        assert_eq!(
            call("formatCurrency", json!({"value": -3, "currencyCode": "eur"})),
            json!("-€3.00")
        );
        assert_eq!(
            call("formatCurrency", json!({"value": 1234.561, "currency": "XYZ"})),
            json!("XYZ 1,234.56")
        );
        assert_eq!(call("formatCurrency", json!({"value": 1})), Value::Null);
    }

    #[test]
    fn test_format_date() {
        assert_eq!(
            call("formatDate", json!({"value": "2024-03-05T14:07:09Z", "format": "dd/MM/yyyy HH:mm"})),
            json!("05/03/2024 14:07")
        );
        assert_eq!(
            call("formatDate", json!({"value": "2024-03-05", "format": "MMMM d, yyyy"})),
            json!("March 5, 2024")
        );
        assert_eq!(
            call("formatDate", json!({"value": 0, "format": "yyyy-MM-dd"})),
            json!("1970-01-01")
        );
    }

    #[test]
    fn test_format_date_returns_original() {
        assert_eq!(
            call("formatDate", json!({"value": "next tuesday", "format": "yyyy"})),
            json!("next tuesday")
        );
        assert_eq!(
            call("formatDate", json!({"value": "2024-03-05", "format": "%Y %n"})),
            json!("2024-03-05")
        );
        let long = "y".repeat(MAX_DATE_FORMAT_LENGTH + 1);
        assert_eq!(
            call("formatDate", json!({"value": "2024-03-05", "format": long})),
            json!("2024-03-05")
        );
    }

    #[test]
    fn test_pluralize() {
        let forms = |n: Value| {
            call(
                "pluralize",
                json!({"value": n, "zero": "none", "one": "one item", "few": "a few", "many": "lots", "other": "some"}),
            )
        };
        assert_eq!(forms(json!(0)), json!("none"));
        assert_eq!(forms(json!(1)), json!("one item"));
        assert_eq!(forms(json!(2)), json!("some"));
        assert_eq!(forms(json!(3)), json!("a few"));
        assert_eq!(forms(json!(10)), json!("a few"));
        assert_eq!(forms(json!(11)), json!("lots"));
        assert_eq!(forms(json!(2.5)), json!("some"));
        assert_eq!(call("pluralize", json!({"value": 1})), Value::Null);
    }

    #[test]
    fn test_translate_date_format() {
        assert_eq!(translate_date_format("yyyy-MM-dd"), "%Y-%m-%d");
        assert_eq!(translate_date_format("EEE h:mm a"), "%a %-I:%M %p");
        assert_eq!(translate_date_format("yyyy'T'"), "%Y'T'");
    }
}
