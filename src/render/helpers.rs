//! Template helpers.
//!
//! ```text
//! {{ widget(name="menu", tpl="row") }}
//! {{ chunk(name="footer", key="val") }}
//! {{ doc.date | date(format="LL", lang="fr") }}
//! {{ doc.content | cut(tag="<!-- more -->") }}
//! {% if assert(a=doc.rank, op=">=", b=3) %} ... {% endif %}
//! ```

use crate::engine::Engine;
use crate::utils::date::{self, LONG};
use serde_json::{Map, Value};
use std::{cmp::Ordering, collections::HashMap};
use tera::Tera;

type Args = HashMap<String, Value>;

pub(super) fn register(tera: &mut Tera, engine: &Engine, context: &Value) {
    let settings = engine.settings();
    let locale = settings.config.locale().to_owned();
    let cut_tag = settings.config.cut_tag().to_owned();

    let widget_engine = engine.clone();
    tera.register_function("widget", move |args: &Args| -> tera::Result<Value> {
        let name = required_str(args, "name", "widget")?;
        widget_engine
            .get_widget(name, &params(args))
            .map_err(|err| tera::Error::chain(format!("widget `{name}` failed"), err))
    });

    let chunk_engine = engine.clone();
    let doc = context.get("doc").cloned().unwrap_or_default();
    let config = context
        .get("config")
        .cloned()
        .unwrap_or_else(|| settings.config.to_value());
    tera.register_function("chunk", move |args: &Args| -> tera::Result<Value> {
        let name = required_str(args, "name", "chunk")?;
        let mut data = params(args);
        data.insert("doc".into(), doc.clone());
        data.insert("config".into(), config.clone());
        chunk_engine
            .get_chunk(name, &Value::Object(data))
            .map(Value::String)
            .map_err(|err| tera::Error::chain(format!("chunk `{name}` failed"), err))
    });

    tera.register_filter("date", move |value: &Value, args: &Args| -> tera::Result<Value> {
        let format = optional_str(args, "format").unwrap_or(LONG);
        let lang = optional_str(args, "lang").unwrap_or(&locale);
        let parsed = date::parse_date(value)
            .ok_or_else(|| tera::Error::msg(format!("`{value}` is not a date")))?;
        date::format_date(parsed, format, lang)
            .map(Value::String)
            .map_err(|err| tera::Error::msg(err.to_string()))
    });

    tera.register_filter("cut", move |value: &Value, args: &Args| -> tera::Result<Value> {
        let content = value
            .as_str()
            .ok_or_else(|| tera::Error::msg(format!("`cut` expects a string, got `{value}`")))?;
        let tag = optional_str(args, "tag").unwrap_or(&cut_tag);
        Ok(Value::String(cut(content, tag).to_owned()))
    });

    tera.register_function("assert", |args: &Args| -> tera::Result<Value> {
        Ok(Value::Bool(assert_args(args)))
    });
}

/// `assert(a=.., op=.., b=..)` as a condition.
///
/// `tera` only accepts booleans in `{% if %}`, so an unknown operator,
/// which has no result, is rendered as `false`.
fn assert_args(args: &Args) -> bool {
    let a = args.get("a").unwrap_or(&Value::Null);
    let b = args.get("b").unwrap_or(&Value::Null);
    let op = optional_str(args, "op").unwrap_or_default();
    compare(a, op, b).unwrap_or(false)
}

fn required_str<'a>(args: &'a Args, key: &str, helper: &str) -> tera::Result<&'a str> {
    optional_str(args, key)
        .ok_or_else(|| tera::Error::msg(format!("`{helper}` requires a string `{key}` argument")))
}

fn optional_str<'a>(args: &'a Args, key: &str) -> Option<&'a str> {
    args.get(key).and_then(Value::as_str)
}

/// Helper arguments minus the resource name.
fn params(args: &Args) -> Map<String, Value> {
    args.iter()
        .filter(|(key, _)| key.as_str() != "name")
        .map(|(key, value)| (key.clone(), value.clone()))
        .collect()
}

/// Content before the first `tag`, or all of it when `tag` does not occur.
pub fn cut<'a>(content: &'a str, tag: &str) -> &'a str {
    if tag.is_empty() {
        return content;
    }
    content.split_once(tag).map_or(content, |(head, _)| head)
}

/// Evaluate `a <op> b` for `= == != > >= < <=`.
///
/// Returns `None` for any other operator. Numbers (and numeric strings
/// compared with numbers) compare numerically, strings and booleans by
/// value; other mixes only compare for (in)equality.
pub fn compare(a: &Value, op: &str, b: &Value) -> Option<bool> {
    let ord = order(a, b);
    let eq = ord.map_or_else(|| a == b, Ordering::is_eq);
    let result = match op {
        "=" | "==" => eq,
        "!=" => !eq,
        ">" => ord.is_some_and(Ordering::is_gt),
        ">=" => ord.is_some_and(Ordering::is_ge),
        "<" => ord.is_some_and(Ordering::is_lt),
        "<=" => ord.is_some_and(Ordering::is_le),
        _ => return None,
    };
    Some(result)
}

fn order(a: &Value, b: &Value) -> Option<Ordering> {
    match (a, b) {
        (Value::String(x), Value::String(y)) => Some(x.cmp(y)),
        (Value::Bool(x), Value::Bool(y)) => Some(x.cmp(y)),
        (Value::Number(_), _) | (_, Value::Number(_)) => {
            as_number(a)?.partial_cmp(&as_number(b)?)
        }
        _ => None,
    }
}

fn as_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_cut_before_marker() {
        assert_eq!(cut("ABC<!-- cut -->DEF", "<!-- cut -->"), "ABC");
        assert_eq!(cut("A<!-- cut -->B<!-- cut -->C", "<!-- cut -->"), "A");
    }

    #[test]
    fn test_cut_without_marker() {
        assert_eq!(cut("ABC", "<!-- cut -->"), "ABC");
        assert_eq!(cut("ABC", ""), "ABC");
        assert_eq!(cut("", "<!-- cut -->"), "");
    }

    #[test]
    fn test_compare_numbers() {
        assert_eq!(compare(&json!(3), ">", &json!(2)), Some(true));
        assert_eq!(compare(&json!(3), ">=", &json!(3)), Some(true));
        assert_eq!(compare(&json!(1), "!=", &json!(1)), Some(false));
        assert_eq!(compare(&json!(1), "<", &json!(1.5)), Some(true));
        assert_eq!(compare(&json!(2), "<=", &json!(1)), Some(false));
        assert_eq!(compare(&json!(2), "=", &json!(2.0)), Some(true));
        assert_eq!(compare(&json!(2), "==", &json!(3)), Some(false));
    }

    #[test]
    fn test_compare_numeric_strings() {
        assert_eq!(compare(&json!("10"), ">", &json!(9)), Some(true));
        assert_eq!(compare(&json!(3), "==", &json!("3")), Some(true));
    }

    #[test]
    fn test_compare_strings() {
        assert_eq!(compare(&json!("b"), ">", &json!("a")), Some(true));
        assert_eq!(compare(&json!("post"), "==", &json!("post")), Some(true));
        assert_eq!(compare(&json!("10"), "<", &json!("9")), Some(true));
    }

    #[test]
    fn test_compare_mixed_types() {
        assert_eq!(compare(&json!(null), "==", &json!(null)), Some(true));
        assert_eq!(compare(&json!("x"), ">", &json!(1)), Some(false));
        assert_eq!(compare(&json!([1]), "!=", &json!([2])), Some(true));
    }

    #[test]
    fn test_compare_unknown_operator() {
        assert_eq!(compare(&json!(1), "<>", &json!(2)), None);
        assert_eq!(compare(&json!(1), "", &json!(2)), None);
    }

    #[test]
    fn test_assert_args_always_boolean() {
        let args = |op: &str| -> Args {
            [("a", json!(3)), ("op", json!(op)), ("b", json!(2))]
                .into_iter()
                .map(|(k, v)| (k.to_owned(), v))
                .collect()
        };
        assert!(assert_args(&args(">")));
        assert!(!assert_args(&args("<")));
        assert!(!assert_args(&args("<>")));
        assert!(!assert_args(&Args::new()));
    }

    #[test]
    fn test_params_drop_name() {
        let mut args = Args::new();
        args.insert("name".into(), json!("menu"));
        args.insert("tpl".into(), json!("row"));
        let params = params(&args);
        assert_eq!(params.len(), 1);
        assert_eq!(params["tpl"], json!("row"));
    }
}
