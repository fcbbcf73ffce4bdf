//! Upstream target construction
//!
//! Path-template substitution and query-string serialization. Both are
//! permissive: unmatched placeholders resolve to empty strings and null
//! values are silently dropped. Parameter validation happens upstream.

use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use serde_json::{Map, Value};
use url::form_urlencoded::Serializer;

static PATH_PARAM: Lazy<Regex> = Lazy::new(|| {
    // `:name` placeholders, word characters only.
    Regex::new(r":(\w+)").unwrap_or_else(|_| unreachable!("static pattern"))
});

/// Substitute `:name` placeholders from `params`, consuming matched keys.
///
/// Placeholders without a corresponding parameter become empty strings.
pub fn resolve_path(template: &str, params: &mut Map<String, Value>) -> String {
    PATH_PARAM
        .replace_all(template, |caps: &Captures<'_>| {
            let key = &caps[1];
            match params.remove(key) {
                Some(Value::Null) | None => String::new(),
                Some(value) => scalar_to_string(&value),
            }
        })
        .into_owned()
}

/// Serialize remaining parameters into a query string (with leading `?`),
/// or an empty string when nothing survives.
///
/// Scalar arrays repeat the key (`ids=1&ids=2`), arrays of objects flatten
/// to indexed dotted keys (`attrs[0].id=5`), plain objects flatten to
/// dotted keys (`filter.id=5`), null values are omitted entirely.
pub fn build_query(params: &Map<String, Value>) -> String {
    let mut serializer = Serializer::new(String::new());
    for (key, value) in params {
        append_value(&mut serializer, key, value);
    }
    let query = serializer.finish();
    if query.is_empty() {
        query
    } else {
        format!("?{}", query)
    }
}

fn append_value(serializer: &mut Serializer<String>, key: &str, value: &Value) {
    match value {
        Value::Null => {}
        Value::Array(items) => {
            for (index, item) in items.iter().enumerate() {
                match item {
                    Value::Null => {}
                    Value::Object(props) => {
                        for (prop, val) in props {
                            if !val.is_null() {
                                append_value(
                                    serializer,
                                    &format!("{}[{}].{}", key, index, prop),
                                    val,
                                );
                            }
                        }
                    }
                    scalar => {
                        serializer.append_pair(key, &scalar_to_string(scalar));
                    }
                }
            }
        }
        Value::Object(props) => {
            for (prop, val) in props {
                if !val.is_null() {
                    append_value(serializer, &format!("{}.{}", key, prop), val);
                }
            }
        }
        scalar => {
            serializer.append_pair(key, &scalar_to_string(scalar));
        }
    }
}

/// Stringify a scalar JSON value without quoting.
fn scalar_to_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
