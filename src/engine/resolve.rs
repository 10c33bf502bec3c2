//! Variable resolution and structured extraction
//!
//! `resolve` substitutes `${name}` placeholders from a case's namespace.
//! Substitution is exact-match only: a string that is exactly `${name}` is
//! replaced by the raw bound value, preserving its type. Partial
//! interpolation inside a larger string is deliberately unsupported; it
//! would force ambiguous coercion when a non-string value lands in, say, a
//! numeric argument position.
//!
//! `extract` applies a dot/bracket path query to a JSON result, used when a
//! step asserts on a nested field via `expected_key`.

use serde_json::{Map, Value};

use crate::common::{Error, Result};

/// Recursively substitute `${name}` placeholders in a value.
///
/// Pure and idempotent: a value without placeholder strings resolves to
/// itself, and substituted values are final (no nested re-expansion).
pub fn resolve(value: &Value, namespace: &Map<String, Value>) -> Result<Value> {
    match value {
        Value::String(s) => match placeholder_name(s) {
            Some(name) => namespace
                .get(name)
                .cloned()
                .ok_or_else(|| Error::UnboundVariable(name.to_string())),
            None => Ok(value.clone()),
        },
        Value::Array(items) => items
            .iter()
            .map(|item| resolve(item, namespace))
            .collect::<Result<Vec<Value>>>()
            .map(Value::Array),
        Value::Object(map) => map
            .iter()
            .map(|(key, item)| resolve(item, namespace).map(|v| (key.clone(), v)))
            .collect::<Result<Map<String, Value>>>()
            .map(Value::Object),
        _ => Ok(value.clone()),
    }
}

/// If the whole string is a `${name}` placeholder, return the name
fn placeholder_name(s: &str) -> Option<&str> {
    let inner = s.strip_prefix("${")?.strip_suffix('}')?;
    if inner.is_empty() || inner.contains(['$', '{', '}']) {
        return None;
    }
    Some(inner)
}

/// One addressing step in a path expression
#[derive(Debug, PartialEq, Eq)]
enum Segment {
    Key(String),
    Index(usize),
}

/// Apply a dot/bracket path query (`body.items[0].id`) to a JSON value
pub fn extract(result: &Value, path: &str) -> Result<Value> {
    let mut current = result;
    for segment in parse_path(path)? {
        current = match &segment {
            Segment::Key(key) => current.get(key.as_str()).ok_or_else(|| {
                Error::extraction(path, format!("no field '{key}' in {current}"))
            })?,
            Segment::Index(index) => current.get(*index).ok_or_else(|| {
                Error::extraction(path, format!("no index {index} in {current}"))
            })?,
        };
    }
    Ok(current.clone())
}

fn parse_path(path: &str) -> Result<Vec<Segment>> {
    if path.is_empty() {
        return Err(Error::extraction(path, "empty path"));
    }

    let mut segments = Vec::new();
    for part in path.split('.') {
        let bracket = part.find('[').unwrap_or(part.len());
        let name = &part[..bracket];
        if name.is_empty() {
            if bracket == part.len() {
                return Err(Error::extraction(path, "empty path segment"));
            }
        } else {
            segments.push(Segment::Key(name.to_string()));
        }

        let mut rest = &part[bracket..];
        while let Some(stripped) = rest.strip_prefix('[') {
            let end = stripped
                .find(']')
                .ok_or_else(|| Error::extraction(path, "unclosed '['"))?;
            let index: usize = stripped[..end].parse().map_err(|_| {
                Error::extraction(path, format!("invalid index '{}'", &stripped[..end]))
            })?;
            segments.push(Segment::Index(index));
            rest = &stripped[end + 1..];
        }
        if !rest.is_empty() {
            return Err(Error::extraction(
                path,
                format!("unexpected trailing '{rest}'"),
            ));
        }
    }
    Ok(segments)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn namespace(pairs: &[(&str, Value)]) -> Map<String, Value> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect()
    }

    #[test]
    fn test_exact_match_preserves_type() {
        let ns = namespace(&[("count", json!(15)), ("flag", json!(true))]);
        assert_eq!(resolve(&json!("${count}"), &ns).unwrap(), json!(15));
        assert_eq!(resolve(&json!("${flag}"), &ns).unwrap(), json!(true));
    }

    #[test]
    fn test_partial_interpolation_left_literal() {
        let ns = namespace(&[("x", json!(1))]);
        let value = json!("id-${x}-suffix");
        assert_eq!(resolve(&value, &ns).unwrap(), value);
    }

    #[test]
    fn test_recursive_structures() {
        let ns = namespace(&[("user", json!("alice")), ("id", json!(7))]);
        let value = json!({"who": "${user}", "ids": ["${id}", 8], "fixed": null});
        let resolved = resolve(&value, &ns).unwrap();
        assert_eq!(
            resolved,
            json!({"who": "alice", "ids": [7, 8], "fixed": null})
        );
    }

    #[test]
    fn test_unbound_variable() {
        let ns = namespace(&[]);
        let err = resolve(&json!("${missing}"), &ns).unwrap_err();
        match err {
            Error::UnboundVariable(name) => assert_eq!(name, "missing"),
            other => panic!("expected UnboundVariable, got {other:?}"),
        }
    }

    #[test]
    fn test_idempotent_on_resolved_values() {
        let ns = namespace(&[("x", json!(1))]);
        let value = json!({"a": [1, "two", {"b": 3.5}], "c": true});
        let once = resolve(&value, &ns).unwrap();
        let twice = resolve(&once, &ns).unwrap();
        assert_eq!(once, value);
        assert_eq!(twice, once);
    }

    #[test]
    fn test_non_placeholder_strings_unchanged() {
        let ns = namespace(&[("x", json!(1))]);
        for literal in ["plain", "${}", "${a${b}", "$x", "${x"] {
            assert_eq!(resolve(&json!(literal), &ns).unwrap(), json!(literal));
        }
    }

    #[test]
    fn test_extract_dot_path() {
        let value = json!({"body": {"status": "ok", "items": [{"id": 1}, {"id": 2}]}});
        assert_eq!(extract(&value, "body.status").unwrap(), json!("ok"));
        assert_eq!(extract(&value, "body.items[1].id").unwrap(), json!(2));
    }

    #[test]
    fn test_extract_leading_index() {
        let value = json!([[10, 20], [30]]);
        assert_eq!(extract(&value, "[0][1]").unwrap(), json!(20));
    }

    #[test]
    fn test_extract_missing_path() {
        let value = json!({"a": 1});
        let err = extract(&value, "a.b").unwrap_err();
        assert!(matches!(err, Error::Extraction { .. }));

        let err = extract(&value, "nope").unwrap_err();
        assert!(matches!(err, Error::Extraction { .. }));
    }

    #[test]
    fn test_extract_malformed_path() {
        let value = json!({"a": [1]});
        assert!(extract(&value, "a[").is_err());
        assert!(extract(&value, "a[one]").is_err());
        assert!(extract(&value, "a..b").is_err());
        assert!(extract(&value, "").is_err());
    }
}
