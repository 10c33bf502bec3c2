//! Assertion dispatch
//!
//! Maps a symbolic assertion-type string to a binary predicate over JSON
//! values. The mapping is a fixed table; unknown names fail fatally and are
//! rejected before the retry loop ever starts.

use std::cmp::Ordering;

use serde_json::Value;

use crate::common::{Error, Result};

/// A named binary predicate used to judge pass/fail
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssertionType {
    Equals,
    NotEquals,
    Contains,
    NotContains,
    Greater,
    Less,
    GreaterEqual,
    LessEqual,
    IsNone,
    IsNotNone,
}

impl AssertionType {
    /// Resolve a symbolic name (case-insensitive) to an assertion type
    pub fn parse(name: &str) -> Result<Self> {
        match name.to_ascii_lowercase().as_str() {
            "equals" | "equal_to" => Ok(Self::Equals),
            "not_equals" => Ok(Self::NotEquals),
            "contains" => Ok(Self::Contains),
            "not_contains" => Ok(Self::NotContains),
            "greater" | "greater_than" => Ok(Self::Greater),
            "less" | "less_than" => Ok(Self::Less),
            "greater_equal" => Ok(Self::GreaterEqual),
            "less_equal" => Ok(Self::LessEqual),
            "is_none" => Ok(Self::IsNone),
            "is_not_none" => Ok(Self::IsNotNone),
            _ => Err(Error::UnknownAssertionType(name.to_string())),
        }
    }

    /// Canonical name used in failure detail
    pub fn name(self) -> &'static str {
        match self {
            Self::Equals => "equals",
            Self::NotEquals => "not_equals",
            Self::Contains => "contains",
            Self::NotContains => "not_contains",
            Self::Greater => "greater",
            Self::Less => "less",
            Self::GreaterEqual => "greater_equal",
            Self::LessEqual => "less_equal",
            Self::IsNone => "is_none",
            Self::IsNotNone => "is_not_none",
        }
    }

    /// Whether the predicate compares against an expected value.
    /// Nullity checks only inspect the actual value.
    pub fn requires_expected(self) -> bool {
        !matches!(self, Self::IsNone | Self::IsNotNone)
    }

    /// Evaluate the predicate
    pub fn holds(self, actual: &Value, expected: &Value) -> bool {
        match self {
            Self::Equals => actual == expected,
            Self::NotEquals => actual != expected,
            Self::Contains => contains(actual, expected),
            Self::NotContains => !contains(actual, expected),
            Self::Greater => matches!(compare(actual, expected), Some(Ordering::Greater)),
            Self::Less => matches!(compare(actual, expected), Some(Ordering::Less)),
            Self::GreaterEqual => {
                matches!(
                    compare(actual, expected),
                    Some(Ordering::Greater | Ordering::Equal)
                )
            }
            Self::LessEqual => {
                matches!(
                    compare(actual, expected),
                    Some(Ordering::Less | Ordering::Equal)
                )
            }
            Self::IsNone => actual.is_null(),
            Self::IsNotNone => !actual.is_null(),
        }
    }
}

/// Membership test: substring for strings, element for arrays, key for
/// objects. Anything else cannot contain and yields false.
fn contains(actual: &Value, expected: &Value) -> bool {
    match actual {
        Value::String(s) => expected.as_str().is_some_and(|e| s.contains(e)),
        Value::Array(items) => items.contains(expected),
        Value::Object(map) => expected.as_str().is_some_and(|k| map.contains_key(k)),
        _ => false,
    }
}

/// Ordering over JSON values: numeric for numbers, lexicographic for
/// strings, undefined otherwise (the predicate is simply false).
fn compare(actual: &Value, expected: &Value) -> Option<Ordering> {
    match (actual, expected) {
        (Value::Number(a), Value::Number(b)) => a.as_f64()?.partial_cmp(&b.as_f64()?),
        (Value::String(a), Value::String(b)) => Some(a.cmp(b)),
        _ => None,
    }
}

/// Evaluate an assertion, raising a classified failure carrying the
/// comparison detail when the predicate does not hold
pub fn assert_matches(actual: &Value, expected: &Value, assertion: AssertionType) -> Result<()> {
    if assertion.holds(actual, expected) {
        Ok(())
    } else {
        Err(Error::AssertionFailed {
            assertion: assertion.name().to_string(),
            expected: expected.clone(),
            actual: actual.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_aliases_and_case() {
        assert_eq!(AssertionType::parse("equals").unwrap(), AssertionType::Equals);
        assert_eq!(AssertionType::parse("equal_to").unwrap(), AssertionType::Equals);
        assert_eq!(AssertionType::parse("EQUALS").unwrap(), AssertionType::Equals);
        assert_eq!(AssertionType::parse("greater").unwrap(), AssertionType::Greater);
        assert_eq!(
            AssertionType::parse("Greater_Than").unwrap(),
            AssertionType::Greater
        );
        assert_eq!(
            AssertionType::parse("less_than").unwrap(),
            AssertionType::Less
        );
    }

    #[test]
    fn test_parse_unknown_name() {
        let err = AssertionType::parse("bogus").unwrap_err();
        match err {
            Error::UnknownAssertionType(name) => assert_eq!(name, "bogus"),
            other => panic!("expected UnknownAssertionType, got {other:?}"),
        }
    }

    #[test]
    fn test_equality_predicates() {
        assert!(AssertionType::Equals.holds(&json!(15), &json!(15)));
        assert!(!AssertionType::Equals.holds(&json!(15), &json!("15")));
        assert!(AssertionType::NotEquals.holds(&json!(1), &json!(2)));
    }

    #[test]
    fn test_contains_variants() {
        assert!(AssertionType::Contains.holds(&json!("hello world"), &json!("world")));
        assert!(AssertionType::Contains.holds(&json!([1, 2, 3]), &json!(2)));
        assert!(AssertionType::Contains.holds(&json!({"key": 1}), &json!("key")));
        assert!(AssertionType::NotContains.holds(&json!([1, 2]), &json!(5)));
        assert!(!AssertionType::Contains.holds(&json!(42), &json!(4)));
    }

    #[test]
    fn test_ordering_predicates() {
        assert!(AssertionType::Greater.holds(&json!(10), &json!(5)));
        assert!(AssertionType::Less.holds(&json!(2.5), &json!(3)));
        assert!(AssertionType::GreaterEqual.holds(&json!(5), &json!(5)));
        assert!(AssertionType::LessEqual.holds(&json!("abc"), &json!("abd")));
        // Mixed types have no ordering
        assert!(!AssertionType::Greater.holds(&json!("10"), &json!(5)));
    }

    #[test]
    fn test_nullity_predicates() {
        assert!(AssertionType::IsNone.holds(&Value::Null, &Value::Null));
        assert!(AssertionType::IsNotNone.holds(&json!(0), &Value::Null));
        assert!(!AssertionType::IsNotNone.requires_expected());
        assert!(AssertionType::Equals.requires_expected());
    }

    #[test]
    fn test_assert_matches_carries_detail() {
        let err = assert_matches(&json!(1), &json!(2), AssertionType::Equals).unwrap_err();
        match err {
            Error::AssertionFailed {
                assertion,
                expected,
                actual,
            } => {
                assert_eq!(assertion, "equals");
                assert_eq!(expected, json!(2));
                assert_eq!(actual, json!(1));
            }
            other => panic!("expected AssertionFailed, got {other:?}"),
        }
    }
}
