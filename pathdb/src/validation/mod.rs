use crate::error::{PathDbError, Result};
use crate::path::SEPARATOR;
use crate::value::Value;

/// Check an id string: non-empty, no empty segments, no trailing separator.
pub fn validate_id(id: &str) -> Result<()> {
    if id.is_empty() {
        return Err(PathDbError::InvalidId("ID must not be empty".into()));
    }
    if id.ends_with(SEPARATOR) {
        return Err(PathDbError::InvalidId(format!(
            "ID '{id}' must not end with '{SEPARATOR}'"
        )));
    }
    if id.split(SEPARATOR).any(str::is_empty) {
        return Err(PathDbError::InvalidId(format!(
            "ID '{id}' shouldn't contain blank segments"
        )));
    }
    Ok(())
}

/// Whether a value may be stored.
///
/// Every kind is storable except non-finite numbers, which have no JSON
/// encoding. Mappings and arrays are checked recursively.
pub fn is_valid(value: &Value) -> bool {
    match value {
        Value::Undefined | Value::Null | Value::Bool(_) | Value::String(_) => true,
        Value::Number(n) => n.is_finite(),
        Value::Array(items) => items.iter().all(is_valid),
        Value::Map(fields) => fields.values().all(is_valid),
    }
}

/// Reject values that cannot be stored, naming the first offending location.
pub fn validate(value: &Value) -> Result<()> {
    match first_invalid(value, String::new()) {
        None => Ok(()),
        Some((location, bad)) if location.is_empty() => Err(PathDbError::InvalidValue(format!(
            "The value cannot be stored: {} has no JSON encoding",
            describe(bad)
        ))),
        Some((location, bad)) => Err(PathDbError::InvalidValue(format!(
            "Field '{location}' cannot be stored: {} has no JSON encoding",
            describe(bad)
        ))),
    }
}

fn first_invalid(value: &Value, location: String) -> Option<(String, &Value)> {
    match value {
        Value::Number(n) if !n.is_finite() => Some((location, value)),
        Value::Array(items) => items
            .iter()
            .enumerate()
            .find_map(|(i, item)| first_invalid(item, join(&location, &i.to_string()))),
        Value::Map(fields) => fields
            .iter()
            .find_map(|(key, item)| first_invalid(item, join(&location, key))),
        _ => None,
    }
}

fn describe(value: &Value) -> String {
    match value {
        Value::Number(n) => format!("{} {n}", value.kind_name()),
        other => other.kind_name().to_string(),
    }
}

fn join(location: &str, key: &str) -> String {
    if location.is_empty() {
        key.to_string()
    } else {
        format!("{location}.{key}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    #[test]
    fn test_valid_ids() {
        for id in ["a", "0001", "a.b", "users.0001.name", "with space"] {
            assert!(validate_id(id).is_ok(), "{id} should be valid");
        }
    }

    #[test]
    fn test_invalid_ids() {
        for id in ["", "a..b", "a.", ".a", "."] {
            let err = validate_id(id).unwrap_err();
            assert_eq!(err.kind(), ErrorKind::InvalidId, "{id} should be rejected");
        }
    }

    #[test]
    fn test_accepted_kinds() {
        assert!(is_valid(&Value::from("text")));
        assert!(is_valid(&Value::from(1.5)));
        assert!(is_valid(&Value::from(false)));
        assert!(is_valid(&Value::Undefined));
        assert!(is_valid(&Value::Null));
        assert!(is_valid(&Value::from(vec![1, 2, 3])));
        assert!(is_valid(&Value::map()));
    }

    #[test]
    fn test_non_finite_rejected() {
        assert!(!is_valid(&Value::Number(f64::NAN)));
        assert!(!is_valid(&Value::Number(f64::INFINITY)));

        let nested: Value = [("score", Value::Number(f64::NEG_INFINITY))].into_iter().collect();
        assert!(!is_valid(&nested));
        let err = validate(&nested).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidValue);
        assert!(err.to_string().contains("'score'"));
        assert!(err.to_string().contains("number -inf"));
    }

    #[test]
    fn test_validate_reports_array_index() {
        let value: Value = [("list", Value::Array(vec![Value::from(1), Value::Number(f64::NAN)]))]
            .into_iter()
            .collect();
        let err = validate(&value).unwrap_err();
        assert!(err.to_string().contains("'list.1'"));
    }
}
