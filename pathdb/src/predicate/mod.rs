// Textual predicates for find/filter, e.g. `country=CO`, `name~^D`, `admin?`

use crate::error::{PathDbError, Result};
use crate::path::{self, IdPath};
use crate::value::Value;
use regex::Regex;

/// Field name that refers to the entry itself instead of one of its fields.
pub const SELF_FIELD: &str = "@";

/// A compiled predicate over one scanned entry.
#[derive(Debug, Clone)]
pub enum Predicate {
    /// `field=value`
    Equals { field: IdPath, value: Value },
    /// `field!=value`
    NotEquals { field: IdPath, value: Value },
    /// `field~regex`, only matches string values
    Matches { field: IdPath, pattern: Regex },
    /// `field?`
    Truthy { field: IdPath },
}

impl Predicate {
    pub fn parse(text: &str) -> Result<Self> {
        let text = text.trim();
        match text.find(['=', '~', '!']) {
            Some(pos) => {
                let field = parse_field(&text[..pos], text)?;
                let rest = &text[pos..];
                if let Some(raw) = rest.strip_prefix("!=") {
                    Ok(Predicate::NotEquals {
                        field,
                        value: parse_literal(raw.trim()),
                    })
                } else if let Some(raw) = rest.strip_prefix('=') {
                    Ok(Predicate::Equals {
                        field,
                        value: parse_literal(raw.trim()),
                    })
                } else if let Some(raw) = rest.strip_prefix('~') {
                    let pattern = Regex::new(raw.trim()).map_err(|e| {
                        PathDbError::InvalidCallback(format!("Invalid pattern in '{text}': {e}"))
                    })?;
                    Ok(Predicate::Matches { field, pattern })
                } else {
                    Err(PathDbError::InvalidCallback(format!(
                        "Expected '!=' in predicate '{text}'"
                    )))
                }
            }
            None => match text.strip_suffix('?') {
                Some(field) => Ok(Predicate::Truthy {
                    field: parse_field(field, text)?,
                }),
                None => Err(PathDbError::InvalidCallback(format!(
                    "Predicate '{text}' must look like field=value, field!=value, field~regex or field?"
                ))),
            },
        }
    }

    /// Evaluate against one entry value.
    pub fn matches(&self, entry: &Value) -> bool {
        match self {
            Predicate::Equals { field, value } => path::resolve(entry, field) == value,
            Predicate::NotEquals { field, value } => path::resolve(entry, field) != value,
            Predicate::Matches { field, pattern } => path::resolve(entry, field)
                .as_str()
                .map(|s| pattern.is_match(s))
                .unwrap_or(false),
            Predicate::Truthy { field } => path::resolve(entry, field).is_truthy(),
        }
    }
}

/// True when every predicate matches. An empty list matches everything.
pub fn all_match(predicates: &[Predicate], entry: &Value) -> bool {
    predicates.iter().all(|p| p.matches(entry))
}

/// Interpret text as a JSON literal, falling back to a plain string.
pub fn parse_literal(raw: &str) -> Value {
    serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string()))
}

fn parse_field(field: &str, text: &str) -> Result<IdPath> {
    let field = field.trim();
    if field == SELF_FIELD {
        return Ok(IdPath::root());
    }
    IdPath::parse(field).map_err(|_| {
        PathDbError::InvalidCallback(format!("Invalid field '{field}' in predicate '{text}'"))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    fn entry(json: &str) -> Value {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn test_equals() {
        let p = Predicate::parse("country=NI").unwrap();
        assert!(p.matches(&entry(r#"{"country":"NI"}"#)));
        assert!(!p.matches(&entry(r#"{"country":"CO"}"#)));
        assert!(!p.matches(&entry(r#"{}"#)));
    }

    #[test]
    fn test_equals_parses_json_literals() {
        assert!(Predicate::parse("age=30").unwrap().matches(&entry(r#"{"age":30}"#)));
        assert!(Predicate::parse("admin=true").unwrap().matches(&entry(r#"{"admin":true}"#)));
        assert!(!Predicate::parse("age=30").unwrap().matches(&entry(r#"{"age":"30"}"#)));
        assert!(Predicate::parse(r#"age="30""#).unwrap().matches(&entry(r#"{"age":"30"}"#)));
    }

    #[test]
    fn test_spaces_around_operator() {
        let david = entry(r#"{"name":"David","age":30}"#);
        assert!(Predicate::parse("name = David").unwrap().matches(&david));
        assert!(Predicate::parse("age != 31").unwrap().matches(&david));
        assert!(Predicate::parse("name ~ ^D").unwrap().matches(&david));
        assert!(Predicate::parse(r#"name=" David""#).unwrap().matches(&entry(r#"{"name":" David"}"#)));
    }

    #[test]
    fn test_not_equals() {
        let p = Predicate::parse("country!=CO").unwrap();
        assert!(p.matches(&entry(r#"{"country":"NI"}"#)));
        assert!(p.matches(&entry(r#"{}"#)));
        assert!(!p.matches(&entry(r#"{"country":"CO"}"#)));
    }

    #[test]
    fn test_regex() {
        let p = Predicate::parse("name~^D").unwrap();
        assert!(p.matches(&entry(r#"{"name":"David"}"#)));
        assert!(!p.matches(&entry(r#"{"name":"Free"}"#)));
        assert!(!p.matches(&entry(r#"{"name":5}"#)));
    }

    #[test]
    fn test_truthy_nested_field() {
        let p = Predicate::parse("profile.admin?").unwrap();
        assert!(p.matches(&entry(r#"{"profile":{"admin":true}}"#)));
        assert!(!p.matches(&entry(r#"{"profile":{"admin":0}}"#)));
    }

    #[test]
    fn test_self_field() {
        let p = Predicate::parse("@=5").unwrap();
        assert!(p.matches(&Value::from(5)));
        assert!(!p.matches(&Value::from(6)));
    }

    #[test]
    fn test_all_match() {
        let preds = vec![
            Predicate::parse("country=CO").unwrap(),
            Predicate::parse("name~a").unwrap(),
        ];
        assert!(all_match(&preds, &entry(r#"{"country":"CO","name":"Ana"}"#)));
        assert!(!all_match(&preds, &entry(r#"{"country":"CO","name":"Bob"}"#)));
        assert!(all_match(&[], &entry("{}")));
    }

    #[test]
    fn test_malformed_is_invalid_callback() {
        for text in ["", "name", "=x", "a..b=1", "name!x", "name~("] {
            let err = Predicate::parse(text).unwrap_err();
            assert_eq!(err.kind(), ErrorKind::InvalidCallback, "{text}");
        }
    }
}
