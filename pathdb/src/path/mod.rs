// Dot-separated id paths - parsing, resolution, and create-if-missing assignment

use crate::error::Result;
use crate::validation;
use crate::value::{array_index, Map, Value, UNDEFINED};
use std::fmt;
use std::str::FromStr;

/// Separator between id segments.
pub const SEPARATOR: char = '.';

/// A validated address into a document tree.
///
/// The root path has no segments and addresses the whole document. Every
/// other path is built from an id string that passed [`validation::validate_id`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct IdPath {
    segments: Vec<String>,
}

impl IdPath {
    /// The whole-document path.
    pub fn root() -> Self {
        IdPath::default()
    }

    /// Parse and validate an id such as `users.0001.name`.
    pub fn parse(id: &str) -> Result<Self> {
        validation::validate_id(id)?;
        Ok(IdPath {
            segments: id.split(SEPARATOR).map(str::to_string).collect(),
        })
    }

    pub fn is_root(&self) -> bool {
        self.segments.is_empty()
    }

    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    /// The path of a direct child entry. The key is taken verbatim as one segment.
    pub fn child(&self, key: &str) -> IdPath {
        let mut segments = self.segments.clone();
        segments.push(key.to_string());
        IdPath { segments }
    }
}

impl fmt::Display for IdPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_root() {
            return f.write_str("/");
        }
        f.write_str(&self.segments.join("."))
    }
}

impl FromStr for IdPath {
    type Err = crate::error::PathDbError;

    fn from_str(s: &str) -> Result<Self> {
        IdPath::parse(s)
    }
}

/// Look up the value at `path`. Array elements are addressed by index. Absent
/// entries, out-of-range indexes, and steps through scalars resolve to
/// `Undefined`. Never modifies the document.
pub fn resolve<'a>(document: &'a Value, path: &IdPath) -> &'a Value {
    path.segments
        .iter()
        .try_fold(document, |node, segment| node.get(segment))
        .unwrap_or(&UNDEFINED)
}

/// Write `value` at `path`, creating intermediate mappings as needed.
///
/// Arrays are updated in place when the segment is an index, padding with
/// `null` past the end. Any other intermediate that is not a mapping is
/// replaced by an empty one. With `create_only`, a truthy value already at the
/// final segment wins and is returned untouched. Returns the value now stored
/// at `path`.
pub fn assign(document: &mut Value, path: &IdPath, value: Value, create_only: bool) -> Value {
    let Some((last, parents)) = path.segments.split_last() else {
        if create_only && document.is_truthy() {
            return document.clone();
        }
        *document = if value.is_map() { value } else { Value::map() };
        return document.clone();
    };

    let mut node = document;
    for segment in parents {
        node = child_slot(node, segment);
    }

    let slot = child_slot(node, last);
    if create_only && slot.is_truthy() {
        return slot.clone();
    }
    *slot = value;
    slot.clone()
}

fn child_slot<'a>(node: &'a mut Value, segment: &str) -> &'a mut Value {
    let index = match node {
        Value::Array(_) => array_index(segment),
        _ => None,
    };
    match (node, index) {
        (Value::Array(items), Some(index)) => {
            if index >= items.len() {
                items.resize(index + 1, Value::Null);
            }
            &mut items[index]
        }
        (node, _) => ensure_map(node).entry(segment.to_string()).or_default(),
    }
}

fn ensure_map(node: &mut Value) -> &mut Map {
    if !node.is_map() {
        *node = Value::map();
    }
    match node {
        Value::Map(m) => m,
        _ => unreachable!("node was just replaced with a mapping"),
    }
}
