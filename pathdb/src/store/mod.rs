use crate::document;
use crate::error::{PathDbError, Result};
use crate::live::LiveObject;
use crate::options::StoreOptions;
use crate::path::{self, IdPath};
use crate::serializer;
use crate::validation;
use crate::value::Value;
use serde::ser::{Serialize, Serializer};
use std::ops::Index;
use std::path::{Path, PathBuf};

/// Id accepted by `find`/`filter` as an explicit alias for the whole document.
pub const ROOT_ID: &str = "/";

/// The main entry point for pathdb.
/// Owns the location of one database file and runs every operation as a
/// full load, modify, and rewrite of that file.
#[derive(Debug, Clone)]
pub struct Store {
    options: StoreOptions,
    file: PathBuf,
}

/// Result of a read: a live object for mappings, the plain value otherwise.
#[derive(Debug, Clone, PartialEq)]
pub enum Item {
    Live(LiveObject),
    Raw(Value),
}

/// Result of [`Store::filter`].
///
/// When every match is a mapping the matches come back as live objects.
/// Otherwise the whole result is raw `(key, value)` pairs.
#[derive(Debug, Clone, PartialEq)]
pub enum Filtered {
    Live(Vec<LiveObject>),
    Raw(Vec<(String, Value)>),
}

impl Store {
    /// Open a database, creating its directory and an empty file if needed.
    pub fn open(options: StoreOptions) -> Result<Self> {
        options.validate()?;

        if !options.directory.exists() {
            std::fs::create_dir_all(&options.directory)?;
            log::info!("Created database directory {}", options.directory.display());
        }

        let file = options.file_path();
        if document::ensure_document(&file)? {
            log::info!("Created database file {}", file.display());
        }

        Ok(Store { options, file })
    }

    /// Path of the database file.
    pub fn file(&self) -> &Path {
        &self.file
    }

    pub fn options(&self) -> &StoreOptions {
        &self.options
    }

    pub fn is_raw(&self) -> bool {
        self.options.raw
    }

    // ── Operations ──────────────────────────────────────────────────

    /// The whole document, as a live object rooted at the document unless raw.
    pub fn all(&self) -> Result<Item> {
        let data = self.load()?;
        Ok(self.wrap(data, IdPath::root()))
    }

    /// Store `initial` at `id` unless a truthy value is already there.
    /// Returns whichever value ends up stored.
    pub fn create(&self, id: &str, initial: impl Into<Value>) -> Result<Value> {
        let id = IdPath::parse(id)?;
        let value = initial.into();
        validation::validate(&value)?;

        let data = self.load()?;
        let existing = path::resolve(&data, &id);
        if existing.is_truthy() {
            return Ok(existing.clone());
        }
        self.write(data, &id, value, true)
    }

    /// The value at `id`; mappings are wrapped as live objects unless raw.
    pub fn get(&self, id: &str) -> Result<Item> {
        let id = IdPath::parse(id)?;
        let data = self.load()?;
        let value = path::resolve(&data, &id).clone();
        Ok(self.wrap(value, id))
    }

    /// Store `value` at `id`, overwriting whatever is there.
    pub fn set(&self, id: &str, value: impl Into<Value>) -> Result<Value> {
        let id = IdPath::parse(id)?;
        let value = value.into();
        validation::validate(&value)?;

        let data = self.load()?;
        self.write(data, &id, value, false)
    }

    /// Remove the value at `id`, returning what was stored there.
    /// Falsy values count as missing and fail with not-found.
    pub fn delete(&self, id: &str) -> Result<Value> {
        let id = IdPath::parse(id)?;
        let data = self.load()?;

        let current = path::resolve(&data, &id);
        if !current.is_truthy() {
            return Err(PathDbError::NotFound { id: id.to_string() });
        }
        let previous = current.clone();

        self.write(data, &id, Value::Undefined, false)?;
        Ok(previous)
    }

    /// Whether the value at `id` is truthy. A key holding `0`, `false`, `""`
    /// or `null` does not exist by this definition.
    pub fn exists(&self, id: &str) -> Result<bool> {
        let id = IdPath::parse(id)?;
        let data = self.load()?;
        Ok(path::resolve(&data, &id).is_truthy())
    }

    /// First entry under `start` (the whole document when `None`) whose value
    /// satisfies `predicate`, scanning in insertion order.
    pub fn find<F>(&self, mut predicate: F, start: Option<&str>) -> Result<Option<Item>>
    where
        F: FnMut(&Value) -> bool,
    {
        let start = parse_start(start)?;
        let data = self.load()?;
        let base = path::resolve(&data, &start);

        let found = entries(base).find(|(_, value)| predicate(*value));
        Ok(found.map(|(key, value)| self.wrap(value.clone(), start.child(&key))))
    }

    /// Every entry under `start` (the whole document when `None`) whose value
    /// satisfies `predicate`, in insertion order.
    pub fn filter<F>(&self, mut predicate: F, start: Option<&str>) -> Result<Filtered>
    where
        F: FnMut(&Value) -> bool,
    {
        let start = parse_start(start)?;
        let data = self.load()?;
        let base = path::resolve(&data, &start);

        let matches: Vec<(String, Value)> = entries(base)
            .filter(|(_, value)| predicate(*value))
            .map(|(key, value)| (key, value.clone()))
            .collect();

        let all_mappings = matches.iter().all(|(_, value)| value.is_map());
        if self.options.raw || !all_mappings {
            return Ok(Filtered::Raw(matches));
        }

        let objects = matches
            .into_iter()
            .filter_map(|(key, value)| match value {
                Value::Map(fields) => Some(LiveObject::new(
                    fields,
                    start.child(&key),
                    self.file.clone(),
                )),
                _ => None,
            })
            .collect();
        Ok(Filtered::Live(objects))
    }

    // ── Internals ───────────────────────────────────────────────────

    fn load(&self) -> Result<Value> {
        document::read_document(&self.file)
    }

    fn write(&self, mut data: Value, id: &IdPath, value: Value, create_only: bool) -> Result<Value> {
        let stored = path::assign(&mut data, id, value, create_only);
        document::write_document(&self.file, &data)?;
        log::debug!("Wrote {} = {}", id, serializer::serialize(&stored));
        Ok(stored)
    }

    fn wrap(&self, value: Value, id: IdPath) -> Item {
        match value {
            Value::Map(fields) if !self.options.raw => {
                Item::Live(LiveObject::new(fields, id, self.file.clone()))
            }
            other => Item::Raw(other),
        }
    }
}

fn parse_start(start: Option<&str>) -> Result<IdPath> {
    match start {
        None | Some(ROOT_ID) => Ok(IdPath::root()),
        Some(id) => IdPath::parse(id),
    }
}

/// Addressable entries of a scan base. Array elements are keyed by index.
/// Falsy bases and scalars have no entries; empty keys are skipped since no id
/// can address them.
fn entries(base: &Value) -> Box<dyn Iterator<Item = (String, &Value)> + '_> {
    match base {
        Value::Map(fields) => Box::new(
            fields
                .iter()
                .filter(|(key, _)| !key.is_empty())
                .map(|(key, value)| (key.clone(), value)),
        ),
        Value::Array(items) => Box::new(
            items
                .iter()
                .enumerate()
                .map(|(i, value)| (i.to_string(), value)),
        ),
        _ => Box::new(std::iter::empty()),
    }
}

// ── Result types ────────────────────────────────────────────────────

impl Item {
    pub fn is_live(&self) -> bool {
        matches!(self, Item::Live(_))
    }

    pub fn as_live(&self) -> Option<&LiveObject> {
        match self {
            Item::Live(obj) => Some(obj),
            Item::Raw(_) => None,
        }
    }

    pub fn into_live(self) -> Option<LiveObject> {
        match self {
            Item::Live(obj) => Some(obj),
            Item::Raw(_) => None,
        }
    }

    /// The plain value, unwrapping live objects.
    pub fn into_value(self) -> Value {
        match self {
            Item::Live(obj) => obj.into_value(),
            Item::Raw(value) => value,
        }
    }

    pub fn to_value(&self) -> Value {
        match self {
            Item::Live(obj) => obj.to_value(),
            Item::Raw(value) => value.clone(),
        }
    }
}

impl Index<&str> for Item {
    type Output = Value;

    fn index(&self, key: &str) -> &Value {
        match self {
            Item::Live(obj) => &obj[key],
            Item::Raw(value) => &value[key],
        }
    }
}

impl Serialize for Item {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match self {
            Item::Live(obj) => obj.serialize(serializer),
            Item::Raw(value) => value.serialize(serializer),
        }
    }
}

impl Filtered {
    pub fn len(&self) -> usize {
        match self {
            Filtered::Live(objects) => objects.len(),
            Filtered::Raw(pairs) => pairs.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Flatten to `(key, value)` pairs regardless of wrapping.
    pub fn into_pairs(self) -> Vec<(String, Value)> {
        match self {
            Filtered::Live(objects) => objects
                .into_iter()
                .map(|obj| {
                    let key = obj.id().segments().last().cloned().unwrap_or_default();
                    (key, obj.into_value())
                })
                .collect(),
            Filtered::Raw(pairs) => pairs,
        }
    }
}

impl Serialize for Filtered {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match self {
            Filtered::Live(objects) => serializer.collect_seq(objects),
            Filtered::Raw(pairs) => serializer.collect_seq(pairs),
        }
    }
}
