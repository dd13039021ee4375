// Live objects - detached snapshots of nested mappings with an explicit save

use crate::document;
use crate::error::{PathDbError, Result};
use crate::path::{self, IdPath};
use crate::validation;
use crate::value::{Map, Value, UNDEFINED};
use serde::{Serialize, Serializer};
use std::ops::{Deref, DerefMut, Index};
use std::path::{Path, PathBuf};

/// A mutable snapshot of a mapping read from the store.
///
/// Fields are edited directly (the object derefs to its field [`Map`]) and
/// nothing touches the file until [`LiveObject::save`]. Saving reloads the
/// file, overwrites the value at the object's id, and rewrites the file. Changes
/// made to that id by anyone else since the snapshot was taken are lost.
#[derive(Debug, Clone, PartialEq)]
pub struct LiveObject {
    id: IdPath,
    file: PathBuf,
    fields: Map,
}

impl LiveObject {
    pub(crate) fn new(fields: Map, id: IdPath, file: PathBuf) -> Self {
        LiveObject { id, file, fields }
    }

    /// The id this object was read from.
    pub fn id(&self) -> &IdPath {
        &self.id
    }

    /// The database file this object saves into.
    pub fn file(&self) -> &Path {
        &self.file
    }

    /// Field value, or `Undefined` when missing.
    pub fn get(&self, key: &str) -> &Value {
        self.fields.get(key).unwrap_or(&UNDEFINED)
    }

    /// Set a field, returning the previous value if there was one.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.fields.insert(key.into(), value.into())
    }

    /// Remove a field, keeping the order of the remaining ones.
    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.fields.shift_remove(key)
    }

    pub fn to_value(&self) -> Value {
        Value::Map(self.fields.clone())
    }

    pub fn into_value(self) -> Value {
        Value::Map(self.fields)
    }

    /// Write the current fields back at this object's id. Returns the stored value.
    pub fn save(&self) -> Result<Value> {
        let value = self.to_value();
        validation::validate(&value)?;

        let mut data = document::read_document(&self.file)?;
        let stored = path::assign(&mut data, &self.id, value, false);
        document::write_document(&self.file, &data)?;

        log::debug!("Saved live object {} to {}", self.id, self.file.display());
        Ok(stored)
    }

    /// Replace the snapshot with what is currently stored at this object's id.
    pub fn reload(&mut self) -> Result<()> {
        let data = document::read_document(&self.file)?;
        match path::resolve(&data, &self.id) {
            Value::Map(fields) => {
                self.fields = fields.clone();
                Ok(())
            }
            _ => Err(PathDbError::NotFound {
                id: self.id.to_string(),
            }),
        }
    }
}

impl Deref for LiveObject {
    type Target = Map;

    fn deref(&self) -> &Map {
        &self.fields
    }
}

impl DerefMut for LiveObject {
    fn deref_mut(&mut self) -> &mut Map {
        &mut self.fields
    }
}

impl Index<&str> for LiveObject {
    type Output = Value;

    fn index(&self, key: &str) -> &Value {
        self.get(key)
    }
}

impl Serialize for LiveObject {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_map(self.fields.iter().filter(|(_, v)| !v.is_undefined()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    fn setup(content: &str) -> (TempDir, PathBuf) {
        let tmp = TempDir::new().unwrap();
        let file = tmp.path().join("db.json");
        std::fs::write(&file, content).unwrap();
        (tmp, file)
    }

    fn live(file: &Path, id: &str) -> LiveObject {
        let data = document::read_document(file).unwrap();
        let id = IdPath::parse(id).unwrap();
        let fields = path::resolve(&data, &id).as_map().unwrap().clone();
        LiveObject::new(fields, id, file.to_path_buf())
    }

    #[test]
    fn test_field_access() {
        let (_tmp, file) = setup(r#"{"0001":{"name":"David","country":"CO"}}"#);
        let mut obj = live(&file, "0001");

        assert_eq!(obj["name"], Value::from("David"));
        assert_eq!(obj.get("missing"), &Value::Undefined);
        assert_eq!(obj.len(), 2);

        let previous = obj.set("name", "Deivid");
        assert_eq!(previous, Some(Value::from("David")));
        assert_eq!(obj.remove("country"), Some(Value::from("CO")));
        assert_eq!(obj.to_value(), [("name", "Deivid")].into_iter().collect::<Value>());
    }

    #[test]
    fn test_edits_are_not_persisted_until_save() {
        let (_tmp, file) = setup(r#"{"0001":{"name":"David"}}"#);
        let mut obj = live(&file, "0001");
        obj.set("name", "Deivid");

        let on_disk = document::read_document(&file).unwrap();
        assert_eq!(on_disk["0001"]["name"], Value::from("David"));

        let stored = obj.save().unwrap();
        assert_eq!(stored["name"], Value::from("Deivid"));
        let on_disk = document::read_document(&file).unwrap();
        assert_eq!(on_disk["0001"]["name"], Value::from("Deivid"));
    }

    #[test]
    fn test_save_keeps_sibling_changes_made_after_snapshot() {
        let (_tmp, file) = setup(r#"{"0001":{"name":"David"},"0002":{"name":"Free"}}"#);
        let mut obj = live(&file, "0001");

        std::fs::write(&file, r#"{"0001":{"name":"David"},"0002":{"name":"Changed"}}"#).unwrap();
        obj.set("name", "Deivid");
        obj.save().unwrap();

        let on_disk = document::read_document(&file).unwrap();
        assert_eq!(on_disk["0002"]["name"], Value::from("Changed"));
        assert_eq!(on_disk["0001"]["name"], Value::from("Deivid"));
    }

    #[test]
    fn test_last_save_wins() {
        let (_tmp, file) = setup(r#"{"0001":{"name":"David","age":1}}"#);
        let mut first = live(&file, "0001");
        let mut second = live(&file, "0001");

        first.set("name", "First");
        second.set("age", 2);
        first.save().unwrap();
        second.save().unwrap();

        let on_disk = document::read_document(&file).unwrap();
        assert_eq!(on_disk["0001"]["name"], Value::from("David"));
        assert_eq!(on_disk["0001"]["age"], Value::from(2));
    }

    #[test]
    fn test_save_rejects_invalid_field() {
        let (_tmp, file) = setup(r#"{"0001":{"score":1}}"#);
        let mut obj = live(&file, "0001");
        obj.set("score", f64::NAN);

        let err = obj.save().unwrap_err();
        assert_eq!(err.kind(), crate::error::ErrorKind::InvalidValue);
        let on_disk = document::read_document(&file).unwrap();
        assert_eq!(on_disk["0001"]["score"], Value::from(1));
    }

    #[test]
    fn test_reload() {
        let (_tmp, file) = setup(r#"{"0001":{"name":"David"}}"#);
        let mut obj = live(&file, "0001");
        std::fs::write(&file, r#"{"0001":{"name":"External"}}"#).unwrap();

        assert_eq!(obj["name"], Value::from("David"));
        obj.reload().unwrap();
        assert_eq!(obj["name"], Value::from("External"));

        std::fs::write(&file, r#"{}"#).unwrap();
        let err = obj.reload().unwrap_err();
        assert_eq!(err.kind(), crate::error::ErrorKind::NotFound);
    }

    #[test]
    fn test_serialize_skips_undefined_fields() {
        let (_tmp, file) = setup(r#"{"0001":{"name":"David","country":"CO"}}"#);
        let mut obj = live(&file, "0001");
        obj.set("country", Value::Undefined);
        assert_eq!(serde_json::to_string(&obj).unwrap(), r#"{"name":"David"}"#);
    }
}
