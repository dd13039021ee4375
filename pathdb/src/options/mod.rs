use crate::error::{PathDbError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Extension of every database file.
pub const FILE_EXTENSION: &str = "json";

/// Options used to open a [`crate::Store`].
///
/// Can be built in code or loaded from a YAML options file:
///
/// ```yaml
/// dir: ./data
/// name: users
/// raw: false
/// filename: users-v1
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoreOptions {
    /// Directory holding the database file. Created if absent.
    #[serde(alias = "dir")]
    pub directory: PathBuf,
    /// Name of the database; also the file's base name unless `filename` is set.
    pub name: String,
    /// Base name override for the database file.
    #[serde(default)]
    pub filename: Option<String>,
    /// Return plain values instead of live objects from read operations.
    #[serde(default)]
    pub raw: bool,
}

impl StoreOptions {
    pub fn new(directory: impl Into<PathBuf>, name: impl Into<String>) -> Self {
        StoreOptions {
            directory: directory.into(),
            name: name.into(),
            filename: None,
            raw: false,
        }
    }

    pub fn raw(mut self, raw: bool) -> Self {
        self.raw = raw;
        self
    }

    pub fn filename(mut self, filename: impl Into<String>) -> Self {
        self.filename = Some(filename.into());
        self
    }

    /// Parse options from YAML. Missing or mistyped fields are invalid options.
    pub fn from_yaml_str(content: &str) -> Result<Self> {
        serde_yaml::from_str(content)
            .map_err(|e| PathDbError::InvalidOptions(format!("Failed to parse options: {e}")))
    }

    /// Load options from a YAML file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&content)
    }

    pub fn validate(&self) -> Result<()> {
        if self.directory.as_os_str().is_empty() {
            return Err(PathDbError::InvalidOptions(
                "The directory path is required".into(),
            ));
        }
        if self.name.is_empty() {
            return Err(PathDbError::InvalidOptions(
                "The name of the database is required".into(),
            ));
        }
        Ok(())
    }

    /// Base name of the database file: `filename` when set and non-empty, else `name`.
    pub fn file_stem(&self) -> &str {
        match self.filename.as_deref() {
            Some(f) if !f.is_empty() => f,
            _ => &self.name,
        }
    }

    /// Full path of the database file.
    pub fn file_path(&self) -> PathBuf {
        self.directory
            .join(format!("{}.{FILE_EXTENSION}", self.file_stem()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_file_path_uses_name() {
        let opts = StoreOptions::new("/data", "users");
        assert_eq!(opts.file_path(), PathBuf::from("/data/users.json"));
        assert!(!opts.raw);
    }

    #[test]
    fn test_file_path_uses_filename_override() {
        let opts = StoreOptions::new("/data", "users").filename("people");
        assert_eq!(opts.file_path(), PathBuf::from("/data/people.json"));

        let empty = StoreOptions::new("/data", "users").filename("");
        assert_eq!(empty.file_path(), PathBuf::from("/data/users.json"));
    }

    #[test]
    fn test_validate_rejects_missing_fields() {
        let err = StoreOptions::new("", "users").validate().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidOptions);

        let err = StoreOptions::new("/data", "").validate().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidOptions);
    }

    #[test]
    fn test_from_yaml() {
        let opts = StoreOptions::from_yaml_str("dir: ./data\nname: test\nraw: true\nfilename: filename\n")
            .unwrap();
        assert_eq!(opts.directory, PathBuf::from("./data"));
        assert_eq!(opts.name, "test");
        assert!(opts.raw);
        assert_eq!(opts.filename.as_deref(), Some("filename"));

        let long = StoreOptions::from_yaml_str("directory: x\nname: y").unwrap();
        assert_eq!(long, StoreOptions::new("x", "y"));
    }

    #[test]
    fn test_from_yaml_missing_name_is_invalid_options() {
        let err = StoreOptions::from_yaml_str("dir: ./data\n").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidOptions);
    }

    #[test]
    fn test_from_yaml_non_string_name_is_invalid_options() {
        let err = StoreOptions::from_yaml_str("dir: ./data\nname: [a, b]\n").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidOptions);
    }
}
