// Document file I/O - whole-file read and atomic whole-file rewrite

use crate::error::Result;
use crate::serializer;
use crate::value::Value;
use std::io::Write;
use std::path::Path;
use tempfile::NamedTempFile;

/// Contents written when a database file is first created.
pub const EMPTY_DOCUMENT: &str = "{}";

/// Read and decode the whole database file.
pub fn read_document(path: &Path) -> Result<Value> {
    let content = std::fs::read_to_string(path)?;
    serializer::decode_document(&content)
}

/// Encode and write the whole database file.
///
/// The document is written to a temporary file next to the target and renamed
/// over it, so readers see either the old or the new document.
pub fn write_document(path: &Path, document: &Value) -> Result<()> {
    let text = serializer::encode_document(document)?;
    let dir = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));

    let mut tmp = NamedTempFile::new_in(dir)?;
    tmp.write_all(text.as_bytes())?;
    tmp.as_file().sync_all()?;
    tmp.persist(path)?;
    Ok(())
}

/// Create the file with an empty document if it does not exist yet.
/// Returns true when the file was created.
pub fn ensure_document(path: &Path) -> Result<bool> {
    if path.exists() {
        return Ok(false);
    }
    std::fs::write(path, EMPTY_DOCUMENT)?;
    Ok(true)
}
