// Value serialization - display text for single values, strict JSON for whole documents

use crate::error::Result;
use crate::value::Value;
use serde::Serialize;
use serde_json::ser::{CompactFormatter, Formatter};
use std::io;

/// Token written for the missing-sentinel by [`serialize`].
pub const UNDEFINED_TOKEN: &str = "undefined";

/// Integral numbers below this magnitude are written out in full digits.
const EXPONENT_THRESHOLD: f64 = 1e21;

/// Compact JSON, except integral floats below 1e21 are written without an
/// exponent (`100000000000000000000`, not `1e20`).
struct NumberFormatter;

impl Formatter for NumberFormatter {
    fn write_f64<W: ?Sized + io::Write>(&mut self, writer: &mut W, value: f64) -> io::Result<()> {
        if value.fract() == 0.0 && value.abs() < EXPONENT_THRESHOLD {
            write!(writer, "{value}")
        } else {
            CompactFormatter.write_f64(writer, value)
        }
    }
}

fn to_json_string(value: &Value) -> serde_json::Result<String> {
    let mut out = Vec::new();
    let mut ser = serde_json::Serializer::with_formatter(&mut out, NumberFormatter);
    value.serialize(&mut ser)?;
    // serde_json only ever writes UTF-8
    Ok(String::from_utf8_lossy(&out).into_owned())
}

/// Render a value as text.
///
/// Strings, numbers and mappings use canonical JSON encoding, booleans are
/// `true`/`false`, and arrays are rendered element by element. The
/// missing-sentinel renders as the bare token `undefined`, so the output is
/// not always valid JSON. Use [`encode_document`] for anything written to disk.
pub fn serialize(value: &Value) -> String {
    match value {
        Value::Undefined => UNDEFINED_TOKEN.to_string(),
        Value::Bool(true) => "true".to_string(),
        Value::Bool(false) => "false".to_string(),
        Value::Array(items) => {
            let parts: Vec<String> = items.iter().map(serialize).collect();
            format!("[{}]", parts.join(","))
        }
        other => to_json_string(other).unwrap_or_else(|_| UNDEFINED_TOKEN.to_string()),
    }
}

/// Encode a whole document for the database file.
///
/// Always strict JSON: mapping entries holding the missing-sentinel are left
/// out and sentinels inside arrays become `null`.
pub fn encode_document(document: &Value) -> Result<String> {
    Ok(to_json_string(document)?)
}

/// Decode the contents of a database file.
pub fn decode_document(text: &str) -> Result<Value> {
    Ok(serde_json::from_str(text)?)
}
