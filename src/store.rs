//! File-backed telemetry store.
//!
//! The store owns the full parsed document so keys it does not know about
//! survive every write. Each mutation rewrites the whole file:
//!
//! 1. update the in-memory document,
//! 2. serialize it (pretty-printed, 4-space indent by default),
//! 3. overwrite the file at the original path,
//! 4. update the typed [`TelemetryRecord`].
//!
//! There is no rollback. If step 3 fails the document already holds the new
//! values while the record still reports the old ones.

use crate::errors::{TelemetryError, TelemetryResult};
use crate::identifiers::{generate_id_pair, HEX_ID_LENGTH};
use crate::record::{
    TelemetryRecord, TelemetryStats, MAC_MACHINE_ID_KEY, MACHINE_ID_KEY,
};

use serde::Serialize;
use serde_json::ser::PrettyFormatter;
use serde_json::{Map, Value};
use std::fs::{self, File};
use std::io::{self, ErrorKind, Write};
use std::path::{Path, PathBuf};

/// Indentation used when writing the document back.
pub const DEFAULT_INDENT: usize = 4;

/// A loaded `storage.json` document plus its typed telemetry view.
#[derive(Debug)]
pub struct TelemetryStore {
    path: PathBuf,
    indent: usize,
    document: Map<String, Value>,
    record: TelemetryRecord,
}

impl TelemetryStore {
    /// Load the document at `path`.
    ///
    /// Returns:
    /// - `Err(TelemetryError::NotFound)` if the file does not exist.
    /// - `Err(TelemetryError::Format)` if it is not a JSON object.
    /// - `Err(TelemetryError::Read)` for any other I/O failure.
    pub fn load(path: impl AsRef<Path>) -> TelemetryResult<Self> {
        Self::load_with_indent(path, DEFAULT_INDENT)
    }

    /// Like [`TelemetryStore::load`], with a custom indentation for writes.
    pub fn load_with_indent(path: impl AsRef<Path>, indent: usize) -> TelemetryResult<Self> {
        let path = path.as_ref().to_path_buf();
        let document = read_document(&path)?;
        let record = TelemetryRecord::from_document(&document);
        log::debug!(
            "Loaded {} keys from {} ({} telemetry fields set)",
            document.len(),
            path.display(),
            record.non_empty_count()
        );

        Ok(Self {
            path,
            indent,
            document,
            record,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The full document, including keys the store does not interpret.
    pub fn document(&self) -> &Map<String, Value> {
        &self.document
    }

    pub fn record(&self) -> &TelemetryRecord {
        &self.record
    }

    pub fn sqm_id(&self) -> &str {
        &self.record.sqm_id
    }

    pub fn machine_id(&self) -> &str {
        &self.record.machine_id
    }

    pub fn dev_device_id(&self) -> &str {
        &self.record.dev_device_id
    }

    pub fn mac_machine_id(&self) -> &str {
        &self.record.mac_machine_id
    }

    /// Replace `telemetry.machineId` and write the document back.
    pub fn set_machine_id(&mut self, new_value: &str) -> TelemetryResult<()> {
        self.document
            .insert(MACHINE_ID_KEY.to_string(), Value::String(new_value.to_string()));
        self.persist()?;
        self.record.machine_id = new_value.to_string();
        log::debug!("Updated machine id in {}", self.path.display());
        Ok(())
    }

    /// Generate new `machineId` and `macMachineId` values and write both.
    ///
    /// Returns the new `(machine_id, mac_machine_id)` pair.
    pub fn regenerate_ids(&mut self) -> TelemetryResult<(String, String)> {
        let (machine_id, mac_machine_id) = generate_id_pair();

        self.document
            .insert(MACHINE_ID_KEY.to_string(), Value::String(machine_id.clone()));
        self.document.insert(
            MAC_MACHINE_ID_KEY.to_string(),
            Value::String(mac_machine_id.clone()),
        );
        self.persist()?;

        self.record.machine_id = machine_id.clone();
        self.record.mac_machine_id = mac_machine_id.clone();
        log::info!("Regenerated telemetry ids in {}", self.path.display());

        Ok((machine_id, mac_machine_id))
    }

    /// Summarise the current record, then regenerate both machine ids.
    ///
    /// Note that this mutates the store and the file on disk: the counts
    /// describe the record before regeneration, the ids are the new ones.
    pub fn generate_stats(&mut self) -> TelemetryResult<TelemetryStats> {
        let before = self.record.clone();
        let (new_machine_id, new_mac_machine_id) = self.regenerate_ids()?;
        debug_assert_eq!(new_machine_id.len(), HEX_ID_LENGTH);

        Ok(TelemetryStats {
            total_fields: TelemetryRecord::FIELD_COUNT,
            non_empty_fields: before.non_empty_count(),
            total_characters: before.total_characters(),
            hex_length: new_machine_id.chars().count(),
            new_machine_id,
            new_mac_machine_id,
        })
    }

    /// Serialize the whole document and overwrite the backing file.
    fn persist(&self) -> TelemetryResult<()> {
        let write_error = |source: io::Error| TelemetryError::Write {
            path: self.path.clone(),
            source,
        };

        let bytes = to_pretty_json(&self.document, self.indent).map_err(write_error)?;

        // The handle is closed when `file` drops, on success and on error.
        let mut file = File::create(&self.path).map_err(write_error)?;
        file.write_all(&bytes).map_err(write_error)?;
        file.flush().map_err(write_error)?;

        log::debug!("Wrote {} bytes to {}", bytes.len(), self.path.display());
        Ok(())
    }
}

/// Read and parse `path` as a JSON object.
fn read_document(path: &Path) -> TelemetryResult<Map<String, Value>> {
    let contents = match fs::read_to_string(path) {
        Ok(s) => s,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            return Err(TelemetryError::NotFound {
                path: path.to_path_buf(),
            });
        }
        Err(e) if e.kind() == ErrorKind::InvalidData => {
            // Not UTF-8, so not JSON either.
            return Err(TelemetryError::Format {
                path: path.to_path_buf(),
                reason: e.to_string(),
            });
        }
        Err(e) => {
            return Err(TelemetryError::Read {
                path: path.to_path_buf(),
                source: e,
            });
        }
    };

    let value: Value = serde_json::from_str(&contents).map_err(|e| TelemetryError::Format {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;

    match value {
        Value::Object(map) => Ok(map),
        other => Err(TelemetryError::Format {
            path: path.to_path_buf(),
            reason: format!("expected a JSON object, found {}", json_kind(&other)),
        }),
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// Pretty-print `value` with `indent` spaces per level.
fn to_pretty_json<T: Serialize>(value: &T, indent: usize) -> io::Result<Vec<u8>> {
    let indent = " ".repeat(indent);
    let mut buf = Vec::new();
    let formatter = PrettyFormatter::with_indent(indent.as_bytes());
    let mut serializer = serde_json::Serializer::with_formatter(&mut buf, formatter);
    value.serialize(&mut serializer)?;
    Ok(buf)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    fn fixture(dir: &TempDir, contents: &str) -> PathBuf {
        let path = dir.path().join("storage.json");
        fs::write(&path, contents).expect("writing fixture should succeed");
        path
    }

    #[test]
    fn pretty_json_uses_requested_indent() {
        let bytes = to_pretty_json(&json!({ "a": { "b": 1 } }), 4).unwrap();
        let text = String::from_utf8(bytes).unwrap();
        assert_eq!(text, "{\n    \"a\": {\n        \"b\": 1\n    }\n}");
    }

    #[test]
    fn top_level_array_is_a_format_error() {
        let dir = TempDir::new().unwrap();
        let path = fixture(&dir, "[1, 2, 3]");

        match TelemetryStore::load(&path) {
            Err(TelemetryError::Format { reason, .. }) => {
                assert!(reason.contains("an array"), "unexpected reason: {reason}");
            }
            other => panic!("Expected Format error, got: {:?}", other),
        }
    }

    #[test]
    fn non_utf8_file_is_a_format_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("storage.json");
        fs::write(&path, [0xff, 0xfe, 0x00]).unwrap();

        assert!(matches!(
            TelemetryStore::load(&path),
            Err(TelemetryError::Format { .. })
        ));
    }

    #[test]
    fn directory_path_is_not_reported_as_missing() {
        let dir = TempDir::new().unwrap();
        let result = TelemetryStore::load(dir.path());
        assert!(
            !matches!(result, Err(TelemetryError::NotFound { .. })),
            "a directory exists, so it must not be NotFound"
        );
    }

    #[test]
    fn failed_write_leaves_record_unchanged() {
        let dir = TempDir::new().unwrap();
        let path = fixture(&dir, r#"{"telemetry.machineId": "old"}"#);
        let mut store = TelemetryStore::load(&path).unwrap();

        // Replace the file with a directory so the rewrite fails.
        fs::remove_file(&path).unwrap();
        fs::create_dir(&path).unwrap();

        let result = store.set_machine_id("new");
        assert!(matches!(result, Err(TelemetryError::Write { .. })));
        assert_eq!(store.machine_id(), "old");
        assert_eq!(store.document()[MACHINE_ID_KEY], json!("new"));
    }

    #[test]
    fn custom_indent_is_used_on_write() {
        let dir = TempDir::new().unwrap();
        let path = fixture(&dir, r#"{"telemetry.machineId": "m"}"#);
        let mut store = TelemetryStore::load_with_indent(&path, 2).unwrap();
        store.set_machine_id("x").unwrap();

        let written = fs::read_to_string(&path).unwrap();
        assert_eq!(written, "{\n  \"telemetry.machineId\": \"x\"\n}");
    }
}
