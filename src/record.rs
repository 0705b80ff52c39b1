//! Typed view over the telemetry keys of a storage document.

use serde::Serialize;
use serde_json::{Map, Value};

pub const SQM_ID_KEY: &str = "telemetry.sqmId";
pub const MACHINE_ID_KEY: &str = "telemetry.machineId";
pub const DEV_DEVICE_ID_KEY: &str = "telemetry.devDeviceId";
pub const MAC_MACHINE_ID_KEY: &str = "telemetry.macMachineId";

/// The four telemetry identifiers tracked by the store.
///
/// Fields are never absent: keys missing from the document load as `""`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TelemetryRecord {
    pub sqm_id: String,
    pub machine_id: String,
    pub dev_device_id: String,
    pub mac_machine_id: String,
}

impl TelemetryRecord {
    /// Number of identifier fields in a record.
    pub const FIELD_COUNT: usize = 4;

    /// Build a record from a parsed document.
    pub fn from_document(document: &Map<String, Value>) -> Self {
        Self {
            sqm_id: field_text(document, SQM_ID_KEY),
            machine_id: field_text(document, MACHINE_ID_KEY),
            dev_device_id: field_text(document, DEV_DEVICE_ID_KEY),
            mac_machine_id: field_text(document, MAC_MACHINE_ID_KEY),
        }
    }

    /// Field values in key order: sqmId, machineId, devDeviceId, macMachineId.
    pub fn values(&self) -> [&str; Self::FIELD_COUNT] {
        [
            self.sqm_id.as_str(),
            self.machine_id.as_str(),
            self.dev_device_id.as_str(),
            self.mac_machine_id.as_str(),
        ]
    }

    pub fn non_empty_count(&self) -> usize {
        self.values().iter().filter(|v| !v.is_empty()).count()
    }

    /// Total length of all fields, counted in characters rather than bytes.
    pub fn total_characters(&self) -> usize {
        self.values().iter().map(|v| v.chars().count()).sum()
    }
}

/// Text of a telemetry key. Strings are taken verbatim, `null` and missing
/// keys become empty, anything else is rendered as compact JSON.
fn field_text(document: &Map<String, Value>, key: &str) -> String {
    match document.get(key) {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}

/// Summary returned by [`TelemetryStore::generate_stats`](crate::store::TelemetryStore::generate_stats).
///
/// Counts describe the record as it was before the ids were regenerated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TelemetryStats {
    pub total_fields: usize,
    pub non_empty_fields: usize,
    pub total_characters: usize,
    pub new_machine_id: String,
    pub new_mac_machine_id: String,
    pub hex_length: usize,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn document(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            _ => panic!("fixture must be an object"),
        }
    }

    #[test]
    fn reads_all_four_keys() {
        let doc = document(json!({
            "telemetry.sqmId": "{SQM}",
            "telemetry.machineId": "mid",
            "telemetry.devDeviceId": "dev",
            "telemetry.macMachineId": "mac",
        }));
        let record = TelemetryRecord::from_document(&doc);
        assert_eq!(record.sqm_id, "{SQM}");
        assert_eq!(record.machine_id, "mid");
        assert_eq!(record.dev_device_id, "dev");
        assert_eq!(record.mac_machine_id, "mac");
    }

    #[test]
    fn missing_and_null_keys_default_to_empty() {
        let doc = document(json!({
            "telemetry.machineId": null,
            "unrelated": 1,
        }));
        assert_eq!(TelemetryRecord::from_document(&doc), TelemetryRecord::default());
    }

    #[test]
    fn non_string_values_are_rendered_as_json() {
        let doc = document(json!({ "telemetry.sqmId": 42, "telemetry.devDeviceId": true }));
        let record = TelemetryRecord::from_document(&doc);
        assert_eq!(record.sqm_id, "42");
        assert_eq!(record.dev_device_id, "true");
    }

    #[test]
    fn counts_match_a_hand_computed_fixture() {
        let record = TelemetryRecord {
            sqm_id: "sqm1".into(),
            machine_id: "mid1".into(),
            dev_device_id: "dev1".into(),
            mac_machine_id: String::new(),
        };
        assert_eq!(record.non_empty_count(), 3);
        assert_eq!(record.total_characters(), 12);
    }

    #[test]
    fn total_characters_counts_chars_not_bytes() {
        let record = TelemetryRecord {
            sqm_id: "é".into(),
            ..Default::default()
        };
        assert_eq!(record.total_characters(), 1);
    }

    #[test]
    fn record_serializes_with_camel_case_keys() {
        let value = serde_json::to_value(TelemetryRecord::default()).unwrap();
        assert!(value.get("macMachineId").is_some());
        assert!(value.get("devDeviceId").is_some());
    }
}
