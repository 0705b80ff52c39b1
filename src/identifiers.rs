//! Fresh telemetry identifiers derived from the clock and a random UUID.

use sha2::{Digest, Sha256};
use std::thread;
use std::time::{Duration, SystemTime, UNIX_EPOCH};
use uuid::Uuid;

/// Length of a hex-encoded SHA-256 digest.
pub const HEX_ID_LENGTH: usize = 64;

/// Pause between the two halves of an id pair so their timestamps differ.
const PAIR_DELAY: Duration = Duration::from_millis(1);

/// Current wall-clock time as fractional Unix seconds, e.g. `1718000000.123456`.
///
/// A clock set before the epoch yields `0.000000` rather than failing; the
/// random UUID half of the seed still keeps ids unique.
pub fn timestamp_string() -> String {
    let since_epoch = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default();
    format!(
        "{}.{:06}",
        since_epoch.as_secs(),
        since_epoch.subsec_micros()
    )
}

/// Generates a fresh identifier:
///   `hex(sha256(timestamp_string() + uuid_v4))`
pub fn generate_hex_id() -> String {
    let seed = format!("{}{}", timestamp_string(), Uuid::new_v4());
    hex::encode(Sha256::digest(seed.as_bytes()))
}

/// Generates a `(machine_id, mac_machine_id)` pair.
pub fn generate_id_pair() -> (String, String) {
    let machine_id = generate_hex_id();
    thread::sleep(PAIR_DELAY);
    let mac_machine_id = generate_hex_id();
    (machine_id, mac_machine_id)
}

/// Returns true if `value` looks like an id produced by [`generate_hex_id`].
pub fn is_hex_digest(value: &str) -> bool {
    value.len() == HEX_ID_LENGTH
        && value
            .bytes()
            .all(|b| b.is_ascii_digit() || (b'a'..=b'f').contains(&b))
}
