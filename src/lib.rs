//! Telemetry store - read and regenerate the telemetry identifiers kept in a
//! `storage.json` document.
//!
//! # Example
//!
//! ```rust,no_run
//! use telemetry_store::store::TelemetryStore;
//!
//! # fn main() -> telemetry_store::errors::TelemetryResult<()> {
//! let mut store = TelemetryStore::load("./storage.json")?;
//! println!("machine id: {}", store.machine_id());
//!
//! let (machine_id, mac_machine_id) = store.regenerate_ids()?;
//! assert_ne!(machine_id, mac_machine_id);
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod errors;
pub mod identifiers;
pub mod logging;
pub mod record;
pub mod store;

pub use errors::{TelemetryError, TelemetryResult};
pub use record::{TelemetryRecord, TelemetryStats};
pub use store::TelemetryStore;
