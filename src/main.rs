use telemetry_store::config::get_config;
use telemetry_store::errors::TelemetryResult;
use telemetry_store::logging::init_logging;
use telemetry_store::store::TelemetryStore;

/// Loads the configured storage.json, prints the current ids, regenerates
/// them through `generate_stats` and prints the report.
///
/// Errors are printed and the process still exits normally.
fn main() {
    if let Err(e) = run() {
        println!("Error: {e}");
    }
}

fn run() -> TelemetryResult<()> {
    let config = get_config()?;
    init_logging(&config.logging);

    let mut store = TelemetryStore::load_with_indent(&config.storage.path, config.storage.indent)?;

    println!("Original Values:");
    println!("Machine ID: {}", store.machine_id());
    println!("MAC Machine ID: {}", store.mac_machine_id());

    println!("\nGenerating new stats and updating JSON...");
    let stats = store.generate_stats()?;

    println!("\nStats:");
    println!("Total fields: {}", stats.total_fields);
    println!("Non-empty fields: {}", stats.non_empty_fields);
    println!("Total characters: {}", stats.total_characters);
    println!("\nNew Values ({} chars each):", stats.hex_length);
    println!("New Machine ID: {}", stats.new_machine_id);
    println!("New MAC Machine ID: {}", stats.new_mac_machine_id);

    Ok(())
}
