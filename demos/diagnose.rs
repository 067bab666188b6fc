//! Print every HID interface as JSON.
//!
//! ```text
//! cargo run --example diagnose [config.toml]
//! ```

use hidlink::{HidConfig, Manager};

fn main() {
    let config = match std::env::args().nth(1) {
        Some(path) => HidConfig::load(path).expect("load config"),
        None => HidConfig::default(),
    };
    let mgr = Manager::with_config(config).expect("init hidapi");

    let devices = mgr.devices();
    for info in &devices {
        eprintln!("{info}");
    }
    println!(
        "{}",
        serde_json::to_string_pretty(&devices).expect("serialize devices")
    );
}
