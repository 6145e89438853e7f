//! Build script for macrotrack
//!
//! Stamps each build with a counter and UTC timestamp, exposed to the crate
//! as `MACROTRACK_BUILD_NUMBER` and `MACROTRACK_BUILD_TIMESTAMP`.

use std::fs;
use std::path::Path;

const COUNTER_FILE: &str = "build_number.txt";

fn read_counter(path: &Path) -> u64 {
    fs::read_to_string(path)
        .ok()
        .and_then(|raw| raw.trim().parse().ok())
        .unwrap_or(0)
}

fn main() {
    println!("cargo:rerun-if-changed=src");

    let counter = Path::new(COUNTER_FILE);
    let build = read_counter(counter) + 1;

    // A read-only checkout still builds; the number just stops advancing
    if let Err(e) = fs::write(counter, build.to_string()) {
        println!("cargo:warning=could not update {}: {}", COUNTER_FILE, e);
    }

    let stamped_at = chrono::Utc::now().format("%Y-%m-%dT%H:%M:%SZ");

    println!("cargo:rustc-env=MACROTRACK_BUILD_NUMBER={}", build);
    println!("cargo:rustc-env=MACROTRACK_BUILD_TIMESTAMP={}", stamped_at);
}
