//! Fuzz target for TOML settings parsing.

#![no_main]

use libfuzzer_sys::fuzz_target;
use pgm_config::{validate_settings, Settings};

fuzz_target!(|data: &[u8]| {
    let Ok(text) = std::str::from_utf8(data) else {
        return;
    };
    if let Ok(settings) = Settings::from_toml_str(text) {
        let _ = validate_settings(&settings);
    }
});
