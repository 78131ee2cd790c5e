//! Fuzz target for JSON settings parsing.
//!
//! Parsing and validation must return errors, never panic.

#![no_main]

use libfuzzer_sys::fuzz_target;
use pgm_config::{validate_settings, Settings};

fuzz_target!(|data: &[u8]| {
    let Ok(text) = std::str::from_utf8(data) else {
        return;
    };
    if let Ok(settings) = Settings::from_json_str(text) {
        let _ = validate_settings(&settings);
    }
});
