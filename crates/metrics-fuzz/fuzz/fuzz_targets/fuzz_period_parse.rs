#![no_main]

use journal_metrics::models::{normalize_doi, parse_period};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if let Ok(text) = std::str::from_utf8(data) {
        // Must return Ok or Err, never panic
        if let Ok(period) = parse_period(text) {
            assert!(!period.years.is_empty());
            let _ = period.to_string();
        }
        let _ = normalize_doi(text);
    }
});
