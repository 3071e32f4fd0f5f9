#![no_main]

use journal_metrics::models::{RegistryWork, validate_registry_items};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    // Decoding may fail, but a decoded record must survive every accessor
    if let Ok(work) = serde_json::from_slice::<RegistryWork>(data) {
        let _ = work.title_text();
        let _ = work.published_date();
        let _ = work.author.iter().map(|a| a.short_name()).count();
        let _ = work.reference.iter().filter_map(|r| r.year_value()).count();
        let _ = validate_registry_items(vec![work]);
    }
});
