#![no_main]

use catalog_query::{ListingFilter, ListingKind, QueryLimits, RawParams, Visibility};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if let Ok(body) = serde_json::from_slice::<serde_json::Value>(data) {
        let raw = RawParams::from_json(&body);
        for kind in ListingKind::ALL {
            let limits = QueryLimits::for_schema(kind.schema());
            let _ = ListingFilter::build(*kind, &raw, Visibility::Any, &limits);
        }
    }
});
