#![no_main]

use catalog_db::{DocumentQuery, RelationalQuery};
use catalog_query::{ListingFilter, ListingKind, QueryLimits, RawParams, Visibility};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if let Ok(query) = std::str::from_utf8(data) {
        let raw = RawParams::from_query_str(query);
        for kind in ListingKind::ALL {
            let limits = QueryLimits::for_schema(kind.schema());
            let filter = ListingFilter::build(*kind, &raw, Visibility::Public, &limits);
            assert!(filter.page() >= 1);
            assert!(filter.limit() >= 1 && filter.limit() <= limits.effective_max());
            let _ = RelationalQuery::compile(&filter).select();
            let _ = DocumentQuery::compile(&filter);
        }
    }
});
