#![no_main]

use catalog_query::{CompositeKind, StorageForm, deflate, inflate, try_inflate};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    // Stored text of any shape must read back without panicking.
    if let Ok(text) = std::str::from_utf8(data) {
        let stored = serde_json::Value::String(text.to_owned());
        for kind in [CompositeKind::SequenceOfString, CompositeKind::StructuredObject] {
            let composite = inflate(Some(&stored), kind);
            if try_inflate(&stored, kind).is_ok() {
                let again = inflate(Some(&deflate(&composite, StorageForm::Serialized)), kind);
                assert_eq!(again, composite);
            }
        }
    }
});
