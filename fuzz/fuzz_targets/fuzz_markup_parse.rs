#![no_main]

use libfuzzer_sys::fuzz_target;
use tether_dom::Document;

fuzz_target!(|data: &[u8]| {
    let Ok(markup) = std::str::from_utf8(data) else {
        return;
    };
    if let Ok(doc) = Document::parse(markup) {
        let _ = doc.inner_html(doc.root());
    }
});
