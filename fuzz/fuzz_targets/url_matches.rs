#![no_main]

use libfuzzer_sys::fuzz_target;

fuzz_target!(|input: (String, String)| {
    let (url, pattern) = input;
    let matched = txmatch_domain::url_matches(&url, &pattern);
    if url == pattern {
        assert!(matched, "literal url must match itself: {url}");
    }
});
