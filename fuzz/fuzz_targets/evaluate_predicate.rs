#![no_main]

use libfuzzer_sys::fuzz_target;

fuzz_target!(|input: (String, String, String)| {
    let (body, path, expected) = input;
    let holds = txmatch_domain::evaluate(&body, &path, &expected);

    let upper = expected.to_uppercase();
    if upper.to_lowercase() == expected.to_lowercase() {
        assert_eq!(holds, txmatch_domain::evaluate(&body, &path, &upper));
    }
});
