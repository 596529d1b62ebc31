#![no_main]

use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if let Ok(report) = serde_json::from_slice::<txmatch_types::TestRunReport>(data) {
        let _ = txmatch_app::render_report_markdown(&report);
    }
});
