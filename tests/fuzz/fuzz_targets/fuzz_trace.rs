#![no_main]
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    // Trace parser must not panic on any input.
    if let Ok(s) = std::str::from_utf8(data) {
        let _ = shcov::trace::TraceParser::default().parse(s);
    }
});
