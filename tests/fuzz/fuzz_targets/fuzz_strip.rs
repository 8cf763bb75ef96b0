#![no_main]
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    // Stripping must not panic and must keep every line.
    let source = String::from_utf8_lossy(data);
    let text = shcov::strip::trim_lines(&source);
    for stage in shcov::strip::PIPELINE {
        let out = stage.strip(&text);
        assert_eq!(out.split('\n').count(), text.split('\n').count());
    }
    let _ = shcov::lines::coverable_lines(&source);
});
