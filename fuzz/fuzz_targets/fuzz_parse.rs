#![no_main]

use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    // Test the parser with arbitrary UTF-8 input
    if let Ok(s) = std::str::from_utf8(data) {
        let _ = ledger_tools::parse("fuzz.ledger", s);
    }
});
