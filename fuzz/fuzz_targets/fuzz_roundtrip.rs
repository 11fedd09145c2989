#![no_main]

use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    // Canonicalization must be idempotent: formatting accepted input and
    // formatting the result again must agree byte for byte.
    if let Ok(s) = std::str::from_utf8(data) {
        if let Ok(formatted) = ledger_tools::format_journal(s) {
            let again = ledger_tools::format_journal(&formatted)
                .expect("canonical output must reparse");
            assert_eq!(again, formatted);
        }
    }
});
