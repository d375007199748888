#![no_main]

use goc_types::AccountName;
use libfuzzer_sys::fuzz_target;

// Parsing arbitrary text never panics, and every accepted name prints back
// to a string that parses to the same value.
fuzz_target!(|data: &[u8]| {
    let Ok(text) = std::str::from_utf8(data) else {
        return;
    };
    let Ok(name) = text.parse::<AccountName>() else {
        return;
    };
    let printed = name.to_string();
    let reparsed: AccountName = printed.parse().expect("printed name must parse");
    assert_eq!(reparsed, name);
    assert_eq!(name.suffix().suffix(), name.suffix());
    let _ = goc_names::check_biddable(name);

    // Raw values round-trip through text as well.
    if data.len() >= 8 {
        let raw = u64::from_le_bytes([
            data[0], data[1], data[2], data[3], data[4], data[5], data[6], data[7],
        ]);
        let _ = AccountName::new(raw).to_string();
    }
});
