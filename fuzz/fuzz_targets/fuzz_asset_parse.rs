#![no_main]

use goc_types::{Asset, Symbol};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Ok(text) = std::str::from_utf8(data) else {
        return;
    };
    if let Ok(symbol) = text.parse::<Symbol>() {
        assert_eq!(symbol.to_string().parse::<Symbol>().ok(), Some(symbol));
    }
    if let Ok(asset) = text.parse::<Asset>() {
        assert_eq!(asset.to_string().parse::<Asset>().ok(), Some(asset));
        let _ = asset.checked_add(asset);
        let _ = asset.checked_sub(asset);
    }
});
