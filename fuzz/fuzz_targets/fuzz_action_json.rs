#![no_main]

use goc_system::Action;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if let Ok(action) = serde_json::from_slice::<Action>(data) {
        let _ = action.name();
        let _ = action.authority();
        let json = serde_json::to_vec(&action).expect("action must serialize");
        let back: Action = serde_json::from_slice(&json).expect("serialized action must parse");
        assert_eq!(back.name(), action.name());
    }
});
