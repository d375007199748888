#![no_main]

use goc_system::SystemState;
use libfuzzer_sys::fuzz_target;

// Decoding arbitrary bytes as saved state must fail cleanly, never panic,
// and anything that decodes must encode again.
fuzz_target!(|data: &[u8]| {
    if let Ok(state) = SystemState::load_state(data) {
        let _ = state.save_state().expect("decoded state must re-encode");
    }
});
