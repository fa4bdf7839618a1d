#![no_main]

use libfuzzer_sys::fuzz_target;
use mimic_wire::{decode_frame, encode_frame};

fuzz_target!(|data: &[u8]| {
    // Receivers drop non UTF-8 datagrams before decoding
    let Ok(text) = std::str::from_utf8(data) else {
        return;
    };

    let frame = decode_frame(text);
    for dir in frame.bones.values() {
        assert!(dir.is_finite());
    }
    assert!(encode_frame(&frame).is_ok());
});
