#![no_main]

use compile_score::codec::decode;
use compile_score::timeline::decode_timeline_file;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    // Both decoders must reject malformed input with an error, never a panic
    let _ = decode(data);
    let _ = decode_timeline_file(data);
});
