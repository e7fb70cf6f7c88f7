// cargo fuzz run decode corpus/decode -- -timeout=30

#![no_main]

use std::io::Cursor;
use libfuzzer_sys::fuzz_target;
use rgb::RGBA8;

use animgif::Decoder;

fuzz_target!(|data: &[u8]| {
    let decoder = Decoder::new(Cursor::new(data)).max_image_sz(Some(1 << 20));
    for step in decoder.into_steps::<RGBA8>() {
        if step.is_err() {
            break;
        }
    }
    let _ = Decoder::new(Cursor::new(data))
        .max_image_sz(Some(1 << 20))
        .identify();
});
