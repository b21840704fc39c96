//! Fuzz target for image decoding and packing.
//!
//! Untrusted image bytes go through format sniffing, decode, resize and
//! packing. Only errors are acceptable outcomes, never panics.

#![no_main]

use std::io::Cursor;

use image::ImageReader;
use libfuzzer_sys::fuzz_target;
use vision_bridge::engine::{InputShape, Preprocessor};

fuzz_target!(|data: &[u8]| {
    let Ok(reader) = ImageReader::new(Cursor::new(data)).with_guessed_format() else {
        return;
    };
    if let Ok(image) = reader.decode() {
        let shape = InputShape::new(8, 8, 3);
        if let Ok(buffer) = Preprocessor::default().preprocess_image(&image, shape) {
            assert_eq!(buffer.len(), shape.len());
        }
    }
});
