#![no_main]

use libfuzzer_sys::fuzz_target;
use protocol_hpack::{huffman, Writer};

fuzz_target!(|data: &[u8]| {
    // Arbitrary bytes must either decode cleanly or fail cleanly
    let _ = huffman::decode(data);

    // Encoding arbitrary bytes must always decode back to the input
    let mut writer = Writer::new();
    huffman::encode(&mut writer, data);
    assert_eq!(writer.used(), huffman::encoded_len(data));
    let decoded = huffman::decode(writer.as_slice()).expect("own coding must decode");
    assert_eq!(decoded, data, "huffman roundtrip mismatch");
});
