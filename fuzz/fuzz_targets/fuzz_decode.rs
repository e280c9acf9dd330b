#![no_main]

use libfuzzer_sys::fuzz_target;
use protocol_hpack::{HpackCodec, Reader, Writer};

fuzz_target!(|data: &[u8]| {
    let mut decoder = HpackCodec::new();
    let mut reader = Reader::new(data);

    // Try to decode an arbitrary header block
    if let Ok(headers) = decoder.decode(&mut reader) {
        // Roundtrip test: re-encoding the decoded headers and decoding
        // them again must give the same list. The wire bytes may differ
        // because indexing decisions differ.
        let mut encoder = HpackCodec::new();
        let mut writer = Writer::new();
        if encoder.encode(&mut writer, &headers).is_ok() {
            let mut decoder2 = HpackCodec::new();
            let mut reader2 = Reader::new(writer.as_slice());
            let decoded = decoder2
                .decode(&mut reader2)
                .expect("re-encoded block must decode");
            assert_eq!(headers.len(), decoded.len(), "roundtrip header count mismatch");
            for (orig, dec) in headers.iter().zip(decoded.iter()) {
                assert_eq!(orig.name, dec.name, "roundtrip name mismatch");
                assert_eq!(orig.value, dec.value, "roundtrip value mismatch");
            }
            assert_eq!(encoder, decoder2, "encoder and decoder tables diverged");
        }
    }
    // Decode errors are expected for malformed input
});
