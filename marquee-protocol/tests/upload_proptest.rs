//! Property tests for the upload decoder.
//! Every well-formed upload decodes; every length that matches neither
//! encoding is rejected.

use marquee_protocol::{decode_upload, Color16, DecodeLimits, Encoding, UploadError, UploadReceiver};

const LIMITS: DecodeLimits = DecodeLimits {
    max_width: 512,
    max_height: 64,
};

fn upload(width: u16, height: u16, body_len: usize, fill: u8) -> Vec<u8> {
    let mut bytes = Vec::with_capacity(4 + body_len);
    bytes.extend_from_slice(&width.to_le_bytes());
    bytes.extend_from_slice(&height.to_le_bytes());
    bytes.extend((0..body_len).map(|i| (i as u8).wrapping_mul(31).wrapping_add(fill)));
    bytes
}

proptest::proptest! {
    /// Matching RGB565 payloads decode with one pixel per cell and no alpha.
    #[test]
    fn rgb565_always_decodes(w in 1u16..=64, h in 1u16..=64, fill in 0u8..=255) {
        let count = w as usize * h as usize;
        let bytes = upload(w, h, count * 2, fill);
        let bitmap = decode_upload(&bytes, &LIMITS).unwrap();
        assert_eq!(bitmap.pixels().len(), count);
        assert!(bitmap.alpha().is_none());
    }

    /// Matching A8+RGB565 payloads carry exactly one alpha byte per pixel.
    #[test]
    fn alpha_payload_always_decodes(w in 1u16..=64, h in 1u16..=64, fill in 0u8..=255) {
        let count = w as usize * h as usize;
        let bytes = upload(w, h, count * 3, fill);
        let bitmap = decode_upload(&bytes, &LIMITS).unwrap();
        assert_eq!(bitmap.pixels().len(), count);
        assert_eq!(bitmap.alpha().map(<[u8]>::len), Some(count));
        assert_eq!(bitmap.encoding(), Encoding::AlphaRgb565);
    }

    /// Any other body length is a size mismatch.
    #[test]
    fn other_lengths_are_size_mismatch(w in 1u16..=32, h in 1u16..=32, body_len in 0usize..=4096) {
        let count = w as usize * h as usize;
        proptest::prop_assume!(body_len != count * 2 && body_len != count * 3);
        let bytes = upload(w, h, body_len, 0);
        let is_mismatch = matches!(
            decode_upload(&bytes, &LIMITS),
            Err(UploadError::SizeMismatch { .. })
        );
        assert!(is_mismatch);
    }

    /// Arbitrary bytes never panic the decoder.
    #[test]
    fn arbitrary_bytes_never_panic(bytes in proptest::collection::vec(0u8..=255, 0..512)) {
        let _ = decode_upload(&bytes, &LIMITS);
    }

    /// Chunked delivery yields the same result as one-shot decoding.
    #[test]
    fn receiver_matches_one_shot(w in 1u16..=16, h in 1u16..=16, alpha in proptest::bool::ANY, chunk in 1usize..=64) {
        let count = w as usize * h as usize;
        let bytes = upload(w, h, count * if alpha { 3 } else { 2 }, 7);

        let mut receiver = UploadReceiver::new(LIMITS);
        for piece in bytes.chunks(chunk) {
            receiver.feed(piece).unwrap();
        }
        assert_eq!(receiver.finish(), decode_upload(&bytes, &LIMITS));
    }

    /// hex parsing matches 888 packing for every 6-digit string.
    #[test]
    fn from_hex_matches_rgb888(r in 0u8..=255, g in 0u8..=255, b in 0u8..=255) {
        let hex = format!("#{:02x}{:02X}{:02x}", r, g, b);
        assert_eq!(Color16::from_hex(&hex), Some(Color16::from_rgb888(r, g, b)));
    }
}
