//! Encoding helpers: `DynamicImage` → PNG bytes, bytes → base64.
//!
//! PNG is the single format the webhook receives. It is lossless, so a
//! JPEG re-encoded here keeps exactly the pixels the user uploaded, and
//! rendered PDF text stays crisp for downstream OCR.

use base64::{engine::general_purpose::STANDARD, Engine as _};
use image::DynamicImage;
use std::io::Cursor;
use tracing::debug;

/// Encode an image as PNG.
pub fn png_bytes(img: &DynamicImage) -> Result<Vec<u8>, image::ImageError> {
    let mut buf = Vec::new();
    img.write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)?;
    debug!(
        "Encoded {}x{} image → {} bytes PNG",
        img.width(),
        img.height(),
        buf.len()
    );
    Ok(buf)
}

/// Base64-encode (standard alphabet, padded).
///
/// Fails only when the encoded length would overflow `usize`.
pub fn encode_base64(bytes: &[u8]) -> Result<String, String> {
    let len = base64::encoded_len(bytes.len(), true)
        .ok_or_else(|| format!("{} bytes is too large to base64-encode", bytes.len()))?;
    let mut out = String::with_capacity(len);
    STANDARD.encode_string(bytes, &mut out);
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgba, RgbaImage};

    #[test]
    fn png_has_signature() {
        let img = DynamicImage::ImageRgba8(RgbaImage::from_pixel(10, 10, Rgba([255, 0, 0, 255])));
        let png = png_bytes(&img).expect("encode should succeed");
        assert_eq!(&png[..8], b"\x89PNG\r\n\x1a\n");
    }

    #[test]
    fn base64_is_lossless() {
        let data: Vec<u8> = (0..=255u8).cycle().take(1000).collect();
        let encoded = encode_base64(&data).unwrap();
        assert_eq!(encoded.len(), base64::encoded_len(1000, true).unwrap());
        assert_eq!(STANDARD.decode(&encoded).unwrap(), data);
    }

    #[test]
    fn base64_known_value() {
        assert_eq!(encode_base64(b"Hello").unwrap(), "SGVsbG8=");
        assert_eq!(encode_base64(b"").unwrap(), "");
    }
}
