// Bounded image decoding for uploaded and generated images
// Author: kelexine (https://github.com/kelexine)

use super::models::{
    validate_image_size, DecodedImage, ImageFormat, MAX_DECODE_ALLOC_BYTES, MAX_IMAGE_DIMENSION,
};
use crate::error::{Result, StudioError};
use bytes::Bytes;
use image::{ImageReader, Limits};
use std::io::Cursor;
use tracing::debug;

/// Decode untrusted image bytes.
///
/// The format is sniffed from magic bytes, never trusted from a file name or
/// a declared MIME type. Dimension and allocation limits are applied before
/// pixel data is allocated, so decompression bombs fail as ordinary decode
/// errors. The returned image keeps the original encoded bytes.
pub fn decode_image(data: impl Into<Bytes>) -> Result<DecodedImage> {
    let data: Bytes = data.into();

    validate_image_size(data.len()).map_err(StudioError::ImageDecode)?;

    let mut reader = ImageReader::new(Cursor::new(data.as_ref()))
        .with_guessed_format()
        .map_err(|e| StudioError::ImageDecode(format!("Could not read image data: {}", e)))?;

    let codec = reader
        .format()
        .ok_or_else(|| StudioError::ImageDecode("Could not detect image format from data".to_string()))?;

    let format = ImageFormat::from_codec(codec)
        .ok_or_else(|| StudioError::ImageDecode(format!("Unsupported image format: {:?}", codec)))?;

    let mut limits = Limits::default();
    limits.max_image_width = Some(MAX_IMAGE_DIMENSION);
    limits.max_image_height = Some(MAX_IMAGE_DIMENSION);
    limits.max_alloc = Some(MAX_DECODE_ALLOC_BYTES);
    reader.limits(limits);

    let decoded = reader
        .decode()
        .map_err(|e| StudioError::ImageDecode(format!("Invalid {} data: {}", format.mime_type(), e)))?;

    debug!(
        "Decoded {} image {}x{} ({} bytes)",
        format.mime_type(),
        decoded.width(),
        decoded.height(),
        data.len()
    );

    Ok(DecodedImage {
        format,
        width: decoded.width(),
        height: decoded.height(),
        data,
    })
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::vision::models::MAX_IMAGE_SIZE_BYTES;

    /// Encode a blank image of the given size in the given codec.
    pub(crate) fn encoded(width: u32, height: u32, format: image::ImageFormat) -> Vec<u8> {
        let mut buf = Cursor::new(Vec::new());
        image::DynamicImage::new_rgba8(width, height)
            .to_rgb8()
            .write_to(&mut buf, format)
            .unwrap();
        buf.into_inner()
    }

    pub(crate) fn png_bytes() -> Vec<u8> {
        encoded(1, 1, image::ImageFormat::Png)
    }

    #[test]
    fn test_decode_valid_png() {
        let image = decode_image(png_bytes()).unwrap();
        assert_eq!(image.format, ImageFormat::Png);
        assert_eq!(image.mime_type(), "image/png");
        assert_eq!((image.width, image.height), (1, 1));
        assert_eq!(image.data.as_ref(), png_bytes().as_slice());
    }

    #[test]
    fn test_decode_jpeg_written_by_encoder() {
        let image = decode_image(encoded(4, 3, image::ImageFormat::Jpeg)).unwrap();
        assert_eq!(image.format, ImageFormat::Jpeg);
        assert_eq!((image.width, image.height), (4, 3));
    }

    #[test]
    fn test_corrupt_bytes_rejected() {
        let result = decode_image(b"definitely not an image".to_vec());
        assert!(matches!(result, Err(StudioError::ImageDecode(_))));
    }

    #[test]
    fn test_truncated_png_rejected() {
        let mut bytes = png_bytes();
        bytes.truncate(30);
        assert!(decode_image(bytes).is_err());
    }

    #[test]
    fn test_oversized_payload_rejected_before_decoding() {
        let result = decode_image(vec![0u8; MAX_IMAGE_SIZE_BYTES + 1]);
        match result {
            Err(StudioError::ImageDecode(msg)) => assert!(msg.contains("exceeds maximum")),
            other => panic!("expected size rejection, got {:?}", other),
        }
    }
}
