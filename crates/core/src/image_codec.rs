//! Raster image decode and re-encode.
//!
//! Decoding goes through the `image` crate under the configured limits.
//! Encoding maps the compression level onto each encoder:
//! - JPEG: quality 90 / 70 / 50
//! - PNG: deflate effort via the `png` crate directly
//! - WebP: lossless only, the level has no effect
//! - BMP: uncompressed

use crate::config::{CompressionLevel, ImageConfig};
use crate::error::{ConversionError, Result};
use crate::formats::TargetFormat;
use image::codecs::bmp::BmpEncoder;
use image::codecs::jpeg::JpegEncoder;
use image::codecs::webp::WebPEncoder;
use image::{DynamicImage, ImageError, ImageReader, RgbaImage};
use std::io::Cursor;
use tracing::debug;

/// Decode source bytes into a pixel buffer.
pub fn decode(data: &[u8], config: &ImageConfig) -> Result<DynamicImage> {
    let mut reader = ImageReader::new(Cursor::new(data))
        .with_guessed_format()
        .map_err(|e| ConversionError::DecodeFailure(e.to_string()))?;

    if reader.format().is_none() {
        return Err(ConversionError::DecodeFailure(
            "unrecognized image data".to_string(),
        ));
    }

    reader.limits(config.limits());
    let image = reader.decode().map_err(|e| match e {
        ImageError::Limits(limit) => ConversionError::ResourceUnavailable(format!(
            "image exceeds decoder limits: {}",
            limit
        )),
        other => ConversionError::DecodeFailure(other.to_string()),
    })?;

    debug!("Decoded {}x{} image", image.width(), image.height());
    Ok(image)
}

/// Re-encode a decoded image into `target`.
pub fn encode(image: &DynamicImage, target: TargetFormat, level: CompressionLevel) -> Result<Vec<u8>> {
    let mut buffer = Vec::new();

    let written = match target {
        // JPEG has no alpha channel
        TargetFormat::Jpg => image.to_rgb8().write_with_encoder(JpegEncoder::new_with_quality(
            &mut buffer,
            level.jpeg_quality(),
        )),
        TargetFormat::Png => return encode_png(&image.to_rgba8(), level.png_compression()),
        TargetFormat::Webp => image
            .to_rgba8()
            .write_with_encoder(WebPEncoder::new_lossless(&mut buffer)),
        TargetFormat::Bmp => image
            .to_rgba8()
            .write_with_encoder(BmpEncoder::new(&mut buffer)),
        other => {
            return Err(ConversionError::UnsupportedConversion {
                from: "image".to_string(),
                to: other.to_string(),
            })
        }
    };

    written.map_err(|e| encode_failure(target, e))?;

    debug!(
        "Encoded {} ({}) to {} bytes",
        target,
        level.as_str(),
        buffer.len()
    );
    Ok(buffer)
}

fn encode_png(image: &RgbaImage, compression: png::Compression) -> Result<Vec<u8>> {
    let mut buffer = Cursor::new(Vec::new());

    let mut encoder = png::Encoder::new(&mut buffer, image.width(), image.height());
    encoder.set_color(png::ColorType::Rgba);
    encoder.set_depth(png::BitDepth::Eight);
    encoder.set_compression(compression);

    let mut writer = encoder
        .write_header()
        .map_err(|e| encode_failure(TargetFormat::Png, format!("header: {}", e)))?;

    writer
        .write_image_data(image.as_raw())
        .map_err(|e| encode_failure(TargetFormat::Png, format!("data: {}", e)))?;

    writer
        .finish()
        .map_err(|e| encode_failure(TargetFormat::Png, e))?;

    Ok(buffer.into_inner())
}

fn encode_failure(target: TargetFormat, error: impl std::fmt::Display) -> ConversionError {
    ConversionError::EncodeFailure {
        format: target.to_string(),
        message: error.to_string(),
    }
}
