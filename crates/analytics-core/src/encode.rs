//! JPEG encoding of outbound frames.

use crate::frame::BgrFrame;
use anyhow::{bail, Context, Result};
use base64::{prelude::BASE64_STANDARD, Engine as _};
use image::codecs::jpeg::JpegEncoder;
use image::imageops::{self, FilterType};
use image::RgbImage;

/// Base64 JPEG payload plus the dimensions actually encoded.
///
/// Detection coordinates returned by the service are normalized against
/// these dimensions, not the original frame's.
#[derive(Debug, Clone)]
pub struct EncodedImage {
    pub width: u32,
    pub height: u32,
    pub base64_jpeg: String,
}

/// Downscale frames wider than `target_width` (preserving aspect ratio)
/// and encode the result as a base64 JPEG. Narrower frames are sent as-is;
/// the encoder never upscales.
pub fn encode_frame_as_base64_jpeg(
    frame: &BgrFrame,
    target_width: u32,
    jpeg_quality: u8,
) -> Result<EncodedImage> {
    if frame.width == 0 || frame.height == 0 || frame.data.is_empty() {
        bail!("cannot encode an empty frame");
    }

    let mut rgb_data = frame.data.clone();
    for px in rgb_data.chunks_exact_mut(3) {
        px.swap(0, 2);
    }
    let rgb = RgbImage::from_raw(frame.width, frame.height, rgb_data)
        .context("frame buffer does not match its dimensions")?;

    let to_encode = if target_width > 0 && frame.width > target_width {
        let scale = target_width as f64 / frame.width as f64;
        let scaled_height = ((frame.height as f64 * scale).round() as u32).max(1);
        imageops::resize(&rgb, target_width, scaled_height, FilterType::Triangle)
    } else {
        rgb
    };

    let mut jpeg = Vec::new();
    let quality = jpeg_quality.clamp(40, 95);
    JpegEncoder::new_with_quality(&mut jpeg, quality)
        .encode_image(&to_encode)
        .context("JPEG encoding failed")?;

    Ok(EncodedImage {
        width: to_encode.width(),
        height: to_encode.height(),
        base64_jpeg: BASE64_STANDARD.encode(&jpeg),
    })
}
