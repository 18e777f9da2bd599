//! Pixel-format conversion from host frames to the pipeline's BGR layout.

use crate::frame::BgrFrame;
use anyhow::{bail, Result};
use common::{PixelFormat, VideoFrame};

/// Convert a host frame into a contiguous BGR byte matrix.
///
/// Packed formats honor the per-plane line stride; YV12 expects a tightly
/// packed single buffer (Y, then V, then U). Frames with degenerate
/// dimensions are rejected.
pub fn convert_frame_to_bgr(frame: &dyn VideoFrame) -> Result<BgrFrame> {
    let width = frame.width();
    let height = frame.height();
    if width <= 0 || height <= 0 {
        bail!("frame has degenerate dimensions {}x{}", width, height);
    }
    let (w, h) = (width as usize, height as usize);

    match frame.pixel_format() {
        PixelFormat::Bgr24 => packed_to_bgr(frame, w, h, 3, false),
        PixelFormat::Rgb24 => packed_to_bgr(frame, w, h, 3, true),
        PixelFormat::Bgra32 => packed_to_bgr(frame, w, h, 4, false),
        PixelFormat::Rgba32 => packed_to_bgr(frame, w, h, 4, true),
        PixelFormat::Yv12 => yv12_to_bgr(frame, w, h),
    }
}

fn packed_to_bgr(
    frame: &dyn VideoFrame,
    w: usize,
    h: usize,
    bytes_per_pixel: usize,
    swap_rb: bool,
) -> Result<BgrFrame> {
    let stride = frame.line_size(0);
    if stride < (w * bytes_per_pixel) as i32 {
        bail!("line size {} too small for width {}", stride, w);
    }
    let stride = stride as usize;

    let data = frame.data(0);
    let needed = (h - 1) * stride + w * bytes_per_pixel;
    if data.len() < needed {
        bail!(
            "frame buffer too small: {} bytes, need at least {}",
            data.len(),
            needed
        );
    }

    // Tight BGR24 input is already in the output layout.
    if !swap_rb && bytes_per_pixel == 3 && stride == w * 3 {
        return BgrFrame::new(w as u32, h as u32, data[..w * h * 3].to_vec());
    }

    let mut out = Vec::with_capacity(w * h * 3);
    for row in 0..h {
        let line = &data[row * stride..];
        for col in 0..w {
            let px = &line[col * bytes_per_pixel..col * bytes_per_pixel + bytes_per_pixel];
            if swap_rb {
                out.extend_from_slice(&[px[2], px[1], px[0]]);
            } else {
                out.extend_from_slice(&[px[0], px[1], px[2]]);
            }
        }
    }
    BgrFrame::new(w as u32, h as u32, out)
}

fn yv12_to_bgr(frame: &dyn VideoFrame, w: usize, h: usize) -> Result<BgrFrame> {
    if w % 2 != 0 || h % 2 != 0 {
        bail!("YV12 conversion requires even dimensions, got {}x{}", w, h);
    }
    let stride = frame.line_size(0);
    if stride != w as i32 {
        bail!(
            "YV12 conversion expects a tightly packed buffer (line size {}, width {})",
            stride,
            w
        );
    }

    let data = frame.data(0);
    let y_size = w * h;
    let uv_size = y_size / 4;
    if data.len() < y_size + 2 * uv_size {
        bail!(
            "YV12 buffer too small: {} bytes for {}x{}",
            data.len(),
            w,
            h
        );
    }

    // YV12 plane order: Y, then V, then U.
    let y_plane = &data[..y_size];
    let v_plane = &data[y_size..y_size + uv_size];
    let u_plane = &data[y_size + uv_size..y_size + 2 * uv_size];

    let mut out = vec![0u8; w * h * 3];
    for row in 0..h {
        for col in 0..w {
            let luma = y_plane[row * w + col] as i32;
            let uv_index = (row / 2) * (w / 2) + col / 2;
            let u = u_plane[uv_index] as i32;
            let v = v_plane[uv_index] as i32;

            // Integer BT.601, studio swing.
            let c = luma - 16;
            let d = u - 128;
            let e = v - 128;
            let r = clamp_u8((298 * c + 409 * e + 128) >> 8);
            let g = clamp_u8((298 * c - 100 * d - 208 * e + 128) >> 8);
            let b = clamp_u8((298 * c + 516 * d + 128) >> 8);

            let offset = (row * w + col) * 3;
            out[offset] = b;
            out[offset + 1] = g;
            out[offset + 2] = r;
        }
    }
    BgrFrame::new(w as u32, h as u32, out)
}

fn clamp_u8(value: i32) -> u8 {
    value.clamp(0, 255) as u8
}
