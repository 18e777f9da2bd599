use serde::{Deserialize, Serialize};

/// Pixel layouts accepted at frame ingress.
///
/// `Yv12` is YUV 4:2:0 planar with the V plane stored before the U plane
/// (swapped relative to I420).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PixelFormat {
    Rgb24,
    Bgr24,
    Bgra32,
    Rgba32,
    Yv12,
}

/// Host-owned view of one uncompressed video frame.
///
/// This mirrors the ingress port of the host SDK: a timestamp in
/// microseconds on the host's timeline, pixel dimensions, and per-plane
/// byte access with an explicit line stride.
pub trait VideoFrame {
    fn timestamp_us(&self) -> i64;
    fn width(&self) -> i32;
    fn height(&self) -> i32;
    fn pixel_format(&self) -> PixelFormat;
    fn data(&self, plane: usize) -> &[u8];
    fn line_size(&self, plane: usize) -> i32;
}

/// Owned frame buffer implementing [`VideoFrame`].
///
/// Used by embedders that already hold the pixel data, and throughout the
/// test suites.
#[derive(Debug, Clone)]
pub struct RawVideoFrame {
    pub timestamp_us: i64,
    pub width: i32,
    pub height: i32,
    pub pixel_format: PixelFormat,
    pub planes: Vec<Vec<u8>>,
    pub line_sizes: Vec<i32>,
}

impl RawVideoFrame {
    /// Wrap a tightly packed single-plane buffer (no row padding).
    pub fn packed(
        timestamp_us: i64,
        width: i32,
        height: i32,
        pixel_format: PixelFormat,
        data: Vec<u8>,
    ) -> Self {
        let line_size = match pixel_format {
            PixelFormat::Rgb24 | PixelFormat::Bgr24 => width * 3,
            PixelFormat::Bgra32 | PixelFormat::Rgba32 => width * 4,
            PixelFormat::Yv12 => width,
        };
        Self {
            timestamp_us,
            width,
            height,
            pixel_format,
            planes: vec![data],
            line_sizes: vec![line_size],
        }
    }
}

impl VideoFrame for RawVideoFrame {
    fn timestamp_us(&self) -> i64 {
        self.timestamp_us
    }

    fn width(&self) -> i32 {
        self.width
    }

    fn height(&self) -> i32 {
        self.height
    }

    fn pixel_format(&self) -> PixelFormat {
        self.pixel_format
    }

    fn data(&self, plane: usize) -> &[u8] {
        &self.planes[plane]
    }

    fn line_size(&self, plane: usize) -> i32 {
        self.line_sizes[plane]
    }
}
