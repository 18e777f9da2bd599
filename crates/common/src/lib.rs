//! Shared contracts between the host-facing agent and the analytics core.
//!
//! This crate defines the data model (rectangles, detections, metadata
//! packets) and the host-port traits (frame ingress view, diagnostic sink)
//! consumed by the per-camera processing core. The concrete host SDK is out
//! of scope; embedders implement the ports.

pub mod detection;
pub mod diagnostics;
pub mod frame;
pub mod metadata;
pub mod rect;

pub use detection::Detection;
pub use diagnostics::{DiagnosticLevel, DiagnosticSink, TracingDiagnosticSink};
pub use frame::{PixelFormat, RawVideoFrame, VideoFrame};
pub use metadata::{
    Attribute, AttributeType, EventMetadata, EventMetadataPacket, MetadataPacket, ObjectMetadata,
    ObjectMetadataPacket,
};
pub use rect::Rect;

pub const VERSION: &str = env!("CARGO_PKG_VERSION");
