//! Umbrella crate for the per-camera video analytics core.
//!
//! Re-exports the member crates so embedders depend on a single package.
//! The processing pipeline lives in [`analytics_core`], the shared data
//! model and host ports in [`common`], and the logging/metrics bootstrap
//! in [`telemetry`].
//!
//! # Example
//!
//! The embedding host installs logging once at plugin load, then creates
//! one agent per camera, feeds it frames from its ingress callback and
//! polls metadata from its pump:
//!
//! ```no_run
//! use std::sync::Arc;
//! use vigil_analytics::{telemetry, AgentConfig, DeviceAgent, TracingDiagnosticSink};
//!
//! telemetry::init_with_service("vms-analytics-plugin");
//!
//! let agent = DeviceAgent::new(
//!     "camera-1",
//!     AgentConfig::default(),
//!     Arc::new(TracingDiagnosticSink),
//! )
//! .expect("device agent");
//!
//! // In the host's frame callback:
//! //     agent.push_frame(&frame);
//! // In the host's metadata pump:
//! //     for packet in agent.pull_metadata() { /* hand to the sink */ }
//! ```

pub use analytics_core;
pub use common;
pub use telemetry;

pub use analytics_core::{AgentConfig, DetectorClient, DetectorConfig, DeviceAgent};
pub use common::{DiagnosticSink, MetadataPacket, TracingDiagnosticSink, VideoFrame};
