use serde::{Deserialize, Serialize};

/// Connection settings for the out-of-process AI inference service.
///
/// The embedding host constructs this (bootstrap and configuration
/// sourcing are its concern) and hands it to the agent. Field docs state
/// the valid range each value is expected to stay in.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DetectorConfig {
    /// Base URL of the inference service. Only `http://` is supported;
    /// a bare `host:port` is treated as `http://host:port`.
    #[serde(default = "default_service_url")]
    pub service_url: String,

    /// Range 50–5000 ms.
    #[serde(default = "default_connect_timeout_ms")]
    pub connect_timeout_ms: u64,

    /// Range 50–5000 ms.
    #[serde(default = "default_read_timeout_ms")]
    pub read_timeout_ms: u64,

    /// Range 50–5000 ms.
    #[serde(default = "default_write_timeout_ms")]
    pub write_timeout_ms: u64,

    /// Frames wider than this are proportionally downscaled before
    /// encoding. Range 160–3840.
    #[serde(default = "default_send_width")]
    pub send_width: u32,

    /// Range 40–95; out-of-range values are clamped at encode time.
    #[serde(default = "default_jpeg_quality")]
    pub jpeg_quality: u8,

    /// Consecutive failures before the circuit breaker trips. Range 1–20.
    #[serde(default = "default_circuit_failure_threshold")]
    pub circuit_failure_threshold: u32,

    /// How long the breaker stays open before the next attempt.
    /// Range 200–60000 ms.
    #[serde(default = "default_circuit_open_ms")]
    pub circuit_open_ms: u64,

    /// Minimum interval between failure log lines. Range 200–60000 ms.
    #[serde(default = "default_log_throttle_ms")]
    pub log_throttle_ms: u64,
}

fn default_service_url() -> String {
    "http://127.0.0.1:18000".to_string()
}

fn default_connect_timeout_ms() -> u64 {
    250
}

fn default_read_timeout_ms() -> u64 {
    400
}

fn default_write_timeout_ms() -> u64 {
    250
}

fn default_send_width() -> u32 {
    640
}

fn default_jpeg_quality() -> u8 {
    80
}

fn default_circuit_failure_threshold() -> u32 {
    3
}

fn default_circuit_open_ms() -> u64 {
    3000
}

fn default_log_throttle_ms() -> u64 {
    5000
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            service_url: default_service_url(),
            connect_timeout_ms: default_connect_timeout_ms(),
            read_timeout_ms: default_read_timeout_ms(),
            write_timeout_ms: default_write_timeout_ms(),
            send_width: default_send_width(),
            jpeg_quality: default_jpeg_quality(),
            circuit_failure_threshold: default_circuit_failure_threshold(),
            circuit_open_ms: default_circuit_open_ms(),
            log_throttle_ms: default_log_throttle_ms(),
        }
    }
}

/// Per-camera agent settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentConfig {
    #[serde(default)]
    pub detector: DetectorConfig,

    /// Target processing rate, range 0.1–60; values <= 0 process every
    /// frame.
    #[serde(default = "default_sample_fps")]
    pub sample_fps: f64,

    /// Bound of the ingress-to-worker frame queue. Range 1–120.
    #[serde(default = "default_max_queue_size")]
    pub max_queue_size: usize,

    /// How long a falling track may go unobserved before its episode is
    /// force-finished. Range 0–1.2e8 us.
    #[serde(default = "default_fall_finish_grace_us")]
    pub fall_finish_grace_us: i64,

    /// Lifetime of an unmatched synthetic track.
    #[serde(default = "default_synthetic_track_ttl_us")]
    pub synthetic_track_ttl_us: i64,

    /// Lifetime of an idle track-key-to-UUID mapping.
    #[serde(default = "default_track_map_ttl_us")]
    pub track_map_ttl_us: i64,

    /// Minimum interval between ingress drop diagnostics.
    /// Range 200–60000 ms.
    #[serde(default = "default_log_throttle_ms")]
    pub log_throttle_ms: u64,
}

fn default_sample_fps() -> f64 {
    5.0
}

fn default_max_queue_size() -> usize {
    4
}

fn default_fall_finish_grace_us() -> i64 {
    3_000_000
}

fn default_synthetic_track_ttl_us() -> i64 {
    2_000_000
}

fn default_track_map_ttl_us() -> i64 {
    60_000_000
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            detector: DetectorConfig::default(),
            sample_fps: default_sample_fps(),
            max_queue_size: default_max_queue_size(),
            fall_finish_grace_us: default_fall_finish_grace_us(),
            synthetic_track_ttl_us: default_synthetic_track_ttl_us(),
            track_map_ttl_us: default_track_map_ttl_us(),
            log_throttle_ms: default_log_throttle_ms(),
        }
    }
}
