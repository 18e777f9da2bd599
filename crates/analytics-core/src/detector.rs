//! HTTP client for the out-of-process AI inference service.

use crate::config::DetectorConfig;
use crate::encode::{encode_frame_as_base64_jpeg, EncodedImage};
use crate::frame::BgrFrame;
use anyhow::{bail, Context, Result};
use common::{Detection, Rect};
use serde::Deserialize;
use std::time::{Duration, Instant};
use telemetry::LogThrottle;
use uuid::Uuid;

/// Resolved connection target for the inference service.
#[derive(Debug, Clone, PartialEq, Eq)]
struct ServiceEndpoint {
    host: String,
    port: u16,
    infer_path: String,
}

impl ServiceEndpoint {
    fn infer_url(&self) -> String {
        format!("http://{}:{}{}", self.host, self.port, self.infer_path)
    }
}

/// Wire form of one detection as returned by the AI service.
///
/// Coordinates are pixels of the image actually sent (i.e. of the possibly
/// downscaled frame). Everything is optional on the wire; missing numerics
/// read as 0, missing booleans as false, a missing class as "person".
#[derive(Debug, Deserialize)]
struct WireDetection {
    #[serde(default)]
    x: f32,
    #[serde(default)]
    y: f32,
    #[serde(default)]
    w: f32,
    #[serde(default)]
    h: f32,
    #[serde(default, alias = "class")]
    cls: Option<String>,
    #[serde(default, alias = "confidence")]
    score: Option<f32>,
    #[serde(default)]
    fall_detected: bool,
    #[serde(default)]
    track_id: Option<serde_json::Value>,
}

/// Client for the inference service with fail-fast timeouts and a circuit
/// breaker.
///
/// `run` never fails: any transport or protocol failure yields an empty
/// detection list and advances the breaker, keeping the worker loop
/// linear. All breaker state is private to the worker thread.
pub struct DetectorClient {
    config: DetectorConfig,
    endpoint: ServiceEndpoint,
    http: reqwest::blocking::Client,
    consecutive_failures: u32,
    circuit_open: bool,
    circuit_retry_at: Option<Instant>,
    log_throttle: LogThrottle,
}

impl DetectorClient {
    /// Build the client, validating the service URL up front.
    pub fn new(config: DetectorConfig) -> Result<Self> {
        let endpoint = parse_service_url(&config.service_url)?;
        let request_deadline = Duration::from_millis(
            config.connect_timeout_ms + config.read_timeout_ms + config.write_timeout_ms,
        );
        let http = reqwest::blocking::Client::builder()
            .connect_timeout(Duration::from_millis(config.connect_timeout_ms))
            .timeout(request_deadline)
            .build()
            .context("failed to build HTTP client for the AI service")?;

        Ok(Self {
            log_throttle: LogThrottle::from_millis(config.log_throttle_ms),
            config,
            endpoint,
            http,
            consecutive_failures: 0,
            circuit_open: false,
            circuit_retry_at: None,
        })
    }

    /// Run inference on one frame. Returns an empty list while the breaker
    /// is open or when the service misbehaves.
    pub fn run(&mut self, camera_id: &str, frame: &BgrFrame) -> Vec<Detection> {
        if self.circuit_open {
            match self.circuit_retry_at {
                Some(retry_at) if Instant::now() < retry_at => return Vec::new(),
                _ => {
                    self.circuit_open = false;
                    self.circuit_retry_at = None;
                    self.consecutive_failures = 0;
                }
            }
        }

        let started = Instant::now();
        match self.call_service(camera_id, frame) {
            Ok(detections) => {
                self.on_success();
                telemetry::metrics::INFERENCE_LATENCY
                    .with_label_values(&[camera_id])
                    .observe(started.elapsed().as_secs_f64());
                detections
            }
            Err(error) => {
                self.on_failure(camera_id, &error);
                Vec::new()
            }
        }
    }

    pub fn circuit_open(&self) -> bool {
        self.circuit_open
    }

    fn call_service(&self, camera_id: &str, frame: &BgrFrame) -> Result<Vec<Detection>> {
        let encoded =
            encode_frame_as_base64_jpeg(frame, self.config.send_width, self.config.jpeg_quality)?;

        let body = serde_json::json!({
            "camera_id": camera_id,
            "image": encoded.base64_jpeg,
        });

        let response = self
            .http
            .post(self.endpoint.infer_url())
            .json(&body)
            .send()
            .context("AI service did not respond")?;

        let status = response.status();
        if status != reqwest::StatusCode::OK {
            bail!("AI service returned HTTP {}", status.as_u16());
        }

        let items: Vec<WireDetection> = response
            .json()
            .context("AI response must be a JSON array of detections")?;

        Ok(items
            .into_iter()
            .filter_map(|item| normalize_detection(item, &encoded))
            .collect())
    }

    fn on_success(&mut self) {
        self.consecutive_failures = 0;
        self.circuit_open = false;
        self.circuit_retry_at = None;
    }

    fn on_failure(&mut self, camera_id: &str, error: &anyhow::Error) {
        self.consecutive_failures += 1;
        if self.consecutive_failures >= self.config.circuit_failure_threshold.max(1) {
            self.circuit_open = true;
            self.circuit_retry_at =
                Some(Instant::now() + Duration::from_millis(self.config.circuit_open_ms.max(1)));
        }

        telemetry::metrics::INFERENCE_FAILURES
            .with_label_values(&[camera_id])
            .inc();

        if self.log_throttle.allow() {
            tracing::warn!(
                camera = %camera_id,
                consecutive_failures = self.consecutive_failures,
                circuit_open = self.circuit_open,
                "inference failure: {:#}",
                error
            );
        }
    }
}

/// Convert one wire detection from pixel coordinates of the encoded image
/// to the clamped unit square. Degenerate or non-finite boxes are dropped.
fn normalize_detection(item: WireDetection, encoded: &EncodedImage) -> Option<Detection> {
    if !(item.x.is_finite() && item.y.is_finite() && item.w.is_finite() && item.h.is_finite()) {
        return None;
    }
    if item.w <= 0.0 || item.h <= 0.0 {
        return None;
    }

    let image_width = encoded.width as f32;
    let image_height = encoded.height as f32;

    let x = clamp01(item.x / image_width);
    let y = clamp01(item.y / image_height);
    let mut w = clamp01(item.w / image_width);
    let mut h = clamp01(item.h / image_height);
    if x + w > 1.0 {
        w = (1.0 - x).max(0.0);
    }
    if y + h > 1.0 {
        h = (1.0 - y).max(0.0);
    }
    if w <= 0.0 || h <= 0.0 {
        return None;
    }

    Some(Detection {
        bbox: Rect::new(x, y, w, h),
        class_label: item.cls.unwrap_or_else(|| "person".to_string()),
        confidence: item.score.unwrap_or(0.0),
        fall_detected: item.fall_detected,
        ai_track_id: item.track_id.as_ref().and_then(parse_track_id),
        track_id: Uuid::nil(),
    })
}

/// Lenient track id parsing: integer, float (rounded) or numeric string.
/// Anything else reads as absent.
fn parse_track_id(value: &serde_json::Value) -> Option<i64> {
    match value {
        serde_json::Value::Number(number) => number
            .as_i64()
            .or_else(|| number.as_f64().map(|f| f.round() as i64)),
        serde_json::Value::String(text) => text.trim().parse().ok(),
        _ => None,
    }
}

fn parse_service_url(service_url: &str) -> Result<ServiceEndpoint> {
    let input = service_url.trim();
    if input.is_empty() {
        bail!("AI service URL is empty");
    }
    if input.starts_with("https://") {
        bail!("https:// is not supported by this build, use http://");
    }

    let rest = input.strip_prefix("http://").unwrap_or(input);
    let (host_port, path) = match rest.find('/') {
        Some(pos) => (&rest[..pos], &rest[pos..]),
        None => (rest, ""),
    };

    let (host, port) = match host_port.rfind(':') {
        Some(pos) => {
            let port: u16 = host_port[pos + 1..]
                .parse()
                .context("invalid AI service URL port")?;
            (&host_port[..pos], port)
        }
        None => (host_port, 80),
    };
    if host.is_empty() {
        bail!("invalid AI service URL host");
    }
    if port == 0 {
        bail!("invalid AI service URL port");
    }

    let infer_path = if path.is_empty() || path == "/" {
        "/infer".to_string()
    } else if path.ends_with("/infer") {
        path.to_string()
    } else {
        format!("{}/infer", path.trim_end_matches('/'))
    };

    Ok(ServiceEndpoint {
        host: host.to_string(),
        port,
        infer_path,
    })
}

fn clamp01(value: f32) -> f32 {
    value.max(0.0).min(1.0)
}
