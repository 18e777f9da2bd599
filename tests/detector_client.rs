//! Integration tests for the detector client against a scripted AI
//! service on a real port.

mod support;

use analytics_core::{BgrFrame, DetectorClient, DetectorConfig};
use std::time::Duration;
use support::{service_detection, MockAiService, Reply};

fn client_for(service: &MockAiService, config: DetectorConfig) -> DetectorClient {
    DetectorClient::new(DetectorConfig {
        service_url: service.base_url.clone(),
        ..config
    })
    .expect("client")
}

fn frame(width: u32, height: u32) -> BgrFrame {
    BgrFrame::new(width, height, vec![60; (width * height * 3) as usize]).unwrap()
}

#[test]
fn happy_path_returns_normalized_detections() {
    let service = MockAiService::start(vec![Reply::Json(serde_json::json!([
        service_detection(100.0, 100.0, 50.0, 200.0, Some(7), false)
    ]))]);
    let mut client = client_for(&service, DetectorConfig::default());

    let detections = client.run("cam-1", &frame(640, 480));
    assert_eq!(detections.len(), 1);
    assert_eq!(service.hits(), 1);

    let detection = &detections[0];
    assert!((detection.bbox.x - 0.15625).abs() < 1e-4);
    assert!((detection.bbox.y - 0.2083).abs() < 1e-4);
    assert!((detection.bbox.width - 0.0781).abs() < 1e-4);
    assert!((detection.bbox.height - 0.4167).abs() < 1e-4);
    assert_eq!(detection.class_label, "person");
    assert_eq!(detection.ai_track_id, Some(7));
    assert!(!detection.fall_detected);
}

#[test]
fn coordinates_are_normalized_against_the_downscaled_image() {
    // A 1280x960 frame is downscaled to 640x480 before sending; the
    // service answers in coordinates of the image it received.
    let service = MockAiService::start(vec![Reply::Json(serde_json::json!([
        service_detection(100.0, 100.0, 50.0, 200.0, None, false)
    ]))]);
    let mut client = client_for(&service, DetectorConfig::default());

    let detections = client.run("cam-1", &frame(1280, 960));
    assert_eq!(detections.len(), 1);
    assert!((detections[0].bbox.x - 0.15625).abs() < 1e-4);
    assert!((detections[0].bbox.height - 0.4167).abs() < 1e-4);
}

#[test]
fn degenerate_elements_are_dropped_and_valid_ones_kept() {
    let service = MockAiService::start(vec![Reply::Json(serde_json::json!([
        service_detection(10.0, 10.0, 0.0, 50.0, None, false),
        service_detection(10.0, 10.0, 50.0, 50.0, None, false),
    ]))]);
    let mut client = client_for(&service, DetectorConfig::default());

    let detections = client.run("cam-1", &frame(640, 480));
    assert_eq!(detections.len(), 1);
}

#[test]
fn non_array_body_counts_as_a_failure() {
    let service = MockAiService::start(vec![Reply::Json(serde_json::json!({"not": "an array"}))]);
    let mut client = client_for(&service, DetectorConfig::default());

    assert!(client.run("cam-1", &frame(320, 240)).is_empty());
    assert_eq!(service.hits(), 1);
    assert!(!client.circuit_open());
}

#[test]
fn breaker_trips_on_the_threshold_consecutive_failure() {
    let service = MockAiService::start(vec![Reply::Status(503)]);
    let mut client = client_for(
        &service,
        DetectorConfig {
            circuit_failure_threshold: 3,
            circuit_open_ms: 60_000,
            ..DetectorConfig::default()
        },
    );

    let image = frame(320, 240);
    assert!(client.run("cam-1", &image).is_empty());
    assert!(!client.circuit_open());
    assert!(client.run("cam-1", &image).is_empty());
    assert!(!client.circuit_open());
    assert!(client.run("cam-1", &image).is_empty());
    assert!(client.circuit_open());
    assert_eq!(service.hits(), 3);

    // Fourth call short-circuits: no network request while open.
    assert!(client.run("cam-1", &image).is_empty());
    assert_eq!(service.hits(), 3);
}

#[test]
fn breaker_closes_after_the_open_window() {
    let service = MockAiService::start(vec![
        Reply::Status(503),
        Reply::Status(503),
        Reply::Status(503),
        Reply::Json(serde_json::json!([])),
    ]);
    let mut client = client_for(
        &service,
        DetectorConfig {
            circuit_failure_threshold: 3,
            circuit_open_ms: 200,
            ..DetectorConfig::default()
        },
    );

    let image = frame(320, 240);
    for _ in 0..3 {
        client.run("cam-1", &image);
    }
    assert!(client.circuit_open());
    assert_eq!(service.hits(), 3);

    std::thread::sleep(Duration::from_millis(250));

    // The window elapsed: the next call goes to the wire again.
    client.run("cam-1", &image);
    assert_eq!(service.hits(), 4);
    assert!(!client.circuit_open());
}

#[test]
fn success_resets_the_failure_streak() {
    let service = MockAiService::start(vec![
        Reply::Status(503),
        Reply::Status(503),
        Reply::Json(serde_json::json!([])),
        Reply::Status(503),
        Reply::Status(503),
    ]);
    let mut client = client_for(
        &service,
        DetectorConfig {
            circuit_failure_threshold: 3,
            ..DetectorConfig::default()
        },
    );

    let image = frame(320, 240);
    for _ in 0..5 {
        client.run("cam-1", &image);
    }
    // Two failures, a success, then two more failures: never three in a
    // row, so the breaker stays closed and every call reaches the wire.
    assert!(!client.circuit_open());
    assert_eq!(service.hits(), 5);
}

#[test]
fn unreachable_service_fails_fast_and_empty() {
    let mut client = DetectorClient::new(DetectorConfig {
        service_url: "http://127.0.0.1:1".to_string(),
        connect_timeout_ms: 50,
        read_timeout_ms: 50,
        write_timeout_ms: 50,
        ..DetectorConfig::default()
    })
    .unwrap();

    assert!(client.run("cam-1", &frame(64, 64)).is_empty());
}
