use lazy_static::lazy_static;
use prometheus::{HistogramOpts, HistogramVec, IntCounterVec, Opts, Registry};

lazy_static! {
    pub static ref REGISTRY: Registry = Registry::new();

    // ==== Ingress Metrics ====
    pub static ref FRAMES_SAMPLED: IntCounterVec = {
        let metric = IntCounterVec::new(
            Opts::new(
                "analytics_frames_sampled_total",
                "Total number of frames accepted by the sampler",
            ),
            &["camera"],
        )
        .expect("metric can be created");
        REGISTRY.register(Box::new(metric.clone())).ok();
        metric
    };

    pub static ref FRAMES_DROPPED: IntCounterVec = {
        let metric = IntCounterVec::new(
            Opts::new(
                "analytics_frames_dropped_total",
                "Total number of frames discarded by the bounded queue",
            ),
            &["camera"],
        )
        .expect("metric can be created");
        REGISTRY.register(Box::new(metric.clone())).ok();
        metric
    };

    // ==== Pipeline Metrics ====
    pub static ref FRAMES_PROCESSED: IntCounterVec = {
        let metric = IntCounterVec::new(
            Opts::new(
                "analytics_frames_processed_total",
                "Total number of frames run through the detection pipeline",
            ),
            &["camera"],
        )
        .expect("metric can be created");
        REGISTRY.register(Box::new(metric.clone())).ok();
        metric
    };

    pub static ref DETECTIONS_EMITTED: IntCounterVec = {
        let metric = IntCounterVec::new(
            Opts::new(
                "analytics_detections_total",
                "Total number of object metadata items emitted",
            ),
            &["camera"],
        )
        .expect("metric can be created");
        REGISTRY.register(Box::new(metric.clone())).ok();
        metric
    };

    pub static ref FALL_EVENTS: IntCounterVec = {
        let metric = IntCounterVec::new(
            Opts::new(
                "analytics_fall_events_total",
                "Total number of fall events emitted",
            ),
            &["camera", "kind"],
        )
        .expect("metric can be created");
        REGISTRY.register(Box::new(metric.clone())).ok();
        metric
    };

    // ==== Inference Metrics ====
    pub static ref INFERENCE_FAILURES: IntCounterVec = {
        let metric = IntCounterVec::new(
            Opts::new(
                "analytics_inference_failures_total",
                "Total number of failed AI service calls",
            ),
            &["camera"],
        )
        .expect("metric can be created");
        REGISTRY.register(Box::new(metric.clone())).ok();
        metric
    };

    pub static ref INFERENCE_LATENCY: HistogramVec = {
        let metric = HistogramVec::new(
            HistogramOpts::new(
                "analytics_inference_seconds",
                "Latency of successful AI service calls",
            )
            .buckets(vec![0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5]),
            &["camera"],
        )
        .expect("metric can be created");
        REGISTRY.register(Box::new(metric.clone())).ok();
        metric
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counters_are_registered_and_incrementable() {
        FRAMES_SAMPLED.with_label_values(&["cam-test"]).inc();
        FRAMES_DROPPED.with_label_values(&["cam-test"]).inc();
        FALL_EVENTS.with_label_values(&["cam-test", "started"]).inc();

        assert!(FRAMES_SAMPLED.with_label_values(&["cam-test"]).get() >= 1);
        assert!(!REGISTRY.gather().is_empty());
    }
}
