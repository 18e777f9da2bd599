pub mod logging;
pub mod metrics;
pub mod throttle;

// Re-export commonly used items
pub use logging::{init_structured_logging, init_with_service, LogConfig, LogFormat};
pub use throttle::LogThrottle;
