pub mod error;
pub mod hop;
mod lenient;
pub mod precision;
pub mod sample;

pub use error::TelemetryError;
pub use hop::{HopRecord, TraceInput, TraceSnapshot};
pub use precision::PrecisionTier;
pub use sample::{MetricSample, decode_history, decode_history_str};
