//! # Utility Modules
//!
//! Supporting utilities used by the sender.
//!
//! ## Components
//! - **Buffer Pool**: exactly-sized, zeroed send buffers reused across sends
//! - **Logging**: `tracing-subscriber` setup from configuration
//! - **Metrics**: thread-safe send counters

pub mod buffer_pool;
pub mod logging;
pub mod metrics;

pub use buffer_pool::{BufferPool, PooledBuffer};
pub use metrics::{MetricsSnapshot, SendMetrics};
