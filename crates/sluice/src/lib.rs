#![doc = include_str!("../README.md")]

pub mod config;
pub mod dispatcher;
pub mod error;
pub mod latch;
pub mod pipeline;
pub mod pool;
pub mod sink;
pub mod source;
pub mod transform;

pub use crate::config::{MAX_CONCURRENCY, MAX_QUEUE_CAPACITY, PipelineConfig};
pub use crate::dispatcher::{Dispatcher, PipelineState};
pub use crate::error::{ConfigError, Result};
pub use crate::latch::ErrorLatch;
pub use crate::pipeline::Pipeline;
pub use crate::sink::Sink;
pub use crate::transform::Transform;
