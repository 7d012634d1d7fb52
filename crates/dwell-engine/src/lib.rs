pub mod accumulator;
pub mod config;
pub mod detector;
pub mod entity;
pub mod error;
pub mod matcher;
pub mod pipeline;
pub mod report;
pub mod sampler;
pub mod video;

pub use config::EngineConfig;
pub use error::EngineError;
pub use pipeline::{run, RunSummary};
