pub mod logging;

pub use logging::{init, init_structured_logging, init_with_service, LogConfig, LogFormat};
