pub use crate::config::{Config, ConfigBuilder};
pub use crate::error::{Error, Result};
pub use crate::executor::{handler, Handler, PanicStrategy, TaskManager};
pub use crate::telemetry::MetricsSnapshot;
