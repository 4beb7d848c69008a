mod clock;
mod logs;
mod metrics;
mod otel;

pub use self::clock::{Clock, DynClock, FixedClock, SystemClock};
pub use self::logs::init_logger;
pub use self::metrics::{Metrics, OperationLabels, Outcome, ProcessMetrics, run_metrics_collector};
pub use self::otel::{ServiceTracing, Telemetry, TracingContext};
