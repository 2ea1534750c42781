// Motion Logger Core - accelerometer sampling and motion model fitting
// Gravity removal, trapezoidal velocity integration and saturating-exponential fit

// Module declarations
pub mod analysis;
pub mod calibration;
pub mod config;
pub mod error;
pub mod sensor;
pub mod session;
pub mod telemetry;
pub mod testing;

// Re-exports for convenience
pub use analysis::{MotionPipeline, RunSummary};
pub use calibration::CalibrationOffsets;
pub use config::AppConfig;
pub use session::{CycleOutcome, MotionSession};

use tracing_subscriber::EnvFilter;

/// Install the fmt subscriber used by binaries.
///
/// Honours `RUST_LOG`, defaulting to `info`. Safe to call more than once;
/// later calls are no-ops.
pub fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}
