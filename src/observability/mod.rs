//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! All subsystems produce:
//!     → logging.rs (structured log events via tracing)
//!     → metrics.rs (counters via the metrics facade)
//!
//! Consumers:
//!     → stdout (fmt or JSON layer)
//!     → whatever metrics recorder the host process installs
//! ```
//!
//! # Design Decisions
//! - Keys, seeds and signed payloads never reach a log line
//! - Each execution runs inside one span carrying chain, type and sender

pub mod logging;
pub mod metrics;

pub use logging::init_logging;
