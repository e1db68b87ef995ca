//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! dispatcher / token manager produce:
//!     → events.rs (DispatchEvent → DispatchObserver; TracingObserver by default)
//!     → metrics.rs (counters)
//!
//! Consumers:
//!     → logging.rs subscriber (stdout, pretty or JSON)
//!     → custom observers (tests, dashboards)
//! ```
//!
//! # Design Decisions
//! - Diagnostics go through an observer, never straight to stdout
//! - Each attempt carries a request ID that is also sent upstream
//! - Metrics are cheap (no-op without a recorder)

pub mod events;
pub mod logging;
pub mod metrics;

pub use events::{DispatchEvent, DispatchObserver, TracingObserver};
