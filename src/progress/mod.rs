//! Monthly progress indicator.
//!
//! # Data Flow
//! ```text
//! SalesData (POS API) + dashboard.monthly_target
//!     → indicator.rs (ProgressPercent, ProgressTier)
//!
//! ProgressStore (spreadsheet backend, alternate source)
//!     → store.rs (ProgressRows → ProgressPercent for "<Month> <Year>")
//! ```

pub mod indicator;
pub mod store;

pub use indicator::{month_label, remaining_days, ProgressPercent, ProgressTier};
pub use store::{load_month_progress, InMemoryProgressStore, ProgressError, ProgressRows, ProgressStore};
