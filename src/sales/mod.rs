//! Sales data subsystem.
//!
//! # Data Flow
//! ```text
//! SalesQuery (explicit range or calendar month)
//!     → to_params() → dispatcher GET {base}{sales}?start_date&end_date&format=json
//!     → RawResponse
//!     → normalizer.rs (envelope → SalesData, period from the query)
//! ```

pub mod normalizer;
pub mod types;

pub use normalizer::normalize;
pub use types::{SalesData, SalesQuery};
