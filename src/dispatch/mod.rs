//! Request dispatch subsystem.
//!
//! # Data Flow
//! ```text
//! endpoint + optional SalesQuery + ordered strategies
//!     for each base URL (primary, then fallbacks):
//!         for each strategy:
//!             → token manager (BearerToken only)
//!             → strategy headers + X-Request-Id
//!             → GET with per-attempt timeout
//!             → 2xx + JSON body? return RawResponse
//!             → otherwise record AttemptResult, continue
//!     → AllStrategiesFailed { attempts }
//! ```
//!
//! # Design Decisions
//! - Sequential, never parallel: no duplicate side effects upstream
//! - No retry of the same strategy on the same URL
//! - A rejected bearer token is invalidated so the next call refreshes

pub mod attempt;
pub mod dispatcher;

pub use attempt::{AttemptResult, RawResponse};
pub use dispatcher::RequestDispatcher;
