//! Testing infrastructure for stallwatch.
//!
//! - **Mocks**: [`MockTracker`], an [`IssueTracker`](crate::tracker::IssueTracker)
//!   with canned data, failure injection and call counting
//! - **Assertions**: reason and suggestion assertions with readable failures
//! - **Fixtures**: issues and histories on a fixed clock (test-only)
//!
//! # Example
//!
//! ```rust,ignore
//! use stallwatch::testing::{MockTracker, TrackerOp, assert_has_reason};
//!
//! let tracker = MockTracker::new().failing(TrackerOp::FetchBlockers);
//! let engine = StallEngine::new(tracker, StallConfig::default());
//! let result = engine.classify(&issue).await?;
//! assert_has_reason(&result, "STATUS_BLOCKED");
//! ```

pub mod assertions;
#[cfg(test)]
pub mod fixtures;
pub mod mocks;

pub use assertions::*;
#[cfg(test)]
pub use fixtures::*;
pub use mocks::*;
